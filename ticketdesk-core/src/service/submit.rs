//! Duplicate-submission guard for submitting controls

use crate::error::{AppError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-flight flag of one control (e.g., the "create ticket" button).
///
/// A second submission while one is outstanding fails with `Busy`.
#[derive(Debug, Clone)]
pub struct SubmitGuard {
    name: &'static str,
    busy: Arc<AtomicBool>,
}

impl SubmitGuard {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the control should render disabled
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mark the control busy until the returned token is dropped
    pub fn begin(&self) -> Result<InFlight> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(control = self.name, "Submission already in progress");
            return Err(AppError::Busy(format!("{} already in progress", self.name)));
        }

        Ok(InFlight {
            busy: Arc::clone(&self.busy),
        })
    }
}

/// Releases its guard on drop, including on error and cancellation
#[derive(Debug)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
