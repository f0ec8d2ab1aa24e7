//! Host environment the Mini App runs in

use std::env;

/// Source of the platform init assertion
pub trait HostEnvironment: Send + Sync {
    /// Raw Telegram init data, if the host provided any
    fn init_data(&self) -> Option<String>;
}

/// Telegram WebApp launch parameters
#[derive(Debug, Clone, Default)]
pub struct TelegramHost {
    init_data: Option<String>,
}

impl TelegramHost {
    /// Host launched with the given init data string.
    ///
    /// Empty or whitespace-only init data counts as absent.
    pub fn new(init_data: impl Into<String>) -> Self {
        let init_data = init_data.into();
        Self {
            init_data: (!init_data.trim().is_empty()).then_some(init_data),
        }
    }

    /// Host without init data (local browser, tests)
    pub fn absent() -> Self {
        Self::default()
    }

    /// Read init data from `TELEGRAM_INIT_DATA`
    pub fn from_env() -> Self {
        env::var("TELEGRAM_INIT_DATA")
            .map(Self::new)
            .unwrap_or_default()
    }
}

impl HostEnvironment for TelegramHost {
    fn init_data(&self) -> Option<String> {
        self.init_data.clone()
    }
}
