//! One-time session bootstrap

use super::host::HostEnvironment;
use crate::api::SessionExchange;
use crate::context::IdentityContext;
use crate::domain::{Identity, Role};
use crate::error::AppError;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// How the bootstrap ended
#[derive(Debug)]
pub enum BootstrapOutcome {
    /// Init data exchanged for an identity
    Authenticated(Identity),
    /// No init data; development fallback identity installed
    DevFallback(Identity),
    /// No init data outside development mode
    NoInitData,
    /// Exchange failed; the session stays unauthenticated
    Failed(AppError),
    /// Another bootstrap already ran for this context
    AlreadyBootstrapped,
}

impl BootstrapOutcome {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            BootstrapOutcome::Authenticated(identity) | BootstrapOutcome::DevFallback(identity) => {
                Some(identity)
            }
            _ => None,
        }
    }

    fn as_label(&self) -> &'static str {
        match self {
            BootstrapOutcome::Authenticated(_) => "authenticated",
            BootstrapOutcome::DevFallback(_) => "dev_fallback",
            BootstrapOutcome::NoInitData => "no_init_data",
            BootstrapOutcome::Failed(_) => "failed",
            BootstrapOutcome::AlreadyBootstrapped => "already_bootstrapped",
        }
    }
}

/// Clears `loading` when dropped unless the bootstrap completed first.
///
/// Covers the bootstrap future being dropped mid-exchange.
struct LoadingGuard<'a> {
    context: &'a IdentityContext,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(context: &'a IdentityContext) -> Self {
        Self {
            context,
            armed: true,
        }
    }

    fn complete(mut self, identity: Option<Identity>) {
        self.armed = false;
        self.context.complete_bootstrap(identity);
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Session bootstrap interrupted, continuing unauthenticated");
            self.context.complete_bootstrap(None);
        }
    }
}

/// Establishes the session identity once per application lifetime
pub struct SessionBootstrapper<E: SessionExchange> {
    exchange: Arc<E>,
    context: IdentityContext,
    dev_mode: bool,
    dev_role: Role,
}

impl<E: SessionExchange + 'static> SessionBootstrapper<E> {
    pub fn new(exchange: Arc<E>, context: IdentityContext) -> Self {
        Self {
            exchange,
            context,
            dev_mode: false,
            dev_role: Role::SuperAdmin,
        }
    }

    /// Allow the fallback identity with `role` when no init data is present
    pub fn with_dev_mode(mut self, dev_mode: bool, role: Role) -> Self {
        self.dev_mode = dev_mode;
        self.dev_role = role;
        self
    }

    pub fn context(&self) -> &IdentityContext {
        &self.context
    }

    /// Establish the session.
    ///
    /// Never fails: a rejected or unreachable exchange leaves the session
    /// unauthenticated. `loading` is cleared on every path.
    pub async fn bootstrap(&self, host: &dyn HostEnvironment) -> BootstrapOutcome {
        let outcome = if self.context.claim_bootstrap() {
            let guard = LoadingGuard::new(&self.context);
            let outcome = self.establish(host).await;
            guard.complete(outcome.identity().cloned());
            outcome
        } else {
            tracing::debug!("Session already bootstrapped, skipping");
            BootstrapOutcome::AlreadyBootstrapped
        };

        metrics::counter!("ticketdesk_session_bootstrap_total", "outcome" => outcome.as_label())
            .increment(1);
        outcome
    }

    /// Run [`Self::bootstrap`] on the runtime
    pub fn spawn(
        self: Arc<Self>,
        host: Arc<dyn HostEnvironment>,
    ) -> JoinHandle<BootstrapOutcome> {
        tokio::spawn(async move { self.bootstrap(host.as_ref()).await })
    }

    async fn establish(&self, host: &dyn HostEnvironment) -> BootstrapOutcome {
        let Some(init_data) = host.init_data() else {
            return self.without_init_data();
        };

        match self.exchange.exchange_init_data(&init_data).await {
            Ok(identity) => {
                self.exchange.attach_init_data(init_data).await;
                tracing::info!(
                    user_id = %identity.id,
                    role = %identity.role,
                    "Session established"
                );
                BootstrapOutcome::Authenticated(identity)
            }
            Err(e) => {
                tracing::error!(error = %e, "Auth initialization failed");
                BootstrapOutcome::Failed(AppError::Bootstrap(e.to_string()))
            }
        }
    }

    fn without_init_data(&self) -> BootstrapOutcome {
        if !self.dev_mode {
            tracing::warn!("No Telegram init data and development mode is off");
            return BootstrapOutcome::NoInitData;
        }

        let identity = Identity::development(self.dev_role);
        tracing::warn!(role = %identity.role, "Development mode: using fallback identity");
        BootstrapOutcome::DevFallback(identity)
    }
}
