//! Application state: wires the client, the identity context and the
//! components built on top of it.

use crate::api::ApiClient;
use crate::config::Config;
use crate::context::IdentityContext;
use crate::error::Result;
use crate::navigation::{NavigationShell, RouteTable};
use crate::service::{TicketService, UserAdminService};
use crate::session::{BootstrapOutcome, HostEnvironment, SessionBootstrapper};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Everything one running Mini App instance holds
pub struct AppState {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub context: IdentityContext,
    pub shell: NavigationShell,
    pub tickets: TicketService<ApiClient>,
    pub users: UserAdminService<ApiClient>,
    bootstrapper: Arc<SessionBootstrapper<ApiClient>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let api = Arc::new(ApiClient::new(config.api.clone())?);
        let context = IdentityContext::new();

        let bootstrapper = SessionBootstrapper::new(Arc::clone(&api), context.clone())
            .with_dev_mode(config.session.dev_mode, config.session.dev_role);

        Ok(Self {
            shell: NavigationShell::new(RouteTable::standard(), context.clone()),
            tickets: TicketService::new(Arc::clone(&api), context.clone()),
            users: UserAdminService::new(Arc::clone(&api), context.clone()),
            bootstrapper: Arc::new(bootstrapper),
            context,
            api,
            config,
        })
    }

    /// Spawn the session bootstrap against `host`.
    ///
    /// Later calls return immediately with
    /// [`BootstrapOutcome::AlreadyBootstrapped`].
    pub fn start(&self, host: Arc<dyn HostEnvironment>) -> JoinHandle<BootstrapOutcome> {
        tracing::info!(
            api_url = %self.config.api.base_url,
            dev_mode = self.config.is_dev_mode(),
            "Starting session bootstrap"
        );
        Arc::clone(&self.bootstrapper).spawn(host)
    }
}
