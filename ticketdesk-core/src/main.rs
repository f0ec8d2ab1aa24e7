use anyhow::Result;
use std::sync::Arc;
use ticketdesk_core::{
    config::Config, navigation::Navigation, session::TelegramHost, state::AppState, telemetry,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let metrics_handle = telemetry::init(&config.telemetry);

    info!(service = %config.telemetry.service_name, "Starting Ticketdesk session");
    info!("Backend API at {}", config.api.base_url);

    let state = AppState::new(config)?;
    let outcome = state.start(Arc::new(TelegramHost::from_env())).await?;

    match outcome.identity() {
        Some(identity) => info!(
            user = identity.greeting_name(),
            role = identity.role.label(),
            "Session ready"
        ),
        None => info!("Session ready without identity"),
    }

    for entry in state.shell.menu() {
        info!(title = entry.title, "Menu entry");
    }

    for path in ["/dashboard", "/tickets", "/tickets/new", "/users", "/settings"] {
        match state.shell.navigate(path) {
            Navigation::Render(route) => info!(path, route = %route.path(), "Render"),
            Navigation::Redirect(route) => info!(path, target = %route.path(), "Redirect"),
            Navigation::Pending => info!(path, "Pending"),
        }
    }

    if let Some(handle) = metrics_handle {
        println!("{}", handle.render());
    }

    Ok(())
}
