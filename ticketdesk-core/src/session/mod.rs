//! Session bootstrap: host init data in, identity context populated

pub mod bootstrap;
pub mod host;

pub use bootstrap::{BootstrapOutcome, SessionBootstrapper};
pub use host::{HostEnvironment, TelegramHost};
