//! Domain models for Ticketdesk Core

pub mod identity;
pub mod ticket;
pub mod user;

pub use identity::*;
pub use ticket::*;
pub use user::*;
