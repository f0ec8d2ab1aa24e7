//! Business workflows on top of the API client and the identity context

pub mod submit;
pub mod ticket;
pub mod user;

pub use submit::{InFlight, SubmitGuard};
pub use ticket::TicketService;
pub use user::UserAdminService;
