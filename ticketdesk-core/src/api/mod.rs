//! Ticket backend API
//!
//! The traits are the seams the session and the workflows depend on;
//! [`ApiClient`] implements all of them over HTTP.

pub mod client;
pub mod types;

pub use client::{ApiClient, INIT_DATA_HEADER};
pub use types::*;

use crate::domain::{
    CreateTicketInput, Identity, ManagedUser, Role, Ticket, TicketFilter, TicketPage,
    TicketStatus,
};
use crate::error::Result;
use async_trait::async_trait;

/// Exchange of the Telegram init data for a session
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionExchange: Send + Sync {
    /// `POST /api/auth/telegram`
    async fn exchange_init_data(&self, init_data: &str) -> Result<Identity>;

    /// Attach the raw init data to every later request
    async fn attach_init_data(&self, init_data: String);
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketApi: Send + Sync {
    async fn list_tickets(&self, filter: &TicketFilter) -> Result<TicketPage>;
    async fn get_ticket(&self, id: &str) -> Result<Ticket>;
    async fn create_ticket(&self, input: &CreateTicketInput) -> Result<Ticket>;
    async fn update_ticket_status(&self, id: &str, status: TicketStatus) -> Result<Ticket>;
    async fn add_comment(&self, id: &str, message: &str) -> Result<Ticket>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list_users(&self, role: Option<Role>) -> Result<Vec<ManagedUser>>;
    async fn update_user_role(&self, user_id: &str, role: Role) -> Result<()>;
    async fn toggle_user_status(&self, user_id: &str) -> Result<()>;
}
