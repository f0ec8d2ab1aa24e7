//! Request and response envelopes of the ticket backend

use crate::domain::{Identity, ManagedUser, Ticket};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitDataRequest<'a> {
    pub init_data: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: Identity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketResponse {
    pub ticket: Ticket,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<ManagedUser>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateRequest {
    pub status: crate::domain::TicketStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<crate::domain::Role>,
}
