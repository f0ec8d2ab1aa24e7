//! Ticket workflows behind the dashboard, list, detail and creation views

use super::submit::SubmitGuard;
use crate::api::TicketApi;
use crate::context::IdentityContext;
use crate::domain::{
    AddCommentInput, CreateTicketInput, DashboardSummary, Ticket, TicketFilter, TicketPage,
    TicketStats, TicketStatus,
};
use crate::error::{AppError, Result};
use crate::gate::{require, CapabilityRequirement};
use std::sync::Arc;
use validator::Validate;

/// Recent tickets shown on the dashboard
const RECENT_LIMIT: u32 = 5;
/// Listing size used to count tickets per status
const STATS_LIMIT: u32 = 1000;

pub struct TicketService<A: TicketApi> {
    api: Arc<A>,
    context: IdentityContext,
    create_guard: SubmitGuard,
    comment_guard: SubmitGuard,
    status_guard: SubmitGuard,
}

impl<A: TicketApi> TicketService<A> {
    pub fn new(api: Arc<A>, context: IdentityContext) -> Self {
        Self {
            api,
            context,
            create_guard: SubmitGuard::new("Ticket creation"),
            comment_guard: SubmitGuard::new("Comment submission"),
            status_guard: SubmitGuard::new("Status change"),
        }
    }

    pub fn create_guard(&self) -> &SubmitGuard {
        &self.create_guard
    }

    pub fn comment_guard(&self) -> &SubmitGuard {
        &self.comment_guard
    }

    pub fn status_guard(&self) -> &SubmitGuard {
        &self.status_guard
    }

    /// One page of tickets
    pub async fn list(&self, filter: &TicketFilter) -> Result<TicketPage> {
        self.context.ensure_ready()?;
        self.api.list_tickets(filter).await
    }

    pub async fn get(&self, id: &str) -> Result<Ticket> {
        self.context.ensure_ready()?;
        self.api.get_ticket(id).await
    }

    /// Recent tickets plus per-status counts
    pub async fn dashboard(&self) -> Result<DashboardSummary> {
        self.context.ensure_ready()?;

        let recent = self.api.list_tickets(&TicketFilter::first(RECENT_LIMIT)).await?;
        // TODO: switch to a backend stats endpoint once one exists; counting
        // over a bounded listing undercounts beyond STATS_LIMIT tickets.
        let all = self.api.list_tickets(&TicketFilter::first(STATS_LIMIT)).await?;

        let stats = TicketStats::tally(recent.pagination.total, &all.tickets);
        Ok(DashboardSummary {
            recent: recent.tickets,
            stats,
        })
    }

    /// Validate and submit a new ticket
    pub async fn create(&self, input: CreateTicketInput) -> Result<Ticket> {
        self.context.ensure_ready()?;
        input.validate()?;

        let _in_flight = self.create_guard.begin()?;
        let ticket = self.api.create_ticket(&input).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to create ticket");
        })?;

        tracing::info!(ticket_id = %ticket.id, "Ticket created");
        Ok(ticket)
    }

    /// Post a comment; returns the updated ticket
    pub async fn add_comment(&self, ticket_id: &str, message: &str) -> Result<Ticket> {
        self.context.ensure_ready()?;
        let input = AddCommentInput {
            message: message.trim().to_string(),
        };
        input.validate()?;

        let _in_flight = self.comment_guard.begin()?;
        self.api
            .add_comment(ticket_id, &input.message)
            .await
            .inspect_err(|e| tracing::error!(ticket_id, error = %e, "Failed to add comment"))
    }

    /// Move a ticket to another status. Admins and super-admins only.
    pub async fn change_status(&self, ticket: &Ticket, status: TicketStatus) -> Result<Ticket> {
        let state = self.context.ensure_ready()?;
        require(&state, &CapabilityRequirement::admin())?;

        if !ticket.status.can_transition_to(status) {
            return Err(AppError::Validation(format!(
                "Cannot move ticket from {} to {}",
                ticket.status, status
            )));
        }

        let _in_flight = self.status_guard.begin()?;
        self.api
            .update_ticket_status(&ticket.id, status)
            .await
            .inspect_err(|e| {
                tracing::error!(ticket_id = %ticket.id, error = %e, "Failed to update status")
            })
    }
}
