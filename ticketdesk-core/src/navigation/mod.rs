//! Navigation shell: route table and gated route resolution
//!
//! The shell matches a path to a [`Route`], looks up the route's capability
//! requirement and asks the gate for a decision. It never decides access on
//! its own.

use crate::context::IdentityContext;
use crate::gate::{authorize_session, CapabilityRequirement, GateDecision};
use serde::Serialize;

/// Logical routes of the Mini App
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    Dashboard,
    Tickets,
    NewTicket,
    TicketDetail { id: String },
    Users,
    Settings,
}

/// Route without its parameters, used as the table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    Dashboard,
    Tickets,
    NewTicket,
    TicketDetail,
    Users,
    Settings,
}

impl Route {
    pub fn kind(&self) -> RouteKind {
        match self {
            Route::Dashboard => RouteKind::Dashboard,
            Route::Tickets => RouteKind::Tickets,
            Route::NewTicket => RouteKind::NewTicket,
            Route::TicketDetail { .. } => RouteKind::TicketDetail,
            Route::Users => RouteKind::Users,
            Route::Settings => RouteKind::Settings,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/dashboard".to_string(),
            Route::Tickets => "/tickets".to_string(),
            Route::NewTicket => "/tickets/new".to_string(),
            Route::TicketDetail { id } => format!("/tickets/{}", id),
            Route::Users => "/users".to_string(),
            Route::Settings => "/settings".to_string(),
        }
    }

    /// Match a path. `None` for the index and for unknown paths.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["dashboard"] => Some(Route::Dashboard),
            ["tickets"] => Some(Route::Tickets),
            // Static segment ranks above the `:id` parameter
            ["tickets", "new"] => Some(Route::NewTicket),
            ["tickets", id] => Some(Route::TicketDetail { id: id.to_string() }),
            ["users"] => Some(Route::Users),
            ["settings"] => Some(Route::Settings),
            _ => None,
        }
    }
}

/// Returns `true` if any path segment is `.` or `..`.
fn has_dot_segments(path: &str) -> bool {
    path.split('/').any(|seg| seg == "." || seg == "..")
}

fn is_index(path: &str) -> bool {
    path.split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_matches('/')
        .is_empty()
}

/// Route table entry
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub kind: RouteKind,
    pub title: &'static str,
    /// `None`: public once the session has loaded
    pub gate: Option<CapabilityRequirement>,
    /// Listed in the navigation menu
    pub in_menu: bool,
}

/// Routes and their capability requirements
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    landing: Route,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RouteTable {
    /// The Mini App's routes; user administration is super-admin only
    pub fn standard() -> Self {
        let entry = |kind, title, gate, in_menu| RouteEntry {
            kind,
            title,
            gate,
            in_menu,
        };

        Self {
            entries: vec![
                entry(RouteKind::Dashboard, "Dashboard", None, true),
                entry(RouteKind::Tickets, "Tickets", None, true),
                entry(RouteKind::NewTicket, "New Ticket", None, false),
                entry(RouteKind::TicketDetail, "Ticket", None, false),
                entry(
                    RouteKind::Users,
                    "Users",
                    Some(CapabilityRequirement::super_admin()),
                    true,
                ),
                entry(RouteKind::Settings, "Settings", None, true),
            ],
            landing: Route::Dashboard,
        }
    }

    /// Default redirect target
    pub fn landing(&self) -> &Route {
        &self.landing
    }

    pub fn entry(&self, kind: RouteKind) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    pub fn gate_for(&self, kind: RouteKind) -> Option<&CapabilityRequirement> {
        self.entry(kind).and_then(|e| e.gate.as_ref())
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }
}

/// Outcome of navigating to a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "target", rename_all = "snake_case")]
pub enum Navigation {
    /// Neutral pending indicator while the session loads
    Pending,
    Render(Route),
    Redirect(Route),
}

/// Composes the route table with the live identity context
#[derive(Debug, Clone)]
pub struct NavigationShell {
    table: RouteTable,
    context: IdentityContext,
}

impl NavigationShell {
    pub fn new(table: RouteTable, context: IdentityContext) -> Self {
        Self { table, context }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolve `path` against the current session
    pub fn navigate(&self, path: &str) -> Navigation {
        let landing = self.table.landing().clone();

        if has_dot_segments(path) {
            tracing::warn!(path, "Rejected path with dot segments");
            return Navigation::Redirect(landing);
        }
        if is_index(path) {
            return Navigation::Redirect(landing);
        }

        let Some(route) = Route::parse(path) else {
            tracing::debug!(path, "Unknown path, redirecting to landing");
            return Navigation::Redirect(landing);
        };

        self.open(route)
    }

    /// Decide access to an already matched route
    pub fn open(&self, route: Route) -> Navigation {
        let state = self.context.snapshot();

        let decision = match self.table.gate_for(route.kind()) {
            Some(required) => authorize_session(&state, required).decision(),
            None if state.loading => GateDecision::ShowPending,
            None => GateDecision::Render,
        };

        match decision {
            GateDecision::ShowPending => Navigation::Pending,
            GateDecision::Render => Navigation::Render(route),
            GateDecision::RedirectToLanding => {
                tracing::info!(route = %route.path(), "Access denied, redirecting to landing");
                Navigation::Redirect(self.table.landing().clone())
            }
        }
    }

    /// Menu entries the current session may open
    pub fn menu(&self) -> Vec<&RouteEntry> {
        let state = self.context.snapshot();
        if state.loading {
            return Vec::new();
        }

        self.table
            .entries()
            .iter()
            .filter(|e| e.in_menu)
            .filter(|e| match &e.gate {
                Some(required) => {
                    authorize_session(&state, required).decision() == GateDecision::Render
                }
                None => true,
            })
            .collect()
    }
}
