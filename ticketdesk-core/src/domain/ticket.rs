//! Ticket domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Cancelled,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Cancelled,
    ];

    /// Statuses a manager can move the ticket to from here
    pub fn transitions(self) -> Vec<TicketStatus> {
        [
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            TicketStatus::Cancelled,
        ]
        .into_iter()
        .filter(|s| *s != self)
        .collect()
    }

    pub fn can_transition_to(self, target: TicketStatus) -> bool {
        self.transitions().contains(&target)
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in-progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown ticket status: {}", s)),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Resolved => write!(f, "resolved"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Ticket category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TicketType {
    #[default]
    Issue,
    FeatureRequest,
    Other,
}

impl std::str::FromStr for TicketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "issue" => Ok(Self::Issue),
            "feature-request" => Ok(Self::FeatureRequest),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown ticket type: {}", s)),
        }
    }
}

impl std::fmt::Display for TicketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Issue => write!(f, "issue"),
            Self::FeatureRequest => write!(f, "feature-request"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Ticket priority
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

/// User reference embedded in tickets and comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub user: Option<UserRef>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn author(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.username.as_str())
            .unwrap_or("Unknown")
    }
}

/// Ticket entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    #[serde(default)]
    pub created_by: Option<UserRef>,
    #[serde(default)]
    pub assigned_to: Option<UserRef>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a ticket
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct CreateTicketInput {
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[validate(custom(function = "validate_description"))]
    pub description: String,
    pub priority: TicketPriority,
}

/// Input for adding a comment
#[derive(Debug, Clone, Serialize, Validate)]
pub struct AddCommentInput {
    #[validate(custom(function = "validate_comment"))]
    pub message: String,
}

fn validate_title(value: &str) -> Result<(), validator::ValidationError> {
    not_blank(value, "Title is required")
}

fn validate_description(value: &str) -> Result<(), validator::ValidationError> {
    not_blank(value, "Description is required")
}

fn validate_comment(value: &str) -> Result<(), validator::ValidationError> {
    not_blank(value, "Comment must not be empty")
}

fn not_blank(value: &str, message: &'static str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        Err(validator::ValidationError::new("blank").with_message(message.into()))
    } else {
        Ok(())
    }
}

/// Ticket list query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<TicketType>,
    pub page: u32,
    pub limit: u32,
}

impl Default for TicketFilter {
    fn default() -> Self {
        Self {
            status: None,
            ticket_type: None,
            page: 1,
            limit: 20,
        }
    }
}

impl TicketFilter {
    /// First page of `limit` tickets, unfiltered
    pub fn first(limit: u32) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

/// One page of tickets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketPage {
    pub tickets: Vec<Ticket>,
    pub pagination: Pagination,
}

/// Per-status ticket counts shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub cancelled: u64,
}

impl TicketStats {
    /// Count statuses over `tickets`; `total` comes from the server
    pub fn tally<'a>(total: u64, tickets: impl IntoIterator<Item = &'a Ticket>) -> Self {
        let mut stats = Self {
            total,
            ..Default::default()
        };
        for ticket in tickets {
            match ticket.status {
                TicketStatus::Open => stats.open += 1,
                TicketStatus::InProgress => stats.in_progress += 1,
                TicketStatus::Resolved => stats.resolved += 1,
                TicketStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }

    pub fn count(&self, status: TicketStatus) -> u64 {
        match status {
            TicketStatus::Open => self.open,
            TicketStatus::InProgress => self.in_progress,
            TicketStatus::Resolved => self.resolved,
            TicketStatus::Cancelled => self.cancelled,
        }
    }
}

/// Dashboard data: recent tickets and status counts
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub recent: Vec<Ticket>,
    pub stats: TicketStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_ticket(status: TicketStatus) -> Ticket {
        serde_json::from_value(json!({
            "_id": "t-1",
            "title": "Login broken",
            "description": "Cannot log in",
            "type": "issue",
            "priority": "high",
            "status": status.to_string(),
            "createdBy": { "_id": "u-1", "username": "alice" },
            "comments": [],
            "createdAt": "2024-03-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_ticket_wire_format() {
        let ticket: Ticket = serde_json::from_value(json!({
            "_id": "t-42",
            "title": "Add dark mode",
            "description": "Please",
            "type": "feature-request",
            "priority": "low",
            "status": "in-progress",
            "createdBy": { "username": "bob" },
            "assignedTo": { "username": "carol" },
            "comments": [
                {
                    "user": { "username": "carol" },
                    "message": "On it",
                    "createdAt": "2024-03-02T09:30:00Z"
                },
                { "message": "orphan", "createdAt": "2024-03-02T09:31:00Z" }
            ],
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-02T09:31:00Z"
        }))
        .unwrap();

        assert_eq!(ticket.id, "t-42");
        assert_eq!(ticket.ticket_type, TicketType::FeatureRequest);
        assert_eq!(ticket.status, TicketStatus::InProgress);
        assert_eq!(ticket.assigned_to.unwrap().username, "carol");
        assert_eq!(ticket.comments[0].author(), "carol");
        assert_eq!(ticket.comments[1].author(), "Unknown");
    }

    #[test]
    fn test_transitions_exclude_current_status() {
        assert_eq!(
            TicketStatus::Open.transitions(),
            vec![
                TicketStatus::InProgress,
                TicketStatus::Resolved,
                TicketStatus::Cancelled
            ]
        );
        assert_eq!(
            TicketStatus::Resolved.transitions(),
            vec![TicketStatus::InProgress, TicketStatus::Cancelled]
        );
        assert!(!TicketStatus::InProgress.can_transition_to(TicketStatus::InProgress));
        assert!(!TicketStatus::Resolved.can_transition_to(TicketStatus::Open));
    }

    #[test]
    fn test_create_input_validation() {
        let input = CreateTicketInput {
            title: "  ".to_string(),
            description: String::new(),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("description"));

        let input = CreateTicketInput {
            title: "Printer".to_string(),
            description: "Out of toner".to_string(),
            ..Default::default()
        };
        assert!(input.validate().is_ok());
        assert_eq!(input.ticket_type, TicketType::Issue);
        assert_eq!(input.priority, TicketPriority::Medium);
    }

    #[test]
    fn test_filter_serialization_skips_empty() {
        let filter = TicketFilter {
            status: Some(TicketStatus::InProgress),
            ..Default::default()
        };
        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            value,
            json!({ "status": "in-progress", "page": 1, "limit": 20 })
        );
    }

    #[test]
    fn test_stats_tally() {
        let tickets = vec![
            sample_ticket(TicketStatus::Open),
            sample_ticket(TicketStatus::Open),
            sample_ticket(TicketStatus::Resolved),
            sample_ticket(TicketStatus::Cancelled),
        ];
        let stats = TicketStats::tally(12, &tickets);

        assert_eq!(stats.total, 12);
        assert_eq!(stats.count(TicketStatus::Open), 2);
        assert_eq!(stats.in_progress, 0);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.cancelled, 1);
    }
}
