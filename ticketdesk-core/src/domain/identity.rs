//! Identity domain model

use serde::{Deserialize, Deserializer, Serialize};

/// Role of an identity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    #[default]
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::SuperAdmin];

    /// Admins and super-admins
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub fn is_super_admin(self) -> bool {
        self == Role::SuperAdmin
    }

    /// Human-readable label (e.g., "Super Admin")
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
            Role::SuperAdmin => "Super Admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "super-admin" => Ok(Self::SuperAdmin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
            Self::SuperAdmin => write!(f, "super-admin"),
        }
    }
}

/// Given/family name pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl DisplayName {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
        }
    }

    /// "First Last", either part optional; `None` when both are missing
    pub fn full(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// The authenticated actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "IdentityRecord")]
pub struct Identity {
    pub id: String,
    /// Telegram account id
    #[serde(rename = "telegramId")]
    pub external_id: String,
    /// Telegram username; empty for accounts without one
    #[serde(rename = "username")]
    pub handle: String,
    #[serde(flatten)]
    pub display_name: DisplayName,
    pub role: Role,
}

impl Identity {
    /// Fixed identity used when running without the Telegram host
    pub fn development(role: Role) -> Self {
        Self {
            id: "1".to_string(),
            external_id: "123456789".to_string(),
            handle: "dev_user".to_string(),
            display_name: DisplayName::new("Dev", "User"),
            role,
        }
    }

    /// Name used in greetings: first name, then the handle, then the role
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .first_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| Some(self.handle.as_str()).filter(|h| !h.trim().is_empty()))
            .unwrap_or_else(|| self.role.label())
    }
}

/// Identity as the backend sends it.
///
/// Documents carry `_id`, and some serializers add an `id` copy as well.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityRecord {
    #[serde(rename = "_id")]
    document_id: Option<String>,
    id: Option<String>,
    #[serde(rename = "telegramId", deserialize_with = "string_or_number")]
    external_id: String,
    #[serde(rename = "username", default)]
    handle: Option<String>,
    #[serde(flatten)]
    display_name: DisplayName,
    role: Role,
}

impl TryFrom<IdentityRecord> for Identity {
    type Error = String;

    fn try_from(record: IdentityRecord) -> Result<Self, Self::Error> {
        let id = record
            .document_id
            .or(record.id)
            .ok_or_else(|| "missing field `_id`".to_string())?;

        Ok(Self {
            id,
            external_id: record.external_id,
            handle: record.handle.unwrap_or_default(),
            display_name: record.display_name,
            role: record.role,
        })
    }
}

/// Telegram ids arrive as JSON numbers from some backends
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
