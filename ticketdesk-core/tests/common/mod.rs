//! Common test utilities

#![allow(dead_code)]

use serde_json::{json, Value};
use ticketdesk_core::config::{ApiConfig, Config, SessionConfig, TelemetryConfig};
use ticketdesk_core::domain::Role;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const INIT_DATA: &str = concat!(
    "query_id=AAHdF6IQAAAAAN0XohDhrOrc",
    "&user=%7B%22id%22%3A279058397%7D",
    "&auth_date=1700000000",
    "&hash=c501b71e775f74ce10e377dea85a7ea24ecd640b223ea86dfe453e0eaed2e2b2",
);

pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
    }
}

pub fn config(base_url: &str, dev_mode: bool) -> Config {
    Config {
        api: api_config(base_url),
        session: SessionConfig {
            dev_mode,
            dev_role: Role::SuperAdmin,
        },
        telemetry: TelemetryConfig::default(),
    }
}

pub fn user_json(id: &str, role: &str) -> Value {
    json!({
        "_id": id,
        "telegramId": 279058397,
        "username": "support_kate",
        "firstName": "Kate",
        "lastName": "Lee",
        "role": role,
        "isActive": true
    })
}

/// Telegram account without a username
pub fn anonymous_user_json(id: &str, role: &str) -> Value {
    json!({
        "_id": id,
        "telegramId": 5550001,
        "firstName": "Nadia",
        "role": role,
        "isActive": true
    })
}

pub fn ticket_json(id: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "title": "Cannot log in",
        "description": "The login button does nothing",
        "type": "issue",
        "priority": "high",
        "status": status,
        "createdBy": { "_id": "u-1", "username": "support_kate" },
        "comments": [],
        "createdAt": "2024-03-01T09:30:00.000Z",
        "updatedAt": "2024-03-01T09:30:00.000Z"
    })
}

/// Mount the init data exchange answering with a user of `role`
pub async fn mount_auth(server: &MockServer, role: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/telegram"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": user_json("u-1", role)
        })))
        .mount(server)
        .await;
}
