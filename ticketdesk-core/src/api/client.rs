//! HTTP client for the ticket backend
//!
//! After a successful init data exchange the raw init data is attached to
//! every request as `X-Telegram-Init-Data`, so the backend can re-validate
//! each call without a server-side session.

use super::types::*;
use super::{SessionExchange, TicketApi, UserApi};
use crate::config::ApiConfig;
use crate::domain::{
    AddCommentInput, CreateTicketInput, Identity, ManagedUser, Role, Ticket, TicketFilter,
    TicketPage, TicketStatus, UpdateRoleInput,
};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Header carrying the raw Telegram init data
pub const INIT_DATA_HEADER: &str = "X-Telegram-Init-Data";

/// Ticket backend client
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http_client: Client,
    init_data: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new client
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            http_client,
            init_data: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Whether init data is attached to outgoing requests
    pub async fn has_credential(&self) -> bool {
        self.init_data.read().await.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http_client.request(method, self.url(path));
        match self.init_data.read().await.as_deref() {
            Some(init_data) => builder.header(INIT_DATA_HEADER, init_data),
            None => builder,
        }
    }

    /// Send a request and map non-success statuses to errors.
    ///
    /// `endpoint` is the route template, used for logs and metrics.
    async fn send(
        &self,
        method: Method,
        endpoint: &'static str,
        builder: RequestBuilder,
    ) -> Result<Response> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::counter!(
                    "ticketdesk_api_requests_total",
                    "method" => method.to_string(),
                    "endpoint" => endpoint,
                    "status" => "error"
                )
                .increment(1);
                tracing::warn!(%method, endpoint, error = %e, "Request failed");
                return Err(AppError::Http(e));
            }
        };

        let status = response.status();
        metrics::counter!(
            "ticketdesk_api_requests_total",
            "method" => method.to_string(),
            "endpoint" => endpoint,
            "status" => status.as_u16().to_string()
        )
        .increment(1);
        tracing::debug!(%method, endpoint, status = status.as_u16(), "Request completed");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => {
                AppError::Unauthorized(format!("{} {} rejected credentials", method, endpoint))
            }
            StatusCode::FORBIDDEN => {
                AppError::Forbidden(format!("{} {} not permitted", method, endpoint))
            }
            StatusCode::NOT_FOUND => AppError::NotFound(format!("{} {}", method, endpoint)),
            _ => AppError::Request(format!(
                "{} {} failed: {} - {}",
                method, endpoint, status, body
            )),
        })
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        endpoint: &'static str,
        response: Response,
    ) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| AppError::Request(format!("Failed to parse {} response: {}", endpoint, e)))
    }
}

#[async_trait]
impl SessionExchange for ApiClient {
    async fn exchange_init_data(&self, init_data: &str) -> Result<Identity> {
        const ENDPOINT: &str = "/api/auth/telegram";

        // The exchange itself never carries a previously attached credential.
        let builder = self
            .http_client
            .post(self.url(ENDPOINT))
            .json(&InitDataRequest { init_data });

        let response = self.send(Method::POST, ENDPOINT, builder).await?;
        let auth: AuthResponse = Self::parse(ENDPOINT, response).await?;
        Ok(auth.user)
    }

    async fn attach_init_data(&self, init_data: String) {
        let mut slot = self.init_data.write().await;
        *slot = Some(init_data);
    }
}

#[async_trait]
impl TicketApi for ApiClient {
    async fn list_tickets(&self, filter: &TicketFilter) -> Result<TicketPage> {
        const ENDPOINT: &str = "/api/tickets";

        let builder = self.request(Method::GET, ENDPOINT).await.query(filter);
        let response = self.send(Method::GET, ENDPOINT, builder).await?;
        Self::parse(ENDPOINT, response).await
    }

    async fn get_ticket(&self, id: &str) -> Result<Ticket> {
        const ENDPOINT: &str = "/api/tickets/:id";

        let path = format!("/api/tickets/{}", urlencode(id));
        let builder = self.request(Method::GET, &path).await;
        let response = self.send(Method::GET, ENDPOINT, builder).await?;
        let body: TicketResponse = Self::parse(ENDPOINT, response).await?;
        Ok(body.ticket)
    }

    async fn create_ticket(&self, input: &CreateTicketInput) -> Result<Ticket> {
        const ENDPOINT: &str = "/api/tickets";

        let builder = self.request(Method::POST, ENDPOINT).await.json(input);
        let response = self.send(Method::POST, ENDPOINT, builder).await?;
        let body: TicketResponse = Self::parse(ENDPOINT, response).await?;
        Ok(body.ticket)
    }

    async fn update_ticket_status(&self, id: &str, status: TicketStatus) -> Result<Ticket> {
        const ENDPOINT: &str = "/api/tickets/:id";

        let path = format!("/api/tickets/{}", urlencode(id));
        let builder = self
            .request(Method::PATCH, &path)
            .await
            .json(&StatusUpdateRequest { status });
        let response = self.send(Method::PATCH, ENDPOINT, builder).await?;
        let body: TicketResponse = Self::parse(ENDPOINT, response).await?;
        Ok(body.ticket)
    }

    async fn add_comment(&self, id: &str, message: &str) -> Result<Ticket> {
        const ENDPOINT: &str = "/api/tickets/:id/comments";

        let path = format!("/api/tickets/{}/comments", urlencode(id));
        let builder = self
            .request(Method::POST, &path)
            .await
            .json(&AddCommentInput {
                message: message.to_string(),
            });
        let response = self.send(Method::POST, ENDPOINT, builder).await?;
        let body: TicketResponse = Self::parse(ENDPOINT, response).await?;
        Ok(body.ticket)
    }
}

#[async_trait]
impl UserApi for ApiClient {
    async fn list_users(&self, role: Option<Role>) -> Result<Vec<ManagedUser>> {
        const ENDPOINT: &str = "/api/users";

        let builder = self
            .request(Method::GET, ENDPOINT)
            .await
            .query(&RoleQuery { role });
        let response = self.send(Method::GET, ENDPOINT, builder).await?;
        let body: UsersResponse = Self::parse(ENDPOINT, response).await?;
        Ok(body.users)
    }

    async fn update_user_role(&self, user_id: &str, role: Role) -> Result<()> {
        const ENDPOINT: &str = "/api/users/:id/role";

        let path = format!("/api/users/{}/role", urlencode(user_id));
        let builder = self
            .request(Method::PATCH, &path)
            .await
            .json(&UpdateRoleInput { role });
        self.send(Method::PATCH, ENDPOINT, builder).await?;
        Ok(())
    }

    async fn toggle_user_status(&self, user_id: &str) -> Result<()> {
        const ENDPOINT: &str = "/api/users/:id/status";

        let path = format!("/api/users/{}/status", urlencode(user_id));
        let builder = self.request(Method::PATCH, &path).await;
        self.send(Method::PATCH, ENDPOINT, builder).await?;
        Ok(())
    }
}

/// Percent-encode a single path segment
fn urlencode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
