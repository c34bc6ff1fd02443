//! Procedure client used by the dashboard components.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use inbox_core::{
    defaults, CreateTeamRequest, Document, DocumentTag, DocumentTagAssignmentRequest,
    UpdateUserRequest, User,
};

use crate::error::{ClientError, Result};

/// The API procedures the dashboard components call.
#[async_trait]
pub trait Procedures: Send + Sync {
    /// Create a team and return its id.
    async fn create_team(&self, req: &CreateTeamRequest) -> Result<Uuid>;

    async fn update_user(&self, req: &UpdateUserRequest) -> Result<User>;

    async fn current_user(&self) -> Result<User>;

    async fn get_document(&self, id: Uuid) -> Result<Document>;

    async fn list_document_tags(&self) -> Result<Vec<DocumentTag>>;

    async fn create_document_tag_assignment(&self, req: DocumentTagAssignmentRequest)
        -> Result<()>;

    async fn delete_document_tag_assignment(&self, req: DocumentTagAssignmentRequest)
        -> Result<()>;
}

/// Connection settings for [`HttpProcedures`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: String,
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            timeout_secs: defaults::CLIENT_TIMEOUT_SECS,
        }
    }

    /// Read `INBOX_API_URL`, `INBOX_API_TOKEN` and the optional
    /// `INBOX_CLIENT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("INBOX_API_URL")
            .map_err(|_| ClientError::Config("INBOX_API_URL is not set".to_string()))?;
        let token = std::env::var("INBOX_API_TOKEN")
            .map_err(|_| ClientError::Config("INBOX_API_TOKEN is not set".to_string()))?;
        let mut config = Self::new(base_url, token);
        if let Some(secs) = std::env::var("INBOX_CLIENT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout_secs = secs;
        }
        Ok(config)
    }
}

#[derive(Deserialize)]
struct Created {
    id: Uuid,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`Procedures`] over the JSON HTTP API with a bearer session token.
pub struct HttpProcedures {
    client: Client,
    config: ClientConfig,
}

impl HttpProcedures {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.config.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request.bearer_auth(&self.config.token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);
        warn!(
            subsystem = "dashboard",
            component = "procedures",
            status = status.as_u16(),
            error = %message,
            "Procedure rejected"
        );
        Err(ClientError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Procedures for HttpProcedures {
    #[instrument(skip(self, req), fields(subsystem = "dashboard", op = "team.create"))]
    async fn create_team(&self, req: &CreateTeamRequest) -> Result<Uuid> {
        let created: Created = self
            .send_json(self.client.post(self.url("/teams")).json(req))
            .await?;
        debug!(team_id = %created.id, "Team created");
        Ok(created.id)
    }

    #[instrument(skip(self, req), fields(subsystem = "dashboard", op = "user.update"))]
    async fn update_user(&self, req: &UpdateUserRequest) -> Result<User> {
        self.send_json(self.client.patch(self.url("/users/me")).json(req))
            .await
    }

    async fn current_user(&self) -> Result<User> {
        self.send_json(self.client.get(self.url("/users/me"))).await
    }

    async fn get_document(&self, id: Uuid) -> Result<Document> {
        self.send_json(self.client.get(self.url(&format!("/documents/{}", id))))
            .await
    }

    async fn list_document_tags(&self) -> Result<Vec<DocumentTag>> {
        self.send_json(self.client.get(self.url("/document-tags")))
            .await
    }

    #[instrument(skip(self), fields(subsystem = "dashboard", op = "documentTagAssignments.create"))]
    async fn create_document_tag_assignment(
        &self,
        req: DocumentTagAssignmentRequest,
    ) -> Result<()> {
        self.send(
            self.client
                .post(self.url("/document-tag-assignments"))
                .json(&req),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(subsystem = "dashboard", op = "documentTagAssignments.delete"))]
    async fn delete_document_tag_assignment(
        &self,
        req: DocumentTagAssignmentRequest,
    ) -> Result<()> {
        self.send(
            self.client
                .delete(self.url("/document-tag-assignments"))
                .json(&req),
        )
        .await?;
        Ok(())
    }
}
