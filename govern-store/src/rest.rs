//! PostgREST client.
//!
//! Talks to the hosted store's REST interface. Every request carries the anon
//! key as `apikey`; the bearer token is the signed-in user's access token when
//! one is set, so row-level security applies, and the anon key otherwise.

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::rows::{MembershipRow, OrganizationRow, MEMBERSHIP_COLUMNS, ORGANIZATION_COLUMNS};
use crate::RemoteStore;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

const ORGANIZATIONS_PATH: &str = "/rest/v1/organizations";
const MEMBERS_PATH: &str = "/rest/v1/organization_members";

/// Remote store over PostgREST.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    config: StoreConfig,
    access_token: Option<String>,
}

impl std::fmt::Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStore")
            .field("base_url", &self.config.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl RestStore {
    /// Create a client for the configured store.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            config,
            access_token: None,
        })
    }

    /// Use the signed-in user's access token for requests.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// The store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn authorize(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(ref anon_key) = self.config.anon_key {
            request = request.header("apikey", anon_key);
        }

        let bearer = self
            .access_token
            .as_ref()
            .or(self.config.anon_key.as_ref());
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        request
    }

    async fn fetch<T>(&self, path: &str, query: &[(&str, String)]) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.config.url(path);
        let request = self.client.get(&url).query(query);
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_connect() {
                StoreError::Unavailable(e.to_string())
            } else {
                StoreError::RequestFailed(e)
            }
        })?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            error!(path, "Store authentication failed");
            return Err(StoreError::AuthenticationFailed);
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Store error ({}): {}", status.as_u16(), message);
            return Err(StoreError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    #[instrument(skip(self))]
    async fn list_organizations(&self) -> StoreResult<Vec<OrganizationRow>> {
        let query = [
            ("select", ORGANIZATION_COLUMNS.to_string()),
            ("order", "name.asc".to_string()),
        ];
        let organizations: Vec<OrganizationRow> = self.fetch(ORGANIZATIONS_PATH, &query).await?;
        debug!(count = organizations.len(), "Fetched organizations");
        Ok(organizations)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_memberships_for_user(&self, user_id: Uuid) -> StoreResult<Vec<MembershipRow>> {
        let query = [
            ("select", MEMBERSHIP_COLUMNS.to_string()),
            ("user_id", format!("eq.{}", user_id)),
        ];
        let rows: Vec<MembershipRow> = self.fetch(MEMBERS_PATH, &query).await?;
        debug!(count = rows.len(), "Fetched memberships");
        Ok(rows)
    }
}
