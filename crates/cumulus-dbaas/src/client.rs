//! Control-plane client: the trait the database clients consume, and its
//! REST implementation backed by the platform's DBaaS agent.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::classifier::Classifier;
use crate::context::RequestContext;
use crate::error::{DbaasError, Result};
use crate::model::{
    BaseDbParams, ConnectionProperties, CreateDatabaseRequest, FindConnectionRequest,
    LogicalDatabase,
};

/// In-cluster address of the DBaaS agent, used when none is configured.
pub const DEFAULT_AGENT_URL: &str = "http://dbaas-agent:8080";

/// Remote control-plane operations used by the database clients.
#[async_trait]
pub trait DbaasClient: Send + Sync {
    /// Provisions the logical database on first use, or returns the existing
    /// one for the classifier.
    async fn get_or_create_database(
        &self,
        ctx: &RequestContext,
        db_type: &str,
        classifier: &Classifier,
        params: &BaseDbParams,
    ) -> Result<LogicalDatabase>;

    /// Looks up connection properties for an existing database. Never
    /// provisions; fails with the platform's not-found status when the
    /// database does not exist.
    async fn get_connection(
        &self,
        ctx: &RequestContext,
        db_type: &str,
        classifier: &Classifier,
        params: &BaseDbParams,
    ) -> Result<ConnectionProperties>;
}

/// REST client for the DBaaS agent.
pub struct DbaasRestClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Option<(String, String)>,
}

impl DbaasRestClient {
    pub fn new(base_url: Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(concat!("cumulus-dbaas/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                DbaasError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url,
            credentials: None,
        })
    }

    /// Reads the agent address from `DBAAS_AGENT_URL` (falling back to the
    /// in-cluster default) and optional basic-auth credentials from
    /// `DBAAS_CLIENT_USERNAME` / `DBAAS_CLIENT_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var("DBAAS_AGENT_URL").unwrap_or_else(|_| DEFAULT_AGENT_URL.to_string());
        let base_url = Url::parse(&raw)
            .map_err(|e| DbaasError::Configuration(format!("Invalid DBAAS_AGENT_URL: {}", e)))?;

        let mut client = Self::new(base_url)?;
        if let (Ok(username), Ok(password)) = (
            std::env::var("DBAAS_CLIENT_USERNAME"),
            std::env::var("DBAAS_CLIENT_PASSWORD"),
        ) {
            client.credentials = Some((username, password));
        }
        Ok(client)
    }

    /// Authenticates requests to the agent with HTTP basic auth.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| DbaasError::Configuration(format!("Invalid agent URL path {}: {}", path, e)))
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.credentials {
            Some((username, password)) => builder.basic_auth(username, Some(password)),
            None => builder,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(DbaasError::ControlPlane {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl DbaasClient for DbaasRestClient {
    async fn get_or_create_database(
        &self,
        ctx: &RequestContext,
        db_type: &str,
        classifier: &Classifier,
        params: &BaseDbParams,
    ) -> Result<LogicalDatabase> {
        let url = self.endpoint(&format!("api/v3/dbaas/{}/databases", ctx.namespace))?;
        debug!(%url, %classifier, "requesting database from the control plane");

        let body = CreateDatabaseRequest {
            classifier,
            db_type,
            origin_service: &ctx.microservice_name,
            params,
        };
        let response = self
            .request(reqwest::Method::PUT, url)
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn get_connection(
        &self,
        ctx: &RequestContext,
        db_type: &str,
        classifier: &Classifier,
        params: &BaseDbParams,
    ) -> Result<ConnectionProperties> {
        let url = self.endpoint(&format!(
            "api/v3/dbaas/{}/databases/get-by-classifier/{}",
            ctx.namespace, db_type
        ))?;
        debug!(%url, %classifier, "looking up connection properties");

        let body = FindConnectionRequest {
            classifier,
            user_role: params.role.as_deref(),
        };
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}
