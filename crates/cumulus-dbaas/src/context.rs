//! Ambient request context consumed by the classifier builders.

use crate::error::{DbaasError, Result};

/// Identity of the calling service, plus the tenant the current request acts
/// for when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Name the service is registered under in the control plane.
    pub microservice_name: String,
    /// Cloud namespace the service is deployed to.
    pub namespace: String,
    /// Tenant the current request is scoped to, if any.
    pub tenant_id: Option<String>,
}

impl RequestContext {
    pub fn new(microservice_name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            microservice_name: microservice_name.into(),
            namespace: namespace.into(),
            tenant_id: None,
        }
    }

    /// Scopes the context to a tenant.
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Loads the service identity from `MICROSERVICE_NAME` and
    /// `CLOUD_NAMESPACE`.
    pub fn from_env() -> Result<Self> {
        let microservice_name = std::env::var("MICROSERVICE_NAME").map_err(|_| {
            DbaasError::Configuration("MICROSERVICE_NAME environment variable is required".to_string())
        })?;
        let namespace = std::env::var("CLOUD_NAMESPACE").map_err(|_| {
            DbaasError::Configuration("CLOUD_NAMESPACE environment variable is required".to_string())
        })?;
        Ok(Self::new(microservice_name, namespace))
    }
}
