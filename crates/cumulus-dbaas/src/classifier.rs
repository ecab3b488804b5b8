//! Classifier construction.
//!
//! A classifier is the logical identity of a database within the control
//! plane. Two classifiers with the same key/value content are the same
//! identity, no matter how or where they were built.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::context::RequestContext;

/// Classifier scope for one-database-per-service.
pub const SCOPE_SERVICE: &str = "service";
/// Classifier scope for one-database-per-tenant.
pub const SCOPE_TENANT: &str = "tenant";

/// Logical database identity: an order-irrelevant map of string keys to
/// string values. Equality and hashing are content-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Classifier(BTreeMap<String, String>);

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (key, value) in &self.0 {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

/// Derives a classifier from the ambient request context.
///
/// Callers may substitute a custom function wholesale; the built-in ones are
/// [`service_classifier`] and [`tenant_classifier`].
pub type ClassifierFn = Arc<dyn Fn(&RequestContext) -> Classifier + Send + Sync>;

/// Service-scoped classifier: one logical database per microservice.
pub fn service_classifier(ctx: &RequestContext) -> Classifier {
    Classifier::new()
        .with("microserviceName", ctx.microservice_name.as_str())
        .with("namespace", ctx.namespace.as_str())
        .with("scope", SCOPE_SERVICE)
}

/// Tenant-scoped classifier: one logical database per tenant of the service.
///
/// # Panics
///
/// Panics when the context carries no tenant id. A tenant-scoped database
/// handle is meaningless without one, so this is treated as a programming
/// error rather than a recoverable condition.
pub fn tenant_classifier(ctx: &RequestContext) -> Classifier {
    let tenant_id = ctx
        .tenant_id
        .as_deref()
        .expect("tenant-scoped database requested without a tenant id in the request context");
    Classifier::new()
        .with("microserviceName", ctx.microservice_name.as_str())
        .with("namespace", ctx.namespace.as_str())
        .with("scope", SCOPE_TENANT)
        .with("tenantId", tenant_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RequestContext {
        RequestContext::new("orders", "prod")
    }

    #[test]
    fn test_service_classifier_content() {
        let classifier = service_classifier(&ctx());
        assert_eq!(classifier.get("microserviceName"), Some("orders"));
        assert_eq!(classifier.get("namespace"), Some("prod"));
        assert_eq!(classifier.get("scope"), Some(SCOPE_SERVICE));
        assert_eq!(classifier.get("tenantId"), None);
    }

    #[test]
    fn test_tenant_classifier_content() {
        let classifier = tenant_classifier(&ctx().with_tenant("acme"));
        assert_eq!(classifier.get("scope"), Some(SCOPE_TENANT));
        assert_eq!(classifier.get("tenantId"), Some("acme"));
    }

    #[test]
    #[should_panic(expected = "without a tenant id")]
    fn test_tenant_classifier_requires_tenant() {
        tenant_classifier(&ctx());
    }

    #[test]
    fn test_equality_is_content_based() {
        let left = Classifier::new().with("a", "1").with("b", "2");
        let right = Classifier::new().with("b", "2").with("a", "1");
        assert_eq!(left, right);
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let classifier = service_classifier(&ctx());
        let json = serde_json::to_value(&classifier).unwrap();
        assert_eq!(json["scope"], "service");
        assert_eq!(json["microserviceName"], "orders");
    }
}
