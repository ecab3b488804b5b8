//! Wire models for the control-plane REST API.

use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;

/// Database customization parameters forwarded to the control plane on
/// provisioning and lookup requests.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseDbParams {
    /// Role the issued credentials should carry (`admin`, `rw`, `ro`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Prefix for the generated database name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
    /// Pin the database to a specific physical cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_database_id: Option<String>,
    /// Free-form engine settings passed through to the platform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
}

/// Connection properties of a logical database, decoded once at the
/// control-plane boundary. Missing required fields fail the decode
/// immediately instead of surfacing later as lookup errors.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProperties {
    pub url: String,
    pub host: String,
    pub username: String,
    pub password: String,
    pub role: String,
    /// Read-only replica host, when the platform provides one.
    #[serde(default)]
    pub ro_host: Option<String>,
    #[serde(default)]
    pub tls: bool,
    /// Relaxes certificate verification when `tls` is set.
    #[serde(default)]
    pub tls_not_strict: bool,
}

/// A logical database as reported by the control plane.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalDatabase {
    pub id: String,
    pub connection_properties: ConnectionProperties,
}

/// Body of the get-or-create request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateDatabaseRequest<'a> {
    pub classifier: &'a Classifier,
    #[serde(rename = "type")]
    pub db_type: &'a str,
    pub origin_service: &'a str,
    #[serde(flatten)]
    pub params: &'a BaseDbParams,
}

/// Body of the get-by-classifier lookup request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FindConnectionRequest<'a> {
    pub classifier: &'a Classifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_properties_decode() {
        let properties: ConnectionProperties = serde_json::from_value(serde_json::json!({
            "url": "postgresql://primary.local:5432/db",
            "host": "primary.local",
            "username": "svc",
            "password": "secret",
            "role": "admin",
            "roHost": "replica.local",
            "tls": true
        }))
        .unwrap();
        assert_eq!(properties.ro_host.as_deref(), Some("replica.local"));
        assert!(properties.tls);
        assert!(!properties.tls_not_strict);
    }

    #[test]
    fn test_missing_required_field_fails_decode() {
        let result: Result<ConnectionProperties, _> = serde_json::from_value(serde_json::json!({
            "url": "postgresql://primary.local:5432/db",
            "host": "primary.local",
            "username": "svc",
            "role": "admin"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_request_shape() {
        let classifier = Classifier::new().with("scope", "service");
        let params = BaseDbParams {
            role: Some("admin".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(CreateDatabaseRequest {
            classifier: &classifier,
            db_type: "postgresql",
            origin_service: "orders",
            params: &params,
        })
        .unwrap();
        assert_eq!(body["type"], "postgresql");
        assert_eq!(body["originService"], "orders");
        assert_eq!(body["classifier"]["scope"], "service");
        assert_eq!(body["role"], "admin");
        assert!(body.get("namePrefix").is_none());
    }
}
