//! Integration tests for the control-plane REST client against a stub agent.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use cumulus_dbaas::{
    service_classifier, BaseDbParams, DbaasClient, DbaasError, DbaasRestClient, RequestContext,
};

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> DbaasRestClient {
    let base_url = format!("http://{}/", addr).parse().unwrap();
    DbaasRestClient::new(base_url).unwrap()
}

fn ctx() -> RequestContext {
    RequestContext::new("orders", "prod")
}

fn admin_params() -> BaseDbParams {
    BaseDbParams {
        role: Some("admin".to_string()),
        ..Default::default()
    }
}

fn properties_json() -> Value {
    json!({
        "url": "postgresql://primary.local:5432/orders_db",
        "host": "primary.local",
        "username": "svc_orders",
        "password": "secret",
        "role": "admin",
        "roHost": "replica.local"
    })
}

async fn create_handler(
    Path(namespace): Path<String>,
    State(recorded): State<Recorded>,
    Json(body): Json<Value>,
) -> Json<Value> {
    assert_eq!(namespace, "prod");
    recorded.bodies.lock().unwrap().push(body);
    Json(json!({
        "id": "db-1",
        "connectionProperties": properties_json()
    }))
}

async fn find_handler(Path((namespace, db_type)): Path<(String, String)>) -> Json<Value> {
    assert_eq!(namespace, "prod");
    assert_eq!(db_type, "postgresql");
    Json(properties_json())
}

#[tokio::test]
async fn create_database_returns_descriptor_and_sends_classifier() {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/api/v3/dbaas/{namespace}/databases", put(create_handler))
        .with_state(recorded.clone());
    let addr = serve(app).await;

    let database = client(addr)
        .get_or_create_database(&ctx(), "postgresql", &service_classifier(&ctx()), &admin_params())
        .await
        .unwrap();

    assert_eq!(database.id, "db-1");
    assert_eq!(database.connection_properties.host, "primary.local");
    assert_eq!(database.connection_properties.username, "svc_orders");

    let bodies = recorded.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["type"], "postgresql");
    assert_eq!(bodies[0]["originService"], "orders");
    assert_eq!(bodies[0]["role"], "admin");
    assert_eq!(bodies[0]["classifier"]["scope"], "service");
    assert_eq!(bodies[0]["classifier"]["microserviceName"], "orders");
}

#[tokio::test]
async fn create_database_error_carries_status() {
    let app = Router::new().route(
        "/api/v3/dbaas/{namespace}/databases",
        put(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "create failed") }),
    );
    let addr = serve(app).await;

    let err = client(addr)
        .get_or_create_database(&ctx(), "postgresql", &service_classifier(&ctx()), &admin_params())
        .await
        .unwrap_err();

    match err {
        DbaasError::ControlPlane { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("create failed"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn find_connection_returns_properties() {
    let app = Router::new().route(
        "/api/v3/dbaas/{namespace}/databases/get-by-classifier/{db_type}",
        post(find_handler),
    );
    let addr = serve(app).await;

    let properties = client(addr)
        .get_connection(&ctx(), "postgresql", &service_classifier(&ctx()), &admin_params())
        .await
        .unwrap();

    assert_eq!(properties.username, "svc_orders");
    assert_eq!(properties.ro_host.as_deref(), Some("replica.local"));
    assert!(!properties.tls);
}

#[tokio::test]
async fn find_connection_not_found_is_typed() {
    let app = Router::new().route(
        "/api/v3/dbaas/{namespace}/databases/get-by-classifier/{db_type}",
        post(|| async { (StatusCode::NOT_FOUND, "database not found") }),
    );
    let addr = serve(app).await;

    let err = client(addr)
        .get_connection(&ctx(), "postgresql", &service_classifier(&ctx()), &admin_params())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.status(), Some(404));
}
