//! Cumulus DBaaS base client.
//!
//! Database-type-agnostic building blocks shared by the per-database clients:
//! the ambient request context, classifier builders, the keyed single-flight
//! connection cache, the typed config resolver and the control-plane REST
//! client.

pub mod cache;
pub mod classifier;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod model;

pub use cache::{CacheKey, ConnectionCache};
pub use classifier::{service_classifier, tenant_classifier, Classifier, ClassifierFn};
pub use client::{DbaasClient, DbaasRestClient};
pub use config::{ConfigResolver, ConfigValue, ResolvedValue};
pub use context::RequestContext;
pub use error::{DbaasError, Result};
pub use model::{BaseDbParams, ConnectionProperties, LogicalDatabase};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
