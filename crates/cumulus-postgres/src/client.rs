//! Entry point: builds per-database facades over one shared cache.

use std::sync::Arc;

use cumulus_dbaas::{
    service_classifier, tenant_classifier, Classifier, ConfigResolver, ConnectionCache,
    DbaasClient, RequestContext,
};
use sqlx::PgPool;

use crate::database::Database;
use crate::driver::{PgDriver, SqlxDriver};
use crate::params::DbParams;

/// PostgreSQL client for the DBaaS platform.
///
/// Owns the connection cache shared by every database it hands out; keep one
/// instance per application.
pub struct DbaasPostgresClient {
    dbaas: Arc<dyn DbaasClient>,
    cache: Arc<ConnectionCache<PgPool>>,
    config: Arc<ConfigResolver>,
    driver: Arc<dyn PgDriver>,
}

impl DbaasPostgresClient {
    pub fn new(dbaas: Arc<dyn DbaasClient>) -> Self {
        Self {
            dbaas,
            cache: Arc::new(ConnectionCache::new()),
            config: Arc::new(ConfigResolver::new()),
            driver: Arc::new(SqlxDriver),
        }
    }

    /// Replaces the config resolver, e.g. to pin pool tunables.
    pub fn with_config(mut self, config: ConfigResolver) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Replaces the driver layer.
    pub fn with_driver(mut self, driver: Arc<dyn PgDriver>) -> Self {
        self.driver = driver;
        self
    }

    /// Database scoped to the calling service.
    pub fn service_database(&self, params: DbParams) -> Database {
        self.database(params, service_classifier)
    }

    /// Database scoped to the tenant carried by each request context.
    pub fn tenant_database(&self, params: DbParams) -> Database {
        self.database(params, tenant_classifier)
    }

    fn database(
        &self,
        params: DbParams,
        default_classifier: fn(&RequestContext) -> Classifier,
    ) -> Database {
        Database::new(
            Arc::clone(&self.dbaas),
            Arc::clone(&self.cache),
            Arc::clone(&self.config),
            Arc::clone(&self.driver),
            params,
            default_classifier,
        )
    }
}
