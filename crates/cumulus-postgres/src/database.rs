//! Per-database facade handed to application code.

use std::sync::Arc;

use cumulus_dbaas::{
    Classifier, ClassifierFn, ConfigResolver, ConnectionCache, DbaasClient, RequestContext,
};
use sqlx::PgPool;
use tracing::{error, info, info_span, Instrument, Span};

use crate::driver::PgDriver;
use crate::error::Result;
use crate::options::PgConnProperties;
use crate::params::DbParams;
use crate::pg_client::PgClient;
use crate::POSTGRESQL;

/// One configured logical database: hands out lifecycle-managed pools and
/// raw connection properties.
pub struct Database {
    dbaas: Arc<dyn DbaasClient>,
    cache: Arc<ConnectionCache<PgPool>>,
    config: Arc<ConfigResolver>,
    driver: Arc<dyn PgDriver>,
    classifier: ClassifierFn,
    params: DbParams,
    span: Span,
}

impl Database {
    pub(crate) fn new(
        dbaas: Arc<dyn DbaasClient>,
        cache: Arc<ConnectionCache<PgPool>>,
        config: Arc<ConfigResolver>,
        driver: Arc<dyn PgDriver>,
        params: DbParams,
        default_classifier: fn(&RequestContext) -> Classifier,
    ) -> Self {
        let classifier: ClassifierFn = match params.classifier.clone() {
            Some(custom) => custom,
            None => Arc::new(default_classifier),
        };
        let span = info_span!(
            "dbaas_database",
            db_type = POSTGRESQL,
            role = params.base.role.as_deref().unwrap_or_default(),
            ro_replica = params.ro_replica,
        );

        Self {
            dbaas,
            cache,
            config,
            driver,
            classifier,
            params,
            span,
        }
    }

    /// Lifecycle manager for this database.
    pub fn client(&self) -> PgClient {
        PgClient::new(
            Arc::clone(&self.dbaas),
            Arc::clone(&self.cache),
            Arc::clone(&self.config),
            Arc::clone(&self.driver),
            Arc::clone(&self.classifier),
            self.params.clone(),
            self.span.clone(),
        )
    }

    /// Normalized connection properties, creating the database on first use.
    pub async fn connection_properties(&self, ctx: &RequestContext) -> Result<PgConnProperties> {
        let classifier = (self.classifier)(ctx);
        async {
            let database = match self
                .dbaas
                .get_or_create_database(ctx, POSTGRESQL, &classifier, &self.params.base)
                .await
            {
                Ok(database) => database,
                Err(err) => {
                    error!(error = %err, "error acquiring connection properties from the control plane");
                    return Err(err.into());
                }
            };
            Ok(PgConnProperties::from(&database.connection_properties))
        }
        .instrument(self.span.clone())
        .await
    }

    /// Normalized connection properties of an existing database; fails with
    /// the platform's not-found error when it was never created.
    pub async fn find_connection_properties(
        &self,
        ctx: &RequestContext,
    ) -> Result<PgConnProperties> {
        let classifier = (self.classifier)(ctx);
        async {
            let properties = match self
                .dbaas
                .get_connection(ctx, POSTGRESQL, &classifier, &self.params.base)
                .await
            {
                Ok(properties) => properties,
                Err(err) => {
                    error!(error = %err, "error finding connection properties on the control plane");
                    return Err(err.into());
                }
            };
            info!(%classifier, "found existing postgresql database");
            Ok(PgConnProperties::from(&properties))
        }
        .instrument(self.span.clone())
        .await
    }
}
