//! The connection lifecycle manager.
//!
//! Resolves the cache key for a logical database, creates the database and
//! its pool on a true miss, and validates the cached pool on every
//! acquisition: a connectivity failure triggers one evict-and-reconnect
//! pass, a rejected password triggers a credential refresh against the
//! control plane, and any other failure propagates to the caller untouched.

use std::sync::Arc;

use cumulus_dbaas::{
    CacheKey, Classifier, ClassifierFn, ConfigResolver, ConnectionCache, DbaasClient,
    RequestContext,
};
use sqlx::PgPool;
use tracing::{debug, error, info, warn, Instrument, Span};

use crate::discriminator::PgDiscriminator;
use crate::driver::PgDriver;
use crate::error::{PgError, Result};
use crate::options::connect_options;
use crate::params::DbParams;
use crate::pool::PoolSettings;
use crate::POSTGRESQL;

/// Hands out validated connection pools for one configured logical database.
pub struct PgClient {
    dbaas: Arc<dyn DbaasClient>,
    cache: Arc<ConnectionCache<PgPool>>,
    config: Arc<ConfigResolver>,
    driver: Arc<dyn PgDriver>,
    classifier: ClassifierFn,
    params: DbParams,
    span: Span,
}

impl PgClient {
    pub(crate) fn new(
        dbaas: Arc<dyn DbaasClient>,
        cache: Arc<ConnectionCache<PgPool>>,
        config: Arc<ConfigResolver>,
        driver: Arc<dyn PgDriver>,
        classifier: ClassifierFn,
        params: DbParams,
        span: Span,
    ) -> Self {
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

    /// Returns a live, validated pool for the configured database.
    ///
    /// The database is created on first use; afterwards the cached pool is
    /// revalidated on every call and replaced in place when the connection
    /// went stale or the platform rotated the password. Both recoveries run
    /// at most once per call, a repeated failure reaches the caller.
    pub async fn acquire(&self, ctx: &RequestContext) -> Result<PgPool> {
        let classifier = (self.classifier)(ctx);
        let discriminator =
            PgDiscriminator::new(self.params.base.role.clone(), self.params.ro_replica);
        let key =
            CacheKey::with_discriminator(POSTGRESQL, classifier.clone(), discriminator.value());

        async {
            let mut pool = self.get_or_create(ctx, &key, &classifier).await?;

            // Only a connectivity-classified ping failure warrants a
            // reconnect; everything else is left for the credential probe.
            if let Err(PgError::Connectivity(cause)) = self.driver.ping(&pool).await {
                warn!(error = %cause, "connection ping failed, recreating the cached connection");
                self.cache.delete(&key);
                pool.close().await;
                pool = self.get_or_create(ctx, &key, &classifier).await?;
            }

            match self.driver.probe(&pool).await {
                Ok(()) => Ok(pool),
                Err(PgError::InvalidPassword) => {
                    self.refresh_credentials(ctx, &key, &classifier, pool).await
                }
                Err(err) => Err(err),
            }
        }
        .instrument(self.span.clone())
        .await
    }

    async fn get_or_create(
        &self,
        ctx: &RequestContext,
        key: &CacheKey,
        classifier: &Classifier,
    ) -> Result<PgPool> {
        self.cache
            .get_or_create(key, || self.create_database(ctx, classifier))
            .await
    }

    /// Cache-miss factory: provisions the database through the control
    /// plane, opens its pool and runs configured migrations before the pool
    /// becomes visible to other callers.
    async fn create_database(
        &self,
        ctx: &RequestContext,
        classifier: &Classifier,
    ) -> Result<PgPool> {
        info!(%classifier, "creating postgresql database");
        let database = self
            .dbaas
            .get_or_create_database(ctx, POSTGRESQL, classifier, &self.params.base)
            .await?;

        let properties = &database.connection_properties;
        if properties.tls {
            info!(host = %properties.host, "connection to postgresql database will be secured");
        }
        let options = connect_options(properties, self.params.ro_replica)?;
        let settings = PoolSettings::resolve(&self.config);
        let pool = self.driver.open(&options, &settings).await?;

        if let Err(err) = self.run_migrations(&pool).await {
            error!(error = %err, "migrations failed for the newly created database");
            pool.close().await;
            return Err(err);
        }
        Ok(pool)
    }

    /// Rotation recovery: fetches fresh credentials without provisioning,
    /// reopens the pool and substitutes it under the same cache key.
    async fn refresh_credentials(
        &self,
        ctx: &RequestContext,
        key: &CacheKey,
        classifier: &Classifier,
        stale: PgPool,
    ) -> Result<PgPool> {
        info!("authentication failed with the cached credentials, fetching fresh ones");
        let properties = self
            .dbaas
            .get_connection(ctx, POSTGRESQL, classifier, &self.params.base)
            .await?;

        let options = connect_options(&properties, self.params.ro_replica)?;
        stale.close().await;
        let settings = PoolSettings::resolve(&self.config);
        let pool = self.driver.open(&options, &settings).await?;
        self.cache.insert(key, pool.clone()).await;
        info!("database password updated");
        Ok(pool)
    }

    async fn run_migrations(&self, pool: &PgPool) -> Result<()> {
        let Some(runner) = self.params.migrations.as_deref() else {
            debug!("no migrations configured for this database");
            return Ok(());
        };

        runner.init(pool).await?;
        match runner.migrate(pool).await {
            Ok(group) if group.is_empty() => {
                info!("no new migrations to run, schema is up to date");
                Ok(())
            }
            Ok(group) => {
                info!(%group, "migrations applied");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "migration run failed, rolling back");
                match runner.rollback(pool).await {
                    Ok(group) => {
                        info!(%group, "rolled back migration group");
                        Err(err)
                    }
                    Err(rollback_err) => {
                        error!(error = %rollback_err, "rollback failed");
                        Err(rollback_err)
                    }
                }
            }
        }
    }
}
