//! Driver seam over sqlx: pool opening and the two validation probes.

use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgPool};

use crate::error::{classify, Result};
use crate::pool::PoolSettings;

/// The slice of the driver surface the lifecycle manager depends on.
///
/// Implementations classify their failures through [`crate::PgError`] so the
/// manager can tell connectivity loss from a rejected password.
#[async_trait]
pub trait PgDriver: Send + Sync {
    /// Opens a pool with the given settings, verifying connectivity.
    async fn open(&self, options: &PgConnectOptions, settings: &PoolSettings) -> Result<PgPool>;

    /// Lightweight liveness check against a pooled connection.
    async fn ping(&self, pool: &PgPool) -> Result<()>;

    /// Trivial read probing whether the stored credentials still work.
    async fn probe(&self, pool: &PgPool) -> Result<()>;
}

/// Production driver backed by sqlx.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlxDriver;

#[async_trait]
impl PgDriver for SqlxDriver {
    async fn open(&self, options: &PgConnectOptions, settings: &PoolSettings) -> Result<PgPool> {
        settings
            .pool_options()
            .connect_with(options.clone())
            .await
            .map_err(classify)
    }

    async fn ping(&self, pool: &PgPool) -> Result<()> {
        let mut conn = pool.acquire().await.map_err(classify)?;
        conn.ping().await.map_err(classify)
    }

    async fn probe(&self, pool: &PgPool) -> Result<()> {
        sqlx::query("SELECT 1").execute(pool).await.map_err(classify)?;
        Ok(())
    }
}
