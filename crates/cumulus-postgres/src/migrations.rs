//! Migration execution seam and its sqlx adapter.

use std::path::Path;

use async_trait::async_trait;
use sqlx::migrate::{Migrate, MigrateError, Migrator};
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::error::{PgError, Result};

/// Versions applied, or reverted, together as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationGroup(Vec<i64>);

impl MigrationGroup {
    pub fn new(versions: Vec<i64>) -> Self {
        Self(versions)
    }

    pub fn versions(&self) -> &[i64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for MigrationGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for version in &self.0 {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}", version)?;
            first = false;
        }
        Ok(())
    }
}

/// Applies and reverts schema migrations on a freshly opened pool.
#[async_trait]
pub trait MigrationRunner: Send + Sync {
    /// Prepares migration bookkeeping.
    async fn init(&self, pool: &PgPool) -> Result<()>;

    /// Applies all pending migrations, returning the applied group. An empty
    /// group means the schema was already up to date.
    async fn migrate(&self, pool: &PgPool) -> Result<MigrationGroup>;

    /// Reverts the group touched by the last [`migrate`](Self::migrate)
    /// call, including a partially applied one.
    async fn rollback(&self, pool: &PgPool) -> Result<MigrationGroup>;
}

/// [`MigrationRunner`] backed by `sqlx::migrate`.
///
/// `sqlx` applies each migration in its own transaction, so a failing group
/// may be partially applied; the runner remembers the schema version the
/// group started from and [`rollback`](MigrationRunner::rollback) unwinds
/// back to it.
pub struct SqlxMigrationRunner {
    migrator: Migrator,
    baseline: Mutex<Option<i64>>,
}

impl SqlxMigrationRunner {
    pub fn new(migrator: Migrator) -> Self {
        Self {
            migrator,
            baseline: Mutex::new(None),
        }
    }

    /// Loads migrations from a directory of `*.sql` files.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let migrator = Migrator::new(path.as_ref()).await.map_err(migration_error)?;
        Ok(Self::new(migrator))
    }

    async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>> {
        let mut conn = pool.acquire().await.map_err(PgError::Database)?;
        let applied = conn
            .list_applied_migrations()
            .await
            .map_err(migration_error)?;
        Ok(applied.iter().map(|migration| migration.version).collect())
    }
}

fn migration_error(err: MigrateError) -> PgError {
    PgError::Migration(err.to_string())
}

#[async_trait]
impl MigrationRunner for SqlxMigrationRunner {
    async fn init(&self, pool: &PgPool) -> Result<()> {
        let mut conn = pool.acquire().await.map_err(PgError::Database)?;
        conn.ensure_migrations_table()
            .await
            .map_err(migration_error)
    }

    async fn migrate(&self, pool: &PgPool) -> Result<MigrationGroup> {
        let before = Self::applied_versions(pool).await?;
        *self.baseline.lock().await = Some(before.iter().copied().max().unwrap_or(0));

        self.migrator.run(pool).await.map_err(migration_error)?;

        let after = Self::applied_versions(pool).await?;
        let group = after
            .into_iter()
            .filter(|version| !before.contains(version))
            .collect();
        Ok(MigrationGroup::new(group))
    }

    async fn rollback(&self, pool: &PgPool) -> Result<MigrationGroup> {
        let Some(target) = self.baseline.lock().await.take() else {
            return Ok(MigrationGroup::default());
        };

        let before = Self::applied_versions(pool).await?;
        self.migrator
            .undo(pool, target)
            .await
            .map_err(migration_error)?;
        let after = Self::applied_versions(pool).await?;

        let group = before
            .into_iter()
            .filter(|version| !after.contains(version))
            .collect();
        Ok(MigrationGroup::new(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_display() {
        let group = MigrationGroup::new(vec![20240101, 20240102]);
        assert_eq!(group.to_string(), "20240101,20240102");
    }

    #[test]
    fn test_empty_group() {
        let group = MigrationGroup::default();
        assert!(group.is_empty());
        assert_eq!(group.to_string(), "");
    }
}
