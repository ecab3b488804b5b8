//! Cumulus PostgreSQL client.
//!
//! Resolves a logical database identity to a live `sqlx` connection pool:
//! the database is created on first use through the DBaaS control plane, the
//! pool is cached per classifier, validated on every acquisition, and
//! replaced transparently when the connection goes stale or the platform
//! rotates the password.

pub mod client;
pub mod database;
pub mod discriminator;
pub mod driver;
pub mod error;
pub mod migrations;
pub mod options;
pub mod params;
pub mod pg_client;
pub mod pool;

pub use client::DbaasPostgresClient;
pub use database::Database;
pub use discriminator::PgDiscriminator;
pub use driver::{PgDriver, SqlxDriver};
pub use error::{PgError, Result};
pub use migrations::{MigrationGroup, MigrationRunner, SqlxMigrationRunner};
pub use options::PgConnProperties;
pub use params::DbParams;
pub use pg_client::PgClient;
pub use pool::PoolSettings;

/// Database type this client registers with the control plane.
pub const POSTGRESQL: &str = "postgresql";
