//! Error types and driver-error classification.

use thiserror::Error;

/// Error type for the PostgreSQL DBaaS client.
#[derive(Error, Debug)]
pub enum PgError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Control plane request failed: {0}")]
    Dbaas(#[from] cumulus_dbaas::DbaasError),

    #[error("Connection failure: {0}")]
    Connectivity(#[source] sqlx::Error),

    #[error("Database rejected the stored credentials")]
    InvalidPassword,

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Result type alias for PostgreSQL client operations.
pub type Result<T> = std::result::Result<T, PgError>;

/// SQLSTATE PostgreSQL reports when a password is rejected.
const INVALID_PASSWORD_CODE: &str = "28P01";

/// Sorts a driver error into the taxonomy the lifecycle manager acts on:
/// a rejected password, a connectivity loss, or a genuine database error.
pub(crate) fn classify(err: sqlx::Error) -> PgError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.code().as_deref() == Some(INVALID_PASSWORD_CODE) {
            return PgError::InvalidPassword;
        }
        return PgError::Database(err);
    }
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => PgError::Connectivity(err),
        other => PgError::Database(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_classify_as_connectivity() {
        let err = sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ));
        assert!(matches!(classify(err), PgError::Connectivity(_)));
        assert!(matches!(
            classify(sqlx::Error::PoolTimedOut),
            PgError::Connectivity(_)
        ));
    }

    #[test]
    fn test_other_errors_classify_as_database() {
        assert!(matches!(
            classify(sqlx::Error::RowNotFound),
            PgError::Database(_)
        ));
    }
}
