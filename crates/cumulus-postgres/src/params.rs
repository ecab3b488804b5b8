//! Caller-supplied database parameters.

use std::sync::Arc;

use cumulus_dbaas::{BaseDbParams, ClassifierFn};

use crate::migrations::MigrationRunner;

/// Configuration of one logical database, supplied once when the facade is
/// built.
///
/// Every field has a usable default: no custom classifier (the facade fills
/// in the service or tenant one), empty base parameters, no migrations, and
/// primary-host routing.
#[derive(Clone, Default)]
pub struct DbParams {
    /// Custom classifier function, substituted wholesale for the default.
    pub classifier: Option<ClassifierFn>,
    /// Database customization parameters forwarded to the control plane.
    pub base: BaseDbParams,
    /// Migrations executed after the database connection is first opened.
    pub migrations: Option<Arc<dyn MigrationRunner>>,
    /// Route connections to the read-only replica host.
    pub ro_replica: bool,
}

impl std::fmt::Debug for DbParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbParams")
            .field("classifier", &self.classifier.as_ref().map(|_| "<custom>"))
            .field("base", &self.base)
            .field("migrations", &self.migrations.is_some())
            .field("ro_replica", &self.ro_replica)
            .finish()
    }
}
