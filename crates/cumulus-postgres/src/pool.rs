//! Connection pool tunables resolved from configuration.

use std::time::Duration;

use cumulus_dbaas::ConfigResolver;
use sqlx::postgres::PgPoolOptions;

/// Idle connections retained by the pool.
pub const MAX_IDLE_CONNECTIONS_PROPERTY: &str = "dbaas.max.idle.connections";
/// Upper bound on open connections.
pub const MAX_OPEN_CONNECTIONS_PROPERTY: &str = "dbaas.max.open.connections";
/// Connection lifetime in seconds.
pub const CONNECTIONS_MAX_LIFETIME_PROPERTY: &str = "dbaas.connections.max.lifetime";
/// Idle time before a connection is reaped, in seconds.
pub const CONNECTIONS_MAX_IDLE_TIME_PROPERTY: &str = "dbaas.connections.max.idletime";

/// Default connection count for both the idle and the open bound.
pub const DEFAULT_CONNECTIONS: u64 = 5;
/// Default lifetime and idle time, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Pool tunables applied to every newly opened pool. Resolution is
/// idempotent and safe to repeat per pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_idle: u32,
    pub max_open: u32,
    pub max_lifetime: Duration,
    pub max_idle_time: Duration,
}

impl PoolSettings {
    /// Resolves the tunables through `config`, falling back to the
    /// documented defaults.
    pub fn resolve(config: &ConfigResolver) -> Self {
        let max_idle = config
            .get_or_default(MAX_IDLE_CONNECTIONS_PROPERTY, DEFAULT_CONNECTIONS)
            .value;
        let max_open = config
            .get_or_default(MAX_OPEN_CONNECTIONS_PROPERTY, DEFAULT_CONNECTIONS)
            .value;
        let max_lifetime = config
            .get_or_default(CONNECTIONS_MAX_LIFETIME_PROPERTY, DEFAULT_TIMEOUT_SECS)
            .value;
        let max_idle_time = config
            .get_or_default(CONNECTIONS_MAX_IDLE_TIME_PROPERTY, DEFAULT_TIMEOUT_SECS)
            .value;

        Self {
            max_idle: max_idle as u32,
            max_open: max_open as u32,
            max_lifetime: Duration::from_secs(max_lifetime),
            max_idle_time: Duration::from_secs(max_idle_time),
        }
    }

    /// Translates the tunables into sqlx pool options.
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.max_idle)
            .max_connections(self.max_open)
            .max_lifetime(self.max_lifetime)
            .idle_timeout(self.max_idle_time)
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_idle: DEFAULT_CONNECTIONS as u32,
            max_open: DEFAULT_CONNECTIONS as u32,
            max_lifetime: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_idle_time: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use cumulus_dbaas::ConfigValue;

    use super::*;

    const POOL_ENV_KEYS: [&str; 4] = [
        "DBAAS_MAX_IDLE_CONNECTIONS",
        "DBAAS_MAX_OPEN_CONNECTIONS",
        "DBAAS_CONNECTIONS_MAX_LIFETIME",
        "DBAAS_CONNECTIONS_MAX_IDLETIME",
    ];

    #[test]
    fn test_defaults_when_nothing_is_configured() {
        let settings = temp_env::with_vars_unset(POOL_ENV_KEYS, || {
            PoolSettings::resolve(&ConfigResolver::new())
        });
        assert_eq!(settings, PoolSettings::default());
    }

    #[test]
    fn test_numeric_string_env_configures_open_bound() {
        let settings = temp_env::with_var("DBAAS_MAX_OPEN_CONNECTIONS", Some("2"), || {
            PoolSettings::resolve(&ConfigResolver::new())
        });
        assert_eq!(settings.max_open, 2);
        assert_eq!(settings.pool_options().get_max_connections(), 2);
    }

    #[test]
    fn test_non_numeric_env_falls_back_to_default() {
        let settings = temp_env::with_var("DBAAS_MAX_OPEN_CONNECTIONS", Some("plenty"), || {
            PoolSettings::resolve(&ConfigResolver::new())
        });
        assert_eq!(settings.max_open, DEFAULT_CONNECTIONS as u32);
    }

    #[test]
    fn test_overrides_shadow_environment() {
        let config = ConfigResolver::new()
            .with_override(CONNECTIONS_MAX_LIFETIME_PROPERTY, ConfigValue::Number(120));
        let settings = temp_env::with_var("DBAAS_CONNECTIONS_MAX_LIFETIME", Some("30"), || {
            PoolSettings::resolve(&config)
        });
        assert_eq!(settings.max_lifetime, Duration::from_secs(120));
    }
}
