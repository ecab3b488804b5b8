//! Typed resolution of numeric tunables.
//!
//! Properties are dotted names (`dbaas.max.open.connections`); each resolves
//! from a programmatic override first, then from the environment under the
//! upper-snake-case form of the name (`DBAAS_MAX_OPEN_CONNECTIONS`).

use std::collections::HashMap;

/// A configuration value supplied programmatically.
#[derive(Debug, Clone)]
pub enum ConfigValue {
    Number(u64),
    Text(String),
}

/// Resolution outcome: the value plus whether the default was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedValue {
    pub value: u64,
    pub defaulted: bool,
}

/// Resolves numeric tunables from overrides or the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    overrides: HashMap<String, ConfigValue>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins `property` to `value`, shadowing the environment.
    pub fn with_override(mut self, property: impl Into<String>, value: ConfigValue) -> Self {
        self.overrides.insert(property.into(), value);
        self
    }

    /// Resolves `property`, falling back to `default`.
    ///
    /// Numeric strings parse as numbers; a non-numeric value silently falls
    /// back to the default rather than erroring.
    pub fn get_or_default(&self, property: &str, default: u64) -> ResolvedValue {
        if let Some(value) = self.overrides.get(property) {
            return Self::coerce(value, default);
        }
        match std::env::var(Self::env_key(property)) {
            Ok(raw) => Self::coerce(&ConfigValue::Text(raw), default),
            Err(_) => ResolvedValue {
                value: default,
                defaulted: true,
            },
        }
    }

    fn coerce(value: &ConfigValue, default: u64) -> ResolvedValue {
        match value {
            ConfigValue::Number(number) => ResolvedValue {
                value: *number,
                defaulted: false,
            },
            ConfigValue::Text(raw) => match raw.trim().parse::<u64>() {
                Ok(number) => ResolvedValue {
                    value: number,
                    defaulted: false,
                },
                Err(_) => ResolvedValue {
                    value: default,
                    defaulted: true,
                },
            },
        }
    }

    fn env_key(property: &str) -> String {
        property.replace('.', "_").to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROPERTY: &str = "dbaas.max.open.connections";

    #[test]
    fn test_missing_property_uses_default() {
        let resolver = ConfigResolver::new();
        let resolved = temp_env::with_var_unset("DBAAS_MAX_OPEN_CONNECTIONS", || {
            resolver.get_or_default(PROPERTY, 5)
        });
        assert_eq!(
            resolved,
            ResolvedValue {
                value: 5,
                defaulted: true
            }
        );
    }

    #[test]
    fn test_numeric_override() {
        let resolver = ConfigResolver::new().with_override(PROPERTY, ConfigValue::Number(12));
        let resolved = resolver.get_or_default(PROPERTY, 5);
        assert_eq!(resolved.value, 12);
        assert!(!resolved.defaulted);
    }

    #[test]
    fn test_numeric_string_from_env() {
        let resolved = temp_env::with_var("DBAAS_MAX_OPEN_CONNECTIONS", Some("2"), || {
            ConfigResolver::new().get_or_default(PROPERTY, 5)
        });
        assert_eq!(resolved.value, 2);
        assert!(!resolved.defaulted);
    }

    #[test]
    fn test_non_numeric_string_falls_back() {
        let resolved = temp_env::with_var("DBAAS_MAX_OPEN_CONNECTIONS", Some("plenty"), || {
            ConfigResolver::new().get_or_default(PROPERTY, 5)
        });
        assert_eq!(
            resolved,
            ResolvedValue {
                value: 5,
                defaulted: true
            }
        );
    }

    #[test]
    fn test_non_numeric_override_falls_back() {
        let resolver =
            ConfigResolver::new().with_override(PROPERTY, ConfigValue::Text("plenty".to_string()));
        let resolved = resolver.get_or_default(PROPERTY, 5);
        assert!(resolved.defaulted);
        assert_eq!(resolved.value, 5);
    }
}
