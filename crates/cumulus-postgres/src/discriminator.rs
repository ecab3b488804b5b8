//! Cache-key discriminator for physical connections sharing one classifier.

/// Distinguishes the physical connections of a logical database: the
/// credential role and whether the read-only replica is targeted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PgDiscriminator {
    pub role: Option<String>,
    pub ro_replica: bool,
}

impl PgDiscriminator {
    pub fn new(role: Option<String>, ro_replica: bool) -> Self {
        Self { role, ro_replica }
    }

    /// Deterministic cache-key segment: `role:roReplica=<bool>`, with the
    /// role part omitted when no role is set.
    pub fn value(&self) -> String {
        match self.role.as_deref() {
            Some(role) if !role.is_empty() => format!("{}:roReplica={}", role, self.ro_replica),
            _ => format!("roReplica={}", self.ro_replica),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_with_role() {
        let discriminator = PgDiscriminator::new(Some("admin".to_string()), false);
        assert_eq!(discriminator.value(), "admin:roReplica=false");
    }

    #[test]
    fn test_value_without_role() {
        let discriminator = PgDiscriminator::new(None, true);
        assert_eq!(discriminator.value(), "roReplica=true");
    }

    #[test]
    fn test_empty_role_is_omitted() {
        let discriminator = PgDiscriminator::new(Some(String::new()), false);
        assert_eq!(discriminator.value(), "roReplica=false");
    }
}
