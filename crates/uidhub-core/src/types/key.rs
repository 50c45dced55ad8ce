//! Typed match key for entitlement records.

use serde::{Deserialize, Serialize};

/// Record uniqueness scope.
///
/// The default deployment keys records by `uid` alone. Some deployments
/// partition identifiers by region and key records by `(uid, region)`;
/// the scope is a store-level configuration choice, not a per-request one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum KeyScope {
    /// Records are unique per `uid`.
    #[default]
    Uid,
    /// Records are unique per `(uid, region)` pair.
    UidRegion,
}

/// The match key for one entitlement record under a given [`KeyScope`].
///
/// `region` is `None` under [`KeyScope::Uid`]; lookups then match any
/// region, and a metadata upsert may move a record between regions without
/// changing its identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UidKey {
    /// The caller-supplied identifier.
    pub uid: String,
    /// The region partition, when the scope includes it.
    pub region: Option<String>,
}

impl UidKey {
    /// Build a key for `uid` (and `region`, when scoped) under `scope`.
    pub fn new(scope: KeyScope, uid: impl Into<String>, region: &str) -> Self {
        Self {
            uid: uid.into(),
            region: match scope {
                KeyScope::Uid => None,
                KeyScope::UidRegion => Some(region.to_string()),
            },
        }
    }

    /// Flatten the key into a single map/index key string.
    ///
    /// The composed form is an opaque index key; it is never parsed back.
    pub fn composed(&self) -> String {
        match &self.region {
            None => self.uid.clone(),
            Some(region) => format!("{}\u{1f}{}", self.uid, region),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_scope_ignores_region() {
        let key = UidKey::new(KeyScope::Uid, "12345", "eu");
        assert_eq!(key.region, None);
        assert_eq!(key.composed(), "12345");
    }

    #[test]
    fn test_region_scope_composes() {
        let a = UidKey::new(KeyScope::UidRegion, "12345", "eu");
        let b = UidKey::new(KeyScope::UidRegion, "12345", "us");
        assert_ne!(a, b);
        assert_ne!(a.composed(), b.composed());
    }

    #[test]
    fn test_empty_region_is_distinct_from_uid_scope() {
        let scoped = UidKey::new(KeyScope::UidRegion, "12345", "");
        assert_eq!(scoped.region.as_deref(), Some(""));
    }
}
