use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one fetchable resource: a namespace plus its ordered parameters.
///
/// Two keys naming the same namespace and parameter values address the same
/// cache entry; value equality is what deduplicates concurrent fetches.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    namespace: String,
    params: Vec<String>,
}

impl QueryKey {
    /// Build a key from a namespace and its ordered parameters.
    pub fn new(
        namespace: impl Into<String>,
        params: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Namespace this key belongs to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Ordered parameters identifying the resource within the namespace.
    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.namespace, self.params.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_value() {
        let a = QueryKey::new("getGame", ["portal-2"]);
        let b = QueryKey::new("getGame", ["portal-2".to_string()]);
        let c = QueryKey::new("getGame", ["half-life-2"]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display_includes_namespace_and_params() {
        let key = QueryKey::new("search", ["portal"]);
        assert_eq!(key.to_string(), "search[portal]");
    }
}
