//! Principal identifiers

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A vertex of the membership graph: a user or a group
///
/// The graph makes no distinction between users and groups; both are plain
/// string keys such as an account name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Create a new principal
    pub fn new<S: Into<String>>(id: S) -> Self {
        Principal(id.into())
    }

    /// Get the principal as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for empty or whitespace-only identifiers
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Consume the principal, returning the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Principal {
    fn from(s: String) -> Self {
        Principal(s)
    }
}

impl From<&str> for Principal {
    fn from(s: &str) -> Self {
        Principal(s.to_string())
    }
}

impl From<&Principal> for Principal {
    fn from(p: &Principal) -> Self {
        p.clone()
    }
}

impl AsRef<str> for Principal {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Principal {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_blank_detection() {
        assert!(Principal::new("").is_blank());
        assert!(Principal::new("   ").is_blank());
        assert!(!Principal::new("alice").is_blank());
    }

    #[test]
    fn test_ordering_is_by_name() {
        let set: BTreeSet<Principal> =
            ["zeta", "alpha", "Mid"].into_iter().map(Principal::from).collect();
        let names: Vec<&str> = set.iter().map(Principal::as_str).collect();
        assert_eq!(names, vec!["Mid", "alpha", "zeta"]);
    }

    #[test]
    fn test_serde_transparent() {
        let p = Principal::new("alice");
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"alice\"");
        let back: Principal = serde_json::from_str("\"bob\"").unwrap();
        assert_eq!(back, Principal::new("bob"));
    }
}
