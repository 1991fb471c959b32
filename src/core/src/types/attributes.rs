//! Descriptive attribute records returned by a directory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attributes of a group entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAttributes {
    /// When the group was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Group category (e.g. "Security", "Distribution")
    #[serde(default)]
    pub category: String,

    /// Group scope (e.g. "Global", "DomainLocal", "Universal")
    #[serde(default)]
    pub scope: String,
}

/// Attributes of a user entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAttributes {
    /// Display name
    #[serde(default)]
    pub display_name: String,

    /// Primary mail address
    #[serde(default)]
    pub email: String,

    /// Job title
    #[serde(default)]
    pub title: String,

    /// Department
    #[serde(default)]
    pub department: String,

    /// Whether the account is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Last interactive logon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_logon: Option<DateTime<Utc>>,
}

fn default_enabled() -> bool { true }

impl Default for UserAttributes {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            email: String::new(),
            title: String::new(),
            department: String::new(),
            enabled: true,
            last_logon: None,
        }
    }
}

/// Attribute record for any principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PrincipalAttributes {
    /// The principal is a group
    Group(GroupAttributes),
    /// The principal is a user account
    User(UserAttributes),
}

impl PrincipalAttributes {
    /// Group attributes, if this principal is a group
    pub fn as_group(&self) -> Option<&GroupAttributes> {
        match self {
            PrincipalAttributes::Group(group) => Some(group),
            PrincipalAttributes::User(_) => None,
        }
    }

    /// User attributes, if this principal is a user
    pub fn as_user(&self) -> Option<&UserAttributes> {
        match self {
            PrincipalAttributes::User(user) => Some(user),
            PrincipalAttributes::Group(_) => None,
        }
    }
}
