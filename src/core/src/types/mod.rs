//! Shared types for groupscope

pub mod attributes;
pub mod principal;
pub mod table;

// Re-export commonly used types
pub use attributes::{GroupAttributes, PrincipalAttributes, UserAttributes};
pub use principal::Principal;
pub use table::Table;
