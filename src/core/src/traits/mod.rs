//! Collaborator contracts the membership core depends on

pub mod directory;
pub mod sink;

// Re-export commonly used traits
pub use directory::DirectoryProvider;
pub use sink::ResultSink;
