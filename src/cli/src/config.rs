//! Configuration file loading and validation

use anyhow::{Context, Result};
use groupscope_membership::{
    CompareConfig, Depth, OverwritePolicy, ResolverConfig, UnresolvedPolicy,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete groupscope configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GroupscopeConfig {
    #[serde(default)]
    pub directory: DirectorySection,

    #[serde(default)]
    pub resolver: ResolverSection,

    #[serde(default)]
    pub compare: CompareSection,

    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DirectorySection {
    /// JSON directory snapshot to serve lookups from
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverSection {
    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,
    /// Remember lookups for the rest of the run
    #[serde(default = "default_true")]
    pub memoize: bool,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: default_max_concurrent_lookups(),
            memoize: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompareSection {
    #[serde(default)]
    pub depth: Depth,
    #[serde(default)]
    pub on_unresolved: UnresolvedPolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSection {
    #[serde(default)]
    pub overwrite: OverwritePolicy,
    /// Whether `--input` files start with a header row
    #[serde(default = "default_true")]
    pub input_has_headers: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            overwrite: OverwritePolicy::default(),
            input_has_headers: true,
        }
    }
}

fn default_true() -> bool { true }
fn default_max_concurrent_lookups() -> usize { ResolverConfig::default().max_concurrent_lookups }

impl GroupscopeConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

        let config: GroupscopeConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse configuration file {}", path.display()))?;

        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.resolver.max_concurrent_lookups == 0 {
            anyhow::bail!("resolver.max_concurrent_lookups must be at least 1");
        }

        if self.resolver.max_concurrent_lookups > 1024 {
            anyhow::bail!("resolver.max_concurrent_lookups must not exceed 1024");
        }

        if let Some(snapshot) = &self.directory.snapshot {
            if snapshot.as_os_str().is_empty() {
                anyhow::bail!("directory.snapshot must not be empty");
            }
        }

        Ok(())
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            max_concurrent_lookups: self.resolver.max_concurrent_lookups,
        }
    }

    pub fn compare_config(&self) -> CompareConfig {
        CompareConfig {
            depth: self.compare.depth,
            on_unresolved: self.compare.on_unresolved,
            max_concurrent_lookups: self.resolver.max_concurrent_lookups,
        }
    }
}
