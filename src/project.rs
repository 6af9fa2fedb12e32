//! # Project metadata seam.
//!
//! A project maps human-readable aliases (e.g. `billing@1.2.0-7`) to package ids and records
//! newly created versions. [`NoProject`] is for callers without a project;
//! [`MemoryProject`] keeps the mapping in memory.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::Result;
use crate::ids::SubscriberVersionId;

/// Project metadata used by the facade.
pub trait Project: Send + Sync + 'static {
    /// Returns the id an alias points to, `None` if `alias` is unknown.
    fn resolve_alias(&self, alias: &str) -> Option<String>;

    /// Persists `alias → id` for a newly created version.
    fn record_version(&self, alias: &str, id: &SubscriberVersionId) -> Result<()>;
}

/// Project with no aliases that accepts and discards writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProject;

impl Project for NoProject {
    fn resolve_alias(&self, _alias: &str) -> Option<String> {
        None
    }

    fn record_version(&self, _alias: &str, _id: &SubscriberVersionId) -> Result<()> {
        Ok(())
    }
}

/// In-memory alias table.
#[derive(Debug, Default)]
pub struct MemoryProject {
    aliases: RwLock<HashMap<String, String>>,
}

impl MemoryProject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an alias.
    pub fn with_alias(self, alias: impl Into<String>, id: impl Into<String>) -> Self {
        self.aliases
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(alias.into(), id.into());
        self
    }

    /// All aliases, sorted by alias.
    pub fn aliases(&self) -> Vec<(String, String)> {
        let g = self.aliases.read().unwrap_or_else(PoisonError::into_inner);
        let mut v: Vec<_> = g.iter().map(|(a, id)| (a.clone(), id.clone())).collect();
        v.sort_unstable();
        v
    }
}

impl Project for MemoryProject {
    fn resolve_alias(&self, alias: &str) -> Option<String> {
        self.aliases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(alias)
            .cloned()
    }

    fn record_version(&self, alias: &str, id: &SubscriberVersionId) -> Result<()> {
        self.aliases
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(alias.to_owned(), id.to_string());
        Ok(())
    }
}
