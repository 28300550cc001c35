// File: src/config.rs
// Purpose: Form behaviour configuration, loadable from TOML

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What a form does when two items share a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateKeyPolicy {
    /// Construction fails and `append` returns an error
    #[default]
    Reject,
    /// The later item replaces the earlier one
    Replace,
    /// Both are kept; lookups return the first in order
    Allow,
}

/// Form manager configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub duplicate_keys: DuplicateKeyPolicy,
}

impl FormConfig {
    /// Parse configuration from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        toml::from_str(content).context("Failed to parse form configuration")
    }

    /// Load configuration from a file
    ///
    /// A missing or empty file yields the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read form config file: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse form config file: {:?}", path))
    }

    pub fn with_duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.duplicate_keys = policy;
        self
    }
}
