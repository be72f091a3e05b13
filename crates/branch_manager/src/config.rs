use serde::{Deserialize, Serialize};

use crate::error::{BranchError, Result};
use crate::merge::MergeOptions;

fn default_main_title() -> String {
    "Main".to_string()
}

fn default_reason() -> String {
    "manual".to_string()
}

fn default_true() -> bool {
    true
}

/// Settings injected into a `BranchManager` at construction time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchManagerConfig {
    /// Title given to the root `main` branch.
    #[serde(default = "default_main_title")]
    pub main_title: String,

    /// Branch-point reason used when the caller supplies none.
    #[serde(default = "default_reason")]
    pub default_reason: String,

    /// Options used by `merge_with_defaults`.
    #[serde(default)]
    pub default_merge: MergeOptions,

    /// Keep a single `merged` tag across repeated merges.
    #[serde(default = "default_true")]
    pub dedupe_merged_tag: bool,
}

impl Default for BranchManagerConfig {
    fn default() -> Self {
        Self {
            main_title: default_main_title(),
            default_reason: default_reason(),
            default_merge: MergeOptions::default(),
            dedupe_merged_tag: true,
        }
    }
}

impl BranchManagerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BranchError::InvalidConfig(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| BranchError::InvalidConfig(e.to_string()))
    }
}
