//! Configuration file loading for compliance-check.
//!
//! Reads `.compliance/config.json` and provides typed access to engine settings.
//! Falls back to defaults when the file is missing or incomplete.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-rule predicate budget in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Upper bound on concurrently evaluated rules.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Unchanged lines around each diff hunk.
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
    #[serde(default)]
    pub fail_on: FailOn,
    /// Ordered category -> banner mapping.
    #[serde(default = "default_banners")]
    pub banners: Vec<BannerRule>,
}

/// Lowest severity that makes the CLI exit non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailOn {
    #[default]
    Critical,
    Recommendation,
}

/// A banner shown above a report when a finding of `category` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerRule {
    pub category: String,
    pub text: String,
}

impl BannerRule {
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}
fn default_max_concurrency() -> usize {
    8
}
fn default_context_lines() -> usize {
    3
}
fn default_banners() -> Vec<BannerRule> {
    vec![
        BannerRule::new("Security", "⚠️ SECURITY WARNING"),
        BannerRule::new("Accessibility", "🚨 CRITICAL: ACCESSIBILITY"),
    ]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_concurrency: default_max_concurrency(),
            context_lines: default_context_lines(),
            fail_on: FailOn::default(),
            banners: default_banners(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from `config.json` inside the given directory.
    /// Returns defaults if the file doesn't exist or can't be parsed.
    pub fn load(config_dir: &Path) -> Self {
        Self::load_file(&config_dir.join("config.json"))
    }

    /// Load configuration from an explicit file path.
    pub fn load_file(config_path: &Path) -> Self {
        let content = match std::fs::read_to_string(config_path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                Self::default()
            }
        }
    }
}
