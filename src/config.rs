//! Build configuration helpers.
//!
//! The configuration carries the ambient build paths every backend needs
//! (source and object roots, target SDK) plus the external commands run
//! after generation.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

const DEFAULT_PACKAGE_COMMAND: &str = "./mach package";
const DEFAULT_BUILD_COMMAND: &str = "./mach build";

/// How synthetic ids for filtered-resource blocks are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterIds {
    /// Count up from 1; output is reproducible.
    #[default]
    Sequential,
    /// Seed from the wall clock in milliseconds, as Eclipse itself does.
    Time,
}

/// Ambient build configuration shared by every project in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    pub schema_version: u32,
    pub topsrcdir: PathBuf,
    pub topobjdir: PathBuf,
    pub android_target_sdk: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_root: Option<PathBuf>,
    #[serde(default)]
    pub filter_ids: FilterIds,
    #[serde(default = "default_package_command")]
    pub package_command: String,
    #[serde(default = "default_build_command")]
    pub build_command: String,
}

fn default_package_command() -> String {
    DEFAULT_PACKAGE_COMMAND.to_string()
}

fn default_build_command() -> String {
    DEFAULT_BUILD_COMMAND.to_string()
}

impl BuildConfig {
    /// Directory overriding the template trees built into the binary.
    pub fn template_root(&self) -> Option<&Path> {
        self.template_root.as_deref()
    }
}

/// Load a build configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<BuildConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: BuildConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse build config JSON {}", path.display()))?;
    Ok(config)
}

/// Validate schema and the paths later joined onto generated output.
pub fn validate_config(config: &BuildConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported build config schema_version {}",
            config.schema_version
        ));
    }
    for (label, path) in [
        ("topsrcdir", &config.topsrcdir),
        ("topobjdir", &config.topobjdir),
    ] {
        if !path.is_absolute() {
            return Err(anyhow!(
                "{label} must be an absolute path (got {})",
                path.display()
            ));
        }
    }
    if config.android_target_sdk.trim().is_empty() {
        return Err(anyhow!("android_target_sdk must be non-empty"));
    }
    if config.package_command.trim().is_empty() || config.build_command.trim().is_empty() {
        return Err(anyhow!("package_command and build_command must be non-empty"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
