//! Configuration for the command line tool.
//!
//! A small JSON file sets where report data lives and how output is ordered
//! and formatted. Environment variables override the file.
use crate::arch::{ArchOrder, DEFAULT_ARCH_ORDER};
use crate::render::OutputFormat;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current schema version for `config.json`.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;
/// Directory holding `index.json` and `versions/` when nothing else is set.
pub const DEFAULT_DATA_DIR: &str = "data";

pub const ENV_CONFIG: &str = "MLREPORT_CONFIG";
pub const ENV_DATA_DIR: &str = "MLREPORT_DATA_DIR";
pub const ENV_ARCH_ORDER: &str = "MLREPORT_ARCH_ORDER";
pub const ENV_FORMAT: &str = "MLREPORT_FORMAT";

fn default_schema_version() -> u32 {
    CONFIG_SCHEMA_VERSION
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arch_order: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            data_dir: None,
            arch_order: Vec::new(),
            format: None,
        }
    }
}

impl ReportConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_dir().join("index.json")
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.data_dir().join("versions")
    }

    pub fn arch_order(&self) -> ArchOrder {
        if self.arch_order.is_empty() {
            ArchOrder::new(DEFAULT_ARCH_ORDER)
        } else {
            ArchOrder::new(self.arch_order.iter().cloned())
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

/// Platform config location, e.g. `~/.config/mlreport/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mlreport").join("config.json"))
}

/// Resolve and load the config, then apply environment overrides.
///
/// An explicit path (flag or `MLREPORT_CONFIG`) must exist; the platform
/// default is used only when present.
pub fn load(explicit: Option<&Path>) -> Result<ReportConfig> {
    let env_path = std::env::var_os(ENV_CONFIG).map(PathBuf::from);
    let explicit = explicit.map(Path::to_path_buf).or(env_path);

    let mut config = match explicit {
        Some(path) => load_config(&path)?,
        None => match default_config_path().filter(|path| path.is_file()) {
            Some(path) => load_config(&path)?,
            None => ReportConfig::default(),
        },
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<ReportConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: ReportConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    validate_config(&config)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn validate_config(config: &ReportConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if config.arch_order.iter().any(|arch| arch.trim().is_empty()) {
        return Err(anyhow!("arch_order entries must be non-empty"));
    }
    Ok(())
}

/// Apply `MLREPORT_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut ReportConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
        config.data_dir = Some(PathBuf::from(dir.trim()));
    }
    if let Some(order) = lookup(ENV_ARCH_ORDER) {
        let archs: Vec<String> = order
            .split(',')
            .map(str::trim)
            .filter(|arch| !arch.is_empty())
            .map(str::to_string)
            .collect();
        if !archs.is_empty() {
            config.arch_order = archs;
        }
    }
    if let Some(format) = lookup(ENV_FORMAT) {
        config.format = Some(
            format
                .parse::<OutputFormat>()
                .map_err(anyhow::Error::msg)
                .with_context(|| ENV_FORMAT)?,
        );
    }
    Ok(())
}
