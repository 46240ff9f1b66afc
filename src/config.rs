//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/msgtree/msgtree.toml`
//! 3. Local config: `<archive_dir>/.msgtree.toml` (next to the archive being decoded)
//! 4. Environment variables: `MSGTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{TrailingPolicy, DEFAULT_BASELINE_BITS, DEFAULT_INTERNAL_MARKER};

/// Unified configuration for msgtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Shape-code character marking internal nodes (default: `^`)
    pub internal_marker: char,
    /// Fixed-width bits per character for the space-saving figure (default: 16)
    pub baseline_bits: u32,
    /// Bits ending mid-path: `strict` fails, `lenient` drops them
    pub trailing: TrailingPolicy,
    /// Escape control characters when printing the code table
    pub escape_symbols: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            internal_marker: DEFAULT_INTERNAL_MARKER,
            baseline_bits: DEFAULT_BASELINE_BITS,
            trailing: TrailingPolicy::default(),
            escape_symbols: true,
        }
    }
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub internal_marker: Option<char>,
    pub baseline_bits: Option<u32>,
    pub trailing: Option<TrailingPolicy>,
    pub escape_symbols: Option<bool>,
}

/// Get the XDG config directory for msgtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "msgtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("msgtree.toml"))
}

/// Get the path to the local config file next to an archive.
pub fn local_config_path(archive_dir: &Path) -> PathBuf {
    archive_dir.join(".msgtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_marker(val: &str) -> Result<char, ApplicationError> {
    let mut chars = val.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ApplicationError::Config {
            message: format!("internal_marker must be a single character, got {val:?}"),
        }),
    }
}

fn parse_trailing(val: &str) -> Result<TrailingPolicy, ApplicationError> {
    match val.to_ascii_lowercase().as_str() {
        "strict" => Ok(TrailingPolicy::Strict),
        "lenient" => Ok(TrailingPolicy::Lenient),
        other => Err(ApplicationError::Config {
            message: format!("trailing must be 'strict' or 'lenient', got {other:?}"),
        }),
    }
}

fn parse_bool(key: &str, val: &str) -> Result<bool, ApplicationError> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ApplicationError::Config {
            message: format!("{key} must be true or false, got {other:?}"),
        }),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            internal_marker: overlay.internal_marker.unwrap_or(self.internal_marker),
            baseline_bits: overlay.baseline_bits.unwrap_or(self.baseline_bits),
            trailing: overlay.trailing.unwrap_or(self.trailing),
            escape_symbols: overlay.escape_symbols.unwrap_or(self.escape_symbols),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.msgtree.toml` (usually the archive's directory)
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("load global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("load local config: {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;

        Ok(current)
    }

    /// Apply MSGTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("MSGTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        Self::apply_overrides(settings, &config)
    }

    /// Apply overrides from a built source; absent keys keep the current value.
    fn apply_overrides(mut settings: Self, config: &Config) -> Result<Self, ApplicationError> {
        if let Ok(val) = config.get_string("internal_marker") {
            settings.internal_marker = parse_marker(&val)?;
        }
        if let Ok(val) = config.get_string("baseline_bits") {
            settings.baseline_bits = val.trim().parse().map_err(|_| ApplicationError::Config {
                message: format!("baseline_bits must be a positive integer, got {val:?}"),
            })?;
        }
        if let Ok(val) = config.get_string("trailing") {
            settings.trailing = parse_trailing(&val)?;
        }
        if let Ok(val) = config.get_string("escape_symbols") {
            settings.escape_symbols = parse_bool("escape_symbols", &val)?;
        }

        Ok(settings)
    }

    /// Reject values the decoder cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.baseline_bits == 0 {
            return Err(ApplicationError::Config {
                message: "baseline_bits must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# msgtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/msgtree/msgtree.toml
#   Local:  <archive_dir>/.msgtree.toml
#   Env:    MSGTREE_* environment variables

# Shape-code character marking internal nodes
# internal_marker = "^"

# Fixed-width bits per character the space saving is measured against
# baseline_bits = 16

# Bits ending in the middle of a code path: "strict" (error) or "lenient" (dropped)
# trailing = "strict"

# Escape \n, \r and \t leaves when printing the code table
# escape_symbols = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
