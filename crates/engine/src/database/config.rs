//! Store configuration via `jsondoc.toml`
//!
//! A simple config file in the data directory. On first open, a default
//! `jsondoc.toml` is written. To change settings, edit the file and reopen
//! the store.

use jsondoc_core::{Error, IdPolicy, Result};
use jsondoc_storage::WriteMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed in the data directory.
pub const CONFIG_FILE_NAME: &str = "jsondoc.toml";

/// Store configuration loaded from `jsondoc.toml`.
///
/// # Example
///
/// ```toml
/// write_mode = "atomic"
/// id_policy = "max_plus_one"
/// enforce_schema = false
/// lock_file = false
/// pretty = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsondocConfig {
    /// How database files are replaced: `"atomic"` or `"overwrite"`.
    #[serde(default = "default_write_mode_str")]
    pub write_mode: String,
    /// Identifier assignment: `"max_plus_one"` or `"sequence"`.
    #[serde(default = "default_id_policy_str")]
    pub id_policy: String,
    /// Validate inserts and updates against collection schemas.
    #[serde(default)]
    pub enforce_schema: bool,
    /// Hold an exclusive `<db>.json.lock` during every operation.
    #[serde(default)]
    pub lock_file: bool,
    /// Pretty-print database files.
    #[serde(default)]
    pub pretty: bool,
}

fn default_write_mode_str() -> String {
    WriteMode::default().as_str().to_string()
}

fn default_id_policy_str() -> String {
    IdPolicy::default().as_str().to_string()
}

impl Default for JsondocConfig {
    fn default() -> Self {
        Self {
            write_mode: default_write_mode_str(),
            id_policy: default_id_policy_str(),
            enforce_schema: false,
            lock_file: false,
            pretty: false,
        }
    }
}

impl JsondocConfig {
    /// Parse the write mode string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"atomic"` or `"overwrite"`.
    pub fn write_mode(&self) -> Result<WriteMode> {
        match self.write_mode.as_str() {
            "atomic" => Ok(WriteMode::Atomic),
            "overwrite" => Ok(WriteMode::Overwrite),
            other => Err(Error::Config {
                reason: format!(
                    "Invalid write_mode '{}' in {}. Expected \"atomic\" or \"overwrite\".",
                    other, CONFIG_FILE_NAME
                ),
            }),
        }
    }

    /// Parse the identifier policy string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"max_plus_one"` or `"sequence"`.
    pub fn id_policy(&self) -> Result<IdPolicy> {
        match self.id_policy.as_str() {
            "max_plus_one" => Ok(IdPolicy::MaxPlusOne),
            "sequence" => Ok(IdPolicy::Sequence),
            other => Err(Error::Config {
                reason: format!(
                    "Invalid id_policy '{}' in {}. Expected \"max_plus_one\" or \"sequence\".",
                    other, CONFIG_FILE_NAME
                ),
            }),
        }
    }

    /// Check every enumerated field eagerly.
    pub fn validate(&self) -> Result<()> {
        self.write_mode()?;
        self.id_policy()?;
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# jsondoc store configuration
#
# How database files are rewritten: "atomic" (default) or "overwrite"
#   "atomic"    = write a temp file, fsync, rename over the database file
#   "overwrite" = truncate and write in place, no fsync
write_mode = "atomic"

# Record identifier assignment: "max_plus_one" (default) or "sequence"
#   "max_plus_one" = highest live _id + 1
#   "sequence"     = persisted per-collection counter, ids never reused
id_policy = "max_plus_one"

# Validate inserts and updates against collection schemas (default: false)
enforce_schema = false

# Hold an exclusive <name>.json.lock file during every operation so separate
# processes cannot interleave writes (default: false)
lock_file = false

# Pretty-print database files (default: false)
pretty = false
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        let config: JsondocConfig = toml::from_str(&content).map_err(|e| Error::Config {
            reason: format!("Failed to parse config file '{}': {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| Error::io(path, e))?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config {
            reason: format!("Failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content).map_err(|e| Error::io(path, e))
    }
}
