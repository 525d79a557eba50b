//! Resolution settings
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! provider = "Builtin"
//!
//! [pss]
//! sha256_max_bits = 3072
//! sha384_max_bits = 7680
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Provider to bind operations with, by name; `None` uses the whole registry
    pub provider: Option<String>,

    /// Default RSASSA-PSS parameter selection
    pub pss: PssSettings,
}

/// Modulus-size thresholds for the synthesized RSASSA-PSS digest
///
/// Keys up to `sha256_max_bits` get SHA-256, up to `sha384_max_bits` SHA-384,
/// larger keys SHA-512.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PssSettings {
    pub sha256_max_bits: usize,
    pub sha384_max_bits: usize,
}

impl Default for PssSettings {
    fn default() -> Self {
        Self {
            sha256_max_bits: 3072,
            sha384_max_bits: 7680,
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }
}
