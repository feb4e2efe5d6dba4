use std::path::Path;

use serde::Deserialize;

use crate::{error::Result, storage::Storage};

/// Interpreter settings. Every field has a default so a config file only needs
/// to mention what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Emit a `trace!` event for every evaluated term.
    pub trace: bool,
    /// Maximum number of frames on one stack before "stack overflow".
    pub max_frames: usize,
    /// Evaluate pure terms with constant inputs at creation time.
    pub constant_folding: bool,
    /// Let `apply_function` return an existing equivalent term.
    pub reuse_equivalent_terms: bool,
    /// Run the static error check before evaluating a script.
    pub check_before_run: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            trace: false,
            max_frames: 4096,
            constant_folding: true,
            reuse_equivalent_terms: true,
            check_before_run: true,
        }
    }
}

impl WorldConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(storage: &dyn Storage, path: &Path) -> Result<Self> {
        let text = storage.read_text_file(path)?;
        Self::from_json(&text)
    }
}
