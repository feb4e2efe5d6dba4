//! Code units: a script file loaded into its own top-level branch.
//!
//! A unit remembers the modified time and content fingerprint of the text it
//! was built from. [`CodeUnit::reload_if_changed`] rebuilds the branch only
//! when the file's time moved and its content actually differs, then carries
//! hidden state across with [`migrate_stateful_values`].

pub mod fingerprint;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    error::Result,
    graph::BranchId,
    runtime::{migration::migrate_stateful_values, value::TaggedValue},
    script::{Script, load_script, parse_script},
    storage::Storage,
    world::World,
};

pub use fingerprint::{Fingerprint, hash_bytes, to_hex};

#[derive(Debug, Clone)]
pub struct CodeUnit {
    pub path: PathBuf,
    pub branch: BranchId,
    pub script: Script,
    pub fingerprint: Fingerprint,
    pub modified: u64,
    /// State that found no home during the last reload.
    pub trash: TaggedValue,
}

impl CodeUnit {
    pub fn load(world: &mut World, storage: &dyn Storage, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let modified = storage.get_modified_time(&path);
        let text = storage.read_text_file(&path)?;
        let (branch, script) = build(world, &path, &text)?;
        let fingerprint = hash_bytes(text.as_bytes());
        debug!(path = %path.display(), fingerprint = %to_hex(&fingerprint), "loaded code unit");
        Ok(Self {
            path,
            branch,
            script,
            fingerprint,
            modified,
            trash: TaggedValue::list(Vec::new()),
        })
    }

    /// Rebuilds the unit when its file changed. Returns whether it did.
    ///
    /// A file that fails to load leaves the unit on its old branch.
    pub fn reload_if_changed(&mut self, world: &mut World, storage: &dyn Storage) -> Result<bool> {
        let modified = storage.get_modified_time(&self.path);
        if modified == self.modified {
            return Ok(false);
        }
        let text = storage.read_text_file(&self.path)?;
        let fingerprint = hash_bytes(text.as_bytes());
        self.modified = modified;
        if fingerprint == self.fingerprint {
            debug!(path = %self.path.display(), "touched but unchanged");
            return Ok(false);
        }
        self.replace(world, &text, fingerprint)?;
        Ok(true)
    }

    /// Rebuilds the unit from its file whether or not it changed.
    pub fn reload(&mut self, world: &mut World, storage: &dyn Storage) -> Result<()> {
        self.modified = storage.get_modified_time(&self.path);
        let text = storage.read_text_file(&self.path)?;
        let fingerprint = hash_bytes(text.as_bytes());
        self.replace(world, &text, fingerprint)
    }

    fn replace(&mut self, world: &mut World, text: &str, fingerprint: Fingerprint) -> Result<()> {
        let (branch, script) = build(world, &self.path, text)?;
        let trash = migrate_stateful_values(world, self.branch, branch)?;
        world.delete_branch(self.branch)?;
        let orphaned = trash.as_list().map(|items| items.len()).unwrap_or(0);
        info!(
            path = %self.path.display(),
            fingerprint = %to_hex(&fingerprint),
            orphaned,
            "reloaded code unit"
        );
        self.branch = branch;
        self.script = script;
        self.fingerprint = fingerprint;
        self.trash = trash;
        Ok(())
    }
}

/// Parses and loads `text` into a fresh branch, deleting the branch again if
/// loading fails halfway.
fn build(world: &mut World, path: &Path, text: &str) -> Result<(BranchId, Script)> {
    let script = parse_script(text)?;
    let branch = world.create_branch(None);
    let source = path.display().to_string();
    if let Err(err) = load_script(world, branch, &script, Some(&source)) {
        world.delete_branch(branch)?;
        return Err(err);
    }
    Ok((branch, script))
}
