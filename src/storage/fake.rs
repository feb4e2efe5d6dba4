use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use super::Storage;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct FakeFile {
    contents: String,
    last_modified: u64,
}

/// In-memory [`Storage`]. Each write ticks a private clock, so a rewritten
/// file always reports a newer modified time than before.
#[derive(Debug, Default)]
pub struct FakeFileSystem {
    files: RefCell<BTreeMap<PathBuf, FakeFile>>,
    clock: Cell<u64>,
}

impl FakeFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or replaces a file.
    pub fn set(&self, path: impl AsRef<Path>, contents: &str) {
        let now = self.clock.get() + 1;
        self.clock.set(now);
        self.files.borrow_mut().insert(
            path.as_ref().to_path_buf(),
            FakeFile {
                contents: contents.to_string(),
                last_modified: now,
            },
        );
    }

    /// Overrides the modified time without touching the contents.
    pub fn set_modified_time(&self, path: impl AsRef<Path>, time: u64) {
        if let Some(file) = self.files.borrow_mut().get_mut(path.as_ref()) {
            file.last_modified = time;
        }
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .borrow()
            .get(path.as_ref())
            .map(|file| file.contents.clone())
    }

    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }
}

impl Storage for FakeFileSystem {
    fn read_text_file(&self, path: &Path) -> Result<String> {
        self.get(path)
            .ok_or_else(|| Error::Storage(format!("{}: file not found", path.display())))
    }

    fn write_text_file(&self, path: &Path, contents: &str) -> Result<()> {
        self.set(path, contents);
        Ok(())
    }

    fn get_modified_time(&self, path: &Path) -> u64 {
        self.files
            .borrow()
            .get(path)
            .map(|file| file.last_modified)
            .unwrap_or(0)
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }
}
