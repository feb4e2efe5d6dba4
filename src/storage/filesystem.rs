use std::{fs, path::Path, time::UNIX_EPOCH};

use tracing::trace;

use super::Storage;
use crate::error::{Error, Result};

/// [`Storage`] backed by the process filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemStorage;

impl FileSystemStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for FileSystemStorage {
    fn read_text_file(&self, path: &Path) -> Result<String> {
        trace!(path = %path.display(), "read");
        fs::read_to_string(path)
            .map_err(|err| Error::Storage(format!("{}: {}", path.display(), err)))
    }

    fn write_text_file(&self, path: &Path, contents: &str) -> Result<()> {
        trace!(path = %path.display(), bytes = contents.len(), "write");
        fs::write(path, contents)
            .map_err(|err| Error::Storage(format!("{}: {}", path.display(), err)))
    }

    fn get_modified_time(&self, path: &Path) -> u64 {
        if path.as_os_str().is_empty() {
            return 0;
        }
        fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
