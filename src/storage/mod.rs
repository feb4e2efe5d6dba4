//! Where program text comes from.
//!
//! The interpreter never touches `std::fs` directly. Scripts, configuration
//! and state dumps go through a [`Storage`] so tests and embedders can swap
//! the real filesystem for [`FakeFileSystem`].

mod fake;
mod filesystem;

use std::path::Path;

use crate::error::Result;

pub use fake::FakeFileSystem;
pub use filesystem::FileSystemStorage;

pub trait Storage {
    fn read_text_file(&self, path: &Path) -> Result<String>;

    fn write_text_file(&self, path: &Path, contents: &str) -> Result<()>;

    /// Seconds since the epoch, or 0 when the file is missing or the path is
    /// empty.
    fn get_modified_time(&self, path: &Path) -> u64;

    fn file_exists(&self, path: &Path) -> bool;
}
