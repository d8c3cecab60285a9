//! Storage collaborator traits

use crate::{RawEntry, Result};
use std::path::Path;

/// Object store operations on `bucket/key` paths.
///
/// Directory paths end with `/`. Calls block until the store answers.
pub trait Connector: Send + Sync {
    /// Entries directly under `path`
    fn list(&self, path: &str) -> Result<Vec<RawEntry>>;

    /// Read at most `max_bytes` from the start of an object
    fn read_bytes(&self, path: &str, max_bytes: usize) -> Result<Vec<u8>>;

    /// Create or replace an object
    fn write_bytes(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Delete an object, or everything under a prefix when `recursive`.
    ///
    /// Deleting a key that does not exist succeeds, like S3 DeleteObject.
    fn delete(&self, path: &str, recursive: bool) -> Result<()>;

    /// Copy an object, or everything under a prefix when `recursive`
    fn copy(&self, src: &str, dst: &str, recursive: bool) -> Result<()>;

    /// Move an object, or everything under a prefix when `recursive`.
    ///
    /// A recursive move into the source prefix itself fails with
    /// [`StoreError::InvalidPath`](crate::StoreError::InvalidPath).
    fn move_to(&self, src: &str, dst: &str, recursive: bool) -> Result<()>;
}

/// What a bulk transfer moved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferSummary {
    pub files: usize,
    pub bytes: u64,
}

impl TransferSummary {
    pub(crate) fn add(&mut self, bytes: u64) {
        self.files += 1;
        self.bytes += bytes;
    }
}

/// Whole-directory transfers between the local filesystem and the store.
///
/// Each call runs to completion before returning.
pub trait BulkTransfer: Send + Sync {
    /// Upload every file under `local_dir` below the `remote` prefix
    fn upload(&self, local_dir: &Path, remote: &str) -> Result<TransferSummary>;

    /// Download `remote` into `local`.
    ///
    /// A `remote` ending with `/` is a prefix and `local` becomes a directory
    /// mirroring it; otherwise `local` is the target file.
    fn download(&self, remote: &str, local: &Path) -> Result<TransferSummary>;
}
