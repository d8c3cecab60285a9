//! S3Browser storage layer
//!
//! Provides the storage collaborators the browser core talks to:
//! - Connector: list / read / write / delete / copy / move on `bucket/key` paths
//! - BulkTransfer: one-shot directory upload and download
//! - S3Connector / S3Transfer: implementations backed by aws-sdk-s3
//! - MemoryConnector: in-process object map
//! - Preview decoding

mod entry;
mod connector;
mod decode;
mod local;
mod memory;
mod s3;
mod transfer;

pub use entry::{EntryKind, RawEntry};
pub use connector::{BulkTransfer, Connector, TransferSummary};
pub use decode::decode_preview;
pub use memory::MemoryConnector;
pub use s3::{S3Connector, S3Settings};
pub use transfer::S3Transfer;

use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 {operation} failed: {message}")]
    S3 {
        operation: &'static str,
        message: String,
    },

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Missing credentials: {0}")]
    Credentials(String),

    #[error("Transfer error: {0}")]
    Transfer(String),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Split a `bucket/key` path into its bucket and key parts.
///
/// `"photos/"` yields `("photos", "")`, `"photos/2024/a.jpg"` yields
/// `("photos", "2024/a.jpg")`.
pub fn split_path(path: &str) -> Result<(&str, &str)> {
    let (bucket, key) = path.split_once('/').unwrap_or((path, ""));
    if bucket.is_empty() {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok((bucket, key))
}

/// Refuse a recursive move into the prefix being moved.
///
/// Copying first and then deleting the source prefix would also delete the
/// new copies.
pub fn check_move_target(src: &str, dst: &str, recursive: bool) -> Result<()> {
    if !recursive || src == dst {
        return Ok(());
    }
    let src_prefix = format!("{}/", src.trim_end_matches('/'));
    if dst.starts_with(&src_prefix) {
        return Err(StoreError::InvalidPath(format!(
            "Cannot move {} into itself ({})",
            src, dst
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_into_own_subtree_is_refused() {
        assert!(matches!(
            check_move_target("bucket/docs/", "bucket/docs/docs/", true),
            Err(StoreError::InvalidPath(_))
        ));
        assert!(check_move_target("bucket/docs/", "bucket/docs/", true).is_ok());
        assert!(check_move_target("bucket/docs/", "bucket/docs-old/", true).is_ok());
        assert!(check_move_target("bucket/docs", "bucket/docs/a", false).is_ok());
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("photos/").unwrap(), ("photos", ""));
        assert_eq!(split_path("photos").unwrap(), ("photos", ""));
        assert_eq!(split_path("photos/2024/a.jpg").unwrap(), ("photos", "2024/a.jpg"));
        assert_eq!(split_path("photos/2024/").unwrap(), ("photos", "2024/"));
    }

    #[test]
    fn test_split_path_rejects_missing_bucket() {
        assert!(matches!(split_path(""), Err(StoreError::InvalidPath(_))));
        assert!(matches!(split_path("/key"), Err(StoreError::InvalidPath(_))));
    }
}
