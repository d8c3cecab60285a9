//! Raw listing entries as returned by a connector

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Kind of a listing entry.
///
/// The declaration order is the listing order: directories sort before files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "dir")]
    Directory,
    #[serde(rename = "file")]
    File,
}

impl EntryKind {
    pub fn is_dir(self) -> bool {
        self == EntryKind::Directory
    }
}

/// One object or common prefix directly under a listed path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    /// Last path segment, without slashes
    pub name: String,

    /// Object size in bytes; `None` for directories
    pub size: Option<u64>,

    pub kind: EntryKind,

    /// Last modification time; `None` for directories
    pub modified: Option<DateTime<FixedOffset>>,
}

impl RawEntry {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            kind: EntryKind::Directory,
            modified: None,
        }
    }

    pub fn file(
        name: impl Into<String>,
        size: Option<u64>,
        modified: Option<DateTime<FixedOffset>>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            kind: EntryKind::File,
            modified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directories_order_before_files() {
        assert!(EntryKind::Directory < EntryKind::File);
        assert!(EntryKind::Directory.is_dir());
        assert!(!EntryKind::File.is_dir());
    }
}
