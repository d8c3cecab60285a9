//! Listing entries and their display rows

use crate::path::{PathResolver, VirtualPath};
use app_store::{EntryKind, RawEntry};
use chrono::{DateTime, FixedOffset};

/// Shown in place of an absent value
pub const PLACEHOLDER: &str = "--";

/// Name of the synthetic row that leads to the enclosing directory
pub const PARENT_NAME: &str = "..";

const SIZE_UNITS: [&str; 8] = ["kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// One row of the current directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub size: Option<u64>,
    /// `None` only for the parent row
    pub kind: Option<EntryKind>,
    pub modified: Option<DateTime<FixedOffset>>,
}

impl Entry {
    /// The `..` row
    pub fn parent() -> Self {
        Self {
            name: PARENT_NAME.to_string(),
            size: None,
            kind: None,
            modified: None,
        }
    }

    pub fn classify(raw: RawEntry) -> Self {
        Self {
            name: raw.name,
            size: raw.size,
            kind: Some(raw.kind),
            modified: raw.modified,
        }
    }

    pub fn is_parent(&self) -> bool {
        self.kind.is_none()
    }

    pub fn is_dir(&self) -> bool {
        self.kind == Some(EntryKind::Directory)
    }

    pub fn row(&self) -> Row {
        Row {
            name: self.name.clone(),
            size: display_size(self.size),
            kind: display_kind(self.kind).to_string(),
            modified: display_timestamp(self.modified.as_ref()),
        }
    }
}

/// Display strings for one entry, in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub name: String,
    pub size: String,
    pub kind: String,
    pub modified: String,
}

impl Row {
    pub const HEADERS: [&'static str; 4] = ["Name", "Size", "Type", "Last modified"];

    pub fn cells(&self) -> [&str; 4] {
        [&self.name, &self.size, &self.kind, &self.modified]
    }
}

/// Human-readable size in decimal units: `1 Byte`, `999 Bytes`, `1.0 kB`
pub fn display_size(size: Option<u64>) -> String {
    let Some(bytes) = size else {
        return PLACEHOLDER.to_string();
    };
    match bytes {
        1 => "1 Byte".to_string(),
        0..=999 => format!("{} Bytes", bytes),
        _ => {
            let value = bytes as f64;
            let mut scale = 1.0_f64;
            let mut suffix = SIZE_UNITS[0];
            for unit in SIZE_UNITS {
                scale *= 1000.0;
                suffix = unit;
                if value < scale * 1000.0 {
                    break;
                }
            }
            format!("{:.1} {}", value / scale, suffix)
        }
    }
}

/// `DD.MM.YYYY, HH:MM` in the timestamp's own offset
pub fn display_timestamp(modified: Option<&DateTime<FixedOffset>>) -> String {
    match modified {
        Some(ts) => ts.format("%d.%m.%Y, %H:%M").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn display_kind(kind: Option<EntryKind>) -> &'static str {
    match kind {
        Some(EntryKind::Directory) => "directory",
        Some(EntryKind::File) => "file",
        None => PLACEHOLDER,
    }
}

/// Directories before files; the store's order is kept within each kind
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by_key(|entry| entry.kind);
}

/// Turn a raw listing of `path` into display entries.
///
/// Below the root the `..` row comes first.
pub fn build_listing(resolver: &PathResolver, path: &VirtualPath, raw: Vec<RawEntry>) -> Vec<Entry> {
    let mut entries: Vec<Entry> = raw.into_iter().map(Entry::classify).collect();
    sort_entries(&mut entries);

    if resolver.is_root(path) {
        return entries;
    }
    let mut listing = Vec::with_capacity(entries.len() + 1);
    listing.push(Entry::parent());
    listing.extend(entries);
    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_size_small_values() {
        assert_eq!(display_size(None), "--");
        assert_eq!(display_size(Some(0)), "0 Bytes");
        assert_eq!(display_size(Some(1)), "1 Byte");
        assert_eq!(display_size(Some(999)), "999 Bytes");
    }

    #[test]
    fn test_display_size_decimal_units() {
        assert_eq!(display_size(Some(1000)), "1.0 kB");
        assert_eq!(display_size(Some(1500)), "1.5 kB");
        assert_eq!(display_size(Some(1_500_000)), "1.5 MB");
        assert_eq!(display_size(Some(3_000_000_000)), "3.0 GB");
        assert_eq!(display_size(Some(u64::MAX)), "18.4 EB");
    }

    #[test]
    fn test_display_timestamp_keeps_offset() {
        let ts = FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2023, 12, 31, 23, 59, 30)
            .unwrap();
        assert_eq!(display_timestamp(Some(&ts)), "31.12.2023, 23:59");
        assert_eq!(display_timestamp(None), "--");
    }

    #[test]
    fn test_parent_row_only_from_constructor() {
        let parent = Entry::parent();
        assert!(parent.is_parent());
        assert_eq!(parent.kind, None);

        let raw = Entry::classify(RawEntry::directory(".."));
        assert!(!raw.is_parent());
        assert_eq!(raw.kind, Some(EntryKind::Directory));

        assert_eq!(
            parent.row(),
            Row {
                name: "..".into(),
                size: "--".into(),
                kind: "--".into(),
                modified: "--".into(),
            }
        );
    }

    #[test]
    fn test_sort_is_by_kind_only_and_stable() {
        let raw = vec![
            RawEntry::file("b.txt", Some(1), None),
            RawEntry::directory("zeta"),
            RawEntry::file("a.txt", Some(2), None),
            RawEntry::directory("alpha"),
        ];
        let resolver = PathResolver::new("bucket").unwrap();
        let names: Vec<String> = build_listing(&resolver, &resolver.root(), raw)
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "b.txt", "a.txt"]);
    }

    #[test]
    fn test_parent_row_below_root() {
        let resolver = PathResolver::new("bucket").unwrap();
        let docs = resolver.normalize("bucket/docs");
        let raw = vec![RawEntry::file("a.txt", Some(5), None)];

        let listing = build_listing(&resolver, &docs, raw.clone());
        assert!(listing[0].is_parent());
        assert_eq!(listing.len(), 2);

        let at_root = build_listing(&resolver, &resolver.root(), raw);
        assert!(at_root.iter().all(|entry| !entry.is_parent()));
    }

    #[test]
    fn test_file_row() {
        let ts = FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 7, 9, 5, 0)
            .unwrap();
        let row = Entry::classify(RawEntry::file("a.txt", Some(1000), Some(ts))).row();
        assert_eq!(row.cells(), ["a.txt", "1.0 kB", "file", "07.03.2024, 09:05"]);
    }
}
