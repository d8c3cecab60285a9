//! Browsing session record

use crate::listing::{Entry, Row};
use crate::path::{PathResolver, VirtualPath};
use app_store::EntryKind;

/// Where the user is and what they have selected.
///
/// A session is never changed in place by the dispatcher: every intent hands
/// back a new record, and the caller decides which one to keep.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    resolver: PathResolver,
    path: VirtualPath,
    entries: Vec<Entry>,
    selection: Option<Entry>,
}

impl Session {
    /// A session at the bucket root with nothing listed yet
    pub fn new(resolver: PathResolver) -> Self {
        let path = resolver.root();
        Self {
            resolver,
            path,
            entries: Vec::new(),
            selection: None,
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn path(&self) -> &VirtualPath {
        &self.path
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn selection(&self) -> Option<&Entry> {
        self.selection.as_ref()
    }

    pub fn rows(&self) -> Vec<Row> {
        self.entries.iter().map(Entry::row).collect()
    }

    /// Select the listed entry called `name`, or clear the selection if
    /// there is none.
    ///
    /// A key and a prefix may share a name. `"name/"` picks the directory;
    /// a bare name picks the file when there is one.
    pub fn select(mut self, name: &str) -> Self {
        let entries = &self.entries;
        let find = |wanted: &str, kind: Option<EntryKind>| -> Option<Entry> {
            entries
                .iter()
                .find(|entry| entry.name == wanted && kind.map_or(true, |k| entry.kind == Some(k)))
                .cloned()
        };
        let found = match name.strip_suffix('/') {
            Some(dir) if !dir.is_empty() => find(dir, Some(EntryKind::Directory)),
            _ => find(name, Some(EntryKind::File)).or_else(|| find(name, None)),
        };
        self.selection = found;
        self
    }

    pub fn deselect(mut self) -> Self {
        self.selection = None;
        self
    }

    /// Replace the path and listing; the selection does not survive
    pub(crate) fn listed(self, path: VirtualPath, entries: Vec<Entry>) -> Self {
        Self {
            resolver: self.resolver,
            path,
            entries,
            selection: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_store::RawEntry;

    fn session() -> Session {
        let resolver = PathResolver::new("bucket").unwrap();
        let path = resolver.root();
        let entries = vec![
            Entry::classify(RawEntry::directory("docs")),
            Entry::classify(RawEntry::file("a.txt", Some(3), None)),
        ];
        Session::new(resolver).listed(path, entries)
    }

    #[test]
    fn test_new_session_starts_at_root() {
        let session = Session::new(PathResolver::new("bucket").unwrap());
        assert_eq!(session.path().as_str(), "bucket/");
        assert!(session.entries().is_empty());
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_select_known_and_unknown() {
        let selected = session().select("a.txt");
        assert_eq!(selected.selection().map(|e| e.name.as_str()), Some("a.txt"));

        let missing = selected.select("nope");
        assert!(missing.selection().is_none());
    }

    #[test]
    fn test_select_file_and_directory_with_same_name() {
        let resolver = PathResolver::new("bucket").unwrap();
        let path = resolver.root();
        let entries = vec![
            Entry::classify(RawEntry::directory("docs")),
            Entry::classify(RawEntry::file("docs", Some(3), None)),
        ];
        let session = Session::new(resolver).listed(path, entries);

        let file = session.clone().select("docs");
        assert_eq!(file.selection().and_then(|e| e.kind), Some(EntryKind::File));

        let dir = session.clone().select("docs/");
        assert!(dir.selection().map_or(false, Entry::is_dir));

        assert!(session.select("a.txt/").selection().is_none());
    }

    #[test]
    fn test_bare_name_still_finds_directory() {
        let dir = session().select("docs");
        assert!(dir.selection().map_or(false, Entry::is_dir));
    }

    #[test]
    fn test_listing_clears_selection() {
        let before = session().select("docs");
        let resolver = before.resolver().clone();
        let after = before.clone().listed(resolver.normalize("bucket/docs"), Vec::new());
        assert!(after.selection().is_none());
        assert_eq!(before.path().as_str(), "bucket/");
        assert_eq!(after.path().as_str(), "bucket/docs/");
    }
}
