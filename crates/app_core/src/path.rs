//! Bucket-rooted virtual paths
//!
//! A [`VirtualPath`] names a directory inside one bucket, always in the form
//! `"<bucket>/"` or `"<bucket>/a/b/"`. [`PathResolver`] is the only way to
//! produce one, so every path in a session satisfies that shape.

use crate::AppError;
use app_store::EntryKind;
use std::fmt;

/// A directory path inside the bucket; always ends with `/`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualPath(String);

impl VirtualPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store path of an entry named `name` directly under this directory.
    ///
    /// Directories keep a trailing `/` so that store calls act on the prefix.
    pub fn entry_path(&self, name: &str, kind: EntryKind) -> String {
        match kind {
            EntryKind::Directory => format!("{}{}/", self.0, name),
            EntryKind::File => format!("{}{}", self.0, name),
        }
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VirtualPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolves user input into paths under a fixed bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    bucket: String,
    root: VirtualPath,
}

impl PathResolver {
    pub fn new(bucket: &str) -> Result<Self, AppError> {
        let bucket = bucket.trim().trim_matches('/');
        if bucket.is_empty() || bucket.contains('/') {
            return Err(AppError::Config(format!("invalid bucket name {:?}", bucket)));
        }
        Ok(Self {
            bucket: bucket.to_string(),
            root: VirtualPath(format!("{}/", bucket)),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// `"<bucket>/"`
    pub fn root(&self) -> VirtualPath {
        self.root.clone()
    }

    pub fn is_root(&self, path: &VirtualPath) -> bool {
        *path == self.root
    }

    /// Turn path-bar input into a directory path.
    ///
    /// Anything that does not start with `"<bucket>/"`, or climbs above it,
    /// silently becomes the root. Empty and `.` segments are dropped and `..`
    /// goes up one level.
    pub fn normalize(&self, input: &str) -> VirtualPath {
        let candidate = format!("{}/", input.trim().trim_end_matches('/'));
        let Some(rest) = candidate.strip_prefix(self.root.as_str()) else {
            return self.root();
        };

        let mut segments: Vec<&str> = Vec::new();
        for segment in rest.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return self.root();
                    }
                }
                name => segments.push(name),
            }
        }

        self.from_segments(&segments)
    }

    /// The enclosing directory; the root is its own parent
    pub fn parent(&self, path: &VirtualPath) -> VirtualPath {
        if self.is_root(path) {
            return self.root();
        }
        let trimmed = path.as_str().trim_end_matches('/');
        match trimmed.rsplit_once('/') {
            Some((parent, _)) => VirtualPath(format!("{}/", parent)),
            None => self.root(),
        }
    }

    /// The subdirectory `name` of `path`
    pub fn child(&self, path: &VirtualPath, name: &str) -> Result<VirtualPath, AppError> {
        if name.is_empty() {
            return Err(AppError::InvalidName(name.to_string()));
        }
        Ok(VirtualPath(format!("{}{}/", path.as_str(), name)))
    }

    /// Resolve the destination typed into a copy/move prompt.
    ///
    /// Input without the bucket prefix is taken as relative to the bucket
    /// root, so `"reports"` means `"<bucket>/reports/"`. The result is
    /// cleaned up the same way as [`normalize`](Self::normalize).
    pub fn resolve_target(&self, input: &str) -> VirtualPath {
        let input = input.trim();
        if input.starts_with(self.root.as_str()) {
            return self.normalize(input);
        }
        self.normalize(&format!("{}{}", self.root, input.trim_start_matches('/')))
    }

    fn from_segments(&self, segments: &[&str]) -> VirtualPath {
        if segments.is_empty() {
            return self.root();
        }
        VirtualPath(format!("{}{}/", self.root, segments.join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("bucket").unwrap()
    }

    #[test]
    fn test_normalize_basic() {
        let r = resolver();
        assert_eq!(r.normalize("bucket/docs").as_str(), "bucket/docs/");
        assert_eq!(r.normalize("  bucket/docs///  ").as_str(), "bucket/docs/");
        assert_eq!(r.normalize("bucket").as_str(), "bucket/");
        assert_eq!(r.normalize("bucket/").as_str(), "bucket/");
    }

    #[test]
    fn test_normalize_falls_back_to_root() {
        let r = resolver();
        for input in ["", "/", "   ", "other/docs", "bucketx/docs", "/bucket/docs", "docs"] {
            assert_eq!(r.normalize(input).as_str(), "bucket/", "input {:?}", input);
        }
    }

    #[test]
    fn test_normalize_cleans_segments() {
        let r = resolver();
        assert_eq!(r.normalize("bucket//a///b").as_str(), "bucket/a/b/");
        assert_eq!(r.normalize("bucket/a/./b").as_str(), "bucket/a/b/");
        assert_eq!(r.normalize("bucket/a/b/..").as_str(), "bucket/a/");
        assert_eq!(r.normalize("bucket/a/../..").as_str(), "bucket/");
        assert_eq!(r.normalize("bucket/../other").as_str(), "bucket/");
    }

    #[test]
    fn test_normalize_always_rooted_and_slash_terminated() {
        let r = resolver();
        let inputs = [
            "bucket/x", "x", "", "////", "bucket//", "bucket/../..", " bucket/a b/ ",
            "bucket/a/..", "BUCKET/a", "bucket/.", "bucket/ü/ñ",
        ];
        for input in inputs {
            let path = r.normalize(input);
            assert!(path.as_str().starts_with("bucket/"), "{:?} -> {}", input, path);
            assert!(path.as_str().ends_with('/'), "{:?} -> {}", input, path);
            assert!(!path.as_str().contains("//"), "{:?} -> {}", input, path);
        }
    }

    #[test]
    fn test_parent() {
        let r = resolver();
        assert_eq!(r.parent(&r.normalize("bucket/docs/")).as_str(), "bucket/");
        assert_eq!(r.parent(&r.normalize("bucket/a/b/c")).as_str(), "bucket/a/b/");
        assert_eq!(r.parent(&r.root()).as_str(), "bucket/");
    }

    #[test]
    fn test_parent_of_child_restores_path() {
        let r = resolver();
        for start in ["bucket/", "bucket/docs/", "bucket/a/b/c/"] {
            let path = r.normalize(start);
            let child = r.child(&path, "x").unwrap();
            assert_eq!(r.parent(&child), path);
        }
    }

    #[test]
    fn test_child() {
        let r = resolver();
        let docs = r.child(&r.root(), "docs").unwrap();
        assert_eq!(docs.as_str(), "bucket/docs/");
        assert!(matches!(r.child(&docs, ""), Err(AppError::InvalidName(_))));
    }

    #[test]
    fn test_resolve_target() {
        let r = resolver();
        assert_eq!(r.resolve_target("reports").as_str(), "bucket/reports/");
        assert_eq!(r.resolve_target("reports/2024/").as_str(), "bucket/reports/2024/");
        assert_eq!(r.resolve_target("bucket/docs/").as_str(), "bucket/docs/");
        assert_eq!(r.resolve_target("bucket/docs").as_str(), "bucket/docs/");
        assert_eq!(r.resolve_target("/reports").as_str(), "bucket/reports/");
        assert_eq!(r.resolve_target("").as_str(), "bucket/");
        assert_eq!(r.resolve_target("bucket").as_str(), "bucket/bucket/");
        assert_eq!(r.resolve_target("a//b").as_str(), "bucket/a/b/");
    }

    #[test]
    fn test_entry_path() {
        let r = resolver();
        let docs = r.normalize("bucket/docs");
        assert_eq!(docs.entry_path("a.txt", EntryKind::File), "bucket/docs/a.txt");
        assert_eq!(docs.entry_path("img", EntryKind::Directory), "bucket/docs/img/");
    }

    #[test]
    fn test_bucket_validation() {
        assert!(PathResolver::new("").is_err());
        assert!(PathResolver::new("a/b").is_err());
        assert_eq!(PathResolver::new(" bucket/ ").unwrap().bucket(), "bucket");
    }
}
