//! In-process object store
//!
//! Keeps objects in a sorted map keyed by `bucket/key`, so listings come back
//! in the same lexicographic order S3 uses. Directories exist only as key
//! prefixes, exactly like in S3.

use crate::local::{collect_local_files, local_target};
use crate::{check_move_target, split_path, BulkTransfer, Connector, RawEntry, Result, StoreError, TransferSummary};
use chrono::{DateTime, FixedOffset, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone)]
struct MemoryObject {
    data: Vec<u8>,
    modified: DateTime<FixedOffset>,
}

/// Object store held in memory
#[derive(Debug, Default)]
pub struct MemoryConnector {
    objects: Mutex<BTreeMap<String, MemoryObject>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object with an explicit modification time
    pub fn insert_at(&self, path: &str, data: &[u8], modified: DateTime<FixedOffset>) {
        self.objects.lock().insert(
            path.to_string(),
            MemoryObject {
                data: data.to_vec(),
                modified,
            },
        );
    }

    /// Whether an object exists at exactly `path`
    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().contains_key(path)
    }

    /// Full contents of an object
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().get(path).map(|o| o.data.clone())
    }

    /// All object paths, sorted
    pub fn paths(&self) -> Vec<String> {
        self.objects.lock().keys().cloned().collect()
    }

    fn keys_under(objects: &BTreeMap<String, MemoryObject>, prefix: &str) -> Vec<String> {
        objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

fn dir_prefix(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

impl Connector for MemoryConnector {
    fn list(&self, path: &str) -> Result<Vec<RawEntry>> {
        split_path(path)?;
        let prefix = dir_prefix(path);
        let objects = self.objects.lock();

        let mut entries: Vec<RawEntry> = Vec::new();
        for key in Self::keys_under(&objects, &prefix) {
            let rest = &key[prefix.len()..];
            if rest.is_empty() {
                // Directory marker object
                continue;
            }
            match rest.split_once('/') {
                Some((dir, _)) => {
                    let seen = entries
                        .last()
                        .map_or(false, |last| last.kind.is_dir() && last.name == dir);
                    if !seen {
                        entries.push(RawEntry::directory(dir));
                    }
                }
                None => {
                    let object = &objects[&key];
                    entries.push(RawEntry::file(
                        rest,
                        Some(object.data.len() as u64),
                        Some(object.modified),
                    ));
                }
            }
        }

        tracing::debug!(path, count = entries.len(), "Listed memory store");
        Ok(entries)
    }

    fn read_bytes(&self, path: &str, max_bytes: usize) -> Result<Vec<u8>> {
        let objects = self.objects.lock();
        let object = objects
            .get(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        let end = object.data.len().min(max_bytes);
        Ok(object.data[..end].to_vec())
    }

    fn write_bytes(&self, path: &str, data: &[u8]) -> Result<()> {
        split_path(path)?;
        self.insert_at(path, data, Utc::now().fixed_offset());
        Ok(())
    }

    fn delete(&self, path: &str, recursive: bool) -> Result<()> {
        let mut objects = self.objects.lock();
        if recursive {
            for key in Self::keys_under(&objects, &dir_prefix(path)) {
                objects.remove(&key);
            }
            return Ok(());
        }
        objects.remove(path);
        Ok(())
    }

    fn copy(&self, src: &str, dst: &str, recursive: bool) -> Result<()> {
        split_path(dst)?;
        let mut objects = self.objects.lock();
        if recursive {
            let src_prefix = dir_prefix(src);
            let dst_prefix = dir_prefix(dst);
            for key in Self::keys_under(&objects, &src_prefix) {
                let object = objects[&key].clone();
                let target = format!("{}{}", dst_prefix, &key[src_prefix.len()..]);
                objects.insert(target, object);
            }
            return Ok(());
        }
        let object = objects
            .get(src)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(src.to_string()))?;
        objects.insert(dst.to_string(), object);
        Ok(())
    }

    fn move_to(&self, src: &str, dst: &str, recursive: bool) -> Result<()> {
        if src == dst {
            return Ok(());
        }
        check_move_target(src, dst, recursive)?;
        self.copy(src, dst, recursive)?;
        self.delete(src, recursive)
    }
}

impl BulkTransfer for MemoryConnector {
    fn upload(&self, local_dir: &Path, remote: &str) -> Result<TransferSummary> {
        let prefix = dir_prefix(remote);
        let mut summary = TransferSummary::default();
        for (path, key) in collect_local_files(local_dir)? {
            let data = std::fs::read(&path)?;
            self.write_bytes(&format!("{}{}", prefix, key), &data)?;
            summary.add(data.len() as u64);
        }
        Ok(summary)
    }

    fn download(&self, remote: &str, local: &Path) -> Result<TransferSummary> {
        let mut summary = TransferSummary::default();

        if !remote.ends_with('/') {
            let data = self
                .get(remote)
                .ok_or_else(|| StoreError::NotFound(remote.to_string()))?;
            if let Some(parent) = local.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(local, &data)?;
            summary.add(data.len() as u64);
            return Ok(summary);
        }

        let snapshot: Vec<(String, Vec<u8>)> = {
            let objects = self.objects.lock();
            Self::keys_under(&objects, remote)
                .into_iter()
                .filter(|key| !key.ends_with('/'))
                .map(|key| {
                    let data = objects[&key].data.clone();
                    (key, data)
                })
                .collect()
        };

        std::fs::create_dir_all(local)?;
        for (key, data) in snapshot {
            let target = local_target(local, &key[remote.len()..])?;
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, &data)?;
            summary.add(data.len() as u64);
        }
        Ok(summary)
    }
}
