//! One-shot bulk transfers between a local directory and an S3 prefix

use crate::local::{collect_local_files, local_target};
use crate::s3::{list_all_keys, sdk_error};
use crate::{split_path, BulkTransfer, Result, S3Settings, StoreError, TransferSummary};
use aws_sdk_s3::{primitives::ByteStream, Client};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};

const DEFAULT_CONCURRENCY: usize = 8;

/// Bulk transfer utility.
///
/// Every call builds its own runtime and client, runs the whole transfer and
/// tears both down again; nothing outlives the call.
#[derive(Debug, Clone)]
pub struct S3Transfer {
    settings: S3Settings,
    concurrency: usize,
}

impl S3Transfer {
    pub fn new(settings: S3Settings) -> Self {
        Self {
            settings,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Maximum number of objects in flight at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    fn one_shot(&self) -> Result<(tokio::runtime::Runtime, Client)> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.concurrency.min(4))
            .enable_all()
            .build()?;
        let client = self.settings.build_client()?;
        Ok((runtime, client))
    }
}

async fn upload_file(client: &Client, bucket: &str, key: &str, local_path: &Path) -> Result<u64> {
    let size = tokio::fs::metadata(local_path).await?.len();
    let body = ByteStream::from_path(local_path.to_path_buf())
        .await
        .map_err(|err| {
            StoreError::Transfer(format!("Failed to stream {}: {}", local_path.display(), err))
        })?;

    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(body)
        .send()
        .await
        .map_err(|err| sdk_error("PutObject", err))?;

    tracing::debug!(key, size, "Uploaded");
    Ok(size)
}

async fn download_file(client: &Client, bucket: &str, key: &str, local_path: &Path) -> Result<u64> {
    if let Some(parent) = local_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let output = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|err| sdk_error("GetObject", err))?;

    let file = tokio::fs::File::create(local_path).await?;
    let mut writer = BufWriter::new(file);
    let mut body = output.body;
    let mut written: u64 = 0;

    while let Some(bytes) = body
        .try_next()
        .await
        .map_err(|err| StoreError::Transfer(format!("Download stream failed: {}", err)))?
    {
        writer.write_all(&bytes).await?;
        written += bytes.len() as u64;
    }
    writer.flush().await?;

    tracing::debug!(key, size = written, "Downloaded");
    Ok(written)
}

fn join_key(prefix: &str, relative: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        format!("{}{}", prefix, relative)
    } else {
        format!("{}/{}", prefix, relative)
    }
}

impl S3Transfer {
    async fn upload_all(
        &self,
        client: &Client,
        bucket: &str,
        prefix: &str,
        files: Vec<(PathBuf, String)>,
    ) -> Result<Vec<u64>> {
        stream::iter(files)
            .map(|(path, relative)| {
                let key = join_key(prefix, &relative);
                async move { upload_file(client, bucket, &key, &path).await }
            })
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await
    }

    async fn download_all(
        &self,
        client: &Client,
        bucket: &str,
        key: &str,
        local: &Path,
    ) -> Result<Vec<u64>> {
        if !key.is_empty() && !key.ends_with('/') {
            let size = download_file(client, bucket, key, local).await?;
            return Ok(vec![size]);
        }

        let targets = list_all_keys(client, bucket, key)
            .await?
            .into_iter()
            .filter(|(object_key, _)| !object_key.ends_with('/'))
            .map(|(object_key, _)| {
                let target = local_target(local, &object_key[key.len()..])?;
                Ok((object_key, target))
            })
            .collect::<Result<Vec<(String, PathBuf)>>>()?;

        tokio::fs::create_dir_all(local).await?;
        tracing::info!(key, local = %local.display(), files = targets.len(), "Download started");

        stream::iter(targets)
            .map(|(object_key, target)| async move {
                download_file(client, bucket, &object_key, &target).await
            })
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await
    }
}

fn summarize(sizes: Vec<u64>) -> TransferSummary {
    let mut summary = TransferSummary::default();
    sizes.into_iter().for_each(|size| summary.add(size));
    summary
}

impl BulkTransfer for S3Transfer {
    fn upload(&self, local_dir: &Path, remote: &str) -> Result<TransferSummary> {
        let (bucket, prefix) = split_path(remote)?;
        let files = collect_local_files(local_dir)?;
        let (runtime, client) = self.one_shot()?;

        tracing::info!(
            local = %local_dir.display(),
            remote,
            files = files.len(),
            "Upload started"
        );

        let sizes = runtime.block_on(self.upload_all(&client, bucket, prefix, files))?;
        let summary = summarize(sizes);
        tracing::info!(remote, files = summary.files, bytes = summary.bytes, "Upload finished");
        Ok(summary)
    }

    fn download(&self, remote: &str, local: &Path) -> Result<TransferSummary> {
        let (bucket, key) = split_path(remote)?;
        let (runtime, client) = self.one_shot()?;

        let sizes = runtime.block_on(self.download_all(&client, bucket, key, local))?;
        let summary = summarize(sizes);
        tracing::info!(remote, files = summary.files, bytes = summary.bytes, "Download finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_key() {
        assert_eq!(join_key("", "a.txt"), "a.txt");
        assert_eq!(join_key("photos/", "2024/a.jpg"), "photos/2024/a.jpg");
        assert_eq!(join_key("photos", "a.jpg"), "photos/a.jpg");
    }

    #[test]
    fn test_concurrency_never_zero() {
        let transfer = S3Transfer::new(S3Settings::default()).with_concurrency(0);
        assert_eq!(transfer.concurrency, 1);
    }

    #[test]
    fn test_upload_requires_local_directory() {
        let transfer = S3Transfer::new(S3Settings::default());
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let result = transfer.upload(&missing, "bucket/dst/");
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    }

    #[test]
    fn test_upload_without_credentials_fails_before_network() {
        let transfer = S3Transfer::new(S3Settings::default());
        let dir = tempfile::tempdir().unwrap();
        let result = transfer.upload(dir.path(), "bucket/dst/");
        assert!(matches!(result, Err(StoreError::Credentials(_))));
    }
}
