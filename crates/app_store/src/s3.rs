//! S3-compatible connector backed by aws-sdk-s3

use crate::{check_move_target, split_path, Connector, RawEntry, Result, StoreError};
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::{ByteStream, DateTime as S3DateTime},
    types::{Delete, ObjectIdentifier},
    Client,
};
use chrono::{DateTime, FixedOffset};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::runtime::Runtime;

const DEFAULT_REGION: &str = "us-east-1";
const COPY_SOURCE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'/');
const DELETE_BATCH_SIZE: usize = 1000;

/// Endpoint and credentials for an S3-compatible service
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Settings {
    /// Custom endpoint (MinIO, Ceph, ...); AWS when absent
    pub endpoint_url: Option<String>,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    /// Path-style addressing; defaults to on for custom endpoints
    pub force_path_style: Option<bool>,
}

impl Default for S3Settings {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            region: DEFAULT_REGION.to_string(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            session_token: None,
            force_path_style: None,
        }
    }
}

impl fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Settings")
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

impl S3Settings {
    fn endpoint(&self) -> Option<&str> {
        self.endpoint_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn path_style(&self) -> bool {
        self.force_path_style.unwrap_or_else(|| self.endpoint().is_some())
    }

    /// Build an SDK client from these settings
    pub fn build_client(&self) -> Result<Client> {
        if self.access_key_id.trim().is_empty() || self.secret_access_key.trim().is_empty() {
            return Err(StoreError::Credentials(
                "access_key_id and secret_access_key are required".to_string(),
            ));
        }

        let region = Some(self.region.trim())
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_REGION);

        let credentials = Credentials::new(
            self.access_key_id.clone(),
            self.secret_access_key.clone(),
            self.session_token.clone(),
            None,
            "s3browser",
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version_latest()
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .force_path_style(self.path_style());

        if let Some(endpoint) = self.endpoint() {
            builder = builder.endpoint_url(endpoint.to_string());
        }

        Ok(Client::from_conf(builder.build()))
    }
}

pub(crate) fn sdk_error<E: std::error::Error>(operation: &'static str, err: E) -> StoreError {
    StoreError::S3 {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}

pub(crate) fn to_chrono(dt: &S3DateTime) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()).map(|utc| utc.fixed_offset())
}

fn as_prefix(key: &str) -> String {
    if key.is_empty() || key.ends_with('/') {
        key.to_string()
    } else {
        format!("{}/", key)
    }
}

/// Every object under `prefix` with its size, following continuation tokens
pub(crate) async fn list_all_keys(
    client: &Client,
    bucket: &str,
    prefix: &str,
) -> Result<Vec<(String, u64)>> {
    let mut continuation_token: Option<String> = None;
    let mut keys = Vec::new();

    loop {
        let mut request = client
            .list_objects_v2()
            .bucket(bucket)
            .max_keys(1000)
            .prefix(prefix);

        if let Some(token) = continuation_token.take() {
            request = request.continuation_token(token);
        }

        let output = request
            .send()
            .await
            .map_err(|err| sdk_error("ListObjectsV2", err))?;

        for object in output.contents() {
            if let Some(key) = object.key() {
                keys.push((key.to_string(), object.size().unwrap_or(0).max(0) as u64));
            }
        }

        continuation_token = output.next_continuation_token().map(str::to_string);
        if !output.is_truncated().unwrap_or(false) || continuation_token.is_none() {
            break;
        }
    }

    Ok(keys)
}

/// Blocking connector: each call drives its request on a private
/// current-thread runtime.
pub struct S3Connector {
    client: Client,
    runtime: Runtime,
}

impl S3Connector {
    pub fn new(settings: &S3Settings) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let client = settings.build_client()?;
        tracing::info!(
            endpoint = settings.endpoint().unwrap_or("aws"),
            region = %settings.region,
            "S3 connector ready"
        );
        Ok(Self { client, runtime })
    }

    async fn list_dir(&self, bucket: &str, prefix: &str) -> Result<Vec<RawEntry>> {
        let mut continuation_token: Option<String> = None;
        let mut entries = Vec::new();

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .delimiter("/")
                .prefix(prefix);

            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let output = request
                .send()
                .await
                .map_err(|err| sdk_error("ListObjectsV2", err))?;

            for common in output.common_prefixes() {
                let name = common
                    .prefix()
                    .and_then(|p| p.strip_prefix(prefix))
                    .map(|p| p.trim_end_matches('/'))
                    .filter(|name| !name.is_empty());
                if let Some(name) = name {
                    entries.push(RawEntry::directory(name));
                }
            }

            for object in output.contents() {
                let name = object
                    .key()
                    .and_then(|key| key.strip_prefix(prefix))
                    .filter(|name| !name.is_empty());
                // The prefix itself comes back as a directory marker
                let Some(name) = name else { continue };
                entries.push(RawEntry::file(
                    name,
                    object.size().map(|size| size.max(0) as u64),
                    object.last_modified().and_then(to_chrono),
                ));
            }

            continuation_token = output.next_continuation_token().map(str::to_string);
            if !output.is_truncated().unwrap_or(false) || continuation_token.is_none() {
                break;
            }
        }

        Ok(entries)
    }

    async fn read_head(&self, bucket: &str, key: &str, max_bytes: usize) -> Result<Vec<u8>> {
        if max_bytes == 0 {
            return Ok(Vec::new());
        }

        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .range(format!("bytes=0-{}", max_bytes - 1));

        let output = match request.send().await {
            Ok(output) => output,
            // An empty object has no satisfiable range
            Err(err) if err.raw_response().map(|r| r.status().as_u16()) == Some(416) => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(sdk_error("GetObject", err)),
        };

        let mut bytes = output
            .body
            .collect()
            .await
            .map_err(|err| sdk_error("GetObject", err))?
            .to_vec();
        // Some S3-compatible servers ignore the Range header
        bytes.truncate(max_bytes);
        Ok(bytes)
    }

    async fn delete_keys(&self, bucket: &str, keys: &[String]) -> Result<()> {
        for batch in keys.chunks(DELETE_BATCH_SIZE) {
            let mut objects = Vec::with_capacity(batch.len());
            for key in batch {
                let object = ObjectIdentifier::builder()
                    .key(key.clone())
                    .build()
                    .map_err(|err| sdk_error("DeleteObjects", err))?;
                objects.push(object);
            }

            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|err| sdk_error("DeleteObjects", err))?;

            let output = self
                .client
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|err| sdk_error("DeleteObjects", err))?;

            if let Some(failed) = output.errors().first() {
                return Err(StoreError::S3 {
                    operation: "DeleteObjects",
                    message: format!(
                        "{} failed to delete: {}",
                        failed.key().unwrap_or("<unknown key>"),
                        failed.message().unwrap_or("no message")
                    ),
                });
            }
        }
        Ok(())
    }

    async fn copy_key(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<()> {
        let copy_source = format!(
            "{}/{}",
            src_bucket,
            utf8_percent_encode(src_key, COPY_SOURCE_ENCODE_SET)
        );

        self.client
            .copy_object()
            .bucket(dst_bucket)
            .key(dst_key)
            .copy_source(copy_source)
            .send()
            .await
            .map_err(|err| sdk_error("CopyObject", err))?;
        Ok(())
    }

    /// Copy `src` to `dst` and return the source keys that were copied
    async fn copy_async(&self, src: &str, dst: &str, recursive: bool) -> Result<Vec<String>> {
        let (src_bucket, src_key) = split_path(src)?;
        let (dst_bucket, dst_key) = split_path(dst)?;

        if !recursive {
            self.copy_key(src_bucket, src_key, dst_bucket, dst_key).await?;
            return Ok(vec![src_key.to_string()]);
        }

        let src_prefix = as_prefix(src_key);
        let dst_prefix = as_prefix(dst_key);
        let keys: Vec<String> = list_all_keys(&self.client, src_bucket, &src_prefix)
            .await?
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        for key in &keys {
            let target = format!("{}{}", dst_prefix, &key[src_prefix.len()..]);
            self.copy_key(src_bucket, key, dst_bucket, &target).await?;
        }
        tracing::debug!(src, dst, objects = keys.len(), "Copied prefix");
        Ok(keys)
    }

    async fn delete_async(&self, path: &str, recursive: bool) -> Result<()> {
        let (bucket, key) = split_path(path)?;

        if !recursive {
            self.client
                .delete_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|err| sdk_error("DeleteObject", err))?;
            return Ok(());
        }

        let keys: Vec<String> = list_all_keys(&self.client, bucket, &as_prefix(key))
            .await?
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        self.delete_keys(bucket, &keys).await?;
        tracing::debug!(path, objects = keys.len(), "Deleted prefix");
        Ok(())
    }
}

impl Connector for S3Connector {
    fn list(&self, path: &str) -> Result<Vec<RawEntry>> {
        let (bucket, key) = split_path(path)?;
        let prefix = as_prefix(key);
        let entries = self.runtime.block_on(self.list_dir(bucket, &prefix))?;
        tracing::debug!(path, count = entries.len(), "Listed prefix");
        Ok(entries)
    }

    fn read_bytes(&self, path: &str, max_bytes: usize) -> Result<Vec<u8>> {
        let (bucket, key) = split_path(path)?;
        self.runtime.block_on(self.read_head(bucket, key, max_bytes))
    }

    fn write_bytes(&self, path: &str, data: &[u8]) -> Result<()> {
        let (bucket, key) = split_path(path)?;
        self.runtime.block_on(async {
            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(ByteStream::from(data.to_vec()))
                .send()
                .await
                .map_err(|err| sdk_error("PutObject", err))
        })?;
        Ok(())
    }

    fn delete(&self, path: &str, recursive: bool) -> Result<()> {
        self.runtime.block_on(self.delete_async(path, recursive))
    }

    fn copy(&self, src: &str, dst: &str, recursive: bool) -> Result<()> {
        self.runtime.block_on(self.copy_async(src, dst, recursive))?;
        Ok(())
    }

    fn move_to(&self, src: &str, dst: &str, recursive: bool) -> Result<()> {
        if src == dst {
            tracing::debug!(src, "Move onto itself skipped");
            return Ok(());
        }
        check_move_target(src, dst, recursive)?;
        let (bucket, _) = split_path(src)?;
        self.runtime.block_on(async {
            let copied = self.copy_async(src, dst, recursive).await?;
            // Only what was copied; objects created meanwhile stay
            self.delete_keys(bucket, &copied).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_rejected() {
        let settings = S3Settings::default();
        assert!(matches!(settings.build_client(), Err(StoreError::Credentials(_))));
    }

    #[test]
    fn test_path_style_follows_endpoint() {
        let mut settings = S3Settings::default();
        assert!(!settings.path_style());

        settings.endpoint_url = Some("http://localhost:9000".into());
        assert!(settings.path_style());

        settings.force_path_style = Some(false);
        assert!(!settings.path_style());

        settings.endpoint_url = Some("   ".into());
        settings.force_path_style = None;
        assert!(!settings.path_style());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let settings = S3Settings {
            access_key_id: "AKIA".into(),
            secret_access_key: "hunter2".into(),
            session_token: Some("token".into()),
            ..Default::default()
        };
        let printed = format!("{:?}", settings);
        assert!(printed.contains("AKIA"));
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("\"token\""));
    }

    #[test]
    fn test_as_prefix() {
        assert_eq!(as_prefix(""), "");
        assert_eq!(as_prefix("docs"), "docs/");
        assert_eq!(as_prefix("docs/"), "docs/");
    }

    #[test]
    fn test_copy_source_encoding_keeps_slashes() {
        let encoded = utf8_percent_encode("dir/my file+1.txt", COPY_SOURCE_ENCODE_SET).to_string();
        assert_eq!(encoded, "dir/my%20file%2B1%2Etxt");
    }

    #[test]
    fn test_to_chrono_keeps_utc() {
        let dt = S3DateTime::from_secs(1_700_000_000);
        let converted = to_chrono(&dt).unwrap();
        assert_eq!(converted.timestamp(), 1_700_000_000);
        assert_eq!(converted.offset().local_minus_utc(), 0);
    }
}
