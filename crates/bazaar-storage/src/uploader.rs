// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upload service that copies photos into a local media directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use bazaar_config::model::UploadConfig;
use bazaar_core::{Adapter, AdapterType, BazaarError, HealthStatus, UploadService};

/// Stores uploads as `<uuid>.<ext>` files under a media directory and hands
/// back `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalDirUploader {
    media_dir: PathBuf,
    max_bytes: u64,
}

impl LocalDirUploader {
    pub fn new(media_dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            media_dir: media_dir.into(),
            max_bytes,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(&config.media_dir, config.max_upload_bytes)
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }
}

fn upload_error(message: impl Into<String>, source: std::io::Error) -> BazaarError {
    BazaarError::Upload {
        message: message.into(),
        source: Some(Box::new(source)),
    }
}

/// Accepts plain paths and `file://` references.
fn resolve_local_ref(local_ref: &str) -> &Path {
    Path::new(local_ref.strip_prefix("file://").unwrap_or(local_ref))
}

#[async_trait]
impl Adapter for LocalDirUploader {
    fn name(&self) -> &str {
        "local-dir"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Upload
    }

    async fn health_check(&self) -> Result<HealthStatus, BazaarError> {
        match tokio::fs::metadata(&self.media_dir).await {
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a directory",
                self.media_dir.display()
            ))),
            // Created lazily on first upload.
            Err(_) => Ok(HealthStatus::Degraded(format!(
                "{} does not exist yet",
                self.media_dir.display()
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), BazaarError> {
        Ok(())
    }
}

#[async_trait]
impl UploadService for LocalDirUploader {
    async fn upload(&self, local_ref: &str) -> Result<String, BazaarError> {
        let source = resolve_local_ref(local_ref);
        let meta = tokio::fs::metadata(source)
            .await
            .map_err(|e| upload_error(format!("cannot read {}", source.display()), e))?;
        if !meta.is_file() {
            return Err(BazaarError::Upload {
                message: format!("{} is not a file", source.display()),
                source: None,
            });
        }
        if meta.len() > self.max_bytes {
            return Err(BazaarError::Upload {
                message: format!(
                    "{} is {} bytes, limit is {}",
                    source.display(),
                    meta.len(),
                    self.max_bytes
                ),
                source: None,
            });
        }

        tokio::fs::create_dir_all(&self.media_dir)
            .await
            .map_err(|e| upload_error("cannot create media directory", e))?;

        let mut name = uuid::Uuid::new_v4().to_string();
        if let Some(ext) = source.extension().and_then(|e| e.to_str()) {
            name.push('.');
            name.push_str(&ext.to_ascii_lowercase());
        }
        let target = self.media_dir.join(name);
        tokio::fs::copy(source, &target)
            .await
            .map_err(|e| upload_error(format!("cannot copy {}", source.display()), e))?;

        let target = tokio::fs::canonicalize(&target).await.unwrap_or(target);
        debug!(bytes = meta.len(), target = %target.display(), "photo stored");
        Ok(format!("file://{}", target.display()))
    }
}
