//! Object storage for synthesized audio.
//!
//! `SupabaseStorage` uploads to a public Supabase Storage bucket.
//! `LocalStorage` writes under a local directory and hands out `file://`
//! URLs, which is enough for single-machine use and for tests.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;

use super::ObjectStore;

/// Supabase Storage REST client
pub struct SupabaseStorage {
    base_url: String,
    service_role: String,
    bucket: String,
    client: reqwest::Client,
}

impl SupabaseStorage {
    pub fn new(base_url: impl Into<String>, service_role: String, bucket: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_role,
            bucket: bucket.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from SUPABASE_URL and SUPABASE_SERVICE_ROLE
    pub fn from_env(bucket: impl Into<String>) -> Result<Self> {
        let base_url = crate::config::secret("SUPABASE_URL")?;
        let service_role = crate::config::secret("SUPABASE_SERVICE_ROLE")?;
        Ok(Self::new(base_url, service_role, bucket))
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }

    /// Public URL for an object in the bucket
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    fn name(&self) -> &str {
        "supabase-storage"
    }

    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let response = self
            .client
            .post(self.object_url(key))
            .bearer_auth(&self.service_role)
            .header("apikey", &self.service_role)
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("Failed to upload {}", key))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Supabase upload error ({}): {}", status, body.trim());
        }

        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.object_url(key))
            .bearer_auth(&self.service_role)
            .header("apikey", &self.service_role)
            .send()
            .await
            .with_context(|| format!("Failed to delete {}", key))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Supabase delete error ({}): {}", status, body.trim());
        }

        Ok(())
    }
}

/// Directory-backed object store
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key below the root, rejecting keys that escape it
    fn object_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.starts_with('/') || key.split('/').any(|part| part == "..") {
            anyhow::bail!("Invalid object key: {}", key);
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalStorage {
    fn name(&self) -> &str {
        "local-storage"
    }

    async fn upload(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(format!("file://{}", path.display()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.object_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }
}
