//! # ss-storage-local
//! Local filesystem implementation of `ObjectStore`.
//! Each bucket is a directory under the root; object paths map to files
//! inside it and are served by the binary under the URL prefix.

use async_trait::async_trait;
use bytes::Bytes;
use ss_core::traits::ObjectStore;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub struct LocalObjectStore {
    /// Root directory holding one sub-directory per bucket (e.g., "./data/storage")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/storage")
    url_prefix: String,
}

impl LocalObjectStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self { root_path: root, url_prefix: url_prefix.trim_end_matches('/').to_string() }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    pub async fn create_bucket(&self, name: &str) -> anyhow::Result<()> {
        let dir = self.bucket_dir(name)?;
        fs::create_dir_all(&dir).await?;
        Ok(())
    }

    fn bucket_dir(&self, bucket: &str) -> anyhow::Result<PathBuf> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
            anyhow::bail!("invalid bucket name: {bucket:?}");
        }
        Ok(self.root_path.join(bucket))
    }

    async fn existing_bucket(&self, bucket: &str) -> anyhow::Result<PathBuf> {
        let dir = self.bucket_dir(bucket)?;
        if !fs::try_exists(&dir).await? {
            anyhow::bail!("bucket not found: {bucket}");
        }
        Ok(dir)
    }
}

/// Rejects absolute paths and `..` so objects stay inside their bucket.
fn object_path(dir: &Path, path: &str) -> anyhow::Result<PathBuf> {
    let relative = Path::new(path);
    if path.is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
        anyhow::bail!("invalid object path: {path:?}");
    }
    Ok(dir.join(relative))
}

/// Every file below `dir`, as `/`-separated paths relative to it.
async fn walk(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
            } else if let Ok(rel) = path.strip_prefix(dir) {
                let parts: Vec<_> = rel.components().map(|c| c.as_os_str().to_string_lossy()).collect();
                found.push(parts.join("/"));
            }
        }
    }
    found.sort();
    Ok(found)
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn list_buckets(&self) -> anyhow::Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = match fs::read_dir(&self.root_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn list_objects(&self, bucket: &str, prefix: &str, limit: usize) -> anyhow::Result<Vec<String>> {
        let dir = self.existing_bucket(bucket).await?;
        Ok(walk(&dir).await?.into_iter().filter(|p| p.starts_with(prefix)).take(limit).collect())
    }

    /// Refuses to overwrite an existing object.
    async fn upload(&self, bucket: &str, path: &str, data: Bytes, _content_type: &str) -> anyhow::Result<String> {
        let dir = self.existing_bucket(bucket).await?;
        let target = object_path(&dir, path)?;
        if fs::try_exists(&target).await? {
            anyhow::bail!("the resource already exists: {bucket}/{path}");
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, &data).await?;
        debug!(bucket, path, bytes = data.len(), "Stored object");
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{}/{}", self.url_prefix, bucket, path)
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> anyhow::Result<()> {
        let dir = self.existing_bucket(bucket).await?;
        for path in paths {
            match fs::remove_file(object_path(&dir, path)?).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> LocalObjectStore {
        LocalObjectStore::new(dir.path().join("storage"), "/storage/".into())
    }

    #[tokio::test]
    async fn missing_root_has_no_buckets() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(&dir).list_buckets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_list_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.create_bucket("items").await.unwrap();
        store.create_bucket("avatars").await.unwrap();
        assert_eq!(store.list_buckets().await.unwrap(), ["avatars", "items"]);

        let stored = store.upload("items", "items/u1-1.png", Bytes::from_static(b"png"), "image/png").await.unwrap();
        assert_eq!(stored, "items/u1-1.png");
        assert_eq!(std::fs::read(store.root().join("items/items/u1-1.png")).unwrap(), b"png");
        assert_eq!(store.public_url("items", &stored), "/storage/items/items/u1-1.png");
        assert_eq!(store.list_objects("items", "items/", 10).await.unwrap(), ["items/u1-1.png"]);

        store.remove("items", &[stored.clone(), "never-there.txt".into()]).await.unwrap();
        assert!(store.list_objects("items", "", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_rejects_duplicates_missing_buckets_and_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.create_bucket("items").await.unwrap();

        store.upload("items", "a.txt", Bytes::from_static(b"1"), "text/plain").await.unwrap();
        assert!(store.upload("items", "a.txt", Bytes::from_static(b"2"), "text/plain").await.is_err());
        assert!(store.upload("avatars", "a.txt", Bytes::from_static(b"1"), "text/plain").await.is_err());
        assert!(store.upload("items", "../escape.txt", Bytes::from_static(b"1"), "text/plain").await.is_err());
        assert!(store.create_bucket("../up").await.is_err());
    }
}
