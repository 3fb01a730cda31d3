use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-value blob store, one JSON document per key. Keys are already
/// namespaced by the caller (`{prefix}:{identity}:profile` etc).
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// File-backed store: one file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // keys contain ':' separators; flatten to a safe file name
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        tokio::fs::write(self.path_for(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path()).await.unwrap();

        assert_eq!(store.get("platelog:alice:profile").await.unwrap(), None);

        store
            .put("platelog:alice:profile", r#"{"identity":"alice"}"#)
            .await
            .unwrap();
        let got = store.get("platelog:alice:profile").await.unwrap();
        assert_eq!(got.as_deref(), Some(r#"{"identity":"alice"}"#));

        store.remove("platelog:alice:profile").await.unwrap();
        assert_eq!(store.get("platelog:alice:profile").await.unwrap(), None);
        // removing an absent key is fine
        store.remove("platelog:alice:profile").await.unwrap();
    }

    #[tokio::test]
    async fn test_keys_do_not_collide_across_identities() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path()).await.unwrap();

        store.put("platelog:a:meals", "[1]").await.unwrap();
        store.put("platelog:b:meals", "[2]").await.unwrap();

        assert_eq!(store.get("platelog:a:meals").await.unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.get("platelog:b:meals").await.unwrap().as_deref(), Some("[2]"));
    }
}
