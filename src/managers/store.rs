use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::api::schema::document::Document;
use crate::error::CoreError;

/// Owner of the persisted document. Every mutation goes through [`update`],
/// which serializes the whole load→mutate→save cycle behind one mutex so two
/// in-flight commands can never overwrite each other's writes.
///
/// [`update`]: DocumentStore::update
pub struct DocumentStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Deserialize the current document. A missing file yields an empty
    /// document; a corrupt file is replaced with a fresh empty one rather
    /// than failing the caller.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Document {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("no data file yet ({err}), starting empty");
                return Document::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(doc) => doc,
            Err(err) => {
                warn!("data file is corrupt ({err}), reinitializing");
                let fresh = Document::default();
                if let Err(err) = self.persist(&fresh).await {
                    warn!("could not rewrite corrupt data file: {err}");
                }
                fresh
            }
        }
    }

    /// Read-only snapshot access. No lock is taken: saves replace the file
    /// atomically, so a plain load always sees a complete document.
    pub async fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> T {
        f(&self.load().await)
    }

    /// One serialized load→mutate→save transaction. The document is persisted
    /// only when `f` succeeds; a domain-rule rejection leaves the previous
    /// version on disk untouched.
    pub async fn update<T>(
        &self,
        f: impl FnOnce(&mut Document) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await;
        let out = f(&mut doc)?;
        self.persist(&doc).await?;
        Ok(out)
    }

    /// Atomic replacement: write a sibling temp file, then rename it over the
    /// target. A reader never observes a half-written document, and a failed
    /// write leaves the previous version intact.
    async fn persist(&self, doc: &Document) -> Result<(), CoreError> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> DocumentStore {
        DocumentStore::new(dir.path().join("data.json"))
    }

    #[tokio::test]
    async fn missing_file_loads_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let doc = store.load().await;
        assert_eq!(doc, Document::default());
    }

    #[tokio::test]
    async fn update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .update(|doc| {
                doc.account_mut("g1", "u1").balance = 300;
                Ok(())
            })
            .await
            .unwrap();

        let doc = store.load().await;
        assert_eq!(doc.economy["g1"]["u1"].balance, 300);
    }

    #[tokio::test]
    async fn corrupt_file_is_reinitialized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = DocumentStore::new(&path);
        assert_eq!(store.load().await, Document::default());

        // the recovery pass rewrote a well-formed file
        let rewritten = std::fs::read(&path).unwrap();
        assert!(serde_json::from_slice::<Document>(&rewritten).is_ok());
    }

    #[tokio::test]
    async fn rejected_transaction_leaves_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .update(|doc| {
                doc.account_mut("g1", "u1").balance = 100;
                Ok(())
            })
            .await
            .unwrap();

        let res: Result<(), CoreError> = store
            .update(|doc| {
                doc.account_mut("g1", "u1").balance = 0;
                Err(CoreError::InsufficientFunds)
            })
            .await;
        assert!(matches!(res, Err(CoreError::InsufficientFunds)));

        assert_eq!(store.load().await.economy["g1"]["u1"].balance, 100);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_save_leaves_previous_version_intact() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .update(|doc| {
                doc.account_mut("g1", "u1").balance = 100;
                Ok(())
            })
            .await
            .unwrap();

        // make the directory unwritable so the temp-file write blows up
        let perms = std::fs::Permissions::from_mode(0o555);
        std::fs::set_permissions(dir.path(), perms).unwrap();

        let res = store
            .update(|doc| {
                doc.account_mut("g1", "u1").balance = 999;
                Ok(())
            })
            .await;
        assert!(matches!(res, Err(CoreError::Storage(_))));

        let perms = std::fs::Permissions::from_mode(0o755);
        std::fs::set_permissions(dir.path(), perms).unwrap();

        assert_eq!(store.load().await.economy["g1"]["u1"].balance, 100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_never_drop_a_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(&dir));

        let mut handles = Vec::new();
        for _ in 0..25 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .update(|doc| {
                        doc.account_mut("g1", "u1").balance += 1;
                        Ok(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.load().await.economy["g1"]["u1"].balance, 25);
    }
}
