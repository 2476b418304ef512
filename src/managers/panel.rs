use std::sync::Arc;

use tracing::instrument;

use crate::error::CoreError;
use crate::managers::store::DocumentStore;

/// Per-server panel configuration: the shared password and the admin list.
pub struct PanelManager {
    store: Arc<DocumentStore>,
}

impl PanelManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, password))]
    pub async fn set_password(&self, server: &str, password: &str) -> Result<(), CoreError> {
        self.store
            .update(|doc| {
                doc.server_config_mut(server).panel_password = Some(password.to_owned());
                Ok(())
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn add_admin(&self, server: &str, user: &str) -> Result<bool, CoreError> {
        self.store
            .update(|doc| Ok(doc.server_config_mut(server).panel_admins.insert(user.to_owned())))
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove_admin(&self, server: &str, user: &str) -> Result<bool, CoreError> {
        self.store
            .update(|doc| Ok(doc.server_config_mut(server).panel_admins.remove(user)))
            .await
    }

    /// Login check for the HTTP panel. A server that never ran `panelogon`
    /// is "not configured" rather than "wrong password".
    pub async fn verify_login(&self, server: &str, password: &str) -> Result<(), CoreError> {
        let stored = self
            .store
            .read(|doc| {
                doc.servers
                    .get(server)
                    .and_then(|config| config.panel_password.clone())
            })
            .await;

        match stored {
            None => Err(CoreError::NotFound("panel")),
            Some(stored) if stored == password => Ok(()),
            Some(_) => Err(CoreError::PermissionDenied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(dir: &tempfile::TempDir) -> PanelManager {
        PanelManager::new(Arc::new(DocumentStore::new(dir.path().join("data.json"))))
    }

    #[tokio::test]
    async fn login_distinguishes_unconfigured_from_wrong_password() {
        let dir = tempfile::tempdir().unwrap();
        let panel = manager(&dir);

        let res = panel.verify_login("g1", "hunter2").await;
        assert!(matches!(res, Err(CoreError::NotFound("panel"))));

        panel.set_password("g1", "hunter2").await.unwrap();
        assert!(panel.verify_login("g1", "hunter2").await.is_ok());

        let res = panel.verify_login("g1", "wrong").await;
        assert!(matches!(res, Err(CoreError::PermissionDenied)));
    }

    #[tokio::test]
    async fn admin_list_tracks_membership() {
        let dir = tempfile::tempdir().unwrap();
        let panel = manager(&dir);

        assert!(panel.add_admin("g1", "u1").await.unwrap());
        assert!(!panel.add_admin("g1", "u1").await.unwrap());
        assert!(panel.remove_admin("g1", "u1").await.unwrap());
        assert!(!panel.remove_admin("g1", "u1").await.unwrap());
    }

    #[tokio::test]
    async fn reconfiguring_keeps_the_admin_list() {
        let dir = tempfile::tempdir().unwrap();
        let panel = manager(&dir);

        panel.add_admin("g1", "u1").await.unwrap();
        panel.set_password("g1", "first").await.unwrap();
        panel.set_password("g1", "second").await.unwrap();

        let store = DocumentStore::new(dir.path().join("data.json"));
        let doc = store.load().await;
        assert!(doc.servers["g1"].panel_admins.contains("u1"));
        assert_eq!(doc.servers["g1"].panel_password.as_deref(), Some("second"));
    }
}
