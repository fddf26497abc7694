use crate::core::installer::BannerInstaller;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// 每個 SSE 連線對應一個 sender
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, mpsc::Sender<Value>>>>,
}

impl SessionRegistry {
    pub async fn insert(&self, session_id: String, sender: mpsc::Sender<Value>) {
        self.sessions.write().await.insert(session_id, sender);
    }

    pub async fn get(&self, session_id: &str) -> Option<mpsc::Sender<Value>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn remove(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// 連線關閉時移除 session
pub struct SessionGuard {
    session_id: String,
    registry: SessionRegistry,
}

impl SessionGuard {
    pub fn new(session_id: String, registry: SessionRegistry) -> Self {
        Self { session_id, registry }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let session_id = std::mem::take(&mut self.session_id);
        let registry = self.registry.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                registry.remove(&session_id).await;
                tracing::debug!("SSE session closed: {}", session_id);
            });
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub installer: Arc<BannerInstaller>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(installer: BannerInstaller) -> Self {
        Self {
            installer: Arc::new(installer),
            sessions: SessionRegistry::default(),
        }
    }
}
