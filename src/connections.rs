//! Process-wide registry of open MCP sessions, used for liveness reporting

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub id: Uuid,
    pub connected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, ConnectionInfo>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session; it stays registered until the returned guard is dropped.
    pub fn register(&self) -> ConnectionGuard {
        let info = ConnectionInfo {
            id: Uuid::new_v4(),
            connected_at: Utc::now(),
        };
        self.inner.write().insert(info.id, info.clone());

        ConnectionGuard {
            registry: self.clone(),
            info,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Open sessions ordered by connection time.
    pub fn snapshot(&self) -> Vec<ConnectionInfo> {
        let mut sessions = self.inner.read().values().cloned().collect::<Vec<_>>();
        sessions.sort_by_key(|info| info.connected_at);
        sessions
    }

    fn remove(&self, id: &Uuid) {
        self.inner.write().remove(id);
    }
}

#[derive(Debug)]
pub struct ConnectionGuard {
    registry: ConnectionRegistry,
    info: ConnectionInfo,
}

impl ConnectionGuard {
    pub fn id(&self) -> Uuid {
        self.info.id
    }

    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.info.id);
    }
}
