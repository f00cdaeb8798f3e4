//! Bounded local logs of mutation and analytics events.
//!
//! Both buffers are drop-oldest rings behind a lock, shared by cloning.
//! Enqueue is fire-and-forget: it runs strictly after the primary store
//! write commits and never blocks or fails the mutation. An external
//! consumer drains the sync outbox; the analytics buffer is local-only.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of mutation an outbox entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperationKind {
    IntentCaptured,
    IntentUpdated,
    IntentDeleted,
    StatusChanged,
    UrgeLogged,
    AchievementUnlocked,
}

impl SyncOperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOperationKind::IntentCaptured => "intent_captured",
            SyncOperationKind::IntentUpdated => "intent_updated",
            SyncOperationKind::IntentDeleted => "intent_deleted",
            SyncOperationKind::StatusChanged => "status_changed",
            SyncOperationKind::UrgeLogged => "urge_logged",
            SyncOperationKind::AchievementUnlocked => "achievement_unlocked",
        }
    }
}

/// One mutation event awaiting the external sync consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOperation {
    pub kind: SyncOperationKind,
    pub intent_id: Option<Uuid>,
    pub at: DateTime<Utc>,
    pub payload: HashMap<String, String>,
}

/// Bounded, drop-oldest outbox of sync operations.
#[derive(Clone)]
pub struct SyncOutbox {
    inner: Arc<Mutex<VecDeque<SyncOperation>>>,
    capacity: usize,
}

impl SyncOutbox {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity: capacity.max(1),
        }
    }

    /// Append an operation, dropping the oldest entry when full.
    pub fn enqueue(&self, op: SyncOperation) {
        let mut queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if queue.len() >= self.capacity {
            queue.pop_front();
        }
        queue.push_back(op);
    }

    /// Drain up to n operations, oldest first.
    pub fn drain_up_to(&self, n: usize) -> Vec<SyncOperation> {
        let mut queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let take = n.min(queue.len());
        queue.drain(..take).collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist pending operations to disk as JSON.
    pub fn persist(&self, path: &Path) -> Result<(), std::io::Error> {
        let queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let data = serde_json::to_string_pretty(&*queue)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Load pending operations from disk, replacing the current contents.
    pub fn load(&self, path: &Path) -> Result<(), std::io::Error> {
        if !path.exists() {
            return Ok(());
        }
        let content = std::fs::read_to_string(path)?;
        let loaded: VecDeque<SyncOperation> = serde_json::from_str(&content)?;
        let mut queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        *queue = loaded;
        while queue.len() > self.capacity {
            queue.pop_front();
        }
        Ok(())
    }
}

/// One analytics event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub at: DateTime<Utc>,
    pub properties: HashMap<String, String>,
}

/// Bounded, drop-oldest buffer of analytics events.
///
/// Doubles as the standalone urge-log counter: the count of events named
/// `urge_logged` feeds progress reconciliation.
#[derive(Clone)]
pub struct AnalyticsBuffer {
    inner: Arc<Mutex<VecDeque<AnalyticsEvent>>>,
    capacity: usize,
}

impl AnalyticsBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&self, event: AnalyticsEvent) {
        let mut buffer = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(event);
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Count of buffered events with the given name.
    pub fn count_named(&self, name: &str) -> u32 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.name == name)
            .count() as u32
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
