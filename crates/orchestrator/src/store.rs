use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use pagewright_core::{TaskRecord, TaskRequest, TaskStatus};

/// Process-wide diagnostic state: the last task seen and how many
/// pipelines are currently running.
///
/// Writes are last-writer-wins with no transactional guarantee; the
/// status route reads a snapshot. Injectable so tests never touch
/// globals.
#[derive(Clone, Default)]
pub struct TaskStore {
    record: Arc<RwLock<Option<TaskRecord>>>,
    running: Arc<AtomicUsize>,
}

#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub running: usize,
    pub last_task: Option<TaskRecord>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self, request: &TaskRequest) {
        let record = TaskRecord::from_request(request);
        *self.record.write().expect("task record lock poisoned") = Some(record);
    }

    pub fn set_status(&self, status: TaskStatus) {
        let mut guard = self.record.write().expect("task record lock poisoned");
        if let Some(record) = guard.as_mut() {
            record.set_status(status);
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            running: self.running.load(Ordering::SeqCst),
            last_task: self
                .record
                .read()
                .expect("task record lock poisoned")
                .clone(),
        }
    }

    /// Track a running pipeline; the counter drops with the guard.
    pub fn begin(&self) -> RunningGuard {
        self.running.fetch_add(1, Ordering::SeqCst);
        RunningGuard {
            running: self.running.clone(),
        }
    }
}

pub struct RunningGuard {
    running: Arc<AtomicUsize>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TaskRequest {
        TaskRequest {
            email: "dev@example.com".to_string(),
            task: "hello".to_string(),
            round: 1,
            nonce: "n1".to_string(),
            brief: "a page".to_string(),
            evaluation_url: "https://example.com/cb".to_string(),
            attachments: vec![],
        }
    }

    #[test]
    fn test_record_overwritten_by_new_task() {
        let store = TaskStore::new();
        store.record_received(&request());

        let mut second = request();
        second.task = "world".to_string();
        store.record_received(&second);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.last_task.unwrap().task, "world");
    }

    #[test]
    fn test_status_updates_apply_to_current_record() {
        let store = TaskStore::new();
        store.record_received(&request());
        store.set_status(TaskStatus::Deploying);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.last_task.unwrap().status, TaskStatus::Deploying);
    }

    #[test]
    fn test_set_status_without_record_is_a_noop() {
        let store = TaskStore::new();
        store.set_status(TaskStatus::Failed);
        assert!(store.snapshot().last_task.is_none());
    }

    #[test]
    fn test_running_counter_follows_guards() {
        let store = TaskStore::new();
        assert_eq!(store.snapshot().running, 0);

        let g1 = store.begin();
        let g2 = store.begin();
        assert_eq!(store.snapshot().running, 2);

        drop(g1);
        assert_eq!(store.snapshot().running, 1);
        drop(g2);
        assert_eq!(store.snapshot().running, 0);
    }
}
