//! In-memory store of classified tasks, backed by the remote service.
//!
//! The remote service owns task existence and attributes; this store
//! owns the classified view for the current session. Local state is
//! mutated only after the corresponding remote call succeeded, so a
//! failed request never corrupts the cache. Races between concurrent
//! mutations on the same id resolve last-write-wins locally, with
//! [`TaskStore::refetch`] as the reconciliation mechanism.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::classify::{self, Quadrant};
use crate::task::{ClassifiedTask, NewTask, TaskUpdate};
use crate::todoist::{ServiceError, TaskService};

/// Snapshot of the store as consumed by the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixState {
    pub tasks: Vec<ClassifiedTask>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One quadrant of the matrix view, in display form.
#[derive(Debug, Clone, Serialize)]
pub struct QuadrantBucket {
    pub id: Quadrant,
    pub title: &'static str,
    pub description: &'static str,
    pub tasks: Vec<ClassifiedTask>,
}

/// Session-authoritative cache of classified tasks.
pub struct TaskStore {
    service: Arc<dyn TaskService>,
    state: RwLock<MatrixState>,
}

/// Shared store handle.
pub type SharedTaskStore = Arc<TaskStore>;

impl TaskStore {
    /// Create an empty store in the loading state.
    pub fn new(service: Arc<dyn TaskService>) -> Self {
        Self {
            service,
            state: RwLock::new(MatrixState {
                tasks: Vec::new(),
                loading: true,
                error: None,
            }),
        }
    }

    /// Current snapshot, atomic with respect to every mutation.
    pub async fn snapshot(&self) -> MatrixState {
        self.state.read().await.clone()
    }

    /// The four quadrants of the matrix, in canonical order. Every
    /// cached task appears in exactly one bucket.
    pub async fn quadrants(&self) -> Vec<QuadrantBucket> {
        let state = self.state.read().await;
        Quadrant::ALL
            .iter()
            .map(|&q| QuadrantBucket {
                id: q,
                title: q.title(),
                description: q.blurb(),
                tasks: state
                    .tasks
                    .iter()
                    .filter(|t| t.classification.quadrant == q)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    /// Replace the cache with the remote's current task list.
    ///
    /// The replacement is a single write under the lock: readers see
    /// either the old sequence or the new one, never a mix. Remote
    /// order is preserved.
    pub async fn refetch(&self) -> Result<(), ServiceError> {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        match self.service.list().await {
            Ok(tasks) => {
                let now = Utc::now();
                let classified = tasks
                    .into_iter()
                    .map(|t| ClassifiedTask::classify(t, now))
                    .collect::<Vec<_>>();
                debug!(count = classified.len(), "refetched task list");

                let mut state = self.state.write().await;
                state.tasks = classified;
                state.loading = false;
                Ok(())
            }
            Err(err) => {
                let mut state = self.state.write().await;
                state.loading = false;
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Create a task remotely and append it to the cache.
    ///
    /// Empty content is rejected before any remote call; callers are
    /// expected to trim their input first.
    pub async fn create_task(
        &self,
        content: &str,
        description: Option<String>,
        priority: Option<u8>,
    ) -> Result<ClassifiedTask, ServiceError> {
        if content.trim().is_empty() {
            return Err(ServiceError::Validation(
                "task content must not be empty".to_string(),
            ));
        }

        let new_task = NewTask {
            content: content.to_string(),
            description,
            priority,
        };
        let task = self.service.create(&new_task).await?;
        let classified = ClassifiedTask::classify(task, Utc::now());

        let mut state = self.state.write().await;
        state.tasks.push(classified.clone());
        Ok(classified)
    }

    /// Create a task directly in a quadrant: the quadrant's drop
    /// priority becomes the task priority.
    pub async fn create_in_quadrant(
        &self,
        content: &str,
        quadrant: Quadrant,
    ) -> Result<ClassifiedTask, ServiceError> {
        self.create_task(content, None, Some(quadrant.priority()))
            .await
    }

    /// Push a partial update to the remote, then merge and reclassify
    /// the cached entry in place without reordering.
    ///
    /// An id the cache does not know is tolerated: the remote update
    /// already succeeded, and the next refetch reconciles the view.
    pub async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<(), ServiceError> {
        self.service.update(id, update).await?;

        let now = Utc::now();
        let mut state = self.state.write().await;
        match state.tasks.iter_mut().find(|t| t.task.id == id) {
            Some(entry) => {
                update.apply_to(&mut entry.task);
                entry.classification = classify::classify(&entry.task, now);
            }
            None => {
                debug!(id = %id, "updated task not in cache; refetch will reconcile");
            }
        }
        Ok(())
    }

    /// Delete remotely, then drop the entry from the cache.
    pub async fn delete_task(&self, id: &str) -> Result<(), ServiceError> {
        self.service.delete(id).await?;

        let mut state = self.state.write().await;
        state.tasks.retain(|t| t.task.id != id);
        Ok(())
    }

    /// Complete remotely, then drop the entry from the cache.
    /// Completed tasks are not retained in the active view.
    pub async fn complete_task(&self, id: &str) -> Result<(), ServiceError> {
        self.service.complete(id).await?;

        let mut state = self.state.write().await;
        state.tasks.retain(|t| t.task.id != id);
        Ok(())
    }

    /// Drag-and-drop contract: reprioritize the task for its target
    /// quadrant, then refetch to reconcile.
    ///
    /// Membership is always recomputed from priority, due date and
    /// time, so a task with a near due date may legally settle in a
    /// different quadrant than the one it was dropped on.
    pub async fn move_to_quadrant(&self, id: &str, target: Quadrant) -> Result<(), ServiceError> {
        let current = {
            let state = self.state.read().await;
            state
                .tasks
                .iter()
                .find(|t| t.task.id == id)
                .map(|t| t.classification.quadrant)
        };
        let Some(current) = current else {
            return Err(ServiceError::NotFound(format!(
                "task {id} is not in the cache"
            )));
        };
        if current == target {
            return Ok(());
        }

        debug!(id = %id, from = %current, to = %target, "moving task");
        let update = TaskUpdate {
            priority: Some(target.priority()),
            ..TaskUpdate::default()
        };
        self.update_task(id, &update).await?;
        self.refetch().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Duration;

    use crate::classify::{Importance, Urgency};
    use crate::task::{Due, Task};

    /// In-memory stand-in for the Todoist API.
    #[derive(Default)]
    struct FakeService {
        tasks: Mutex<Vec<Task>>,
        next_id: AtomicUsize,
        failing: AtomicBool,
        create_calls: AtomicUsize,
        update_calls: AtomicUsize,
        delete_calls: AtomicUsize,
    }

    impl FakeService {
        fn seeded(tasks: Vec<Task>) -> Arc<Self> {
            Arc::new(Self {
                tasks: Mutex::new(tasks),
                ..Self::default()
            })
        }

        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn fail_if_requested(&self) -> Result<(), ServiceError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(ServiceError::Api {
                    status: 503,
                    message: "service unavailable".to_string(),
                });
            }
            Ok(())
        }

        fn remote_tasks(&self) -> Vec<Task> {
            self.tasks.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TaskService for FakeService {
        async fn list(&self) -> Result<Vec<Task>, ServiceError> {
            self.fail_if_requested()?;
            Ok(self.remote_tasks())
        }

        async fn create(&self, new_task: &NewTask) -> Result<Task, ServiceError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.fail_if_requested()?;
            let task = Task {
                id: format!("task-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
                content: new_task.content.clone(),
                description: new_task.description.clone().unwrap_or_default(),
                priority: new_task.priority.unwrap_or(1),
                due: None,
                is_completed: false,
                labels: Vec::new(),
                project_id: None,
                url: None,
                created_at: None,
            };
            self.tasks.lock().unwrap().push(task.clone());
            Ok(task)
        }

        async fn update(&self, id: &str, update: &TaskUpdate) -> Result<(), ServiceError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            self.fail_if_requested()?;
            let mut tasks = self.tasks.lock().unwrap();
            match tasks.iter_mut().find(|t| t.id == id) {
                Some(task) => {
                    update.apply_to(task);
                    Ok(())
                }
                None => Err(ServiceError::NotFound(id.to_string())),
            }
        }

        async fn delete(&self, id: &str) -> Result<(), ServiceError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.fail_if_requested()?;
            let mut tasks = self.tasks.lock().unwrap();
            let before = tasks.len();
            tasks.retain(|t| t.id != id);
            if tasks.len() == before {
                return Err(ServiceError::NotFound(id.to_string()));
            }
            Ok(())
        }

        async fn complete(&self, id: &str) -> Result<(), ServiceError> {
            self.fail_if_requested()?;
            let mut tasks = self.tasks.lock().unwrap();
            let before = tasks.len();
            tasks.retain(|t| t.id != id);
            if tasks.len() == before {
                return Err(ServiceError::NotFound(id.to_string()));
            }
            Ok(())
        }
    }

    fn remote_task(id: &str, content: &str, priority: u8, due_in_days: Option<i64>) -> Task {
        Task {
            id: id.to_string(),
            content: content.to_string(),
            description: String::new(),
            priority,
            due: due_in_days.map(|d| Due::on_date((Utc::now() + Duration::days(d)).date_naive())),
            is_completed: false,
            labels: Vec::new(),
            project_id: None,
            url: None,
            created_at: None,
        }
    }

    fn cached_ids(state: &MatrixState) -> Vec<&str> {
        state.tasks.iter().map(|t| t.task.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_store_starts_empty_and_loading() {
        let store = TaskStore::new(FakeService::seeded(Vec::new()));
        let state = store.snapshot().await;
        assert!(state.tasks.is_empty());
        assert!(state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_refetch_replaces_the_whole_cache() {
        let service = FakeService::seeded(vec![
            remote_task("a", "Buy milk", 1, None),
            remote_task("b", "Team meeting", 2, None),
        ]);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);

        store.refetch().await.unwrap();
        let state = store.snapshot().await;
        assert_eq!(cached_ids(&state), ["a", "b"]);
        assert!(!state.loading);

        // Simulate an external mutation: "a" disappears, "c" appears.
        {
            let mut tasks = service.tasks.lock().unwrap();
            tasks.retain(|t| t.id != "a");
            tasks.push(remote_task("c", "Write report", 4, None));
        }
        store.refetch().await.unwrap();
        let state = store.snapshot().await;
        assert_eq!(cached_ids(&state), ["b", "c"]);
    }

    #[tokio::test]
    async fn test_refetch_failure_records_the_error() {
        let service = FakeService::seeded(Vec::new());
        service.set_failing(true);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);

        assert!(store.refetch().await.is_err());
        let state = store.snapshot().await;
        assert!(!state.loading);
        assert!(state.error.is_some());

        // A later successful refetch clears it.
        service.set_failing(false);
        store.refetch().await.unwrap();
        assert!(store.snapshot().await.error.is_none());
    }

    #[tokio::test]
    async fn test_create_appends_a_classified_task() {
        let store = TaskStore::new(FakeService::seeded(Vec::new()));
        store.refetch().await.unwrap();

        let created = store
            .create_task("Finish report", None, Some(4))
            .await
            .unwrap();
        assert_eq!(created.classification.urgency, Urgency::Urgent);
        assert_eq!(created.classification.importance, Importance::Important);
        assert_eq!(created.classification.quadrant, Quadrant::Do);
        assert_eq!(store.snapshot().await.tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content_before_any_remote_call() {
        let service = FakeService::seeded(Vec::new());
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);

        let err = store.create_task("   ", None, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(service.create_calls.load(Ordering::SeqCst), 0);
        assert!(store.snapshot().await.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_leaves_the_cache_untouched() {
        let service = FakeService::seeded(vec![remote_task("a", "Buy milk", 1, None)]);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);
        store.refetch().await.unwrap();

        service.set_failing(true);
        assert!(store.create_task("New task", None, None).await.is_err());
        assert_eq!(cached_ids(&store.snapshot().await), ["a"]);
    }

    #[tokio::test]
    async fn test_update_merges_and_reclassifies_in_place() {
        let service = FakeService::seeded(vec![
            remote_task("a", "Team meeting", 2, None),
            remote_task("b", "Buy milk", 1, None),
        ]);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);
        store.refetch().await.unwrap();

        let update = TaskUpdate {
            priority: Some(4),
            ..TaskUpdate::default()
        };
        store.update_task("b", &update).await.unwrap();

        let state = store.snapshot().await;
        // Order is preserved; only "b" changed.
        assert_eq!(cached_ids(&state), ["a", "b"]);
        let b = &state.tasks[1];
        assert_eq!(b.task.priority, 4);
        assert_eq!(b.classification.quadrant, Quadrant::Do);
    }

    #[tokio::test]
    async fn test_update_tolerates_an_id_missing_from_the_cache() {
        // The remote knows the task, but the cache was never refetched.
        let service = FakeService::seeded(vec![remote_task("a", "Buy milk", 1, None)]);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);

        let update = TaskUpdate {
            priority: Some(3),
            ..TaskUpdate::default()
        };
        store.update_task("a", &update).await.unwrap();
        assert!(store.snapshot().await.tasks.is_empty());

        // The next refetch reconciles the view.
        store.refetch().await.unwrap();
        assert_eq!(store.snapshot().await.tasks[0].task.priority, 3);
    }

    #[tokio::test]
    async fn test_update_failure_leaves_the_cache_untouched() {
        let service = FakeService::seeded(vec![remote_task("a", "Buy milk", 1, None)]);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);
        store.refetch().await.unwrap();

        service.set_failing(true);
        let update = TaskUpdate {
            priority: Some(4),
            ..TaskUpdate::default()
        };
        assert!(store.update_task("a", &update).await.is_err());
        assert_eq!(store.snapshot().await.tasks[0].task.priority, 1);
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_the_matching_entry() {
        let service = FakeService::seeded(vec![
            remote_task("a", "Buy milk", 1, None),
            remote_task("b", "Team meeting", 2, None),
        ]);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);
        store.refetch().await.unwrap();

        store.delete_task("a").await.unwrap();
        assert_eq!(cached_ids(&store.snapshot().await), ["b"]);
        assert_eq!(service.delete_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_the_cache_untouched() {
        let service = FakeService::seeded(vec![
            remote_task("a", "Buy milk", 1, None),
            remote_task("b", "Team meeting", 2, None),
        ]);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);
        store.refetch().await.unwrap();

        service.set_failing(true);
        assert!(store.delete_task("a").await.is_err());
        assert_eq!(cached_ids(&store.snapshot().await), ["a", "b"]);
    }

    #[tokio::test]
    async fn test_complete_drops_the_task_from_the_active_view() {
        let service = FakeService::seeded(vec![
            remote_task("a", "Buy milk", 1, None),
            remote_task("b", "Team meeting", 2, None),
        ]);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);
        store.refetch().await.unwrap();
        let before = store.snapshot().await.tasks.len();

        store.complete_task("b").await.unwrap();
        let state = store.snapshot().await;
        assert_eq!(state.tasks.len(), before - 1);
        assert_eq!(cached_ids(&state), ["a"]);
    }

    #[tokio::test]
    async fn test_complete_failure_leaves_the_cache_untouched() {
        let service = FakeService::seeded(vec![remote_task("a", "Buy milk", 1, None)]);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);
        store.refetch().await.unwrap();

        service.set_failing(true);
        assert!(store.complete_task("a").await.is_err());
        assert_eq!(store.snapshot().await.tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_move_is_a_noop_when_already_in_the_target_quadrant() {
        let service = FakeService::seeded(vec![remote_task("a", "Write report", 4, None)]);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);
        store.refetch().await.unwrap();

        store.move_to_quadrant("a", Quadrant::Do).await.unwrap();
        assert_eq!(service.update_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.snapshot().await.tasks[0].task.priority, 4);
    }

    #[tokio::test]
    async fn test_move_of_an_unknown_id_fails_without_a_remote_call() {
        let service = FakeService::seeded(Vec::new());
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);
        store.refetch().await.unwrap();

        let err = store
            .move_to_quadrant("ghost", Quadrant::Do)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(service.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_move_sets_the_drop_priority_and_reclassifies() {
        // Priority 2 + "project review" keywords, no due date: Schedule.
        let service = FakeService::seeded(vec![remote_task(
            "a",
            "Quarterly project review",
            2,
            None,
        )]);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);
        store.refetch().await.unwrap();
        assert_eq!(
            store.snapshot().await.tasks[0].classification.quadrant,
            Quadrant::Schedule
        );

        store.move_to_quadrant("a", Quadrant::Do).await.unwrap();
        assert_eq!(service.update_calls.load(Ordering::SeqCst), 1);

        let state = store.snapshot().await;
        assert_eq!(state.tasks[0].task.priority, 4);
        assert_eq!(state.tasks[0].classification.quadrant, Quadrant::Do);
    }

    #[tokio::test]
    async fn test_move_to_delete_downgrades_all_the_way() {
        let store = TaskStore::new(FakeService::seeded(Vec::new()));
        store.refetch().await.unwrap();

        let created = store
            .create_task("Finish report", None, Some(4))
            .await
            .unwrap();
        assert_eq!(created.classification.quadrant, Quadrant::Do);

        store
            .move_to_quadrant(&created.task.id, Quadrant::Delete)
            .await
            .unwrap();
        let state = store.snapshot().await;
        let task = &state.tasks[0];
        assert_eq!(task.task.priority, 1);
        assert_eq!(task.classification.urgency, Urgency::NotUrgent);
        assert_eq!(task.classification.importance, Importance::NotImportant);
        assert_eq!(task.classification.quadrant, Quadrant::Delete);
    }

    #[tokio::test]
    async fn test_due_date_rule_can_override_a_drop() {
        // Due tomorrow: urgent no matter what priority the drop sets,
        // so a move to Schedule settles back in Do after the refetch.
        let service = FakeService::seeded(vec![remote_task("a", "File taxes", 4, Some(1))]);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);
        store.refetch().await.unwrap();
        assert_eq!(
            store.snapshot().await.tasks[0].classification.quadrant,
            Quadrant::Do
        );

        store
            .move_to_quadrant("a", Quadrant::Schedule)
            .await
            .unwrap();
        let state = store.snapshot().await;
        assert_eq!(state.tasks[0].task.priority, 3);
        assert_eq!(state.tasks[0].classification.quadrant, Quadrant::Do);
    }

    #[tokio::test]
    async fn test_create_in_quadrant_uses_the_drop_priority() {
        let store = TaskStore::new(FakeService::seeded(Vec::new()));
        store.refetch().await.unwrap();

        let created = store
            .create_in_quadrant("Plan offsite", Quadrant::Do)
            .await
            .unwrap();
        assert_eq!(created.task.priority, 4);
        assert_eq!(created.classification.quadrant, Quadrant::Do);

        // The drop priority is a hint, not an override: an undated
        // priority-3 task is urgent by the priority rule, so a task
        // created "in" Schedule settles in Do.
        let created = store
            .create_in_quadrant("Plan offsite", Quadrant::Schedule)
            .await
            .unwrap();
        assert_eq!(created.task.priority, 3);
        assert_eq!(created.classification.quadrant, Quadrant::Do);
    }

    #[tokio::test]
    async fn test_quadrants_partition_the_cache() {
        let service = FakeService::seeded(vec![
            remote_task("do", "Write report", 4, None),
            remote_task("schedule", "Quarterly project review", 2, None),
            remote_task("delegate", "Renew passport", 1, Some(1)),
            remote_task("delete", "Buy milk", 1, None),
        ]);
        let store = TaskStore::new(Arc::clone(&service) as Arc<dyn TaskService>);
        store.refetch().await.unwrap();

        let buckets = store.quadrants().await;
        assert_eq!(buckets.len(), 4);
        for bucket in &buckets {
            assert_eq!(bucket.tasks.len(), 1, "bucket {}", bucket.id);
            assert_eq!(bucket.tasks[0].task.id, bucket.id.to_string());
        }
        let total: usize = buckets.iter().map(|b| b.tasks.len()).sum();
        assert_eq!(total, store.snapshot().await.tasks.len());
    }
}
