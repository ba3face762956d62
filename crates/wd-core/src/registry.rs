use crate::types::change::SubjectRef;
use crate::types::enums::ReviewTaskStatus;
use crate::types::ids::ReviewTaskId;
use crate::types::task::{ReviewTask, TaskUpdate};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

pub const DEFAULT_RETENTION_HOURS: i64 = 24;

/// In-memory store of task lifecycle state. Every mutation happens under the
/// write lock at whole-task granularity, so a concurrent reader never
/// observes a half-applied update. A process restart loses all state;
/// completed reports live on in the report store.
pub struct TaskRegistry {
    tasks: RwLock<HashMap<ReviewTaskId, ReviewTask>>,
    retention: Duration,
}

impl TaskRegistry {
    pub fn new(retention: Duration) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            retention,
        }
    }

    pub async fn create(
        &self,
        owner_id: &str,
        subject: SubjectRef,
        total_files: u32,
    ) -> ReviewTask {
        let now = Utc::now();
        let task = ReviewTask {
            id: ReviewTaskId::generate(),
            owner_id: owner_id.to_string(),
            subject,
            status: ReviewTaskStatus::Pending,
            progress: 0,
            total_files,
            processed_files: 0,
            current_file: None,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        let mut tasks = self.tasks.write().await;
        tasks.insert(task.id.clone(), task.clone());
        task
    }

    pub async fn get(&self, id: &ReviewTaskId) -> Option<ReviewTask> {
        self.tasks.read().await.get(id).cloned()
    }

    /// Applies the fields present in `update`. A terminal new status forces
    /// `progress = 100` and stamps `completed_at`; an attempt to move a task
    /// out of a terminal state is refused. Unknown ids are logged and
    /// reported as `None`, never treated as fatal.
    pub async fn update(&self, id: &ReviewTaskId, update: TaskUpdate) -> Option<ReviewTask> {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.get_mut(id) else {
            tracing::warn!(task_id = %id, "update for unknown task ignored");
            return None;
        };

        if task.status.is_terminal() {
            if let Some(status) = update.status {
                if status != task.status {
                    tracing::warn!(
                        task_id = %id,
                        from = ?task.status,
                        to = ?status,
                        "refusing transition out of terminal state"
                    );
                    return Some(task.clone());
                }
            }
        }

        if let Some(progress) = update.progress {
            task.progress = progress.min(100);
        }
        if let Some(processed) = update.processed_files {
            task.processed_files = processed;
        }
        if let Some(file) = update.current_file {
            task.current_file = Some(file);
        }
        if let Some(result) = update.result {
            task.result = Some(result);
        }
        if let Some(error) = update.error {
            task.error = Some(error);
        }
        if let Some(status) = update.status {
            task.status = status;
            if status.is_terminal() {
                task.progress = 100;
                task.completed_at = Some(Utc::now());
                match status {
                    ReviewTaskStatus::Completed => task.error = None,
                    ReviewTaskStatus::Failed => task.result = None,
                    _ => {}
                }
            }
        }
        task.updated_at = Utc::now();
        Some(task.clone())
    }

    /// Per-file completion hook for the fan-out executor. The counter is
    /// incremented under the write lock, so progress stays monotonic no
    /// matter which order concurrent invocations finish in.
    pub async fn mark_file_processed(
        &self,
        id: &ReviewTaskId,
        file: &str,
    ) -> Option<ReviewTask> {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.get_mut(id) else {
            tracing::warn!(task_id = %id, "progress for unknown task ignored");
            return None;
        };
        if task.status.is_terminal() {
            return Some(task.clone());
        }
        task.processed_files = task.processed_files.saturating_add(1).min(task.total_files);
        task.progress = if task.total_files == 0 {
            100
        } else {
            (f64::from(task.processed_files) / f64::from(task.total_files) * 100.0).round() as u8
        };
        task.current_file = Some(file.to_string());
        task.updated_at = Utc::now();
        Some(task.clone())
    }

    pub async fn list_by_owner(&self, owner_id: &str, limit: usize) -> Vec<ReviewTask> {
        let tasks = self.tasks.read().await;
        let mut owned: Vec<ReviewTask> = tasks
            .values()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        owned.truncate(limit);
        owned
    }

    /// Evicts terminal tasks older than the retention window. Non-terminal
    /// tasks survive regardless of age. Returns the number removed.
    pub async fn sweep(&self) -> usize {
        let cutoff = Utc::now() - self.retention;
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, task| {
            if !task.status.is_terminal() {
                return true;
            }
            let finished_at = task.completed_at.unwrap_or(task.updated_at);
            finished_at > cutoff
        });
        let removed = before - tasks.len();
        if removed > 0 {
            tracing::info!(removed, "swept expired review tasks");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_RETENTION_HOURS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::report::ReviewReport;

    fn subject() -> SubjectRef {
        SubjectRef::new("proj-1", "mr-42")
    }

    fn report() -> ReviewReport {
        ReviewReport {
            score: 90,
            issues: Vec::new(),
            suggestions: Vec::new(),
            summary: "clean".to_string(),
            reviewed_files: 1,
            total_files: 1,
            failed_files: None,
            warnings: None,
            provider: "heuristic".to_string(),
            model: "builtin".to_string(),
            timestamp: Utc::now(),
            duration_ms: 10,
        }
    }

    #[tokio::test]
    async fn create_starts_pending_with_zero_progress() {
        let registry = TaskRegistry::default();
        let task = registry.create("owner", subject(), 3).await;
        assert_eq!(task.status, ReviewTaskStatus::Pending);
        assert_eq!(task.progress, 0);
        assert_eq!(task.processed_files, 0);
        assert_eq!(task.total_files, 3);
        assert!(task.result.is_none());
        assert!(task.error.is_none());
        assert_eq!(registry.get(&task.id).await.unwrap(), task);
    }

    #[tokio::test]
    async fn update_unknown_id_is_noop() {
        let registry = TaskRegistry::default();
        let missing = ReviewTaskId::generate();
        assert!(registry.update(&missing, TaskUpdate::default()).await.is_none());
        assert!(registry.mark_file_processed(&missing, "a.rs").await.is_none());
    }

    #[tokio::test]
    async fn mark_file_processed_is_monotonic() {
        let registry = TaskRegistry::default();
        let task = registry.create("owner", subject(), 3).await;

        let after_one = registry.mark_file_processed(&task.id, "a.rs").await.unwrap();
        assert_eq!(after_one.processed_files, 1);
        assert_eq!(after_one.progress, 33);
        assert_eq!(after_one.current_file.as_deref(), Some("a.rs"));

        let after_two = registry.mark_file_processed(&task.id, "b.rs").await.unwrap();
        assert_eq!(after_two.processed_files, 2);
        assert_eq!(after_two.progress, 67);

        let after_three = registry.mark_file_processed(&task.id, "c.rs").await.unwrap();
        assert_eq!(after_three.processed_files, 3);
        assert_eq!(after_three.progress, 100);
    }

    #[tokio::test]
    async fn terminal_transition_forces_progress_and_timestamps() {
        let registry = TaskRegistry::default();
        let task = registry.create("owner", subject(), 2).await;

        let completed = registry
            .update(
                &task.id,
                TaskUpdate {
                    status: Some(ReviewTaskStatus::Completed),
                    result: Some(report()),
                    ..TaskUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(completed.status, ReviewTaskStatus::Completed);
        assert_eq!(completed.progress, 100);
        assert!(completed.completed_at.is_some());
        assert!(completed.result.is_some());
        assert!(completed.error.is_none());
    }

    #[tokio::test]
    async fn failed_task_carries_error_not_result() {
        let registry = TaskRegistry::default();
        let task = registry.create("owner", subject(), 1).await;

        let failed = registry
            .update(
                &task.id,
                TaskUpdate {
                    status: Some(ReviewTaskStatus::Failed),
                    error: Some("a.rs: timeout".to_string()),
                    ..TaskUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(failed.status, ReviewTaskStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("a.rs: timeout"));
        assert!(failed.result.is_none());
        assert_eq!(failed.progress, 100);
    }

    #[tokio::test]
    async fn terminal_state_is_absorbing() {
        let registry = TaskRegistry::default();
        let task = registry.create("owner", subject(), 1).await;
        registry
            .update(
                &task.id,
                TaskUpdate {
                    status: Some(ReviewTaskStatus::Failed),
                    error: Some("boom".to_string()),
                    ..TaskUpdate::default()
                },
            )
            .await;

        let unchanged = registry
            .update(
                &task.id,
                TaskUpdate {
                    status: Some(ReviewTaskStatus::Processing),
                    ..TaskUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unchanged.status, ReviewTaskStatus::Failed);
        assert_eq!(unchanged.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn repeated_reads_are_identical() {
        let registry = TaskRegistry::default();
        let task = registry.create("owner", subject(), 2).await;
        registry.mark_file_processed(&task.id, "a.rs").await;

        let first = registry.get(&task.id).await.unwrap();
        let second = registry.get(&task.id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn list_by_owner_is_newest_first_and_truncated() {
        let registry = TaskRegistry::default();
        for _ in 0..3 {
            registry.create("alice", subject(), 1).await;
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        registry.create("bob", subject(), 1).await;

        let listed = registry.list_by_owner("alice", 2).await;
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
        assert!(listed.iter().all(|task| task.owner_id == "alice"));
    }

    #[tokio::test]
    async fn sweep_evicts_only_aged_terminal_tasks() {
        let registry = TaskRegistry::new(Duration::zero());
        let running = registry.create("owner", subject(), 1).await;
        let done = registry.create("owner", subject(), 1).await;
        registry
            .update(
                &done.id,
                TaskUpdate {
                    status: Some(ReviewTaskStatus::Completed),
                    result: Some(report()),
                    ..TaskUpdate::default()
                },
            )
            .await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let removed = registry.sweep().await;
        assert_eq!(removed, 1);
        assert!(registry.get(&done.id).await.is_none());
        assert!(registry.get(&running.id).await.is_some());
    }

    #[tokio::test]
    async fn sweep_keeps_recent_terminal_tasks() {
        let registry = TaskRegistry::new(Duration::hours(24));
        let done = registry.create("owner", subject(), 1).await;
        registry
            .update(
                &done.id,
                TaskUpdate {
                    status: Some(ReviewTaskStatus::Completed),
                    result: Some(report()),
                    ..TaskUpdate::default()
                },
            )
            .await;

        assert_eq!(registry.sweep().await, 0);
        assert!(registry.get(&done.id).await.is_some());
    }
}
