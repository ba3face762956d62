use crate::types::change::SubjectRef;
use crate::types::enums::ReviewTaskStatus;
use crate::types::ids::ReviewTaskId;
use crate::types::report::ReviewReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One tracked orchestration run. Owned by the registry for its mutable
/// lifetime; readers only ever see clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReviewTask {
    pub id: ReviewTaskId,
    pub owner_id: String,
    pub subject: SubjectRef,
    pub status: ReviewTaskStatus,
    pub progress: u8,
    pub total_files: u32,
    pub processed_files: u32,
    pub current_file: Option<String>,
    pub result: Option<ReviewReport>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Partial update applied by `TaskRegistry::update`; absent fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub status: Option<ReviewTaskStatus>,
    pub progress: Option<u8>,
    pub processed_files: Option<u32>,
    pub current_file: Option<String>,
    pub result: Option<ReviewReport>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskSummary {
    pub id: ReviewTaskId,
    pub subject: SubjectRef,
    pub status: ReviewTaskStatus,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
}

impl From<&ReviewTask> for TaskSummary {
    fn from(task: &ReviewTask) -> Self {
        Self {
            id: task.id.clone(),
            subject: task.subject.clone(),
            status: task.status,
            progress: task.progress,
            created_at: task.created_at,
        }
    }
}
