use crate::types::change::SubjectRef;
use crate::types::ids::ReviewTaskId;
use crate::types::task::ReviewTask;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "payload")]
pub enum EventBody {
    TaskCreated {
        task: ReviewTask,
    },
    TaskCompleted {
        task_id: ReviewTaskId,
        reviewed_files: u32,
        failed_files: u32,
        score: u8,
    },
    TaskFailed {
        task_id: ReviewTaskId,
        error: String,
    },
    ReviewCompleted {
        owner_id: String,
        subject: SubjectRef,
        score: u8,
        reviewed_files: u32,
        total_files: u32,
    },
}
