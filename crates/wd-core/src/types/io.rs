use crate::analysis::ProviderConfig;
use crate::types::change::SubjectRef;
use crate::types::enums::ReviewTaskStatus;
use crate::types::ids::ReviewTaskId;
use crate::types::report::ReviewReport;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Synchronous-mode request: the caller blocks until the report is ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub owner_id: String,
    pub subject: SubjectRef,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub rules: Vec<String>,
}

/// Asynchronous-mode request: accepted immediately, polled afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateReviewTaskInput {
    pub owner_id: String,
    pub subject: SubjectRef,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub rules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskAccepted {
    pub task_id: ReviewTaskId,
    pub status: ReviewTaskStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskStatusOutput {
    pub status: ReviewTaskStatus,
    pub progress: u8,
    pub processed_files: u32,
    pub total_files: u32,
    pub current_file: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskResultOutput {
    pub status: ReviewTaskStatus,
    pub result: Option<ReviewReport>,
    pub message: Option<String>,
}
