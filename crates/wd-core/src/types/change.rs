use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifies what is being reviewed: one change request within one project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct SubjectRef {
    pub project_id: String,
    pub change_request_id: String,
}

impl SubjectRef {
    pub fn new(project_id: impl Into<String>, change_request_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            change_request_id: change_request_id.into(),
        }
    }
}

/// One file's diff within a change set. `patch` may be empty for renames and
/// mode-only changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileChange {
    pub path: String,
    pub patch: String,
    pub language: Option<String>,
}
