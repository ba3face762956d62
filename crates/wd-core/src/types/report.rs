use crate::types::enums::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Issue {
    pub severity: Severity,
    pub file: String,
    pub line: u32,
    pub message: String,
    pub suggestion: Option<String>,
    pub code_before: Option<String>,
    pub code_after: Option<String>,
}

/// Outcome of analyzing a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub score: u8,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FailureRecord {
    pub file: String,
    pub error: String,
}

/// The aggregated review: one report per orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReviewReport {
    pub score: u8,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<String>,
    pub summary: String,
    pub reviewed_files: u32,
    pub total_files: u32,
    pub failed_files: Option<Vec<FailureRecord>>,
    pub warnings: Option<Vec<String>>,
    pub provider: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}
