use crate::error::StoreError;
use crate::types::change::SubjectRef;
use crate::types::ids::ReportId;
use crate::types::report::ReviewReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A persisted report, as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoredReport {
    pub id: ReportId,
    pub owner_id: String,
    pub subject: SubjectRef,
    pub report: ReviewReport,
    pub created_at: DateTime<Utc>,
}

/// Report persistence boundary. The orchestrator treats every failure here
/// as best-effort: logged and swallowed, never visible to the caller.
pub trait ReportStore: Send + Sync {
    fn save(
        &self,
        owner_id: &str,
        subject: &SubjectRef,
        report: &ReviewReport,
    ) -> Result<ReportId, StoreError>;

    fn get(&self, id: &ReportId) -> Result<Option<StoredReport>, StoreError>;

    fn list_by_owner(&self, owner_id: &str, limit: u32) -> Result<Vec<StoredReport>, StoreError>;
}

/// Discards everything. Used where persistence is not wired.
pub struct NullReportStore;

impl ReportStore for NullReportStore {
    fn save(
        &self,
        _owner_id: &str,
        _subject: &SubjectRef,
        _report: &ReviewReport,
    ) -> Result<ReportId, StoreError> {
        Ok(ReportId::generate())
    }

    fn get(&self, _id: &ReportId) -> Result<Option<StoredReport>, StoreError> {
        Ok(None)
    }

    fn list_by_owner(&self, _owner_id: &str, _limit: u32) -> Result<Vec<StoredReport>, StoreError> {
        Ok(Vec::new())
    }
}
