use crate::schema;
use rusqlite::Connection;
use wd_core::error::StoreError;
use wd_core::reports::{ReportStore, StoredReport};
use wd_core::types::ids::ReportId;
use wd_core::types::{ReviewReport, SubjectRef};

/// Inner repository bound to one open connection.
pub struct ReportRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ReportRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(
        &self,
        owner_id: &str,
        subject: &SubjectRef,
        report: &ReviewReport,
    ) -> Result<ReportId, StoreError> {
        let id = ReportId::generate();
        let created_at = chrono::Utc::now();
        self.conn
            .execute(
                "INSERT INTO reports (id, owner_id, project_id, change_request_id, report_json, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (
                    id.as_str(),
                    owner_id,
                    subject.project_id.as_str(),
                    subject.change_request_id.as_str(),
                    encode_json(report)?,
                    created_at.to_rfc3339(),
                ),
            )
            .map_err(map_err)?;
        Ok(id)
    }

    pub fn get(&self, id: &ReportId) -> Result<Option<StoredReport>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, owner_id, project_id, change_request_id, report_json, created_at FROM reports WHERE id = ?1")
            .map_err(map_err)?;
        let mut rows = stmt.query([id.as_str()]).map_err(map_err)?;
        let Some(row) = rows.next().map_err(map_err)? else {
            return Ok(None);
        };
        map_row(row).map(Some)
    }

    pub fn list_by_owner(
        &self,
        owner_id: &str,
        limit: u32,
    ) -> Result<Vec<StoredReport>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, owner_id, project_id, change_request_id, report_json, created_at FROM reports WHERE owner_id = ?1 ORDER BY created_at DESC LIMIT ?2")
            .map_err(map_err)?;
        let mut rows = stmt
            .query((owner_id, i64::from(limit)))
            .map_err(map_err)?;
        let mut reports = Vec::new();
        while let Some(row) = rows.next().map_err(map_err)? {
            reports.push(map_row(row)?);
        }
        Ok(reports)
    }
}

/// `ReportStore` over a SQLite file. Opens a fresh connection per call, so
/// one handle can be shared across the runtime without a connection pool.
pub struct SqliteReportStore {
    path: String,
}

impl SqliteReportStore {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        schema::open_and_migrate(&self.path).map_err(map_err)
    }
}

impl ReportStore for SqliteReportStore {
    fn save(
        &self,
        owner_id: &str,
        subject: &SubjectRef,
        report: &ReviewReport,
    ) -> Result<ReportId, StoreError> {
        let conn = self.connect()?;
        ReportRepo::new(&conn).insert(owner_id, subject, report)
    }

    fn get(&self, id: &ReportId) -> Result<Option<StoredReport>, StoreError> {
        let conn = self.connect()?;
        ReportRepo::new(&conn).get(id)
    }

    fn list_by_owner(&self, owner_id: &str, limit: u32) -> Result<Vec<StoredReport>, StoreError> {
        let conn = self.connect()?;
        ReportRepo::new(&conn).list_by_owner(owner_id, limit)
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> Result<StoredReport, StoreError> {
    let id: String = row.get(0).map_err(map_err)?;
    let owner_id: String = row.get(1).map_err(map_err)?;
    let project_id: String = row.get(2).map_err(map_err)?;
    let change_request_id: String = row.get(3).map_err(map_err)?;
    let report_json: String = row.get(4).map_err(map_err)?;
    let created_at: String = row.get(5).map_err(map_err)?;

    Ok(StoredReport {
        id: ReportId::new(id).map_err(map_err)?,
        owner_id,
        subject: SubjectRef {
            project_id,
            change_request_id,
        },
        report: serde_json::from_str(&report_json).map_err(map_err)?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map(|value| value.with_timezone(&chrono::Utc))
            .map_err(map_err)?,
    })
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(map_err)
}

fn map_err<E: std::fmt::Display>(err: E) -> StoreError {
    StoreError::Internal {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wd_core::types::{FailureRecord, ReviewReport};

    fn report(score: u8) -> ReviewReport {
        ReviewReport {
            score,
            issues: Vec::new(),
            suggestions: vec!["add tests".to_string()],
            summary: "Reviewed 1 of 2 files".to_string(),
            reviewed_files: 1,
            total_files: 2,
            failed_files: Some(vec![FailureRecord {
                file: "b.rs".to_string(),
                error: "timeout".to_string(),
            }]),
            warnings: Some(vec!["1 file(s) could not be analyzed".to_string()]),
            provider: "heuristic".to_string(),
            model: "builtin".to_string(),
            timestamp: Utc::now(),
            duration_ms: 42,
        }
    }

    #[test]
    fn insert_then_get() {
        let conn = schema::with_test_db().unwrap();
        let repo = ReportRepo::new(&conn);
        let subject = SubjectRef::new("proj", "7");

        let id = repo.insert("alice", &subject, &report(85)).unwrap();
        let stored = repo.get(&id).unwrap().expect("report present");
        assert_eq!(stored.owner_id, "alice");
        assert_eq!(stored.subject, subject);
        assert_eq!(stored.report.score, 85);
        assert_eq!(stored.report.failed_files.as_ref().unwrap().len(), 1);

        assert!(repo.get(&ReportId::generate()).unwrap().is_none());
    }

    #[test]
    fn list_is_newest_first_and_scoped_to_owner() {
        let conn = schema::with_test_db().unwrap();
        let repo = ReportRepo::new(&conn);
        let subject = SubjectRef::new("proj", "7");

        repo.insert("alice", &subject, &report(70)).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        repo.insert("alice", &subject, &report(90)).unwrap();
        repo.insert("bob", &subject, &report(50)).unwrap();

        let listed = repo.list_by_owner("alice", 10).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].report.score, 90);
        assert_eq!(listed[1].report.score, 70);

        let limited = repo.list_by_owner("alice", 1).unwrap();
        assert_eq!(limited.len(), 1);
    }
}
