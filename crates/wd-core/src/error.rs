use crate::types::report::FailureRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("no changes found for the requested change request")]
    NoChanges,
    #[error("no files eligible for analysis after filtering")]
    NoEligibleFiles,
    #[error("analysis failed for all {count} files: {summary}", count = .failures.len(), summary = enumerate_failures(.failures))]
    AllFilesFailed { failures: Vec<FailureRecord> },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

/// Per-file analysis failure. Always recovered locally by the fan-out
/// executor into a `FailureRecord`; it only surfaces as an error when every
/// file in the batch fails.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("provider error: {message}")]
    Provider { message: String },
    #[error("analysis timed out")]
    Timeout,
    #[error("unsafe file path: {path}")]
    UnsafePath { path: String },
}

#[derive(Debug, Error)]
pub enum ChangeError {
    #[error("no changes found")]
    NoChanges,
    #[error("change-set provider error: {message}")]
    Provider { message: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown analysis provider: {name}")]
    UnknownProvider { name: String },
    #[error("no analysis providers configured")]
    NoProviders,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("report store error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Error)]
pub enum WardenError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Change(#[from] ChangeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal error: {message}")]
    Internal { message: String },
}

pub(crate) fn enumerate_failures(failures: &[FailureRecord]) -> String {
    failures
        .iter()
        .map(|failure| format!("{}: {}", failure.file, failure.error))
        .collect::<Vec<_>>()
        .join("; ")
}
