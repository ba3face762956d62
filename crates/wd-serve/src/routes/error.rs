use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;
use wd_core::error::{
    AnalysisError, ChangeError, ConfigError, ReviewError, StoreError, TaskError, WardenError,
};

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &WardenError,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        WardenError::Task(task) => map_task_error(task),
        WardenError::Review(review) => map_review_error(review),
        WardenError::Analysis(analysis) => map_analysis_error(analysis),
        WardenError::Change(change) => map_change_error(change),
        WardenError::Config(config) => map_config_error(config),
        WardenError::Store(store) => map_store_error(store),
        WardenError::Internal { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            message.clone(),
        ),
    };

    (
        status,
        Json(ErrorEnvelope {
            code,
            message,
            correlation_id,
        }),
    )
}

fn map_task_error(err: &TaskError) -> (StatusCode, &'static str, String) {
    match err {
        TaskError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        TaskError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_review_error(err: &ReviewError) -> (StatusCode, &'static str, String) {
    match err {
        ReviewError::NoChanges | ReviewError::NoEligibleFiles => {
            (StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        ReviewError::AllFilesFailed { .. } => {
            (StatusCode::BAD_REQUEST, "all_files_failed", err.to_string())
        }
        ReviewError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_analysis_error(err: &AnalysisError) -> (StatusCode, &'static str, String) {
    match err {
        AnalysisError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "timeout", err.to_string()),
        AnalysisError::UnsafePath { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        AnalysisError::Provider { .. } => (
            StatusCode::BAD_GATEWAY,
            "provider_error",
            err.to_string(),
        ),
    }
}

fn map_change_error(err: &ChangeError) -> (StatusCode, &'static str, String) {
    match err {
        ChangeError::NoChanges => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        ChangeError::Provider { .. } => (
            StatusCode::BAD_GATEWAY,
            "provider_error",
            err.to_string(),
        ),
    }
}

fn map_config_error(err: &ConfigError) -> (StatusCode, &'static str, String) {
    match err {
        ConfigError::UnknownProvider { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        ConfigError::NoProviders => (
            StatusCode::SERVICE_UNAVAILABLE,
            "provider_unavailable",
            err.to_string(),
        ),
    }
}

fn map_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            err.to_string(),
        ),
    }
}
