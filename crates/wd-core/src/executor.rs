use crate::analysis::{AnalysisCapability, ProviderConfig};
use crate::registry::TaskRegistry;
use crate::types::enums::ReviewTaskStatus;
use crate::types::ids::ReviewTaskId;
use crate::types::report::{AnalysisResult, FailureRecord};
use crate::types::task::TaskUpdate;
use crate::types::FileChange;
use crate::validation::validate_change_path;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// One successfully analyzed file, in change-set order.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file: String,
    pub result: AnalysisResult,
}

/// Full partition of a fan-out run. Both sides preserve change-set order
/// regardless of completion order.
#[derive(Debug, Default)]
pub struct FanOutOutcome {
    pub successes: Vec<FileOutcome>,
    pub failures: Vec<FailureRecord>,
}

/// Runs the analysis capability over every eligible file concurrently. One
/// spawned invocation per file, no pool cap: outbound rate limiting belongs
/// to the provider client. A file's failure (unsafe path, provider error,
/// deadline, even a panic) becomes a `FailureRecord` and never aborts
/// siblings.
pub struct FanOutExecutor {
    registry: Arc<TaskRegistry>,
    per_file_timeout: Option<Duration>,
}

impl FanOutExecutor {
    pub fn new(registry: Arc<TaskRegistry>, per_file_timeout: Option<Duration>) -> Self {
        Self {
            registry,
            per_file_timeout,
        }
    }

    pub async fn run(
        &self,
        task_id: Option<&ReviewTaskId>,
        changes: Vec<FileChange>,
        capability: Arc<dyn AnalysisCapability>,
        config: &ProviderConfig,
        rules: &[String],
    ) -> FanOutOutcome {
        if let Some(id) = task_id {
            // Idempotent: re-entering Processing is a no-op status-wise.
            self.registry
                .update(
                    id,
                    TaskUpdate {
                        status: Some(ReviewTaskStatus::Processing),
                        progress: Some(0),
                        ..TaskUpdate::default()
                    },
                )
                .await;
        }

        let rules: Arc<[String]> = rules.to_vec().into();
        let config = Arc::new(config.clone());

        let handles: Vec<_> = changes
            .into_iter()
            .map(|change| {
                let registry = Arc::clone(&self.registry);
                let capability = Arc::clone(&capability);
                let config = Arc::clone(&config);
                let rules = Arc::clone(&rules);
                let task_id = task_id.cloned();
                let timeout = self.per_file_timeout;

                tokio::spawn(async move {
                    let file = change.path.clone();
                    let result = analyze_one(&change, capability.as_ref(), &config, &rules, timeout)
                        .await;
                    if let Some(id) = &task_id {
                        registry.mark_file_processed(id, &file).await;
                    }
                    (file, result)
                })
            })
            .collect();

        let mut outcome = FanOutOutcome::default();
        for joined in join_all(handles).await {
            match joined {
                Ok((file, Ok(result))) => outcome.successes.push(FileOutcome { file, result }),
                Ok((file, Err(err))) => {
                    tracing::debug!(%file, error = %err, "file analysis failed");
                    outcome.failures.push(FailureRecord {
                        file,
                        error: err.to_string(),
                    });
                }
                Err(join_err) => {
                    tracing::error!(error = %join_err, "analysis invocation panicked");
                    outcome.failures.push(FailureRecord {
                        file: "<unknown>".to_string(),
                        error: format!("analysis aborted: {join_err}"),
                    });
                }
            }
        }
        outcome
    }
}

async fn analyze_one(
    change: &FileChange,
    capability: &dyn AnalysisCapability,
    config: &ProviderConfig,
    rules: &[String],
    per_file_timeout: Option<Duration>,
) -> Result<AnalysisResult, crate::error::AnalysisError> {
    validate_change_path(&change.path)?;
    match per_file_timeout {
        Some(deadline) => tokio::time::timeout(deadline, capability.analyze(change, config, rules))
            .await
            .map_err(|_| crate::error::AnalysisError::Timeout)?,
        None => capability.analyze(change, config, rules).await,
    }
}
