use crate::aggregate::aggregate;
use crate::analysis::{AnalysisCapability, ProviderRegistry};
use crate::changes::ChangeSetProvider;
use crate::error::{ChangeError, ReviewError, TaskError, WardenError};
use crate::executor::FanOutExecutor;
use crate::filter::is_eligible;
use crate::registry::TaskRegistry;
use crate::reports::ReportStore;
use crate::types::enums::ReviewTaskStatus;
use crate::types::event::EventBody;
use crate::types::ids::ReviewTaskId;
use crate::types::io::{
    CreateReviewTaskInput, ReviewRequest, TaskAccepted, TaskResultOutput, TaskStatusOutput,
};
use crate::types::task::{TaskSummary, TaskUpdate};
use crate::types::{FileChange, ReviewReport, SubjectRef};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wd_events::bus::EventBus;
use wd_events::types::{EventRecord, EventSource};

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub source: EventSource,
    pub correlation_id: Option<String>,
}

impl RequestContext {
    pub fn new(source: EventSource, correlation_id: Option<String>) -> Self {
        Self {
            source,
            correlation_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WardenConfig {
    /// Soft wall-clock budget for one whole orchestration run. Overruns are
    /// logged, never enforced.
    pub soft_budget: Duration,
    /// Optional deadline per analysis invocation. Off by default.
    pub per_file_timeout: Option<Duration>,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            soft_budget: Duration::from_secs(300),
            per_file_timeout: None,
        }
    }
}

/// Top-level coordinator. All collaborators are injected at construction;
/// cloning is cheap and every clone shares the same registry and bus.
#[derive(Clone)]
pub struct Warden {
    registry: Arc<TaskRegistry>,
    providers: Arc<ProviderRegistry>,
    changes: Arc<dyn ChangeSetProvider>,
    reports: Arc<dyn ReportStore>,
    event_bus: EventBus,
    config: WardenConfig,
}

impl Warden {
    pub fn new(
        registry: Arc<TaskRegistry>,
        providers: Arc<ProviderRegistry>,
        changes: Arc<dyn ChangeSetProvider>,
        reports: Arc<dyn ReportStore>,
        event_bus: EventBus,
        config: WardenConfig,
    ) -> Self {
        Self {
            registry,
            providers,
            changes,
            reports,
            event_bus,
            config,
        }
    }

    pub fn reviews(&self) -> ReviewsApi<'_> {
        ReviewsApi { core: self }
    }

    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi { core: self }
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// Change set fetched, filtered, and checked before any fan-out. The two
    /// empty causes stay distinct: a provider with nothing to offer is
    /// `NoChanges`, a change set that filters down to nothing is
    /// `NoEligibleFiles`.
    async fn eligible_changes(
        &self,
        subject: &SubjectRef,
        credentials: Option<&str>,
    ) -> Result<Vec<FileChange>, WardenError> {
        let all = match self.changes.changes(subject, credentials).await {
            Ok(changes) => changes,
            Err(ChangeError::NoChanges) => return Err(ReviewError::NoChanges.into()),
            Err(err) => return Err(err.into()),
        };
        if all.is_empty() {
            return Err(ReviewError::NoChanges.into());
        }
        let eligible: Vec<FileChange> = all
            .into_iter()
            .filter(|change| is_eligible(&change.path))
            .collect();
        if eligible.is_empty() {
            return Err(ReviewError::NoEligibleFiles.into());
        }
        Ok(eligible)
    }

    fn persist_report(&self, owner_id: &str, subject: &SubjectRef, report: &ReviewReport) {
        if let Err(err) = self.reports.save(owner_id, subject, report) {
            tracing::warn!(owner = owner_id, error = %err, "report persistence failed");
        }
    }

    fn publish(&self, ctx: &RequestContext, body: &EventBody) {
        let value = match serde_json::to_value(body) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode event body");
                return;
            }
        };
        self.event_bus.publish(EventRecord {
            id: String::new(),
            seq: 0,
            at: Utc::now(),
            correlation_id: ctx.correlation_id.clone(),
            source: ctx.source,
            body: value,
        });
    }

    fn check_soft_budget(&self, started: Instant, subject: &SubjectRef) {
        let elapsed = started.elapsed();
        if elapsed > self.config.soft_budget {
            tracing::warn!(
                project = %subject.project_id,
                change_request = %subject.change_request_id,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = self.config.soft_budget.as_millis() as u64,
                "review exceeded soft wall-clock budget"
            );
        }
    }
}

pub struct ReviewsApi<'a> {
    core: &'a Warden,
}

impl<'a> ReviewsApi<'a> {
    /// Synchronous mode: the caller blocks for the whole pipeline. No task
    /// is registered, so progress is not externally observable.
    pub async fn run(
        &self,
        ctx: &RequestContext,
        request: ReviewRequest,
    ) -> Result<ReviewReport, WardenError> {
        let capability = self.core.providers.resolve(&request.provider)?;
        let eligible = self
            .core
            .eligible_changes(&request.subject, request.provider.credentials.as_deref())
            .await?;
        let total_files = eligible.len() as u32;

        let started = Instant::now();
        let executor = FanOutExecutor::new(
            Arc::clone(&self.core.registry),
            self.core.config.per_file_timeout,
        );
        let outcome = executor
            .run(None, eligible, capability, &request.provider, &request.rules)
            .await;

        if outcome.successes.is_empty() && !outcome.failures.is_empty() {
            return Err(ReviewError::AllFilesFailed {
                failures: outcome.failures,
            }
            .into());
        }

        let report = aggregate(
            &outcome.successes,
            &outcome.failures,
            total_files,
            started.elapsed().as_millis() as u64,
            &request.provider.provider,
            &request.provider.model,
        );
        self.core.check_soft_budget(started, &request.subject);
        self.core
            .persist_report(&request.owner_id, &request.subject, &report);
        self.core.publish(
            ctx,
            &EventBody::ReviewCompleted {
                owner_id: request.owner_id.clone(),
                subject: request.subject.clone(),
                score: report.score,
                reviewed_files: report.reviewed_files,
                total_files: report.total_files,
            },
        );
        Ok(report)
    }
}

pub struct TasksApi<'a> {
    core: &'a Warden,
}

impl<'a> TasksApi<'a> {
    /// Asynchronous mode: the change set is resolved up front, so a task
    /// with zero known files is never created. The pipeline then runs in
    /// the background and the accepted task id returns immediately.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateReviewTaskInput,
    ) -> Result<TaskAccepted, WardenError> {
        let capability = self.core.providers.resolve(&input.provider)?;
        let eligible = self
            .core
            .eligible_changes(&input.subject, input.provider.credentials.as_deref())
            .await?;

        let task = self
            .core
            .registry
            .create(&input.owner_id, input.subject.clone(), eligible.len() as u32)
            .await;
        self.core
            .publish(ctx, &EventBody::TaskCreated { task: task.clone() });

        let core = self.core.clone();
        let ctx = ctx.clone();
        let task_id = task.id.clone();
        tokio::spawn(async move {
            run_pipeline(core, ctx, task_id, input, eligible, capability).await;
        });

        Ok(TaskAccepted {
            task_id: task.id,
            status: task.status,
        })
    }

    pub async fn status(&self, id: &ReviewTaskId) -> Result<TaskStatusOutput, WardenError> {
        let task = self
            .core
            .registry
            .get(id)
            .await
            .ok_or(TaskError::NotFound)?;
        Ok(TaskStatusOutput {
            status: task.status,
            progress: task.progress,
            processed_files: task.processed_files,
            total_files: task.total_files,
            current_file: task.current_file,
            error: task.error,
        })
    }

    pub async fn result(&self, id: &ReviewTaskId) -> Result<TaskResultOutput, WardenError> {
        let task = self
            .core
            .registry
            .get(id)
            .await
            .ok_or(TaskError::NotFound)?;
        let message = match task.status {
            ReviewTaskStatus::Completed => None,
            ReviewTaskStatus::Failed => task.error.clone(),
            ReviewTaskStatus::Pending | ReviewTaskStatus::Processing => {
                Some("review is still in progress".to_string())
            }
        };
        Ok(TaskResultOutput {
            status: task.status,
            result: task.result,
            message,
        })
    }

    pub async fn list(&self, owner_id: &str, limit: usize) -> Vec<TaskSummary> {
        self.core
            .registry
            .list_by_owner(owner_id, limit)
            .await
            .iter()
            .map(TaskSummary::from)
            .collect()
    }
}

/// Background half of the asynchronous mode. Runs to completion even if the
/// caller stops polling; the terminal registry update carries either the
/// report or the enumerated failure message, never both.
async fn run_pipeline(
    core: Warden,
    ctx: RequestContext,
    task_id: ReviewTaskId,
    input: CreateReviewTaskInput,
    eligible: Vec<FileChange>,
    capability: Arc<dyn AnalysisCapability>,
) {
    let total_files = eligible.len() as u32;
    let started = Instant::now();
    let executor = FanOutExecutor::new(Arc::clone(&core.registry), core.config.per_file_timeout);
    let outcome = executor
        .run(
            Some(&task_id),
            eligible,
            capability,
            &input.provider,
            &input.rules,
        )
        .await;

    if outcome.successes.is_empty() && !outcome.failures.is_empty() {
        let error = ReviewError::AllFilesFailed {
            failures: outcome.failures,
        }
        .to_string();
        core.registry
            .update(
                &task_id,
                TaskUpdate {
                    status: Some(ReviewTaskStatus::Failed),
                    error: Some(error.clone()),
                    ..TaskUpdate::default()
                },
            )
            .await;
        core.publish(&ctx, &EventBody::TaskFailed { task_id, error });
        return;
    }

    let report = aggregate(
        &outcome.successes,
        &outcome.failures,
        total_files,
        started.elapsed().as_millis() as u64,
        &input.provider.provider,
        &input.provider.model,
    );
    core.check_soft_budget(started, &input.subject);
    core.persist_report(&input.owner_id, &input.subject, &report);
    core.registry
        .update(
            &task_id,
            TaskUpdate {
                status: Some(ReviewTaskStatus::Completed),
                result: Some(report.clone()),
                ..TaskUpdate::default()
            },
        )
        .await;
    core.publish(
        &ctx,
        &EventBody::TaskCompleted {
            task_id,
            reviewed_files: report.reviewed_files,
            failed_files: report
                .failed_files
                .as_ref()
                .map_or(0, |failed| failed.len() as u32),
            score: report.score,
        },
    );
}
