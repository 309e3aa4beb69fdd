// Background runs.
// A run is a summary or reasoning job executed on its own task; clients poll its status and
// may cancel it. Records live in memory only and are lost on restart.

pub mod handlers;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::reasoning::tree::ReasoningReport;
use crate::summarize::orchestrator::SummaryArtifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Summary,
    Reasoning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        self != RunStatus::Running
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RunOutput {
    Summary(SummaryArtifact),
    Reasoning(ReasoningReport),
}

/// Public view of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub id: Uuid,
    pub kind: RunKind,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<RunOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct RunRecord {
    snapshot: RunSnapshot,
    cancel: CancellationToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("run {0} not found")]
    NotFound(Uuid),

    #[error("run {0} already finished")]
    AlreadyFinished(Uuid),
}

impl From<RunError> for AppError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::NotFound(_) => AppError::NotFound(err.to_string()),
            RunError::AlreadyFinished(_) => AppError::Conflict(err.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct RunRegistry {
    runs: Arc<RwLock<HashMap<Uuid, RunRecord>>>,
    /// Finished runs older than this are dropped when the next run is registered.
    retention: Duration,
}

impl RunRegistry {
    pub fn new(retention: Duration) -> Self {
        Self {
            runs: Arc::default(),
            retention,
        }
    }

    /// Registers a run and executes `work` on a new task with the run's cancellation token.
    pub async fn spawn<F, Fut>(&self, kind: RunKind, work: F) -> RunSnapshot
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<RunOutput, AppError>> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let snapshot = RunSnapshot {
            id,
            kind,
            status: RunStatus::Running,
            created_at: Utc::now(),
            finished_at: None,
            output: None,
            error: None,
        };

        {
            let mut runs = self.runs.write().await;
            let before = runs.len();
            runs.retain(|_, record| !self.is_expired(&record.snapshot, snapshot.created_at));
            if runs.len() < before {
                debug!(evicted = before - runs.len(), "evicted finished runs");
            }
            runs.insert(
                id,
                RunRecord {
                    snapshot: snapshot.clone(),
                    cancel: cancel.clone(),
                },
            );
        }
        info!(run_id = %id, ?kind, "run started");

        let handle = tokio::spawn(work(cancel));
        let registry = self.clone();
        tokio::spawn(async move {
            // A panic in the work future surfaces here as a JoinError.
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => Err(AppError::Internal(anyhow::anyhow!(
                    "run task panicked: {err}"
                ))),
            };
            registry.finish(id, outcome).await;
        });

        snapshot
    }

    pub async fn get(&self, id: Uuid) -> Result<RunSnapshot, RunError> {
        self.runs
            .read()
            .await
            .get(&id)
            .map(|record| record.snapshot.clone())
            .ok_or(RunError::NotFound(id))
    }

    /// Cancels a running run. Its status becomes `Cancelled` immediately; the task unwinds on
    /// its own and its outcome is discarded.
    pub async fn cancel(&self, id: Uuid) -> Result<RunSnapshot, RunError> {
        let mut runs = self.runs.write().await;
        let record = runs.get_mut(&id).ok_or(RunError::NotFound(id))?;
        if record.snapshot.status.is_terminal() {
            return Err(RunError::AlreadyFinished(id));
        }

        record.cancel.cancel();
        record.snapshot.status = RunStatus::Cancelled;
        record.snapshot.finished_at = Some(Utc::now());
        info!(run_id = %id, "run cancelled");
        Ok(record.snapshot.clone())
    }

    fn is_expired(&self, snapshot: &RunSnapshot, now: DateTime<Utc>) -> bool {
        match snapshot.finished_at {
            Some(finished_at) => (now - finished_at)
                .to_std()
                .map_or(false, |age| age >= self.retention),
            None => false,
        }
    }

    async fn finish(&self, id: Uuid, outcome: Result<RunOutput, AppError>) {
        let mut runs = self.runs.write().await;
        let Some(record) = runs.get_mut(&id) else {
            return;
        };
        // A cancelled run keeps its status; partial work is not committed.
        if record.snapshot.status.is_terminal() {
            return;
        }

        let snapshot = &mut record.snapshot;
        snapshot.finished_at = Some(Utc::now());
        match outcome {
            Ok(output) => {
                snapshot.status = RunStatus::Completed;
                snapshot.output = Some(output);
                info!(run_id = %id, "run completed");
            }
            Err(AppError::Cancelled) => {
                snapshot.status = RunStatus::Cancelled;
            }
            Err(err) => {
                warn!(run_id = %id, error = %err, "run failed");
                snapshot.status = RunStatus::Failed;
                snapshot.error = Some(err.to_string());
            }
        }
    }
}
