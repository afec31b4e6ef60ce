//! Run sessions — in-process coordinator for live workflow runs.
//!
//! Owns the glue between the pure transition engine, the registry, and the
//! store: every mutation goes load → transition → save under a per-run lock,
//! so concurrent `advance` calls on one run id are serialized and the
//! last-write-wins merge stays deterministic. State changes fan out to
//! WebSocket clients over a broadcast channel.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::flows::WorkflowRegistry;

use super::engine::{Completion, TransitionEngine};
use super::instance::{RunStatus, WorkflowInstance};
use super::store::RunStore;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Run lifecycle events for WebSocket fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    /// A run was created and entered its workflow.
    RunStarted { run: WorkflowInstance },
    /// A run moved to another step.
    RunAdvanced { run: WorkflowInstance },
    /// A run reached a terminal step; its outcome is set.
    RunCompleted { run: WorkflowInstance },
    /// A run was abandoned.
    RunCancelled { run: WorkflowInstance },
    /// Full sync of live (non-terminal) runs, sent on connect and on lag.
    RunsSync { runs: Vec<WorkflowInstance> },
}

/// Coordinator for all live runs in this process.
pub struct RunSessions {
    registry: Arc<WorkflowRegistry>,
    engine: TransitionEngine,
    store: Arc<dyn RunStore>,
    /// One mutex per run id seen by this process; entries live until the
    /// run is deleted, so queued waiters never race a replacement mutex.
    locks: RwLock<HashMap<Uuid, Arc<Mutex<()>>>>,
    tx: broadcast::Sender<RunEvent>,
}

impl RunSessions {
    /// Create a coordinator with the default engine (no field validator).
    pub fn new(registry: Arc<WorkflowRegistry>, store: Arc<dyn RunStore>) -> Arc<Self> {
        Self::with_engine(registry, store, TransitionEngine::new())
    }

    /// Create a coordinator around a custom engine, e.g. one carrying a
    /// field validator.
    pub fn with_engine(
        registry: Arc<WorkflowRegistry>,
        store: Arc<dyn RunStore>,
        engine: TransitionEngine,
    ) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self {
            registry,
            engine,
            store,
            locks: RwLock::new(HashMap::new()),
            tx,
        })
    }

    /// Subscribe to run events. Each WS client calls this.
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.tx.subscribe()
    }

    /// The workflow registry this coordinator runs against.
    pub fn registry(&self) -> &WorkflowRegistry {
        &self.registry
    }

    /// Start a new run of the given workflow.
    pub async fn start_run(&self, workflow_id: &str) -> Result<WorkflowInstance> {
        let definition = self.registry.require(workflow_id)?;
        let run = self.engine.start(&definition)?;
        self.store.save_run(&run).await?;

        info!(
            run_id = %run.id,
            workflow_id = %workflow_id,
            step = run.current_step_id.as_deref().unwrap_or_default(),
            "Run started"
        );

        // Broadcast — ok if no receivers are listening yet
        let _ = self.tx.send(RunEvent::RunStarted { run: run.clone() });
        Ok(run)
    }

    /// Get a run by id.
    pub async fn get_run(&self, run_id: Uuid) -> Result<WorkflowInstance> {
        self.load(run_id).await
    }

    /// Advance a run with the given step completion.
    ///
    /// Load, transition, and save happen under the run's lock; racing calls
    /// queue up behind it rather than clobbering each other's merges.
    pub async fn advance_run(
        &self,
        run_id: Uuid,
        completion: &Completion,
    ) -> Result<WorkflowInstance> {
        let lock = self.run_lock(run_id).await;
        let _guard = lock.lock().await;

        let run = self.load(run_id).await?;
        let definition = self.registry.require(&run.definition_id)?;
        let next = self.engine.advance(&definition, &run, completion)?;
        self.store.save_run(&next).await?;

        info!(
            run_id = %next.id,
            workflow_id = %next.definition_id,
            step = next.current_step_id.as_deref().unwrap_or_default(),
            status = %next.status,
            "Run advanced"
        );

        let event = if next.status == RunStatus::Completed {
            RunEvent::RunCompleted { run: next.clone() }
        } else {
            RunEvent::RunAdvanced { run: next.clone() }
        };
        let _ = self.tx.send(event);
        Ok(next)
    }

    /// Cancel a run. Cancelling twice is a no-op and broadcasts nothing.
    pub async fn cancel_run(&self, run_id: Uuid) -> Result<WorkflowInstance> {
        let lock = self.run_lock(run_id).await;
        let _guard = lock.lock().await;

        let run = self.load(run_id).await?;
        let already_cancelled = run.status == RunStatus::Cancelled;
        let next = self.engine.cancel(&run)?;

        if !already_cancelled {
            self.store.save_run(&next).await?;
            info!(run_id = %next.id, workflow_id = %next.definition_id, "Run cancelled");
            let _ = self.tx.send(RunEvent::RunCancelled { run: next.clone() });
        }
        Ok(next)
    }

    /// Delete a run from storage and release its lock entry. Returns
    /// whether the run existed.
    pub async fn delete_run(&self, run_id: Uuid) -> Result<bool> {
        let lock = self.run_lock(run_id).await;
        let existed = {
            let _guard = lock.lock().await;
            self.store.delete_run(run_id).await?
        };
        self.drop_lock(run_id).await;
        if existed {
            debug!(run_id = %run_id, "Run deleted");
        }
        Ok(existed)
    }

    /// Live (non-terminal) runs, oldest first. This is what `runs_sync`
    /// carries on WS connect.
    pub async fn live_runs(&self) -> Result<Vec<WorkflowInstance>> {
        let mut runs = self.store.list_runs_by_status(RunStatus::InProgress).await?;
        let idle = self.store.list_runs_by_status(RunStatus::Idle).await?;
        runs.extend(idle);
        runs.sort_by_key(|r| r.created_at);
        Ok(runs)
    }

    async fn load(&self, run_id: Uuid) -> Result<WorkflowInstance> {
        self.store
            .get_run(run_id)
            .await?
            .ok_or_else(|| StoreError::NotFound { run_id }.into())
    }

    async fn run_lock(&self, run_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.write().await;
        locks
            .entry(run_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn drop_lock(&self, run_id: Uuid) {
        self.locks.write().await.remove(&run_id);
        debug!(run_id = %run_id, "Run lock released");
    }
}
