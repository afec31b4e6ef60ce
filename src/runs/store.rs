//! Run persistence seam.
//!
//! Runs are plain JSON, so any document or key-value backend can hold them.
//! The engine ships only the in-memory implementation; durable backends are
//! the host's concern and plug in behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;

use super::instance::{RunStatus, WorkflowInstance};

/// Backend-agnostic run storage.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Insert or replace a run by id.
    async fn save_run(&self, run: &WorkflowInstance) -> Result<(), StoreError>;

    /// Get a run by id.
    async fn get_run(&self, id: Uuid) -> Result<Option<WorkflowInstance>, StoreError>;

    /// Delete a run. Returns whether it existed.
    async fn delete_run(&self, id: Uuid) -> Result<bool, StoreError>;

    /// All runs, oldest first.
    async fn list_runs(&self) -> Result<Vec<WorkflowInstance>, StoreError>;

    /// Runs with the given status, oldest first.
    async fn list_runs_by_status(
        &self,
        status: RunStatus,
    ) -> Result<Vec<WorkflowInstance>, StoreError>;
}

/// In-memory run store for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryRunStore {
    runs: RwLock<HashMap<Uuid, WorkflowInstance>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn save_run(&self, run: &WorkflowInstance) -> Result<(), StoreError> {
        self.runs.write().await.insert(run.id, run.clone());
        Ok(())
    }

    async fn get_run(&self, id: Uuid) -> Result<Option<WorkflowInstance>, StoreError> {
        Ok(self.runs.read().await.get(&id).cloned())
    }

    async fn delete_run(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.runs.write().await.remove(&id).is_some())
    }

    async fn list_runs(&self) -> Result<Vec<WorkflowInstance>, StoreError> {
        let mut runs: Vec<_> = self.runs.read().await.values().cloned().collect();
        runs.sort_by_key(|r| r.created_at);
        Ok(runs)
    }

    async fn list_runs_by_status(
        &self,
        status: RunStatus,
    ) -> Result<Vec<WorkflowInstance>, StoreError> {
        let mut runs: Vec<_> = self
            .runs
            .read()
            .await
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect();
        runs.sort_by_key(|r| r.created_at);
        Ok(runs)
    }
}
