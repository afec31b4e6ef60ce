//! Transition engine — the state-machine core.
//!
//! `start`, `advance`, and `cancel` are pure state transitions: they take a
//! run by reference and return the successor run, mutating nothing on error.
//! Everything asynchronous (collaborator calls, persistence) happens in the
//! host, which feeds results back in as a [`Completion`].

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::flows::{StepType, WorkflowDefinition, WorkflowStep};

use super::instance::{FieldMap, RunStatus, WorkflowInstance};

/// User decision at a confirm step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Accept and take the confirm branch.
    Confirm,
    /// Send it back and take the edit branch.
    Edit,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirm => write!(f, "confirm"),
            Self::Edit => write!(f, "edit"),
        }
    }
}

/// Result of completing the current step, supplied by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Completion {
    /// Fields the user or collaborator produced for this step. Merged into
    /// the run's collected data, last write wins.
    #[serde(default, skip_serializing_if = "FieldMap::is_empty")]
    pub fields: FieldMap,
    /// Required at confirm steps, ignored everywhere else.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
}

impl Completion {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_fields(fields: FieldMap) -> Self {
        Self {
            fields,
            decision: None,
        }
    }

    pub fn with_decision(decision: Decision) -> Self {
        Self {
            fields: FieldMap::new(),
            decision: Some(decision),
        }
    }
}

/// Optional per-step field validation, plugged in by the host.
///
/// Runs after the fail-fast checks and before the merge. A rejection surfaces
/// as [`EngineError::FieldsRejected`] and the run stays at the same step for a
/// re-prompt.
pub trait FieldValidator: Send + Sync {
    fn validate(&self, step: &WorkflowStep, fields: &FieldMap) -> Result<(), String>;
}

/// Advances runs through compiled workflow graphs.
///
/// Stateless apart from the optional validator; safe to share behind an
/// `Arc`. Serializing concurrent `advance` calls per run id is the caller's
/// job (see [`RunSessions`](crate::runs::RunSessions)).
#[derive(Default)]
pub struct TransitionEngine {
    validator: Option<Box<dyn FieldValidator>>,
}

impl TransitionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(validator: Box<dyn FieldValidator>) -> Self {
        Self {
            validator: Some(validator),
        }
    }

    /// Create a run for `definition` and advance it onto the entry step.
    pub fn start(
        &self,
        definition: &WorkflowDefinition,
    ) -> Result<WorkflowInstance, EngineError> {
        let idle = WorkflowInstance::idle(definition.id.as_str());
        self.advance(definition, &idle, &Completion::empty())
    }

    /// Advance a run by exactly one logical step.
    ///
    /// Deterministic in the run state it produces for a given
    /// `(definition, instance, completion)` triple. The input run is never
    /// mutated; on error the caller's state is untouched.
    pub fn advance(
        &self,
        definition: &WorkflowDefinition,
        instance: &WorkflowInstance,
        completion: &Completion,
    ) -> Result<WorkflowInstance, EngineError> {
        if instance.is_terminal() {
            return Err(EngineError::InvalidState {
                run_id: instance.id,
                status: instance.status.to_string(),
            });
        }
        if instance.definition_id != definition.id {
            return Err(EngineError::DefinitionMismatch {
                run_id: instance.id,
                expected: instance.definition_id.clone(),
                got: definition.id.clone(),
            });
        }

        // First transition since creation: land on the entry step. The entry
        // step has not been completed yet, so no successor is resolved and
        // no validator runs.
        if instance.status == RunStatus::Idle {
            return self.enter(definition, instance, completion);
        }

        let current_id = instance.current_step_id.as_deref().unwrap_or_default();
        let step = definition
            .step(current_id)
            .ok_or_else(|| EngineError::UnknownStep {
                run_id: instance.id,
                step_id: current_id.to_string(),
            })?;

        if let Some(validator) = &self.validator {
            validator
                .validate(step, &completion.fields)
                .map_err(|reason| EngineError::FieldsRejected {
                    step_id: step.id.clone(),
                    reason,
                })?;
        }

        let mut next = instance.clone();
        merge_fields(&mut next.collected_data, &completion.fields);

        let successor = match step.step_type {
            StepType::Confirm => {
                let decision =
                    completion
                        .decision
                        .ok_or_else(|| EngineError::MissingDecision {
                            step_id: step.id.clone(),
                        })?;
                match decision {
                    Decision::Confirm => step.next_step_on_confirm_id.as_deref(),
                    Decision::Edit => step.next_step_on_edit_id.as_deref(),
                }
            }
            _ => step.next_step_id.as_deref(),
        };

        match successor {
            Some(next_id) => {
                let from = next.current_step_id.replace(next_id.to_string());
                next.record_transition(from, next_id.to_string());
            }
            None => {
                // Terminal step: the run completes where it stands and the
                // outcome is a shallow copy of everything collected. The
                // definition's outcome schema is descriptive metadata and
                // never filters or reshapes this.
                next.status = RunStatus::Completed;
                next.outcome = Some(next.collected_data.clone());
                next.completed_at = Some(Utc::now());
                next.record_transition(Some(step.id.clone()), step.id.clone());
            }
        }
        next.updated_at = Utc::now();
        Ok(next)
    }

    /// Abandon a run. Completion is final and cannot be overridden;
    /// cancelling an already-cancelled run is an accepted no-op.
    pub fn cancel(&self, instance: &WorkflowInstance) -> Result<WorkflowInstance, EngineError> {
        match instance.status {
            RunStatus::Completed => Err(EngineError::InvalidState {
                run_id: instance.id,
                status: instance.status.to_string(),
            }),
            RunStatus::Cancelled => Ok(instance.clone()),
            RunStatus::Idle | RunStatus::InProgress => {
                let mut next = instance.clone();
                next.status = RunStatus::Cancelled;
                next.updated_at = Utc::now();
                Ok(next)
            }
        }
    }

    fn enter(
        &self,
        definition: &WorkflowDefinition,
        instance: &WorkflowInstance,
        completion: &Completion,
    ) -> Result<WorkflowInstance, EngineError> {
        let entry = definition
            .entry_step()
            .ok_or_else(|| EngineError::EmptyDefinition {
                workflow_id: definition.id.clone(),
            })?;

        let mut next = instance.clone();
        merge_fields(&mut next.collected_data, &completion.fields);
        next.status = RunStatus::InProgress;
        next.current_step_id = Some(entry.id.clone());
        next.record_transition(None, entry.id.clone());
        next.updated_at = Utc::now();
        Ok(next)
    }
}

/// Merge completion fields by key. A key present on both sides is replaced
/// whole; nested objects are not deep-merged.
fn merge_fields(data: &mut FieldMap, fields: &FieldMap) {
    for (key, value) in fields {
        data.insert(key.clone(), value.clone());
    }
}
