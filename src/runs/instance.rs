//! Run state model — one instance per traversal of a workflow definition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Ordered string-keyed JSON map used for collected fields and outcomes.
pub type FieldMap = serde_json::Map<String, Value>;

/// Transition history entries kept per run; older entries are dropped.
const HISTORY_CAP: usize = 64;

/// Lifecycle status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Created but not yet advanced onto the entry step.
    Idle,
    InProgress,
    /// Reached a terminal step; outcome is set. Final.
    Completed,
    /// Abandoned by the host. Final.
    Cancelled,
}

impl RunStatus {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: RunStatus) -> bool {
        use RunStatus::*;
        matches!(
            (self, target),
            (Idle, InProgress)
                | (Idle, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }

    /// Whether this status accepts no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// One recorded step transition, for observability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Step the run left. Absent for the entry transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_step: Option<String>,
    /// Step the run landed on.
    pub to_step: String,
    pub at: DateTime<Utc>,
}

/// One in-progress or finished traversal of a workflow definition.
///
/// Plain JSON throughout: every field is a primitive, array, or string-keyed
/// map, so instances round-trip through any document store unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInstance {
    /// Fresh per run.
    pub id: Uuid,
    /// Foreign reference to the definition this run executes — never a copy
    /// of the graph itself.
    pub definition_id: String,
    pub status: RunStatus,
    /// Absent only while `status` is `idle`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step_id: Option<String>,
    /// Fields accumulated across steps. Keys are only ever added or
    /// overwritten, never removed.
    #[serde(default)]
    pub collected_data: FieldMap,
    /// Set exactly once, when the run completes. Never mutated after.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<FieldMap>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Recent step transitions, newest last, capped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<TransitionRecord>,
}

impl WorkflowInstance {
    /// Create a fresh idle run bound to a definition id.
    pub fn idle(definition_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            definition_id: definition_id.into(),
            status: RunStatus::Idle,
            current_step_id: None,
            collected_data: FieldMap::new(),
            outcome: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            history: Vec::new(),
        }
    }

    /// Whether the run accepts no further transitions.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Append a transition record, dropping the oldest past the cap.
    pub(crate) fn record_transition(&mut self, from_step: Option<String>, to_step: String) {
        self.history.push(TransitionRecord {
            from_step,
            to_step,
            at: Utc::now(),
        });
        if self.history.len() > HISTORY_CAP {
            let excess = self.history.len() - HISTORY_CAP;
            self.history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use RunStatus::*;
        assert!(Idle.can_transition_to(InProgress));
        assert!(Idle.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Cancelled));
    }

    #[test]
    fn invalid_transitions() {
        use RunStatus::*;
        // Straight to a final state without running
        assert!(!Idle.can_transition_to(Completed));
        // Out of a final state
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(InProgress));
        // Backward
        assert!(!InProgress.can_transition_to(Idle));
    }

    #[test]
    fn terminal_statuses() {
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Cancelled.is_terminal());
        assert!(!RunStatus::Idle.is_terminal());
        assert!(!RunStatus::InProgress.is_terminal());
    }

    #[test]
    fn display_matches_serde() {
        let statuses = [
            RunStatus::Idle,
            RunStatus::InProgress,
            RunStatus::Completed,
            RunStatus::Cancelled,
        ];
        for status in statuses {
            let display = format!("{status}");
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }

    #[test]
    fn fresh_run_is_idle_and_empty() {
        let run = WorkflowInstance::idle("arc_creation_v1");
        assert_eq!(run.definition_id, "arc_creation_v1");
        assert_eq!(run.status, RunStatus::Idle);
        assert!(run.current_step_id.is_none());
        assert!(run.collected_data.is_empty());
        assert!(run.outcome.is_none());
        assert!(run.completed_at.is_none());
        assert!(run.history.is_empty());
    }

    #[test]
    fn fresh_runs_get_distinct_ids() {
        let a = WorkflowInstance::idle("w");
        let b = WorkflowInstance::idle("w");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn history_is_capped() {
        let mut run = WorkflowInstance::idle("w");
        for i in 0..(HISTORY_CAP + 10) {
            run.record_transition(Some(format!("s{i}")), format!("s{}", i + 1));
        }
        assert_eq!(run.history.len(), HISTORY_CAP);
        // Oldest entries were dropped
        assert_eq!(run.history[0].from_step.as_deref(), Some("s10"));
    }

    #[test]
    fn instance_serde_roundtrip() {
        let mut run = WorkflowInstance::idle("onboarding_v1");
        run.status = RunStatus::InProgress;
        run.current_step_id = Some("collect_name".to_string());
        run.collected_data
            .insert("name".to_string(), serde_json::json!("Maya"));
        run.record_transition(None, "welcome".to_string());

        let json = serde_json::to_string(&run).unwrap();
        let parsed: WorkflowInstance = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, run);
    }

    #[test]
    fn collected_data_preserves_insertion_order() {
        let mut run = WorkflowInstance::idle("w");
        run.collected_data
            .insert("zeta".to_string(), serde_json::json!(1));
        run.collected_data
            .insert("alpha".to_string(), serde_json::json!(2));

        let json = serde_json::to_string(&run).unwrap();
        let zeta = json.find("zeta").unwrap();
        let alpha = json.find("alpha").unwrap();
        assert!(zeta < alpha, "insertion order should survive serialization");
    }
}
