//! Compiled runtime model — the immutable step graph the engine executes.

use serde::{Deserialize, Serialize};

use super::spec::{CardUi, RenderMode};

/// Runtime step type — a strict narrowing of the four authoring kinds.
///
/// `assistant_copy_only` and `form` both compile to `collect_fields`: the
/// runtime does not care whether a step takes no input or structured input,
/// only how its successor resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    CollectFields,
    AgentGenerate,
    Confirm,
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CollectFields => "collect_fields",
            Self::AgentGenerate => "agent_generate",
            Self::Confirm => "confirm",
        };
        write!(f, "{s}")
    }
}

/// One compiled step of a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Step id, carried over unchanged from the authoring spec.
    pub id: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub label: String,
    /// Field ids this step may populate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields_collected: Vec<String>,
    /// Authoring prompt with the copy-length sentence folded in. Empty for
    /// steps that never talk to the collaborator.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prompt_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_hint: Option<String>,
    pub render_mode: RenderMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_copy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<CardUi>,
    #[serde(default)]
    pub hide_freeform_chat_input: bool,
    /// Successor for non-confirm steps. Absent means the step is terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step_id: Option<String>,
    /// Confirm-step successor when the decision is `confirm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step_on_confirm_id: Option<String>,
    /// Confirm-step successor when the decision is `edit`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step_on_edit_id: Option<String>,
}

/// A compiled, immutable workflow graph keyed by step id.
///
/// Owned exclusively by the registry. Hosts hold `Arc`s and never mutate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub id: String,
    pub label: String,
    pub version: u32,
    /// Opaque persona tag for the generation collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_mode: Option<String>,
    /// Descriptive outcome shape. Never used to filter or validate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome_schema: Option<serde_json::Value>,
    pub steps: Vec<WorkflowStep>,
}

impl WorkflowDefinition {
    /// The entry step — the first element of `steps`.
    ///
    /// `None` only for an empty definition, which the compiler rejects.
    pub fn entry_step(&self) -> Option<&WorkflowStep> {
        self.steps.first()
    }

    /// Look up a step by id.
    pub fn step(&self, step_id: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }
}
