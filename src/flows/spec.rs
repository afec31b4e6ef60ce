//! Authoring model — human-editable workflow and step specifications.
//!
//! Specs are what flow authors write (by hand or via tooling) and what the
//! compiler consumes. They are never executed directly: the engine only ever
//! runs the compiled [`WorkflowDefinition`](crate::flows::WorkflowDefinition).

use serde::{Deserialize, Serialize};

/// Authoring-time step kind.
///
/// Narrowed to [`StepType`](crate::flows::StepType) at compile time:
/// `assistant_copy_only` and `form` both become `collect_fields`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    AssistantCopyOnly,
    Form,
    AgentGenerate,
    Confirm,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AssistantCopyOnly => "assistant_copy_only",
            Self::Form => "form",
            Self::AgentGenerate => "agent_generate",
            Self::Confirm => "confirm",
        };
        write!(f, "{s}")
    }
}

/// How a step's visible copy is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Copy comes from the generation collaborator at run time.
    Llm,
    /// Copy is the step's fixed `static_copy` text.
    Static,
}

impl Default for RenderMode {
    fn default() -> Self {
        Self::Llm
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Llm => write!(f, "llm"),
            Self::Static => write!(f, "static"),
        }
    }
}

/// Desired length of the collaborator's visible reply for a step.
///
/// Folded into the compiled prompt template as one fixed trailing sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyLength {
    OneSentence,
    TwoSentences,
    ShortParagraph,
}

impl CopyLength {
    /// The sentence appended to the step prompt at compile time.
    pub fn prompt_suffix(&self) -> &'static str {
        match self {
            Self::OneSentence => "Keep your visible reply to a single short sentence.",
            Self::TwoSentences => "Keep your visible reply to two short sentences at most.",
            Self::ShortParagraph => {
                "Keep your visible reply to a short paragraph of two or three sentences."
            }
        }
    }
}

impl std::fmt::Display for CopyLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OneSentence => "one_sentence",
            Self::TwoSentences => "two_sentences",
            Self::ShortParagraph => "short_paragraph",
        };
        write!(f, "{s}")
    }
}

/// One input field shown on a step card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiField {
    /// Field id — matches an entry in the step's `collects` list.
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Declarative card metadata for a step.
///
/// The engine never interprets this — it is carried through compilation and
/// handed to the presenter verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardUi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<UiField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_action_label: Option<String>,
}

impl CardUi {
    /// True when every sub-field is absent. Empty cards are dropped at
    /// compile time rather than emitted as `{}`.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.fields.is_empty()
            && self.primary_action_label.is_none()
    }
}

/// One authoring-time step of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Step id, unique within the workflow.
    pub id: String,
    pub kind: StepKind,
    pub label: String,
    /// Instruction text for the generation collaborator.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prompt: String,
    #[serde(default)]
    pub render_mode: RenderMode,
    /// Fixed copy shown when `render_mode` is `static`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_copy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_length: Option<CopyLength>,
    /// Field ids this step may populate, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collects: Vec<String>,
    /// Advisory validation text folded into prompts. Never enforced by the
    /// engine itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_hint: Option<String>,
    /// Successor step id. Absent on terminal steps. Ignored on confirm
    /// steps, which branch via `next_on_confirm`/`next_on_edit`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Confirm-kind branch target when the user accepts. Absent means the
    /// confirm decision ends the workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_on_confirm: Option<String>,
    /// Confirm-kind branch target when the user asks to revise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_on_edit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<CardUi>,
    #[serde(default)]
    pub hide_freeform_chat_input: bool,
}

/// A complete authoring-time workflow: ordered steps plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSpec {
    pub id: String,
    pub label: String,
    /// Monotonically increasing per workflow id. A new published revision
    /// must increment this.
    pub version: u32,
    /// Opaque persona tag for the generation collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_mode: Option<String>,
    /// Loose, non-enforced description of the final outcome's shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome_schema: Option<serde_json::Value>,
    pub steps: Vec<StepSpec>,
}

impl StepSpec {
    /// Create a bare step with the given identity and everything else unset.
    ///
    /// Catalog code fills in the rest with struct-update syntax.
    pub fn new(id: impl Into<String>, kind: StepKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            prompt: String::new(),
            render_mode: RenderMode::default(),
            static_copy: None,
            copy_length: None,
            collects: Vec::new(),
            validation_hint: None,
            next: None,
            next_on_confirm: None,
            next_on_edit: None,
            ui: None,
            hide_freeform_chat_input: false,
        }
    }
}

impl WorkflowSpec {
    /// Parse a spec from its JSON authoring form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_kind_serde() {
        let kind: StepKind = serde_json::from_str("\"assistant_copy_only\"").unwrap();
        assert_eq!(kind, StepKind::AssistantCopyOnly);

        let kind: StepKind = serde_json::from_str("\"form\"").unwrap();
        assert_eq!(kind, StepKind::Form);

        let kind: StepKind = serde_json::from_str("\"agent_generate\"").unwrap();
        assert_eq!(kind, StepKind::AgentGenerate);

        let kind: StepKind = serde_json::from_str("\"confirm\"").unwrap();
        assert_eq!(kind, StepKind::Confirm);
    }

    #[test]
    fn step_kind_rejects_unknown() {
        let result: Result<StepKind, _> = serde_json::from_str("\"wizard\"");
        assert!(result.is_err());
    }

    #[test]
    fn display_matches_serde() {
        let kinds = [
            StepKind::AssistantCopyOnly,
            StepKind::Form,
            StepKind::AgentGenerate,
            StepKind::Confirm,
        ];
        for kind in kinds {
            let display = format!("{kind}");
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }

    #[test]
    fn render_mode_defaults_to_llm() {
        assert_eq!(RenderMode::default(), RenderMode::Llm);

        let json = r#"{"id": "s1", "kind": "form", "label": "Step"}"#;
        let step: StepSpec = serde_json::from_str(json).unwrap();
        assert_eq!(step.render_mode, RenderMode::Llm);
    }

    #[test]
    fn copy_length_suffixes() {
        assert_eq!(
            CopyLength::OneSentence.prompt_suffix(),
            "Keep your visible reply to a single short sentence."
        );
        assert_eq!(
            CopyLength::TwoSentences.prompt_suffix(),
            "Keep your visible reply to two short sentences at most."
        );
        assert_eq!(
            CopyLength::ShortParagraph.prompt_suffix(),
            "Keep your visible reply to a short paragraph of two or three sentences."
        );
    }

    #[test]
    fn card_ui_is_empty() {
        assert!(CardUi::default().is_empty());

        let with_title = CardUi {
            title: Some("Your arc".to_string()),
            ..Default::default()
        };
        assert!(!with_title.is_empty());

        let with_fields = CardUi {
            fields: vec![UiField {
                id: "name".to_string(),
                label: "Name".to_string(),
                placeholder: None,
            }],
            ..Default::default()
        };
        assert!(!with_fields.is_empty());
    }

    #[test]
    fn minimal_step_spec_from_json() {
        let json = r#"{"id": "intro", "kind": "assistant_copy_only", "label": "Intro"}"#;
        let step: StepSpec = serde_json::from_str(json).unwrap();
        assert_eq!(step.id, "intro");
        assert_eq!(step.kind, StepKind::AssistantCopyOnly);
        assert!(step.prompt.is_empty());
        assert!(step.static_copy.is_none());
        assert!(step.copy_length.is_none());
        assert!(step.collects.is_empty());
        assert!(step.next.is_none());
        assert!(step.ui.is_none());
        assert!(!step.hide_freeform_chat_input);
    }

    #[test]
    fn workflow_spec_from_json() {
        let json = r#"{
            "id": "demo_v1",
            "label": "Demo",
            "version": 1,
            "chat_mode": "coach",
            "outcome_schema": {"topic": "string"},
            "steps": [
                {
                    "id": "ask",
                    "kind": "form",
                    "label": "Ask",
                    "prompt": "Ask the user for a topic.",
                    "copy_length": "one_sentence",
                    "collects": ["topic"],
                    "next": "wrap",
                    "ui": {"title": "Topic", "fields": [{"id": "topic", "label": "Topic"}]}
                },
                {
                    "id": "wrap",
                    "kind": "assistant_copy_only",
                    "label": "Wrap up",
                    "render_mode": "static",
                    "static_copy": "All done."
                }
            ]
        }"#;

        let spec = WorkflowSpec::from_json(json).unwrap();
        assert_eq!(spec.id, "demo_v1");
        assert_eq!(spec.version, 1);
        assert_eq!(spec.chat_mode.as_deref(), Some("coach"));
        assert_eq!(spec.steps.len(), 2);
        assert_eq!(spec.steps[0].copy_length, Some(CopyLength::OneSentence));
        assert_eq!(spec.steps[0].collects, vec!["topic".to_string()]);
        assert_eq!(spec.steps[0].next.as_deref(), Some("wrap"));
        assert_eq!(spec.steps[1].render_mode, RenderMode::Static);
        assert_eq!(spec.steps[1].static_copy.as_deref(), Some("All done."));
        assert!(spec.steps[1].next.is_none());
    }

    #[test]
    fn workflow_spec_serde_roundtrip() {
        let spec = WorkflowSpec {
            id: "rt_v1".to_string(),
            label: "Roundtrip".to_string(),
            version: 3,
            chat_mode: None,
            outcome_schema: None,
            steps: vec![StepSpec {
                id: "only".to_string(),
                kind: StepKind::Confirm,
                label: "Confirm it".to_string(),
                prompt: "Present the draft.".to_string(),
                render_mode: RenderMode::Llm,
                static_copy: None,
                copy_length: Some(CopyLength::TwoSentences),
                collects: vec!["accepted_id".to_string()],
                validation_hint: None,
                next: None,
                next_on_confirm: None,
                next_on_edit: Some("only".to_string()),
                ui: None,
                hide_freeform_chat_input: true,
            }],
        };

        let json = serde_json::to_string(&spec).unwrap();
        let parsed = WorkflowSpec::from_json(&json).unwrap();
        assert_eq!(parsed, spec);
    }
}
