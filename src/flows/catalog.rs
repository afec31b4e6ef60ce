//! Built-in workflow catalog.
//!
//! These specs ship with the engine and double as the reference fixtures for
//! the external contract: a first-time onboarding flow and a short
//! arc-creation flow. Hosts can add more via spec files at startup.

use serde_json::json;

use super::spec::{CardUi, CopyLength, RenderMode, StepKind, StepSpec, UiField, WorkflowSpec};

/// All workflow specs compiled into the registry at startup.
pub fn builtin_specs() -> Vec<WorkflowSpec> {
    vec![onboarding_spec(), arc_creation_spec()]
}

/// First-launch onboarding: identity, a desire interview, then drafted goal,
/// arc, and activities with confirm/edit loops, closing with account extras.
fn onboarding_spec() -> WorkflowSpec {
    WorkflowSpec {
        id: "onboarding_v1".to_string(),
        label: "First-time onboarding".to_string(),
        version: 1,
        chat_mode: Some("onboarding_coach".to_string()),
        outcome_schema: Some(json!({
            "name": "string",
            "age": "number",
            "desireSummary": "string",
            "goal": {"title": "string", "why": "string"},
            "arc": {"title": "string", "summary": "string", "timeHorizon": "string"},
            "activities": [{"title": "string", "cadence": "string"}],
            "avatarUrl": "string (optional)",
            "notifications": {"enabled": "boolean", "dailyNudgeHour": "number"}
        })),
        steps: vec![
            StepSpec {
                render_mode: RenderMode::Static,
                static_copy: Some(
                    "Welcome! Over the next few minutes we'll sketch out what you're \
                     working toward and set up your first plan."
                        .to_string(),
                ),
                next: Some("collect_name".to_string()),
                hide_freeform_chat_input: true,
                ..StepSpec::new("welcome", StepKind::AssistantCopyOnly, "Welcome")
            },
            StepSpec {
                prompt: "Ask the user what they'd like to be called.".to_string(),
                copy_length: Some(CopyLength::OneSentence),
                collects: vec!["name".to_string()],
                ui: Some(CardUi {
                    title: Some("What should we call you?".to_string()),
                    fields: vec![UiField {
                        id: "name".to_string(),
                        label: "Name".to_string(),
                        placeholder: Some("Your name".to_string()),
                    }],
                    primary_action_label: Some("Continue".to_string()),
                    ..Default::default()
                }),
                next: Some("collect_age".to_string()),
                ..StepSpec::new("collect_name", StepKind::Form, "Your name")
            },
            StepSpec {
                prompt: "Ask the user's age so plans can match their season of life."
                    .to_string(),
                copy_length: Some(CopyLength::OneSentence),
                collects: vec!["age".to_string()],
                validation_hint: Some("age should be a reasonable integer".to_string()),
                ui: Some(CardUi {
                    title: Some("How old are you?".to_string()),
                    fields: vec![UiField {
                        id: "age".to_string(),
                        label: "Age".to_string(),
                        placeholder: None,
                    }],
                    primary_action_label: Some("Continue".to_string()),
                    ..Default::default()
                }),
                next: Some("desire_intro".to_string()),
                ..StepSpec::new("collect_age", StepKind::Form, "Your age")
            },
            StepSpec {
                prompt: "Explain that the next questions dig into what the user deeply \
                         wants, and that honest answers make for better plans."
                    .to_string(),
                copy_length: Some(CopyLength::TwoSentences),
                next: Some("collect_desire".to_string()),
                ..StepSpec::new("desire_intro", StepKind::AssistantCopyOnly, "Desire intro")
            },
            StepSpec {
                prompt: "Ask what the user most wants their life to look like a few \
                         years from now. Invite specifics over platitudes."
                    .to_string(),
                collects: vec!["desireSummary".to_string()],
                next: Some("reflect_desire".to_string()),
                ..StepSpec::new("collect_desire", StepKind::Form, "What you want")
            },
            StepSpec {
                prompt: "Reflect the user's desire back to them in their own words, \
                         naming the theme you heard."
                    .to_string(),
                copy_length: Some(CopyLength::ShortParagraph),
                next: Some("generate_goal".to_string()),
                ..StepSpec::new("reflect_desire", StepKind::AssistantCopyOnly, "Reflection")
            },
            StepSpec {
                prompt: "Draft one concrete goal from the user's desire summary: a \
                         short title plus a sentence on why it matters to them."
                    .to_string(),
                collects: vec!["goal".to_string()],
                next: Some("confirm_goal".to_string()),
                ..StepSpec::new("generate_goal", StepKind::AgentGenerate, "Draft goal")
            },
            StepSpec {
                prompt: "Present the drafted goal and ask whether it lands or needs \
                         another pass."
                    .to_string(),
                copy_length: Some(CopyLength::OneSentence),
                next_on_confirm: Some("arc_intro".to_string()),
                next_on_edit: Some("generate_goal".to_string()),
                ui: Some(CardUi {
                    title: Some("Your first goal".to_string()),
                    primary_action_label: Some("Looks right".to_string()),
                    ..Default::default()
                }),
                ..StepSpec::new("confirm_goal", StepKind::Confirm, "Confirm goal")
            },
            StepSpec {
                prompt: "Introduce arcs: the long seasons of effort that carry a goal."
                    .to_string(),
                copy_length: Some(CopyLength::OneSentence),
                next: Some("generate_arc".to_string()),
                ..StepSpec::new("arc_intro", StepKind::AssistantCopyOnly, "Arc intro")
            },
            StepSpec {
                prompt: "Draft an arc that would carry the confirmed goal: title, a \
                         two-sentence summary, and a rough time horizon."
                    .to_string(),
                collects: vec!["arc".to_string()],
                next: Some("confirm_arc".to_string()),
                ..StepSpec::new("generate_arc", StepKind::AgentGenerate, "Draft arc")
            },
            StepSpec {
                prompt: "Present the drafted arc and ask the user to accept it or send \
                         it back for revision."
                    .to_string(),
                copy_length: Some(CopyLength::OneSentence),
                next_on_confirm: Some("activities_intro".to_string()),
                next_on_edit: Some("generate_arc".to_string()),
                ui: Some(CardUi {
                    title: Some("Your first arc".to_string()),
                    primary_action_label: Some("Adopt this arc".to_string()),
                    ..Default::default()
                }),
                ..StepSpec::new("confirm_arc", StepKind::Confirm, "Confirm arc")
            },
            StepSpec {
                prompt: "Explain that activities are the small repeatable actions that \
                         move an arc forward."
                    .to_string(),
                copy_length: Some(CopyLength::OneSentence),
                next: Some("generate_activities".to_string()),
                ..StepSpec::new(
                    "activities_intro",
                    StepKind::AssistantCopyOnly,
                    "Activities intro",
                )
            },
            StepSpec {
                prompt: "Draft two or three starter activities for the adopted arc, \
                         each with a title and a cadence."
                    .to_string(),
                collects: vec!["activities".to_string()],
                next: Some("confirm_activities".to_string()),
                ..StepSpec::new(
                    "generate_activities",
                    StepKind::AgentGenerate,
                    "Draft activities",
                )
            },
            StepSpec {
                prompt: "Present the drafted activities and ask whether to keep them or \
                         rework the list."
                    .to_string(),
                copy_length: Some(CopyLength::OneSentence),
                next_on_confirm: Some("collect_avatar".to_string()),
                next_on_edit: Some("generate_activities".to_string()),
                ..StepSpec::new("confirm_activities", StepKind::Confirm, "Confirm activities")
            },
            StepSpec {
                prompt: "Offer to set a profile photo. Make clear it's optional and \
                         easy to skip."
                    .to_string(),
                copy_length: Some(CopyLength::OneSentence),
                collects: vec!["avatarUrl".to_string()],
                ui: Some(CardUi {
                    title: Some("Add a photo?".to_string()),
                    fields: vec![UiField {
                        id: "avatarUrl".to_string(),
                        label: "Photo".to_string(),
                        placeholder: None,
                    }],
                    primary_action_label: Some("Skip for now".to_string()),
                    ..Default::default()
                }),
                next: Some("collect_notifications".to_string()),
                ..StepSpec::new("collect_avatar", StepKind::Form, "Profile photo")
            },
            StepSpec {
                prompt: "Ask whether the user wants a daily nudge and at what hour."
                    .to_string(),
                copy_length: Some(CopyLength::OneSentence),
                collects: vec!["notifications".to_string()],
                ui: Some(CardUi {
                    title: Some("Daily nudge".to_string()),
                    description: Some(
                        "A short check-in to keep your activities moving.".to_string(),
                    ),
                    primary_action_label: Some("Save".to_string()),
                    ..Default::default()
                }),
                next: Some("wrap_up".to_string()),
                ..StepSpec::new("collect_notifications", StepKind::Form, "Notifications")
            },
            StepSpec {
                render_mode: RenderMode::Static,
                static_copy: Some(
                    "That's everything. Your goal, arc, and starter activities are \
                     ready — see you at your first check-in."
                        .to_string(),
                ),
                hide_freeform_chat_input: true,
                ..StepSpec::new("wrap_up", StepKind::AssistantCopyOnly, "Wrap up")
            },
        ],
    }
}

/// Short arc-creation flow: gather context, draft an arc, confirm or revise.
fn arc_creation_spec() -> WorkflowSpec {
    WorkflowSpec {
        id: "arc_creation_v1".to_string(),
        label: "Create an arc".to_string(),
        version: 1,
        chat_mode: Some("arc_coach".to_string()),
        outcome_schema: Some(json!({
            "prompt": "string",
            "timeHorizon": "string",
            "constraints": "string (optional)",
            "adoptedArcId": "string (optional)"
        })),
        steps: vec![
            StepSpec {
                prompt: "Ask what the user wants this arc to be about and over what \
                         time horizon, plus any constraints worth honoring."
                    .to_string(),
                copy_length: Some(CopyLength::TwoSentences),
                collects: vec![
                    "prompt".to_string(),
                    "timeHorizon".to_string(),
                    "constraints".to_string(),
                ],
                ui: Some(CardUi {
                    title: Some("New arc".to_string()),
                    fields: vec![
                        UiField {
                            id: "prompt".to_string(),
                            label: "What is this arc about?".to_string(),
                            placeholder: Some("e.g. ship the thing".to_string()),
                        },
                        UiField {
                            id: "timeHorizon".to_string(),
                            label: "Time horizon".to_string(),
                            placeholder: Some("e.g. three months".to_string()),
                        },
                        UiField {
                            id: "constraints".to_string(),
                            label: "Constraints (optional)".to_string(),
                            placeholder: None,
                        },
                    ],
                    primary_action_label: Some("Draft my arc".to_string()),
                    ..Default::default()
                }),
                next: Some("agent_generate_arc".to_string()),
                ..StepSpec::new("context_collect", StepKind::Form, "Arc context")
            },
            StepSpec {
                prompt: "Draft an arc from the user's prompt, time horizon, and \
                         constraints: a title, a summary, and three milestones."
                    .to_string(),
                next: Some("confirm_arc".to_string()),
                ..StepSpec::new("agent_generate_arc", StepKind::AgentGenerate, "Draft arc")
            },
            StepSpec {
                prompt: "Present the drafted arc and ask the user to adopt it or send \
                         it back with changes."
                    .to_string(),
                copy_length: Some(CopyLength::OneSentence),
                collects: vec!["adoptedArcId".to_string()],
                next_on_edit: Some("agent_generate_arc".to_string()),
                ui: Some(CardUi {
                    title: Some("Your arc".to_string()),
                    primary_action_label: Some("Adopt this arc".to_string()),
                    ..Default::default()
                }),
                ..StepSpec::new("confirm_arc", StepKind::Confirm, "Confirm arc")
            },
        ],
    }
}
