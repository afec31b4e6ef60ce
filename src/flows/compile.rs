//! Workflow compiler — pure mapping from authoring specs to runtime graphs.
//!
//! Compilation is deterministic and does no I/O. A spec that fails any
//! structural check is rejected whole; nothing dangling ever reaches the
//! registry.

use std::collections::HashSet;

use crate::error::CompileError;

use super::definition::{StepType, WorkflowDefinition, WorkflowStep};
use super::spec::{CopyLength, RenderMode, StepKind, StepSpec, WorkflowSpec};

/// Compile an authoring spec into an executable definition.
///
/// Step order and ids are preserved exactly. Fails closed on duplicate step
/// ids, successor targets that do not resolve within the spec, static steps
/// without copy, and specs with no steps at all.
pub fn compile(spec: &WorkflowSpec) -> Result<WorkflowDefinition, CompileError> {
    if spec.steps.is_empty() {
        return Err(CompileError::EmptyWorkflow {
            workflow_id: spec.id.clone(),
        });
    }

    let mut ids: HashSet<&str> = HashSet::with_capacity(spec.steps.len());
    for step in &spec.steps {
        if !ids.insert(step.id.as_str()) {
            return Err(CompileError::DuplicateStepId {
                workflow_id: spec.id.clone(),
                step_id: step.id.clone(),
            });
        }
    }

    for step in &spec.steps {
        check_target(&spec.id, step, "next", step.next.as_deref(), &ids)?;
        check_target(
            &spec.id,
            step,
            "next_on_confirm",
            step.next_on_confirm.as_deref(),
            &ids,
        )?;
        check_target(
            &spec.id,
            step,
            "next_on_edit",
            step.next_on_edit.as_deref(),
            &ids,
        )?;

        let has_copy = step
            .static_copy
            .as_deref()
            .is_some_and(|copy| !copy.is_empty());
        if step.render_mode == RenderMode::Static && !has_copy {
            return Err(CompileError::MissingStaticCopy {
                workflow_id: spec.id.clone(),
                step_id: step.id.clone(),
            });
        }
    }

    let steps = spec.steps.iter().map(compile_step).collect();

    Ok(WorkflowDefinition {
        id: spec.id.clone(),
        label: spec.label.clone(),
        version: spec.version,
        chat_mode: spec.chat_mode.clone(),
        outcome_schema: spec.outcome_schema.clone(),
        steps,
    })
}

fn compile_step(step: &StepSpec) -> WorkflowStep {
    let step_type = narrow_kind(step.kind);
    // Branch targets are a confirm-only concept at runtime.
    let (on_confirm, on_edit) = match step_type {
        StepType::Confirm => (step.next_on_confirm.clone(), step.next_on_edit.clone()),
        _ => (None, None),
    };

    WorkflowStep {
        id: step.id.clone(),
        step_type,
        label: step.label.clone(),
        fields_collected: step.collects.clone(),
        prompt_template: render_prompt_template(&step.prompt, step.copy_length),
        validation_hint: step.validation_hint.clone(),
        render_mode: step.render_mode,
        static_copy: step.static_copy.clone(),
        ui: step.ui.clone().filter(|ui| !ui.is_empty()),
        hide_freeform_chat_input: step.hide_freeform_chat_input,
        next_step_id: step.next.clone(),
        next_step_on_confirm_id: on_confirm,
        next_step_on_edit_id: on_edit,
    }
}

fn narrow_kind(kind: StepKind) -> StepType {
    match kind {
        StepKind::AssistantCopyOnly | StepKind::Form => StepType::CollectFields,
        StepKind::AgentGenerate => StepType::AgentGenerate,
        StepKind::Confirm => StepType::Confirm,
    }
}

/// Join the authoring prompt and the copy-length sentence with a single
/// space, dropping empty parts.
fn render_prompt_template(prompt: &str, copy_length: Option<CopyLength>) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(2);
    if !prompt.is_empty() {
        parts.push(prompt);
    }
    if let Some(length) = copy_length {
        parts.push(length.prompt_suffix());
    }
    parts.join(" ")
}

fn check_target(
    workflow_id: &str,
    step: &StepSpec,
    field: &'static str,
    target: Option<&str>,
    ids: &HashSet<&str>,
) -> Result<(), CompileError> {
    match target {
        Some(target) if !ids.contains(target) => Err(CompileError::UnknownStepTarget {
            workflow_id: workflow_id.to_string(),
            step_id: step.id.clone(),
            field,
            target: target.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, kind: StepKind) -> StepSpec {
        StepSpec {
            id: id.to_string(),
            kind,
            label: id.to_string(),
            prompt: String::new(),
            render_mode: RenderMode::Llm,
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

    fn spec_with(steps: Vec<StepSpec>) -> WorkflowSpec {
        WorkflowSpec {
            id: "test_v1".to_string(),
            label: "Test".to_string(),
            version: 1,
            chat_mode: None,
            outcome_schema: None,
            steps,
        }
    }

    #[test]
    fn compilation_is_deterministic() {
        let mut first = step("ask", StepKind::Form);
        first.prompt = "Ask for a name.".to_string();
        first.copy_length = Some(CopyLength::OneSentence);
        first.collects = vec!["name".to_string()];
        first.next = Some("done".to_string());

        let spec = spec_with(vec![first, step("done", StepKind::AssistantCopyOnly)]);

        let a = compile(&spec).unwrap();
        let b = compile(&spec).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.steps.len(), spec.steps.len());
    }

    #[test]
    fn step_order_and_ids_preserved() {
        let mut a = step("a", StepKind::Form);
        a.next = Some("b".to_string());
        let mut b = step("b", StepKind::Form);
        b.next = Some("c".to_string());
        let c = step("c", StepKind::Form);

        let def = compile(&spec_with(vec![a, b, c])).unwrap();
        let ids: Vec<&str> = def.steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn kind_narrowing() {
        let mut copy_only = step("copy_only", StepKind::AssistantCopyOnly);
        copy_only.next = Some("form".to_string());
        let mut form = step("form", StepKind::Form);
        form.next = Some("generate".to_string());
        let mut generate = step("generate", StepKind::AgentGenerate);
        generate.next = Some("confirm".to_string());
        let confirm = step("confirm", StepKind::Confirm);

        let def = compile(&spec_with(vec![copy_only, form, generate, confirm])).unwrap();
        assert_eq!(def.steps[0].step_type, StepType::CollectFields);
        assert_eq!(def.steps[1].step_type, StepType::CollectFields);
        assert_eq!(def.steps[2].step_type, StepType::AgentGenerate);
        assert_eq!(def.steps[3].step_type, StepType::Confirm);
    }

    #[test]
    fn prompt_suffix_one_sentence() {
        let mut s = step("ask", StepKind::Form);
        s.prompt = "Ask X.".to_string();
        s.copy_length = Some(CopyLength::OneSentence);

        let def = compile(&spec_with(vec![s])).unwrap();
        assert_eq!(
            def.steps[0].prompt_template,
            "Ask X. Keep your visible reply to a single short sentence."
        );
    }

    #[test]
    fn prompt_without_copy_length_is_unchanged() {
        let mut s = step("ask", StepKind::Form);
        s.prompt = "Ask X.".to_string();

        let def = compile(&spec_with(vec![s])).unwrap();
        assert_eq!(def.steps[0].prompt_template, "Ask X.");
    }

    #[test]
    fn empty_prompt_with_copy_length_is_suffix_only() {
        let mut s = step("nudge", StepKind::AssistantCopyOnly);
        s.copy_length = Some(CopyLength::TwoSentences);

        let def = compile(&spec_with(vec![s])).unwrap();
        assert_eq!(
            def.steps[0].prompt_template,
            "Keep your visible reply to two short sentences at most."
        );
    }

    #[test]
    fn empty_prompt_without_copy_length_is_empty() {
        let def = compile(&spec_with(vec![step("s", StepKind::AssistantCopyOnly)])).unwrap();
        assert!(def.steps[0].prompt_template.is_empty());
    }

    #[test]
    fn empty_ui_is_dropped() {
        use super::super::spec::CardUi;

        let mut s = step("s", StepKind::Form);
        s.ui = Some(CardUi::default());
        let def = compile(&spec_with(vec![s])).unwrap();
        assert!(def.steps[0].ui.is_none());

        let mut s = step("s", StepKind::Form);
        s.ui = Some(CardUi {
            title: Some("Card".to_string()),
            ..Default::default()
        });
        let def = compile(&spec_with(vec![s])).unwrap();
        assert_eq!(def.steps[0].ui.as_ref().unwrap().title.as_deref(), Some("Card"));
    }

    #[test]
    fn next_becomes_next_step_id() {
        let mut a = step("a", StepKind::Form);
        a.next = Some("b".to_string());
        let b = step("b", StepKind::Form);

        let def = compile(&spec_with(vec![a, b])).unwrap();
        assert_eq!(def.steps[0].next_step_id.as_deref(), Some("b"));
        assert!(def.steps[1].next_step_id.is_none());
    }

    #[test]
    fn confirm_branches_carried_only_for_confirm_steps() {
        let mut confirm = step("confirm", StepKind::Confirm);
        confirm.next_on_confirm = Some("done".to_string());
        confirm.next_on_edit = Some("confirm".to_string());
        let done = step("done", StepKind::AssistantCopyOnly);

        let def = compile(&spec_with(vec![confirm, done])).unwrap();
        assert_eq!(def.steps[0].next_step_on_confirm_id.as_deref(), Some("done"));
        assert_eq!(
            def.steps[0].next_step_on_edit_id.as_deref(),
            Some("confirm")
        );

        // The same targets on a form step are meaningless and dropped.
        let mut form = step("form", StepKind::Form);
        form.next_on_confirm = Some("done".to_string());
        let done = step("done", StepKind::AssistantCopyOnly);
        let def = compile(&spec_with(vec![form, done])).unwrap();
        assert!(def.steps[0].next_step_on_confirm_id.is_none());
    }

    #[test]
    fn rejects_duplicate_step_ids() {
        let err = compile(&spec_with(vec![
            step("dup", StepKind::Form),
            step("dup", StepKind::Form),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            CompileError::DuplicateStepId {
                workflow_id: "test_v1".to_string(),
                step_id: "dup".to_string(),
            }
        );
    }

    #[test]
    fn rejects_dangling_next() {
        let mut s = step("s", StepKind::Form);
        s.next = Some("nowhere".to_string());

        let err = compile(&spec_with(vec![s])).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownStepTarget {
                workflow_id: "test_v1".to_string(),
                step_id: "s".to_string(),
                field: "next",
                target: "nowhere".to_string(),
            }
        );
    }

    #[test]
    fn rejects_dangling_confirm_branch() {
        let mut s = step("confirm", StepKind::Confirm);
        s.next_on_edit = Some("ghost".to_string());

        let err = compile(&spec_with(vec![s])).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnknownStepTarget { field: "next_on_edit", .. }
        ));
    }

    #[test]
    fn rejects_static_step_without_copy() {
        let mut s = step("s", StepKind::AssistantCopyOnly);
        s.render_mode = RenderMode::Static;

        let err = compile(&spec_with(vec![s])).unwrap_err();
        assert_eq!(
            err,
            CompileError::MissingStaticCopy {
                workflow_id: "test_v1".to_string(),
                step_id: "s".to_string(),
            }
        );

        let mut s = step("s", StepKind::AssistantCopyOnly);
        s.render_mode = RenderMode::Static;
        s.static_copy = Some("Welcome!".to_string());
        assert!(compile(&spec_with(vec![s])).is_ok());
    }

    #[test]
    fn rejects_empty_workflow() {
        let err = compile(&spec_with(Vec::new())).unwrap_err();
        assert_eq!(
            err,
            CompileError::EmptyWorkflow {
                workflow_id: "test_v1".to_string(),
            }
        );
    }

    #[test]
    fn self_referential_edit_loop_is_valid() {
        let mut confirm = step("confirm", StepKind::Confirm);
        confirm.next_on_edit = Some("confirm".to_string());
        assert!(compile(&spec_with(vec![confirm])).is_ok());
    }
}
