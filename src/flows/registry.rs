//! Workflow registry — write-once lookup from workflow id to compiled definition.
//!
//! Built once at startup from the built-in catalog plus any spec files the
//! host supplies, then never mutated. Hosts hold `Arc`s to definitions; the
//! registry is the only owner of the compiled graphs.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::RegistryError;

use super::catalog::builtin_specs;
use super::compile::compile;
use super::definition::WorkflowDefinition;
use super::spec::WorkflowSpec;

/// Immutable mapping from workflow id to compiled definition.
#[derive(Debug)]
pub struct WorkflowRegistry {
    definitions: HashMap<String, Arc<WorkflowDefinition>>,
}

impl WorkflowRegistry {
    /// Compile and register the given specs. Fails closed: one bad spec and
    /// nothing is registered.
    pub fn from_specs(specs: Vec<WorkflowSpec>) -> Result<Self, RegistryError> {
        let mut definitions = HashMap::with_capacity(specs.len());
        for spec in &specs {
            let def = compile(spec)?;
            tracing::debug!(
                workflow_id = %def.id,
                version = def.version,
                steps = def.steps.len(),
                "Registered workflow"
            );
            if definitions
                .insert(def.id.clone(), Arc::new(def))
                .is_some()
            {
                return Err(RegistryError::Duplicate {
                    workflow_id: spec.id.clone(),
                });
            }
        }
        Ok(Self { definitions })
    }

    /// Registry holding only the built-in catalog.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_specs(builtin_specs())
    }

    /// Registry holding the built-in catalog plus every `*.json` spec file
    /// in `dir`.
    pub fn builtin_with_dir(dir: &Path) -> Result<Self, RegistryError> {
        let mut specs = builtin_specs();
        specs.extend(load_spec_dir(dir)?);
        Self::from_specs(specs)
    }

    /// Look up a definition by workflow id.
    pub fn get(&self, workflow_id: &str) -> Option<Arc<WorkflowDefinition>> {
        self.definitions.get(workflow_id).cloned()
    }

    /// Like [`get`](Self::get), but signals `NotFound` for unknown ids.
    pub fn require(&self, workflow_id: &str) -> Result<Arc<WorkflowDefinition>, RegistryError> {
        self.get(workflow_id)
            .ok_or_else(|| RegistryError::NotFound {
                workflow_id: workflow_id.to_string(),
            })
    }

    /// All registered definitions, ordered by workflow id.
    pub fn list(&self) -> Vec<Arc<WorkflowDefinition>> {
        let mut defs: Vec<_> = self.definitions.values().cloned().collect();
        defs.sort_by(|a, b| a.id.cmp(&b.id));
        defs
    }

    /// Number of registered workflows.
    pub fn count(&self) -> usize {
        self.definitions.len()
    }
}

/// Load every `*.json` workflow spec in a directory, in file-name order.
///
/// Any unreadable or unparsable file fails the whole load.
pub fn load_spec_dir(dir: &Path) -> Result<Vec<WorkflowSpec>, RegistryError> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut specs = Vec::with_capacity(paths.len());
    for path in paths {
        let file = path.display().to_string();
        let json = std::fs::read_to_string(&path)?;
        let spec = WorkflowSpec::from_json(&json).map_err(|e| RegistryError::InvalidSpec {
            file: file.clone(),
            message: e.to_string(),
        })?;
        tracing::info!(workflow_id = %spec.id, file = %file, "Loaded workflow spec");
        specs.push(spec);
    }
    Ok(specs)
}
