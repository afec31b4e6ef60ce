//! Error types for arcflow.

use uuid::Uuid;

/// Top-level error type for the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while compiling a workflow spec into a runnable definition.
///
/// Compilation fails closed: a spec tripping any of these is rejected as a
/// whole and nothing is registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("Workflow '{workflow_id}' declares no steps")]
    EmptyWorkflow { workflow_id: String },

    #[error("Workflow '{workflow_id}' declares step id '{step_id}' more than once")]
    DuplicateStepId { workflow_id: String, step_id: String },

    #[error("Step '{step_id}' in workflow '{workflow_id}' references unknown step '{target}' via {field}")]
    UnknownStepTarget {
        workflow_id: String,
        step_id: String,
        field: &'static str,
        target: String,
    },

    #[error("Step '{step_id}' in workflow '{workflow_id}' renders static copy but provides none")]
    MissingStaticCopy { workflow_id: String, step_id: String },
}

/// Run state-machine errors from start/advance/cancel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Run {run_id} is {status} and accepts no further transitions")]
    InvalidState { run_id: Uuid, status: String },

    #[error("Definition '{workflow_id}' has no steps to run")]
    EmptyDefinition { workflow_id: String },

    #[error("Run {run_id} belongs to workflow '{expected}', not '{got}'")]
    DefinitionMismatch {
        run_id: Uuid,
        expected: String,
        got: String,
    },

    #[error("Run {run_id} sits at step '{step_id}' which the definition does not contain")]
    UnknownStep { run_id: Uuid, step_id: String },

    #[error("Confirm step '{step_id}' requires a decision")]
    MissingDecision { step_id: String },

    #[error("Fields rejected at step '{step_id}': {reason}")]
    FieldsRejected { step_id: String, reason: String },
}

/// Workflow registry errors (construction and lookup).
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown workflow id '{workflow_id}'")]
    NotFound { workflow_id: String },

    #[error("Workflow id '{workflow_id}' registered more than once")]
    Duplicate { workflow_id: String },

    #[error("Invalid workflow spec in {file}: {message}")]
    InvalidSpec { file: String, message: String },

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Run not found: {run_id}")]
    NotFound { run_id: Uuid },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;
