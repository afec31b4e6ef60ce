//! Workflow graphs — authoring specs, the compiler, and the registry.
//!
//! Flows have two layers. Authors write declarative [`WorkflowSpec`]s; the
//! compiler narrows them into immutable [`WorkflowDefinition`] step graphs
//! that the run engine executes. The registry owns every compiled graph and
//! is built exactly once at startup.

pub mod catalog;
pub mod compile;
pub mod definition;
pub mod registry;
pub mod spec;

pub use compile::compile;
pub use definition::{StepType, WorkflowDefinition, WorkflowStep};
pub use registry::{WorkflowRegistry, load_spec_dir};
pub use spec::{CardUi, CopyLength, RenderMode, StepKind, StepSpec, UiField, WorkflowSpec};
