//! Workflow runs — the transition engine and everything that hosts it.
//!
//! [`engine`] is the pure state machine (`start` / `advance` / `cancel`);
//! [`instance`] is the serializable run state it transitions. The rest is
//! host plumbing: [`store`] persists runs behind an async seam, [`sessions`]
//! serializes mutations per run and fans out events, and [`routes`] exposes
//! the REST/WebSocket surface.

pub mod engine;
pub mod instance;
pub mod routes;
pub mod sessions;
pub mod store;

pub use engine::{Completion, Decision, TransitionEngine};
pub use instance::{FieldMap, RunStatus, WorkflowInstance};
pub use routes::run_routes;
pub use sessions::{RunEvent, RunSessions};
pub use store::{InMemoryRunStore, RunStore};
