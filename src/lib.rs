//! Arcflow — guided-workflow engine.
//!
//! Declarative workflow specs compile into immutable step graphs; runs
//! traverse those graphs one transition at a time, accumulating collected
//! fields until a terminal step produces an outcome. The crate ships the
//! compiler and registry ([`flows`]), the pure transition engine and its
//! host-facing session/HTTP layer ([`runs`]), and the error types shared
//! across both.

pub mod config;
pub mod error;
pub mod flows;
pub mod runs;
