//! Configuration types.

use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ArcflowConfig {
    /// Port the REST/WebSocket server binds.
    pub port: u16,
    /// Optional directory of `*.json` workflow specs loaded at startup, in
    /// addition to the built-in catalog.
    pub flow_dir: Option<PathBuf>,
}

impl Default for ArcflowConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            flow_dir: None,
        }
    }
}

impl ArcflowConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = std::env::var("ARCFLOW_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);
        let flow_dir = std::env::var("ARCFLOW_FLOW_DIR").ok().map(PathBuf::from);
        Self { port, flow_dir }
    }
}
