use std::sync::Arc;

use arcflow::config::ArcflowConfig;
use arcflow::flows::WorkflowRegistry;
use arcflow::runs::{InMemoryRunStore, RunSessions, run_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ArcflowConfig::from_env();

    // ── Workflow Registry ───────────────────────────────────────────────
    let registry = match &config.flow_dir {
        Some(dir) => WorkflowRegistry::builtin_with_dir(dir).unwrap_or_else(|e| {
            eprintln!("Error: failed to load workflows from {}: {}", dir.display(), e);
            std::process::exit(1);
        }),
        None => WorkflowRegistry::builtin()?,
    };

    eprintln!("🧭 Arcflow v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Workflows: {}", registry.count());
    for def in registry.list() {
        eprintln!(
            "     {} v{} ({} steps)",
            def.id,
            def.version,
            def.steps.len()
        );
    }
    eprintln!("   Run WS: ws://0.0.0.0:{}/ws", config.port);
    eprintln!("   Run API: http://0.0.0.0:{}/api/runs", config.port);
    eprintln!("   Flow API: http://0.0.0.0:{}/api/flows\n", config.port);

    // ── Run Sessions ────────────────────────────────────────────────────
    let sessions = RunSessions::new(Arc::new(registry), Arc::new(InMemoryRunStore::new()));

    // ── Server ──────────────────────────────────────────────────────────
    let app = run_routes(sessions);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Run server started");
    axum::serve(listener, app).await?;

    Ok(())
}
