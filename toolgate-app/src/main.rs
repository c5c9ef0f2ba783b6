//! Toolgate gateway binary.
//!
//! `toolgate` serves the HTTP front; `toolgate info` prints the loaded
//! tool catalog for human inspection instead of serving.
//!
//! # Environment Variables
//!
//! - `PORT` - listen port (default: 8080)
//! - `TOOLGATE_HOST` - listen host (default: 0.0.0.0)
//! - `FILE_MANAGER_ROOT` - file_manager working root (default: ./data/files)
//! - `RUST_LOG` - tracing filter (default: "info")
//!
//! Adapter credentials (`GMAIL_ACCESS_TOKEN`, `TOGETHER_API_KEY`,
//! `GROQ_API_KEY`, `OPENAI_API_KEY`) are read by the adapters themselves;
//! a missing credential only removes that adapter from the catalog.

use std::sync::Arc;

use toolgate_app::config::Config;
use toolgate_app::server::{app_router, AppState};
use toolgate_core::{describe, AdapterRegistry, SchemaTable};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();

    let schemas = SchemaTable::builtin();
    schemas.validate()?;

    // Load everything before serving; no request ever sees a partial set.
    let declarations = toolgate_adapters::builtin_declarations(config.file_root.clone());
    let registry = Arc::new(AdapterRegistry::load_all(&declarations));

    if std::env::args().nth(1).as_deref() == Some("info") {
        print_catalog(&registry, &schemas);
        return Ok(());
    }

    let state = AppState::new(registry, schemas);
    let app = app_router(state);

    let bind_addr = config.bind_addr();
    tracing::info!("toolgate listening on {}", bind_addr);
    tracing::info!("  GET  /health  - liveness probe");
    tracing::info!("  GET  /tools   - tool catalog");
    tracing::info!("  POST /execute - tool dispatch");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn print_catalog(registry: &AdapterRegistry, schemas: &SchemaTable) {
    let descriptors = describe(registry, schemas);

    println!("{}", "=".repeat(60));
    println!("TOOLGATE - tool catalog");
    println!("{}", "=".repeat(60));
    println!();
    println!(
        "Adapters loaded: {}/{} (failed: {})",
        registry.len(),
        registry.attempted(),
        if registry.failed_names().is_empty() {
            "none".to_string()
        } else {
            registry.failed_names().join(", ")
        }
    );
    println!();

    for (i, descriptor) in descriptors.iter().enumerate() {
        println!("{:2}. {:<14} {}", i + 1, descriptor.name, descriptor.description);
        if let Some(required) = descriptor.input_schema["required"].as_array() {
            if !required.is_empty() {
                let names: Vec<&str> = required.iter().filter_map(|v| v.as_str()).collect();
                println!("    required: {}", names.join(", "));
            }
        }
    }
    println!("{}", "=".repeat(60));
}
