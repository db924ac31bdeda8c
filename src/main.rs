use std::panic;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::core::engine::Engine;
use crate::native::materializer::SourceMaterializer;
use crate::native::runner::InterpreterRunner;

mod api;
mod config;
mod constants;
mod core;
mod models;
mod native;
mod pipeline;
#[cfg(test)]
mod stubs;


#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    set_panic_hook();

    let config = Config::from_env()?;
    tracing::info!(?config, "configuration loaded");

    let runner = InterpreterRunner::new(
        &config.interpreter,
        config.isolated,
        config.output_limit_bytes,
    );
    let engine = Arc::new(Engine::new(
        SourceMaterializer::new(&config.source_dir),
        Arc::new(runner),
        config.engine_limits(),
    ));

    let listener = TcpListener::bind(config.addr).await?;
    tracing::info!("judge listening on {}", config.addr);
    pipeline::serve(listener, engine).await?;

    Ok(())
}

fn set_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        tracing::error!(
            message = "panic occurred",
            panic = %panic_info
        );
    }));
}
