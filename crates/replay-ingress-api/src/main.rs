use anyhow::Context;
use replay_ingress_core::Config;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env().context("Invalid configuration")?;

    // Initialize the application (telemetry, storage, routes)
    let (_state, router) = replay_ingress_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    replay_ingress_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
