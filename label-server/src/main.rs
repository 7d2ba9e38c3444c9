use anyhow::Context;
use label_server::{Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env, configuration and logging
    let config = setup_environment();

    print_banner();
    tracing::info!(addr = %config.bind_addr(), "Label server starting...");

    // 2. Collaborators, gate, pipeline
    let state = ServerState::initialize(&config).context("failed to initialize server state")?;

    // 3. Serve until Ctrl-C
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
