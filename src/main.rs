use dotenvy::dotenv;
use log::{error, info};
use std::sync::Arc;

use deskserver::config::AppConfig;
use deskserver::server::run_server;
use deskserver::shared::state::AppState;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let mut state = AppState::default();
    state.config = Some(config.clone());
    let state = Arc::new(state);

    // Log-sink subscriber for ticket notifications. Delivery to real
    // channels (mail, websockets) is wired up by deployments that need it;
    // the emitters never depend on anyone listening.
    if let Some(tx) = state.ticket_broadcast.as_ref() {
        let mut rx = tx.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(n) => info!(
                        "notification {} -> {} (ticket {}, urgent: {})",
                        n.event, n.recipient_id, n.ticket_id, n.urgent
                    ),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        error!("notification sink lagged, {} events dropped", missed);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    run_server(state, &config.server.host, config.server.port).await
}
