//! Streams ARI events for one Stasis application and logs them.
//!
//! Connection settings come from the environment, or from a `.env` file in the working directory:
//! ```sh
//! ARI_HOST=localhost:8088 ARI_USER=asterisk ARI_PASS=asterisk APP_NAME=demo \
//!     RUST_LOG=ari_events=debug,stream=debug cargo run --example stream
//! ```
//!
//! The stream survives Asterisk restarts. Press Ctrl-C to stop.

use std::env;

use anyhow::Context as _;
use ari_events::auth::Credentials;
use ari_events::events::{Client, Endpoint, Envelope, EventRouter, EventType};
use ari_events::ws::{Config, Lifecycle};
use ari_events::{APP_VAR, HOST_VAR, PASS_VAR, USER_VAR};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{name} must be set"))
}

fn pretty(event: &Envelope) -> String {
    serde_json::to_string_pretty(event).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load before the filter so `.env` can set RUST_LOG too
    let dotenv = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    if let Err(e) = dotenv {
        warn!(error = %e, "No .env file loaded, using the process environment");
    }

    let host = required(HOST_VAR)?;
    let credentials = Credentials::new(required(USER_VAR)?, required(PASS_VAR)?);
    let app = required(APP_VAR)?;

    info!(
        app = %app,
        host = %host,
        user = credentials.username(),
        pass = "********",
        "Initializing ARI client"
    );

    let endpoint = Endpoint::builder()
        .host(host)
        .applications(vec![app])
        .user_agent("ARI_Client")
        .build();
    let client = Client::new(&endpoint, &credentials, Config::default())?;

    let mut lifecycle = client.lifecycle();
    tokio::spawn(async move {
        while let Ok(event) = lifecycle.recv().await {
            match event {
                Lifecycle::Connected => info!("Connected to ARI"),
                Lifecycle::BackingOff { delay } => info!(?delay, "Waiting to reconnect"),
                other => debug!(event = ?other, "Lifecycle"),
            }
        }
    });

    let router = EventRouter::new()
        .on(EventType::StasisStart, |event| {
            debug!(
                app = ?event.application,
                channel = ?event.channel_id(),
                "Received StasisStart\n{}",
                pretty(event)
            );
        })
        .on(EventType::StasisEnd, |event| {
            debug!(
                app = ?event.application,
                channel = ?event.channel_id(),
                "Received StasisEnd\n{}",
                pretty(event)
            );
        })
        .fallback(|event| debug!(event_type = %event.event_type, "Unhandled event type"))
        .on_error(|e| error!(payload = %e.payload, error = %e, "Dropped undecodable event"));

    let cancel = CancellationToken::new();
    let handle = client.spawn(router, cancel.clone());
    info!("Started ARI event stream");

    tokio::signal::ctrl_c().await?;
    info!("Termination signal received, shutting down");
    cancel.cancel();

    handle.await?;
    info!("Shutdown complete");

    Ok(())
}
