//! Message Board - Binary Entry Point
//!
//! Starts the UDP receive loop and the HTTP server against one shared store.

use std::sync::Arc;

use tokio::net::{TcpListener, UdpSocket};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use message_board::api::{http::create_router, AppState};
use message_board::{DatagramAdapter, MessageStore, ServerConfig};

type MainResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> MainResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "message_board=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        version = message_board::VERSION,
        data_file = %config.data_file.display(),
        "Starting message board"
    );

    let store = Arc::new(MessageStore::new(&config.data_file));
    store.initialize()?;

    let udp_socket = UdpSocket::bind(config.udp_addr()).await?;
    tokio::spawn(DatagramAdapter::new(Arc::clone(&store)).run(udp_socket));

    let listener = TcpListener::bind(config.http_addr()).await?;
    info!(addr = %listener.local_addr()?, "Serving HTTP");

    let app = create_router(AppState::new(store));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
