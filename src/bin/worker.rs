//! Queue worker entry point.
//!
//! Consumes the registration queue and sends one welcome email per
//! delivered event. Processing is strictly sequential: a message is
//! acknowledged or requeued before the next one is fetched, so a failed
//! send never loses the event.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use datadock::adapters::broker::{MessageHandler, QueueClient, RedisStreamsTransport};
use datadock::adapters::events::EnvelopeConsumer;
use datadock::adapters::mailer::LogMailer;
use datadock::application::handlers::email::SendWelcomeEmailHandler;
use datadock::config::AppConfig;
use datadock::domain::resilience::{Clock, SystemClock};
use datadock::ports::Mailer;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.server.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        queue = %config.broker.registration_queue,
        "=== Datadock worker starting ==="
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let transport = Arc::new(
        RedisStreamsTransport::new(&config.broker, clock)
            .context("Failed to build broker transport")?,
    );
    transport
        .connect()
        .await
        .context("Failed to connect to message broker")?;
    info!("Broker connected");

    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new());
    let handler = Arc::new(SendWelcomeEmailHandler::new(mailer));
    let consumer: Arc<dyn MessageHandler> = Arc::new(EnvelopeConsumer::new(handler));

    let queue = QueueClient::new(transport);

    tokio::select! {
        result = queue.run(&config.broker.registration_queue, consumer) => {
            result.context("Consumer stopped")?;
        }
        _ = shutdown_signal() => {}
    }

    queue.close().await;
    info!("Worker stopped");
    Ok(())
}

/// Resolves when the process receives ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl-c"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
