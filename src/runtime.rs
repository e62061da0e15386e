//! Runtime services and shared state for support-copilot.

use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction,
    service::llm::LlmClient,
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration and the one LLM client built at startup.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// (and used as router state) without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The LLM client instance.
    pub llm: LlmClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        // Initialize the LLM client before any traffic is accepted.
        let llm = LlmClient::from_config(&config)?;

        Ok(Self { config, llm })
    }

    /// Serve the HTTP API until ctrl-c.
    pub async fn start(&self) -> Void {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        info!("Listening on {} ...", listener.local_addr()?);

        axum::serve(listener, interaction::router(self.clone())).with_graceful_shutdown(shutdown_signal()).await?;

        info!("Server stopped.");

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }

    info!("Shutting down ...");
}
