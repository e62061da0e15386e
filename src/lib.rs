//! Library root for `support-copilot`.
//!
//! Support-copilot is an LLM-powered triage service for customer support tickets.
//! Given a ticket transcript it returns:
//! - The customer's intent, sentiment, and the ticket priority
//! - A concise summary and a suggested reply draft
//! - Recommended follow-up actions
//!
//! Each request is one model call (Gemini by default, OpenAI optionally). The
//! provider is hidden behind the `GenericLlmClient` trait so it can be swapped
//! or mocked.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the support-copilot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the LLM client
/// - Serves the HTTP API until shutdown
pub async fn start(config: Config) -> Void {
    info!("Starting support-copilot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("A rustls crypto provider was already installed."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
