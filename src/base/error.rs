//! Typed failures surfaced to callers.
//!
//! Internal plumbing uses `anyhow` (see [`super::types::Res`]); these types exist
//! where a caller needs to tell failures apart.

use thiserror::Error;

/// Failures of a single triage request.
#[derive(Debug, Error)]
pub enum TriageError {
    /// The submitted ticket is malformed.
    #[error("{0}")]
    InvalidTicket(String),
    /// The model replied with JSON that violates the triage contract.
    #[error("Model response failed validation: {0}")]
    InvalidModelOutput(String),
    /// The model reply could not be decoded at all.
    #[error("Unexpected response format: {0}")]
    MalformedModelOutput(String),
    /// The provider call itself failed.
    #[error("{provider} call failed: {message}")]
    Upstream {
        /// Human-readable provider name.
        provider: &'static str,
        /// What went wrong, as reported by the transport or the provider.
        message: String,
    },
}

/// Configuration problems that prevent the service from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The selected provider has no API key.
    #[error("{key} is required when using the {provider} provider.")]
    MissingCredential {
        /// Selected provider.
        provider: &'static str,
        /// Config key that should hold the credential.
        key: &'static str,
    },
    /// A generation parameter is outside its accepted range.
    #[error("{key} must be between {min} and {max} (got {value}).")]
    OutOfRange {
        /// Offending config key.
        key: &'static str,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
        /// Configured value.
        value: f64,
    },
}
