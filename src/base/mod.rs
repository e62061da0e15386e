//! Core components, types, and utilities for support-copilot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The system directive, prompt builder, and response schema for the model.
//! - Ticket and triage types, plus the typed errors surfaced to callers.

pub mod config;
pub mod error;
pub mod prompts;
pub mod schema;
pub mod types;
