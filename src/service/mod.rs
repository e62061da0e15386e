//! Service integrations for external APIs and clients.
//!
//! Currently this is only the generative model providers (Gemini, OpenAI). The
//! module defines a generic trait alongside the concrete implementations,
//! allowing for extensibility and easy testing.

pub mod llm;
