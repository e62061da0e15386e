//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::{error::ConfigError, prompts};

use super::types::Res;

/// Default Gemini model to use.
fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

/// Default Gemini REST endpoint.
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// Default OpenAI model to use.
fn default_openai_model() -> String {
    "gpt-4.1-mini".to_string()
}

/// Default sampling temperature.
fn default_temperature() -> f32 {
    0.2
}

/// Default nucleus sampling mass.
fn default_top_p() -> f32 {
    0.95
}

/// Default top-k sampling cutoff.
fn default_top_k() -> u32 {
    32
}

/// Default max output tokens.
fn default_max_output_tokens() -> u32 {
    768
}

/// Default system directive for the model.
fn default_system_directive() -> String {
    prompts::SYSTEM_DIRECTIVE.to_string()
}

/// Unprefixed environment variables accepted as fallbacks, mapped to their config keys.
pub const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("GOOGLE_API_KEY", "google_api_key"),
    ("OPENAI_API_KEY", "openai_api_key"),
    ("GEMINI_MODEL", "gemini_model"),
    ("TEMPERATURE", "temperature"),
    ("TOP_P", "top_p"),
    ("TOP_K", "top_k"),
    ("MAX_OUTPUT_TOKENS", "max_output_tokens"),
];

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9000
}

/// Which generative model provider to call.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini over the Generative Language REST API.
    #[default]
    Gemini,
    /// OpenAI over the Responses API.
    OpenAi,
}

/// Configuration for the support-copilot application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The shared, validated settings.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// The settings behind a [`Config`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Provider used for triage (`LLM_PROVIDER`), either `gemini` or `openai`.
    #[serde(default)]
    pub llm_provider: LlmProvider,
    /// Google API key (`GOOGLE_API_KEY`).
    #[serde(default)]
    pub google_api_key: Option<String>,
    /// Gemini model to use (`GEMINI_MODEL`).
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    /// Base URL of the Generative Language API (`GEMINI_BASE_URL`).
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    /// OpenAI API key (`OPENAI_API_KEY`).
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// OpenAI model to use (`OPENAI_MODEL`).
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Optional custom system directive to override the default (`SYSTEM_DIRECTIVE`).
    #[serde(default = "default_system_directive")]
    pub system_directive: String,
    /// Sampling temperature (`TEMPERATURE`).
    /// Value between 0 and 2. Lower values make triage more deterministic.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Nucleus sampling probability mass (`TOP_P`), between 0 and 1.
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Top-k sampling cutoff (`TOP_K`). Ignored by providers that do not support it.
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Max output tokens (`MAX_OUTPUT_TOKENS`).
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Address to bind the HTTP server to (`HOST`).
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind the HTTP server to (`PORT`).
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Config {
    /// Load the configuration.
    ///
    /// Sources, lowest precedence first: the bare variable names listed in
    /// [`LEGACY_ENV_KEYS`], the config file, then `SUPPORT_COPILOT_*` variables.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        Self::load_with(explicit_path, |name| std::env::var(name).ok())
    }

    /// Load the configuration, reading the bare fallback variables through `lookup`.
    pub fn load_with(explicit_path: Option<&std::path::Path>, lookup: impl Fn(&str) -> Option<String>) -> Res<Self> {
        let mut cfg = config::Config::builder();

        for (name, key) in LEGACY_ENV_KEYS {
            if let Some(value) = lookup(*name) {
                cfg = cfg.set_default(*key, value)?;
            }
        }

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        cfg = cfg.add_source(config::Environment::default().prefix("SUPPORT_COPILOT"));

        Self::new(cfg.build()?.try_deserialize()?)
    }

    /// Wrap and validate an already-assembled configuration.
    pub fn new(inner: ConfigInner) -> Res<Self> {
        let result = Config { inner: Arc::new(inner) };

        let (provider, key, credential) = match result.llm_provider {
            LlmProvider::Gemini => ("gemini", "google_api_key", &result.google_api_key),
            LlmProvider::OpenAi => ("openai", "openai_api_key", &result.openai_api_key),
        };

        if credential.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingCredential { provider, key }.into());
        }

        check_range("temperature", result.temperature as f64, 0.0, 2.0)?;
        check_range("top_p", result.top_p as f64, 0.0, 1.0)?;
        check_range("top_k", result.top_k as f64, 1.0, u32::MAX as f64)?;
        check_range("max_output_tokens", result.max_output_tokens as f64, 1.0, 65536.0)?;

        Ok(result)
    }
}

fn check_range(key: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value < min || value > max || value.is_nan() {
        return Err(ConfigError::OutOfRange { key, min, max, value });
    }

    Ok(())
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_inner() -> ConfigInner {
        ConfigInner {
            google_api_key: Some("test_key".to_string()),
            gemini_model: default_gemini_model(),
            gemini_base_url: default_gemini_base_url(),
            openai_model: default_openai_model(),
            system_directive: default_system_directive(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            host: default_host(),
            port: default_port(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        let config = Config::new(valid_inner()).unwrap();

        assert_eq!(config.llm_provider, LlmProvider::Gemini);
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert_eq!(config.top_k, 32);
    }

    #[test]
    fn test_missing_google_key_is_fatal() {
        let inner = ConfigInner { google_api_key: None, ..valid_inner() };
        let err = Config::new(inner).unwrap_err();

        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::MissingCredential { key: "google_api_key", .. })));
    }

    #[test]
    fn test_empty_key_counts_as_missing() {
        let inner = ConfigInner { google_api_key: Some(String::new()), ..valid_inner() };
        assert!(Config::new(inner).is_err());
    }

    #[test]
    fn test_openai_provider_requires_openai_key() {
        let inner = ConfigInner { llm_provider: LlmProvider::OpenAi, ..valid_inner() };
        assert!(Config::new(inner).is_err());

        let inner = ConfigInner {
            llm_provider: LlmProvider::OpenAi,
            google_api_key: None,
            openai_api_key: Some("sk-test".to_string()),
            ..valid_inner()
        };
        assert!(Config::new(inner).is_ok());
    }

    #[test]
    fn test_out_of_range_parameters() {
        assert!(Config::new(ConfigInner { temperature: 2.5, ..valid_inner() }).is_err());
        assert!(Config::new(ConfigInner { top_p: 1.2, ..valid_inner() }).is_err());
        assert!(Config::new(ConfigInner { top_k: 0, ..valid_inner() }).is_err());
        assert!(Config::new(ConfigInner { max_output_tokens: 0, ..valid_inner() }).is_err());
    }

    #[test]
    fn test_load_from_file_applies_defaults() {
        let path = std::env::temp_dir().join(format!("support-copilot-config-{}.toml", std::process::id()));
        std::fs::write(&path, "google_api_key = \"file_key\"\ntemperature = 0.5\nport = 9100\n").unwrap();

        let config = Config::load_with(Some(&path), |_| None);
        std::fs::remove_file(&path).unwrap();
        let config = config.unwrap();

        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.port, 9100);
        assert_eq!(config.top_p, 0.95);
        assert_eq!(config.max_output_tokens, 768);
        assert_eq!(config.system_directive, prompts::SYSTEM_DIRECTIVE);
    }

    fn lookup(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| vars.iter().find(|(k, _)| *k == name).map(|(_, v)| v.to_string())
    }

    #[test]
    fn test_load_reads_unprefixed_env_names() {
        let path = std::env::temp_dir().join(format!("support-copilot-empty-{}.toml", std::process::id()));
        std::fs::write(&path, "").unwrap();

        let vars = &[("GOOGLE_API_KEY", "env_key"), ("GEMINI_MODEL", "gemini-2.0-pro"), ("TEMPERATURE", "0.9"), ("TOP_P", "0.5"), ("TOP_K", "7"), ("MAX_OUTPUT_TOKENS", "1024")];
        let config = Config::load_with(Some(&path), lookup(vars));
        std::fs::remove_file(&path).unwrap();
        let config = config.unwrap();

        assert_eq!(config.google_api_key.as_deref(), Some("env_key"));
        assert_eq!(config.gemini_model, "gemini-2.0-pro");
        assert_eq!(config.temperature, 0.9);
        assert_eq!(config.top_p, 0.5);
        assert_eq!(config.top_k, 7);
        assert_eq!(config.max_output_tokens, 1024);
    }

    #[test]
    fn test_config_file_overrides_unprefixed_env_names() {
        let path = std::env::temp_dir().join(format!("support-copilot-override-{}.toml", std::process::id()));
        std::fs::write(&path, "gemini_model = \"gemini-2.5-pro\"\ntop_k = 16\n").unwrap();

        let vars = &[("GOOGLE_API_KEY", "env_key"), ("GEMINI_MODEL", "gemini-2.0-pro"), ("TOP_K", "7")];
        let config = Config::load_with(Some(&path), lookup(vars));
        std::fs::remove_file(&path).unwrap();
        let config = config.unwrap();

        assert_eq!(config.gemini_model, "gemini-2.5-pro");
        assert_eq!(config.top_k, 16);
        assert_eq!(config.google_api_key.as_deref(), Some("env_key"));
    }

    #[test]
    fn test_out_of_range_unprefixed_env_value_is_fatal() {
        let path = std::env::temp_dir().join(format!("support-copilot-range-{}.toml", std::process::id()));
        std::fs::write(&path, "").unwrap();

        let config = Config::load_with(Some(&path), lookup(&[("GOOGLE_API_KEY", "env_key"), ("TEMPERATURE", "3.5")]));
        std::fs::remove_file(&path).unwrap();

        assert!(config.is_err());
    }
}
