//! Model provider implementations for thoughtloop.
//!
//! All providers implement the `thoughtloop_core::Provider` trait.
//! [`build_from_config`] wires the configured backend.

pub mod anthropic;

use std::sync::Arc;

use thoughtloop_config::AppConfig;
use thoughtloop_core::error::ProviderError;
use thoughtloop_core::provider::{GenerationSettings, Provider};

pub use anthropic::AnthropicProvider;

/// Build the provider described by `config`.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured(
            "no API key; set THOUGHTLOOP_API_KEY or ANTHROPIC_API_KEY".into(),
        )
    })?;

    let provider = AnthropicProvider::new(api_key)?.with_base_url(&config.base_url);
    Ok(Arc::new(provider))
}

/// Generation parameters taken from `config`.
pub fn generation_settings(config: &AppConfig) -> GenerationSettings {
    GenerationSettings {
        model: config.model.clone(),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        top_p: config.top_p,
        top_k: config.top_k,
    }
}
