//! Provider configuration

use super::{AnthropicService, LlmError, LlmService, LoggingService};
use std::sync::Arc;

pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";

/// Configuration for the text-generation provider
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub anthropic_api_key: Option<String>,
    /// Gateway base URL; when set the gateway handles authentication
    pub gateway: Option<String>,
    /// Model override
    pub model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            gateway: std::env::var("LLM_GATEWAY").ok(),
            model: std::env::var("FAMILY_MODEL").ok(),
        }
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Build the provider, wrapped with logging.
    ///
    /// Fails with an `Auth` error when no usable credential is configured.
    pub fn build_service(&self) -> Result<Arc<dyn LlmService>, LlmError> {
        // In gateway mode, use "implicit" as the API key
        let api_key = if self.gateway.is_some() {
            "implicit".to_string()
        } else {
            match self.anthropic_api_key.as_deref().map(str::trim) {
                Some(key) if !key.is_empty() => key.to_string(),
                _ => {
                    return Err(LlmError::auth(
                        "API key not configured. Please set the ANTHROPIC_API_KEY environment variable.",
                    ))
                }
            }
        };

        let service = AnthropicService::new(api_key, self.model(), self.gateway.as_deref())?;
        Ok(Arc::new(LoggingService::new(Arc::new(service))))
    }
}
