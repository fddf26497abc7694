#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use std::fmt;

pub const API_KEY_ENV: &str = "SECURE_PRIVACY_API_KEY";
pub const DEFAULT_API_BASE_URL: &str = "https://api-prod.secureprivacy.ai";
pub const DEFAULT_SCRIPT_BASE_URL: &str = "https://app.secureprivacy.ai/script";
/// 佔位用的網站來源，整合時應換成實際的網站
pub const DEFAULT_CONTENT_SOURCE_URL: &str = "https://your-site.pages.dev/index.html";
/// 平台回應缺少 `Id` 時使用的替代 id
pub const DEFAULT_FALLBACK_DOMAIN_ID: &str = "00000000-0000-0000-0000-000000000000";

/// 安裝流程所需的全部設定，於建構 orchestrator 時傳入
#[derive(Clone)]
pub struct IntegrationConfig {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub script_base_url: String,
    pub content_source_url: String,
    pub fallback_domain_id: String,
}

impl IntegrationConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// 空字串的 key 視為未設定
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_content_source_url(mut self, url: impl Into<String>) -> Self {
        self.content_source_url = url.into();
        self
    }

    pub fn with_script_base_url(mut self, url: impl Into<String>) -> Self {
        self.script_base_url = url.into();
        self
    }

    pub fn with_fallback_domain_id(mut self, id: impl Into<String>) -> Self {
        self.fallback_domain_id = id.into();
        self
    }
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            script_base_url: DEFAULT_SCRIPT_BASE_URL.to_string(),
            content_source_url: DEFAULT_CONTENT_SOURCE_URL.to_string(),
            fallback_domain_id: DEFAULT_FALLBACK_DOMAIN_ID.to_string(),
        }
    }
}

impl fmt::Debug for IntegrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationConfig")
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("script_base_url", &self.script_base_url)
            .field("content_source_url", &self.content_source_url)
            .field("fallback_domain_id", &self.fallback_domain_id)
            .finish()
    }
}

impl Validate for IntegrationConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_base_url", &self.api_base_url)?;
        validate_url("script_base_url", &self.script_base_url)?;
        validate_url("content_source_url", &self.content_source_url)?;
        validate_non_empty_string("fallback_domain_id", &self.fallback_domain_id)?;

        // 沒有 key 仍可啟動，工具呼叫時才回報錯誤
        if self.api_key().is_none() {
            tracing::warn!("⚠️ {} is not set; tool calls will fail until it is configured", API_KEY_ENV);
        }

        tracing::debug!("✅ Integration configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IntegrationConfig::default();
        assert_eq!(config.api_base_url, "https://api-prod.secureprivacy.ai");
        assert_eq!(config.content_source_url, "https://your-site.pages.dev/index.html");
        assert!(config.api_key().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = IntegrationConfig::new(Some("   ".to_string()));
        assert!(config.api_key().is_none());

        let config = IntegrationConfig::new(Some("sk_live".to_string()));
        assert_eq!(config.api_key(), Some("sk_live"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = IntegrationConfig::new(Some("super-secret".to_string()));
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_invalid_urls_rejected() {
        let config = IntegrationConfig::default().with_content_source_url("not a url");
        assert!(config.validate().is_err());

        let config = IntegrationConfig::default().with_fallback_domain_id(" ");
        assert!(config.validate().is_err());
    }
}
