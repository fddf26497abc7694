use crate::config::IntegrationConfig;
use crate::utils::error::{InstallError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 可選的 TOML 設定檔；未填的欄位沿用預設值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub integration: IntegrationSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationSection {
    pub api_base_url: Option<String>,
    pub script_base_url: Option<String>,
    pub content_source_url: Option<String>,
    pub fallback_domain_id: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| InstallError::ConfigError {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// 以檔案內容覆蓋 `base` 中的欄位
    pub fn apply_to(&self, mut base: IntegrationConfig) -> IntegrationConfig {
        let section = &self.integration;
        if let Some(url) = &section.api_base_url {
            base.api_base_url = url.clone();
        }
        if let Some(url) = &section.script_base_url {
            base.script_base_url = url.clone();
        }
        if let Some(url) = &section.content_source_url {
            base.content_source_url = url.clone();
        }
        if let Some(id) = &section.fallback_domain_id {
            base.fallback_domain_id = id.clone();
        }
        base
    }
}
