use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallError {
    /// 缺少必要設定（例如 API key）
    #[error("{message}")]
    ConfigError { message: String },

    /// Consent Platform 回傳錯誤或連線失敗
    #[error("{message}")]
    UpstreamError { message: String },

    /// 無法取得或解析網站 HTML
    #[error("{message}")]
    ContentFetchError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl InstallError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamError {
            message: message.into(),
        }
    }

    pub fn content(message: impl Into<String>) -> Self {
        Self::ContentFetchError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InstallError>;
