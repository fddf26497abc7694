use crate::config::toml_config::TomlConfig;
use crate::config::IntegrationConfig;
use crate::utils::error::{InstallError, Result};
use crate::utils::validation::Validate;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

#[derive(Clone, Parser)]
#[command(name = "secure-privacy-mcp")]
#[command(about = "MCP server that installs the Secure Privacy cookie consent banner")]
pub struct CliConfig {
    #[arg(long, help = "Address to listen on [default: 127.0.0.1:8787]")]
    pub bind: Option<SocketAddr>,

    #[arg(long, env = "SECURE_PRIVACY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub api_base_url: Option<String>,

    #[arg(long)]
    pub script_base_url: Option<String>,

    #[arg(long, help = "URL of the site HTML to inject the banner script into")]
    pub content_source_url: Option<String>,

    #[arg(long, help = "Domain id used when the platform response has no Id")]
    pub fallback_domain_id: Option<String>,

    #[arg(long, help = "Optional TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

/// 啟動伺服器所需的完整設定
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub bind: SocketAddr,
    pub integration: IntegrationConfig,
}

impl CliConfig {
    /// 預設值 < 設定檔 < 命令列參數
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let file = match &self.config {
            Some(path) => {
                tracing::info!("📄 Loading config file: {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        let mut integration = file.apply_to(IntegrationConfig::new(self.api_key.clone()));
        if let Some(url) = &self.api_base_url {
            integration.api_base_url = url.clone();
        }
        if let Some(url) = &self.script_base_url {
            integration.script_base_url = url.clone();
        }
        if let Some(url) = &self.content_source_url {
            integration.content_source_url = url.clone();
        }
        if let Some(id) = &self.fallback_domain_id {
            integration.fallback_domain_id = id.clone();
        }
        integration.validate()?;

        let bind = match (self.bind, file.server.bind.as_deref()) {
            (Some(addr), _) => addr,
            (None, Some(raw)) => raw
                .parse()
                .map_err(|e| InstallError::InvalidConfigValueError {
                    field: "server.bind".to_string(),
                    value: raw.to_string(),
                    reason: format!("{}", e),
                })?,
            (None, None) => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|e| InstallError::config(format!("Invalid default bind address: {}", e)))?,
        };

        Ok(ResolvedConfig { bind, integration })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["secure-privacy-mcp"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_without_flags() {
        let resolved = parse(&["--api-key", "k"]).resolve().unwrap();
        assert_eq!(resolved.bind.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(resolved.integration.api_key(), Some("k"));
        assert_eq!(
            resolved.integration.content_source_url,
            crate::config::DEFAULT_CONTENT_SOURCE_URL
        );
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
bind = "0.0.0.0:9000"

[integration]
api_base_url = "http://file.example:1"
content_source_url = "http://file.example:1/index.html"
"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let resolved = parse(&[
            "--config",
            path.as_str(),
            "--api-base-url",
            "http://flag.example:2",
        ])
        .resolve()
        .unwrap();

        assert_eq!(resolved.bind.to_string(), "0.0.0.0:9000");
        assert_eq!(resolved.integration.api_base_url, "http://flag.example:2");
        assert_eq!(
            resolved.integration.content_source_url,
            "http://file.example:1/index.html"
        );
    }

    #[test]
    fn test_invalid_bind_in_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind = \"nowhere\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let err = parse(&["--config", path.as_str()]).resolve().unwrap_err();
        assert!(matches!(err, InstallError::InvalidConfigValueError { .. }));
    }
}
