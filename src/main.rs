use clap::Parser;
use secure_privacy_mcp::utils::logger::{self, LogFormat};
use secure_privacy_mcp::{run_server, AppState, BannerInstaller, CliConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(LogFormat::from_json_flag(cli.json_logs), cli.verbose);

    tracing::info!("Starting secure-privacy-mcp");

    // 解析並驗證配置
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!("Resolved config: {:?}", config);

    let installer = BannerInstaller::from_config(config.integration);
    let state = Arc::new(AppState::new(installer));

    run_server(config.bind, state).await?;
    Ok(())
}
