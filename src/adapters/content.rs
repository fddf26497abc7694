use crate::domain::ports::SiteContentStore;
use crate::utils::error::{InstallError, Result};
use reqwest::Client;

/// 部署日誌只顯示前 500 個字元
const DEPLOY_PREVIEW_CHARS: usize = 500;

/// 透過 HTTP 讀取網站 HTML；部署尚未實作，只記錄日誌
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    source_url: String,
    client: Client,
}

impl HttpContentStore {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self::with_client(source_url, Client::new())
    }

    pub fn with_client(source_url: impl Into<String>, client: Client) -> Self {
        Self {
            source_url: source_url.into(),
            client,
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

pub fn deploy_preview(html: &str) -> String {
    html.chars().take(DEPLOY_PREVIEW_CHARS).collect()
}

#[async_trait::async_trait]
impl SiteContentStore for HttpContentStore {
    async fn fetch_html(&self) -> Result<String> {
        tracing::debug!("📥 Fetching site HTML from {}", self.source_url);

        let response = self
            .client
            .get(&self.source_url)
            .send()
            .await
            .map_err(|e| InstallError::content(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallError::content(format!(
                "Fetching {} returned status {}",
                self.source_url, status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| InstallError::content(e.to_string()))
    }

    async fn deploy_html(&self, html: &str) -> Result<()> {
        // TODO: push the updated HTML back to the hosting provider (Pages API, object storage or git)
        tracing::info!("🚧 Would deploy updated HTML: {}", deploy_preview(html));
        Ok(())
    }
}
