use crate::domain::model::{entity_id, DomainPayload, TemplateAssignment, TemplatePage};
use crate::domain::ports::ConsentPlatform;
use crate::utils::error::{InstallError, Result};
use reqwest::{Client, Response};

/// 不分頁：一次取回全部模板 header
const RESULTS_PER_PAGE: &str = "999999";

/// Secure Privacy REST API 客戶端
#[derive(Debug, Clone)]
pub struct SecurePrivacyClient {
    base_url: String,
    client: Client,
}

impl SecurePrivacyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 非 2xx 回應轉成 `UpstreamError`，錯誤內容為回應 body
    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!("Upstream error response: status={} body={}", status, body);
        Err(InstallError::upstream(upstream_message(status, &body)))
    }
}

fn transport_error(err: reqwest::Error) -> InstallError {
    InstallError::upstream(err.to_string())
}

/// body 一律序列化成單行 JSON：JSON 重新序列化，純文字則成為 JSON 字串
fn upstream_message(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return format!("Request failed with status code {}", status.as_u16());
    }

    let value = serde_json::from_str::<serde_json::Value>(body)
        .unwrap_or_else(|_| serde_json::Value::String(body.to_string()));
    serde_json::to_string(&value).unwrap_or_else(|_| body.to_string())
}

/// 取出回應中的 `Id`，字串或數字皆可
fn extract_domain_id(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    entity_id(&value)
}

#[async_trait::async_trait]
impl ConsentPlatform for SecurePrivacyClient {
    async fn create_domain(&self, api_key: &str, payload: &DomainPayload) -> Result<Option<String>> {
        let url = self.endpoint("/api/domain");
        tracing::debug!("📡 POST {} (domain: {})", url, payload.domain);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await
            .map_err(transport_error)?;
        let response = Self::ensure_success(response).await?;

        let body = response.text().await.map_err(transport_error)?;
        Ok(extract_domain_id(&body))
    }

    async fn list_template_ids(&self, api_key: &str, is_design_template: bool) -> Result<Vec<String>> {
        let url = self.endpoint("/api/template");
        let is_design = if is_design_template { "true" } else { "false" };
        tracing::debug!("📡 GET {} (isDesignTemplate={})", url, is_design);

        let response = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .query(&[
                ("isDesignTemplate", is_design),
                ("pageNumber", "1"),
                ("resultsPerPage", RESULTS_PER_PAGE),
                ("onlyHeaders", "true"),
            ])
            .send()
            .await
            .map_err(transport_error)?;
        let response = Self::ensure_success(response).await?;

        let body = response.text().await.map_err(transport_error)?;
        let page = match serde_json::from_str::<TemplatePage>(&body) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("⚠️ Unexpected template list response, treating as empty: {}", e);
                TemplatePage::default()
            }
        };

        let total = page.len();
        let ids = page.into_ids();
        if ids.len() < total {
            tracing::warn!("⚠️ Skipped {} template entries without a usable Id", total - ids.len());
        }

        Ok(ids)
    }

    async fn assign_templates(&self, api_key: &str, assignment: &TemplateAssignment) -> Result<()> {
        let url = self.endpoint("/api/domain/assign");
        tracing::debug!(
            "📡 POST {} ({} templates -> {})",
            url,
            assignment.template_ids.len(),
            assignment.domain_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(assignment)
            .send()
            .await
            .map_err(transport_error)?;
        Self::ensure_success(response).await?;

        Ok(())
    }
}
