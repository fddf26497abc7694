use crate::domain::model::{DomainPayload, TemplateAssignment};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Secure Privacy 平台 API
#[async_trait]
pub trait ConsentPlatform: Send + Sync {
    /// 建立 domain，回傳平台指派的 id（平台未回傳時為 `None`）
    async fn create_domain(&self, api_key: &str, payload: &DomainPayload) -> Result<Option<String>>;

    /// 取得模板 header 的 id 清單
    async fn list_template_ids(&self, api_key: &str, is_design_template: bool) -> Result<Vec<String>>;

    async fn assign_templates(&self, api_key: &str, assignment: &TemplateAssignment) -> Result<()>;
}

/// 網站 HTML 的來源
#[async_trait]
pub trait SiteContentStore: Send + Sync {
    async fn fetch_html(&self) -> Result<String>;

    async fn deploy_html(&self, html: &str) -> Result<()>;
}
