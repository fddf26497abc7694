use crate::config::IntegrationConfig;
use crate::core::injection::{inject_script_tag, script_tag};
use crate::domain::model::{
    DomainPayload, DomainRegistration, InstallSummary, ScriptInjectionResult, TemplateAssignment,
};
use crate::domain::ports::{ConsentPlatform, SiteContentStore};
use crate::utils::error::{InstallError, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;
use std::sync::Arc;

const PLACEHOLDER_LABEL_LEN: usize = 13;

/// 失敗的步驟，用於組成工具回應文字
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStep {
    RegisterDomain,
    AssignTemplates,
    InjectScript,
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            InstallStep::RegisterDomain => "add domain",
            InstallStep::AssignTemplates => "assign templates",
            InstallStep::InjectScript => "inject script",
        };
        f.write_str(action)
    }
}

#[derive(Debug)]
pub struct StepFailure {
    pub step: InstallStep,
    pub error: InstallError,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to {}: {}", self.step, self.error)
    }
}

impl std::error::Error for StepFailure {}

/// 工具呼叫的純文字結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub text: String,
    pub is_error: bool,
}

/// 依序執行 register → assign-templates → inject-script，遇到第一個錯誤即停止
pub struct BannerInstaller {
    config: IntegrationConfig,
    platform: Arc<dyn ConsentPlatform>,
    content: Arc<dyn SiteContentStore>,
}

impl BannerInstaller {
    pub fn new(
        config: IntegrationConfig,
        platform: Arc<dyn ConsentPlatform>,
        content: Arc<dyn SiteContentStore>,
    ) -> Self {
        Self {
            config,
            platform,
            content,
        }
    }

    /// 使用真實的 HTTP adapters
    pub fn from_config(config: IntegrationConfig) -> Self {
        let platform = Arc::new(crate::adapters::SecurePrivacyClient::new(
            config.api_base_url.clone(),
        ));
        let content = Arc::new(crate::adapters::HttpContentStore::new(
            config.content_source_url.clone(),
        ));
        Self::new(config, platform, content)
    }

    pub fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str> {
        self.config.api_key().ok_or_else(|| {
            InstallError::config(format!("{} not configured", crate::config::API_KEY_ENV))
        })
    }

    pub fn script_tag(&self, domain_id: &str) -> String {
        script_tag(&self.config.script_base_url, domain_id)
    }

    /// 步驟一：以預設設定建立 domain
    pub async fn register_domain(&self) -> Result<DomainRegistration> {
        let api_key = self.api_key()?;
        let domain = placeholder_domain();
        let payload = DomainPayload::with_defaults(domain.clone());

        let domain_id = match self.platform.create_domain(api_key, &payload).await? {
            Some(id) => id,
            None => {
                // 平台有時不回傳 Id，沿用替代 id
                tracing::warn!(
                    "⚠️ Domain creation response had no Id, using fallback {}",
                    self.config.fallback_domain_id
                );
                self.config.fallback_domain_id.clone()
            }
        };

        Ok(DomainRegistration { domain, domain_id })
    }

    /// 步驟二：把所有模板（非設計 + 設計）指派給 domain，回傳數量
    pub async fn assign_templates(&self, domain_id: &str) -> Result<usize> {
        let api_key = self.api_key()?;

        let mut template_ids = self.platform.list_template_ids(api_key, false).await?;
        tracing::debug!("Fetched {} non-design templates", template_ids.len());

        let design_ids = self.platform.list_template_ids(api_key, true).await?;
        tracing::debug!("Fetched {} design templates", design_ids.len());
        template_ids.extend(design_ids);

        let assignment = TemplateAssignment::new(domain_id, template_ids);
        self.platform.assign_templates(api_key, &assignment).await?;

        Ok(assignment.template_ids.len())
    }

    /// 步驟三：在網站 HTML 中插入 script
    pub async fn inject_script(&self, domain_id: &str) -> Result<ScriptInjectionResult> {
        let html = self.content.fetch_html().await?;
        let result = inject_script_tag(&html, &self.config.script_base_url, domain_id);

        if result.already_present {
            tracing::info!("Script for {} already present, nothing to deploy", domain_id);
        } else {
            self.content.deploy_html(&result.updated_html).await?;
        }

        Ok(result)
    }

    pub async fn install_banner(&self) -> std::result::Result<InstallSummary, StepFailure> {
        tracing::info!("🚀 Starting Secure Privacy installation...");

        let registration = self.register_domain().await.map_err(|error| StepFailure {
            step: InstallStep::RegisterDomain,
            error,
        })?;
        tracing::info!(
            "✅ Domain added: {} ({})",
            registration.domain,
            registration.domain_id
        );

        let templates_assigned = self
            .assign_templates(&registration.domain_id)
            .await
            .map_err(|error| StepFailure {
                step: InstallStep::AssignTemplates,
                error,
            })?;
        tracing::info!("✅ Templates assigned: {}", templates_assigned);

        let injection = self
            .inject_script(&registration.domain_id)
            .await
            .map_err(|error| StepFailure {
                step: InstallStep::InjectScript,
                error,
            })?;
        tracing::info!(
            "✅ Script injected (already present: {})",
            injection.already_present
        );

        let script_tag = self.script_tag(&registration.domain_id);
        Ok(InstallSummary {
            registration,
            templates_assigned,
            injection,
            script_tag,
        })
    }

    /// MCP 工具入口：錯誤一律轉成文字，不會向外拋出
    pub async fn run_tool(&self) -> ToolOutcome {
        match self.install_banner().await {
            Ok(summary) => ToolOutcome {
                text: summary.render(),
                is_error: false,
            },
            Err(failure) => {
                tracing::error!("❌ {}", failure);
                ToolOutcome {
                    text: failure.to_string(),
                    is_error: true,
                }
            }
        }
    }
}

/// `https://{13 個隨機小寫英數字}.example.com`
pub fn placeholder_domain() -> String {
    let label: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PLACEHOLDER_LABEL_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("https://{}.example.com", label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MockPlatform {
        domain_id: Option<String>,
        fail_create: bool,
        template_pages: Mutex<VecDeque<Vec<String>>>,
        fail_assign: bool,
        create_calls: AtomicUsize,
        list_calls: AtomicUsize,
        assigned: Mutex<Option<TemplateAssignment>>,
    }

    impl MockPlatform {
        fn with_domain_id(id: Option<&str>) -> Self {
            Self {
                domain_id: id.map(str::to_string),
                ..Self::default()
            }
        }

        fn with_pages(self, pages: Vec<Vec<&str>>) -> Self {
            let pages = pages
                .into_iter()
                .map(|ids| ids.into_iter().map(str::to_string).collect())
                .collect();
            Self {
                template_pages: Mutex::new(pages),
                ..self
            }
        }
    }

    #[async_trait::async_trait]
    impl ConsentPlatform for MockPlatform {
        async fn create_domain(&self, _api_key: &str, _payload: &DomainPayload) -> Result<Option<String>> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_create {
                return Err(InstallError::upstream(r#"{"Message":"Invalid token"}"#));
            }
            Ok(self.domain_id.clone())
        }

        async fn list_template_ids(&self, _api_key: &str, _is_design: bool) -> Result<Vec<String>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.template_pages.lock().await.pop_front().unwrap_or_default())
        }

        async fn assign_templates(&self, _api_key: &str, assignment: &TemplateAssignment) -> Result<()> {
            if self.fail_assign {
                return Err(InstallError::upstream("Request failed with status code 500"));
            }
            *self.assigned.lock().await = Some(assignment.clone());
            Ok(())
        }
    }

    struct MockContent {
        html: String,
        fetch_calls: AtomicUsize,
        deployed: Mutex<Vec<String>>,
    }

    impl MockContent {
        fn new(html: &str) -> Self {
            Self {
                html: html.to_string(),
                fetch_calls: AtomicUsize::new(0),
                deployed: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl SiteContentStore for MockContent {
        async fn fetch_html(&self) -> Result<String> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.html.clone())
        }

        async fn deploy_html(&self, html: &str) -> Result<()> {
            self.deployed.lock().await.push(html.to_string());
            Ok(())
        }
    }

    fn installer(
        api_key: Option<&str>,
        platform: Arc<MockPlatform>,
        content: Arc<MockContent>,
    ) -> BannerInstaller {
        let config = IntegrationConfig::new(api_key.map(str::to_string))
            .with_fallback_domain_id("fallback-id");
        BannerInstaller::new(config, platform, content)
    }

    #[test]
    fn test_placeholder_domain_shape() {
        let domain = placeholder_domain();
        let label = domain
            .strip_prefix("https://")
            .and_then(|rest| rest.strip_suffix(".example.com"))
            .unwrap();
        assert_eq!(label.len(), 13);
        assert!(label.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_missing_api_key_skips_network() {
        let platform = Arc::new(MockPlatform::with_domain_id(Some("abc123")));
        let content = Arc::new(MockContent::new("<html></html>"));
        let installer = installer(None, platform.clone(), content.clone());

        let outcome = installer.run_tool().await;

        assert!(outcome.is_error);
        assert!(outcome.text.contains("not configured"));
        assert_eq!(
            outcome.text,
            "Failed to add domain: SECURE_PRIVACY_API_KEY not configured"
        );
        assert_eq!(platform.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(content.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_register_uses_platform_id() {
        let platform = Arc::new(MockPlatform::with_domain_id(Some("abc123")));
        let installer = installer(Some("k"), platform, Arc::new(MockContent::new("")));

        let registration = installer.register_domain().await.unwrap();
        assert_eq!(registration.domain_id, "abc123");
        assert!(registration.domain.ends_with(".example.com"));
    }

    #[tokio::test]
    async fn test_register_falls_back_without_id() {
        let platform = Arc::new(MockPlatform::with_domain_id(None));
        let installer = installer(Some("k"), platform, Arc::new(MockContent::new("")));

        let registration = installer.register_domain().await.unwrap();
        assert_eq!(registration.domain_id, "fallback-id");
    }

    #[tokio::test]
    async fn test_assign_collects_both_template_kinds() {
        let platform = Arc::new(
            MockPlatform::with_domain_id(Some("d1")).with_pages(vec![vec!["t1"], vec!["t2", "t3"]]),
        );
        let installer = installer(Some("k"), platform.clone(), Arc::new(MockContent::new("")));

        let count = installer.assign_templates("d1").await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(platform.list_calls.load(Ordering::SeqCst), 2);
        let assigned = platform.assigned.lock().await.clone().unwrap();
        assert_eq!(assigned.domain_id, "d1");
        assert_eq!(assigned.template_ids, vec!["t1", "t2", "t3"]);
        assert!(assigned.policy_ids.is_empty());
    }

    #[tokio::test]
    async fn test_assign_failure_skips_injection() {
        let platform = Arc::new(MockPlatform {
            domain_id: Some("d1".to_string()),
            fail_assign: true,
            ..MockPlatform::default()
        });
        let content = Arc::new(MockContent::new("<html><head></head></html>"));
        let installer = installer(Some("k"), platform, content.clone());

        let outcome = installer.run_tool().await;

        assert!(outcome.is_error);
        assert_eq!(
            outcome.text,
            "Failed to assign templates: Request failed with status code 500"
        );
        assert_eq!(content.fetch_calls.load(Ordering::SeqCst), 0);
        assert!(content.deployed.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_surfaces_upstream_body() {
        let platform = Arc::new(MockPlatform {
            fail_create: true,
            ..MockPlatform::default()
        });
        let installer = installer(Some("k"), platform.clone(), Arc::new(MockContent::new("")));

        let failure = installer.install_banner().await.unwrap_err();
        assert_eq!(failure.step, InstallStep::RegisterDomain);
        assert_eq!(
            failure.to_string(),
            r#"Failed to add domain: {"Message":"Invalid token"}"#
        );
        assert_eq!(platform.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_inject_already_present_does_not_deploy() {
        let html = r#"<html><head><script src="https://app.secureprivacy.ai/script/d1.js"></script></head></html>"#;
        let content = Arc::new(MockContent::new(html));
        let installer = installer(
            Some("k"),
            Arc::new(MockPlatform::default()),
            content.clone(),
        );

        let result = installer.inject_script("d1").await.unwrap();

        assert!(result.already_present);
        assert_eq!(result.updated_html, html);
        assert!(content.deployed.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_full_install_success() {
        let platform = Arc::new(
            MockPlatform::with_domain_id(Some("abc123")).with_pages(vec![vec!["t1"], vec!["t2"]]),
        );
        let content = Arc::new(MockContent::new("<html><head></head><body></body></html>"));
        let installer = installer(Some("k"), platform, content.clone());

        let outcome = installer.run_tool().await;

        assert!(!outcome.is_error);
        assert!(outcome.text.contains("Domain ID: abc123"));
        assert!(outcome.text.contains("Templates assigned: 2"));
        assert!(outcome.text.contains("Script tag injected:\n"));
        assert!(outcome
            .text
            .contains(r#"<script src="https://app.secureprivacy.ai/script/abc123.js"></script>"#));

        let deployed = content.deployed.lock().await;
        assert_eq!(deployed.len(), 1);
        assert!(deployed[0].contains("abc123.js"));
    }
}
