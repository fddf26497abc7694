use serde::{Deserialize, Serialize};

/// 步驟一的結果：平台上新建立的 domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRegistration {
    pub domain: String,
    pub domain_id: String,
}

/// `POST /api/domain/assign` 的請求內容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateAssignment {
    #[serde(rename = "DomainId")]
    pub domain_id: String,
    #[serde(rename = "PolicyIds")]
    pub policy_ids: Vec<String>,
    #[serde(rename = "TemplateIds")]
    pub template_ids: Vec<String>,
}

impl TemplateAssignment {
    /// Policy 清單目前永遠為空
    pub fn new(domain_id: impl Into<String>, template_ids: Vec<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            policy_ids: Vec::new(),
            template_ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInjectionResult {
    pub domain_id: String,
    pub already_present: bool,
    pub updated_html: String,
}

/// 三個步驟全部成功後的彙總
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    pub registration: DomainRegistration,
    pub templates_assigned: usize,
    pub injection: ScriptInjectionResult,
    pub script_tag: String,
}

impl InstallSummary {
    pub fn render(&self) -> String {
        let status = if self.injection.already_present {
            " (already present)"
        } else {
            ""
        };

        format!(
            "Secure Privacy Cookie Banner Installed Successfully!\n\n\
             Domain registered: {}\n\
             Domain ID: {}\n\
             Templates assigned: {}\n\
             Script tag injected{}:\n\
             {}\n\n\
             Your website now shows a compliant cookie banner and is GDPR compliant!",
            self.registration.domain,
            self.registration.domain_id,
            self.templates_assigned,
            status,
            self.script_tag,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WidgetView {
    pub show_on_pages: Option<Vec<String>>,
    pub hide_on_pages: Option<Vec<String>>,
}

/// `POST /api/domain` 的固定請求內容
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainPayload {
    pub domain: String,
    pub name: Option<String>,
    pub business_name: Option<String>,
    pub blocking: String,
    pub website_questions: Option<serde_json::Value>,
    pub collected_data: Option<serde_json::Value>,
    pub information_collected: Option<serde_json::Value>,
    #[serde(rename = "enableGCM")]
    pub enable_gcm: Option<bool>,
    pub framework: String,
    pub google_consent_mode: String,
    pub microsoft_consent_mode: String,
    pub microsoft_clarity_mode: String,
    pub meta_consent_mode: String,
    pub iab_vendors: Option<serde_json::Value>,
    #[serde(rename = "iabusPrivacyNotices")]
    pub iabus_privacy_notices: Option<serde_json::Value>,
    pub widget_view: WidgetView,
    pub tags: Option<Vec<String>>,
    #[serde(rename = "isV2")]
    pub is_v2: bool,
}

impl DomainPayload {
    /// 預設的 consent mode 組合
    pub fn with_defaults(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            name: None,
            business_name: None,
            blocking: "Manual".to_string(),
            website_questions: None,
            collected_data: None,
            information_collected: None,
            enable_gcm: None,
            framework: "Standard".to_string(),
            google_consent_mode: "GCM_ADVANCED".to_string(),
            microsoft_consent_mode: "UET".to_string(),
            microsoft_clarity_mode: "CLARITY".to_string(),
            meta_consent_mode: "META".to_string(),
            iab_vendors: None,
            iabus_privacy_notices: None,
            widget_view: WidgetView {
                show_on_pages: None,
                hide_on_pages: None,
            },
            tags: None,
            is_v2: true,
        }
    }
}

/// 讀取實體的 `Id`，字串或數字皆可；空字串或其他型別視為沒有
pub fn entity_id(value: &serde_json::Value) -> Option<String> {
    match value.get("Id")? {
        serde_json::Value::String(id) if !id.is_empty() => Some(id.clone()),
        serde_json::Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// 模板列表分頁回應；缺少 `PagedResults` 時視為空。
/// 每一筆分開讀取，單筆格式不符不影響其他筆
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatePage {
    #[serde(rename = "PagedResults", default)]
    pub paged_results: Option<Vec<serde_json::Value>>,
}

impl TemplatePage {
    pub fn len(&self) -> usize {
        self.paged_results.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_ids(self) -> Vec<String> {
        self.paged_results
            .unwrap_or_default()
            .iter()
            .filter_map(entity_id)
            .collect()
    }
}
