use crate::utils::error::{InstallError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

const URL_SCHEMES: &[&str] = &["http", "https"];

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> InstallError {
    InstallError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 上游與內容來源都必須是有 host 的 http(s) URL
pub fn validate_url(field_name: &str, url_str: &str) -> Result<Url> {
    if url_str.trim().is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;
    if !URL_SCHEMES.contains(&url.scheme()) {
        return Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field_name, url_str, "URL has no host"));
    }

    Ok(url)
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}
