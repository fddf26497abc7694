use crate::domain::model::ScriptInjectionResult;

/// `<script src="{script_base}/{domain_id}.js"></script>`
pub fn script_tag(script_base_url: &str, domain_id: &str) -> String {
    format!(
        r#"<script src="{}/{}.js"></script>"#,
        script_base_url.trim_end_matches('/'),
        domain_id
    )
}

/// 不含 scheme 的 script 位置，http/https 或 `//` 開頭的引用都算
fn script_marker(script_base_url: &str, domain_id: &str) -> String {
    let base = script_base_url.trim_end_matches('/');
    let base = base.split_once("://").map_or(base, |(_, rest)| rest);
    format!("{}/{}", base, domain_id)
}

/// 判斷 HTML 是否已含有此 domain 的 script
pub fn contains_script(html: &str, script_base_url: &str, domain_id: &str) -> bool {
    html.contains(&script_marker(script_base_url, domain_id))
}

/// 在 `</head>` 前插入 script，其次是 `</body>`，都沒有就附加在結尾
pub fn inject_script_tag(html: &str, script_base_url: &str, domain_id: &str) -> ScriptInjectionResult {
    if contains_script(html, script_base_url, domain_id) {
        return ScriptInjectionResult {
            domain_id: domain_id.to_string(),
            already_present: true,
            updated_html: html.to_string(),
        };
    }

    let tag = script_tag(script_base_url, domain_id);
    let updated_html = if html.contains("</head>") {
        html.replacen("</head>", &format!("{}\n</head>", tag), 1)
    } else if html.contains("</body>") {
        html.replacen("</body>", &format!("{}\n</body>", tag), 1)
    } else {
        format!("{}\n{}", html, tag)
    };

    ScriptInjectionResult {
        domain_id: domain_id.to_string(),
        already_present: false,
        updated_html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://app.secureprivacy.ai/script";

    fn tag(id: &str) -> String {
        script_tag(BASE, id)
    }

    #[test]
    fn test_script_tag() {
        assert_eq!(
            tag("abc123"),
            r#"<script src="https://app.secureprivacy.ai/script/abc123.js"></script>"#
        );
        assert_eq!(script_tag("https://app.secureprivacy.ai/script/", "x"), tag("x"));
    }

    #[test]
    fn test_inject_before_head() {
        let html = "<html><head><title>t</title></head><body></body></html>";
        let result = inject_script_tag(html, BASE, "abc123");

        assert!(!result.already_present);
        assert_eq!(
            result.updated_html,
            format!(
                "<html><head><title>t</title>{}\n</head><body></body></html>",
                tag("abc123")
            )
        );
    }

    #[test]
    fn test_inject_before_body_without_head() {
        let html = "<html><body><p>hi</p></body></html>";
        let result = inject_script_tag(html, BASE, "abc123");

        assert_eq!(
            result.updated_html,
            format!("<html><body><p>hi</p>{}\n</body></html>", tag("abc123"))
        );
    }

    #[test]
    fn test_append_without_markers() {
        let html = "<p>fragment</p>";
        let result = inject_script_tag(html, BASE, "abc123");

        assert!(!result.already_present);
        assert_eq!(result.updated_html, format!("<p>fragment</p>\n{}", tag("abc123")));
        assert!(result.updated_html.ends_with(&tag("abc123")));
    }

    #[test]
    fn test_already_present_leaves_html_unchanged() {
        let html = format!("<html><head>{}</head></html>", tag("abc123"));
        let result = inject_script_tag(&html, BASE, "abc123");

        assert!(result.already_present);
        assert_eq!(result.updated_html, html);
    }

    #[test]
    fn test_other_domain_script_is_not_a_match() {
        let html = format!("<html><head>{}</head></html>", tag("other"));
        let result = inject_script_tag(&html, BASE, "abc123");

        assert!(!result.already_present);
        assert!(result.updated_html.contains(&tag("abc123")));
        assert!(result.updated_html.contains(&tag("other")));
    }

    #[test]
    fn test_only_first_head_marker_is_used() {
        let html = "<head></head><template><head></head></template>";
        let result = inject_script_tag(html, BASE, "d");
        assert_eq!(result.updated_html.matches(&tag("d")).count(), 1);
    }

    #[test]
    fn test_custom_script_base_is_detected() {
        let base = "https://cdn.example.org/sp";
        let html = "<html><head></head><body></body></html>";

        let first = inject_script_tag(html, base, "abc123");
        assert!(!first.already_present);
        assert!(first.updated_html.contains(r#"<script src="https://cdn.example.org/sp/abc123.js"></script>"#));

        let second = inject_script_tag(&first.updated_html, base, "abc123");
        assert!(second.already_present);
        assert_eq!(second.updated_html.matches("cdn.example.org/sp/abc123.js").count(), 1);
    }

    #[test]
    fn test_marker_ignores_scheme() {
        let html = r#"<script src="//app.secureprivacy.ai/script/abc123.js"></script>"#;
        assert!(contains_script(html, BASE, "abc123"));
        assert!(contains_script(html, "http://app.secureprivacy.ai/script/", "abc123"));
        assert!(!contains_script(html, "https://cdn.example.org/sp", "abc123"));
    }
}
