//! HTML helper functions

use super::url::url_for;
use crate::config::SiteConfig;

/// Generate a CSS link tag
///
/// # Examples
/// ```ignore
/// css(&config, "palette") // -> <link rel="stylesheet" href="/css/palette.css">
/// ```
pub fn css(config: &SiteConfig, path: &str) -> String {
    let path = if path.ends_with(".css") {
        path.to_string()
    } else {
        format!("{}.css", path)
    };
    format!(
        r#"<link rel="stylesheet" href="{}">"#,
        url_for(config, &format!("css/{}", path.trim_start_matches('/')))
    )
}

/// Generate a JavaScript script tag
pub fn js(config: &SiteConfig, path: &str) -> String {
    let path = if path.ends_with(".js") {
        path.to_string()
    } else {
        format!("{}.js", path)
    };
    format!(
        r#"<script src="{}" defer></script>"#,
        url_for(config, &format!("js/{}", path.trim_start_matches('/')))
    )
}

/// Generate an anchor tag; http(s) targets open in a new tab
pub fn link_to(config: &SiteConfig, path: &str, text: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            html_escape(path),
            html_escape(text)
        )
    } else {
        format!(
            r#"<a href="{}">{}</a>"#,
            url_for(config, path),
            html_escape(text)
        )
    }
}

/// Generate meta generator tag
pub fn meta_generator() -> String {
    format!(
        r#"<meta name="generator" content="folio {}">"#,
        env!("CARGO_PKG_VERSION")
    )
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Truncate a string to a number of characters
pub fn truncate(s: &str, length: usize, omission: Option<&str>) -> String {
    let omission = omission.unwrap_or("...");

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let truncated: String = s
            .chars()
            .take(length.saturating_sub(omission.chars().count()))
            .collect();
        format!("{}{}", truncated.trim_end(), omission)
    }
}

/// Escape XML special characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_and_js() {
        let config = SiteConfig::default();
        assert_eq!(
            css(&config, "palette"),
            r#"<link rel="stylesheet" href="/css/palette.css">"#
        );
        assert!(js(&config, "folio").contains("/js/folio.js"));
    }

    #[test]
    fn test_link_to() {
        let config = SiteConfig::default();
        assert_eq!(link_to(&config, "/blog/", "Blog"), r#"<a href="/blog/">Blog</a>"#);
        assert!(link_to(&config, "https://github.com/x", "GitHub").contains("noopener"));
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>World</b></p>"), "Hello World");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 8, None), "Hello...");
        assert_eq!(truncate("Hi", 10, None), "Hi");
    }

    #[test]
    fn test_escape() {
        assert_eq!(html_escape("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&#39;");
        assert_eq!(escape_xml("'x'"), "&apos;x&apos;");
    }
}
