//! Regex-level scanning of `<script>` tags in rendered listing pages.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script\b[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

static SCRIPT_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("valid regex")
});

static TYPE_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)type\s*=\s*["']?([^"'\s>]+)"#).expect("valid regex")
});

/// An inline `<script>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScriptBlock<'a> {
    /// Lowercased `type` attribute, if any.
    pub script_type: Option<String>,
    pub body: &'a str,
}

/// Returns every `<script src>` value in document order, with `&amp;`
/// decoded.
pub(crate) fn script_sources(html: &str) -> Vec<String> {
    SCRIPT_SRC_RE
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim().replace("&amp;", "&"))
        .filter(|src| !src.is_empty())
        .collect()
}

/// Returns every `<script>` element with a non-blank body.
pub(crate) fn script_blocks(html: &str) -> Vec<ScriptBlock<'_>> {
    SCRIPT_BLOCK_RE
        .captures_iter(html)
        .filter_map(|cap| {
            let attrs = cap.get(1).map_or("", |m| m.as_str());
            let body = cap.get(2)?.as_str().trim();
            if body.is_empty() {
                return None;
            }
            let script_type = TYPE_ATTR_RE
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_ascii_lowercase());
            Some(ScriptBlock { script_type, body })
        })
        .collect()
}
