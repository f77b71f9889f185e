//! Text-level helpers applied to serialized YAML before it lands in a template

use regex::{Captures, Regex};
use std::sync::LazyLock;

static QUOTED_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"'(\{\{ (?:\.Values\.|index \.Values )[^'\n]* \}\})'|"(\{\{ \.Values\.[^"\\\n]* \}\})""#,
    )
    .expect("valid regex")
});

/// Prefix every non-empty line with `spaces` spaces
pub fn indent(content: &str, spaces: usize) -> String {
    let prefix = " ".repeat(spaces);
    let mut out = String::with_capacity(content.len() + content.lines().count() * spaces);
    for line in content.split_inclusive('\n') {
        if line != "\n" {
            out.push_str(&prefix);
        }
        out.push_str(line);
    }
    out
}

/// Remove trailing newlines and spaces
pub fn trim_trailing(content: &str) -> &str {
    content.trim_end_matches(['\n', ' '])
}

/// Strip the quotes the YAML serializer puts around placeholders.
///
/// `key: '{{ .Values.a.b }}'` becomes `key: {{ .Values.a.b }}` so Helm
/// renders the value with its native type.
pub fn unquote_placeholders(yaml: &str) -> String {
    QUOTED_PLACEHOLDER
        .replace_all(yaml, |caps: &Captures| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        })
        .into_owned()
}
