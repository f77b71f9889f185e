//! Dotted paths into the values store
//!
//! A [`ValuePath`] names one location in `values.yaml`. The same path is used
//! to write the extracted value and to build the template placeholder that
//! reads it back, so the two can never drift apart.

use std::fmt;

/// Ordered, non-empty sequence of key segments.
///
/// Paths are never extended in place: [`ValuePath::child`] returns a new path,
/// so sibling branches of a recursive walk cannot observe each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValuePath {
    segments: Vec<String>,
}

impl ValuePath {
    /// Create a single-segment root path (e.g. `managerConfig`)
    pub fn root(segment: impl Into<String>) -> Self {
        Self {
            segments: vec![segment.into()],
        }
    }

    /// Build a path from segments, `None` if there are none
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    /// Parse a dotted path (`a.b.c`). Empty segments are rejected.
    pub fn parse(dotted: &str) -> Option<Self> {
        if dotted.split('.').any(str::is_empty) {
            return None;
        }
        Self::from_segments(dotted.split('.'))
    }

    /// Return a new path with `key` appended
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(key.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Dotted form, e.g. `managerConfig.health.healthProbeBindAddress`
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// Helm expression reading this path from `.Values`.
    ///
    /// Field access (`.Values.a.b`) only works when every segment is a Go
    /// template identifier. Otherwise the `index` form is used, which keeps
    /// keys such as `my-key` or `dotted.key` as single segments.
    pub fn placeholder(&self) -> String {
        if self.segments.iter().all(|s| is_identifier(s)) {
            return format!("{{{{ .Values.{} }}}}", self.dotted());
        }

        let keys: Vec<String> = self.segments.iter().map(|s| quote(s)).collect();
        format!("{{{{ index .Values {} }}}}", keys.join(" "))
    }
}

/// Letter or underscore, followed by letters, digits or underscores
fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Go interpreted string literal
fn quote(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 2);
    out.push('"');
    for c in segment.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}
