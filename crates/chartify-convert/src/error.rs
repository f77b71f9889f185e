//! Error and diagnostic types for the converter
//!
//! Errors abort the conversion of a single resource. Everything else is a
//! [`ExtractionWarning`] collected into [`Diagnostics`] and handed back next
//! to the converted result, so callers decide how to surface it.

use chartify_core::ValuePath;
use thiserror::Error;

/// Converter error
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid manifest document #{index}: {source}")]
    InvalidManifest {
        index: usize,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unable to cast {kind} '{name}' to its typed representation: {source}")]
    ResourceConversion {
        kind: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} is missing required field '{field}'")]
    MissingField { kind: String, field: String },

    #[error("{kind} '{name}' cannot be used as a template file name: {reason}")]
    InvalidName {
        kind: String,
        name: String,
        reason: &'static str,
    },
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

// =============================================================================
// DIAGNOSTICS
// =============================================================================

/// Warning severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WarningSeverity {
    /// Informational - value kept, nothing lost
    Info,
    /// Warning - part of the input was left unmodified
    Warning,
}

impl WarningSeverity {
    /// Get the label for this severity
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }

    /// Get the icon for this severity
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Info => "ℹ",
            Self::Warning => "⚠",
        }
    }
}

/// What kind of anomaly was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCategory {
    /// Array-valued entry, never extracted
    UnsupportedArray,
    /// Mapping whose keys could not be turned into strings
    UnnormalizableMap,
    /// Mapping with scalar non-string keys, converted to string keys
    NormalizedMap,
    /// Value of a shape the extractor does not handle (null, tagged, ...)
    UnrecognizedValue,
    /// Embedded configuration document could not be parsed or serialized
    EmbeddedConfig,
}

impl WarningCategory {
    /// Get the display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnsupportedArray => "array",
            Self::UnnormalizableMap => "map",
            Self::NormalizedMap => "map",
            Self::UnrecognizedValue => "unknown-type",
            Self::EmbeddedConfig => "embedded-config",
        }
    }
}

/// One anomaly found while extracting values
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionWarning {
    pub severity: WarningSeverity,
    pub category: WarningCategory,
    /// Location of the entry in the values namespace
    pub path: ValuePath,
    pub message: String,
}

impl ExtractionWarning {
    pub fn warning(category: WarningCategory, path: ValuePath, message: impl Into<String>) -> Self {
        Self {
            severity: WarningSeverity::Warning,
            category,
            path,
            message: message.into(),
        }
    }

    pub fn info(category: WarningCategory, path: ValuePath, message: impl Into<String>) -> Self {
        Self {
            severity: WarningSeverity::Info,
            category,
            path,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: [severity] path - message
        write!(
            f,
            "[{}] {} - {}",
            self.severity.label(),
            self.path,
            self.message
        )
    }
}

/// Per-invocation sink for extraction warnings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    warnings: Vec<ExtractionWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and mirror it to the log
    pub fn push(&mut self, warning: ExtractionWarning) {
        match warning.severity {
            WarningSeverity::Info => tracing::debug!(path = %warning.path, "{}", warning.message),
            WarningSeverity::Warning => tracing::warn!(path = %warning.path, "{}", warning.message),
        }
        self.warnings.push(warning);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    pub fn warnings(&self) -> &[ExtractionWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Count warnings of a given category
    pub fn count(&self, category: WarningCategory) -> usize {
        self.warnings.iter().filter(|w| w.category == category).count()
    }
}
