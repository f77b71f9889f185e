//! Value extraction from embedded configuration documents
//!
//! Walks a YAML mapping, replaces every configurable scalar with a Helm
//! placeholder (`{{ .Values.<path> }}`) and records the original value, with
//! its native type, at the same path in a [`Values`] store.
//!
//! # Example
//!
//! ```rust
//! use chartify_convert::extract::{extract, LeafValue};
//! use chartify_core::ValuePath;
//!
//! let payload: serde_yaml::Value = serde_yaml::from_str(r#"
//! webhook:
//!   port: "9443"
//! "#).unwrap();
//!
//! let extraction = extract(payload.as_mapping().unwrap().clone(), &ValuePath::root("managerConfig"));
//!
//! assert_eq!(
//!     extraction.payload["webhook"]["port"].as_str(),
//!     Some("{{ .Values.managerConfig.webhook.port }}")
//! );
//! assert_eq!(extraction.values.get("managerConfig.webhook.port").unwrap().as_i64(), Some(9443));
//! assert_eq!(LeafValue::classify_str("9443"), LeafValue::Int(9443));
//! ```
//!
//! Keys `kind` and `apiVersion` are structural and never extracted. Arrays,
//! nulls and other shapes are left untouched and reported in [`Diagnostics`];
//! extraction itself never fails.

use chartify_core::{ValuePath, Values};
use serde_yaml::{Mapping, Value as YamlValue};
use std::collections::HashSet;

use crate::error::{Diagnostics, ExtractionWarning, WarningCategory};

/// Keys that describe a document rather than configure it
pub const STRUCTURAL_KEYS: [&str; 2] = ["kind", "apiVersion"];

/// Returns true for keys that are never extracted
#[inline]
pub fn is_structural_key(key: &str) -> bool {
    STRUCTURAL_KEYS.contains(&key)
}

// =============================================================================
// TYPE CLASSIFIER
// =============================================================================

/// A configurable scalar, with the type it will have in `values.yaml`
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl LeafValue {
    /// Classify a string-encoded scalar.
    ///
    /// Tried in order: base-10 `i64`, `f64`, boolean token, plain string.
    /// The first successful parse wins, so `"5"` is always an integer.
    pub fn classify_str(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Self::Float(f);
        }
        if let Some(b) = parse_bool(raw) {
            return Self::Bool(b);
        }
        Self::String(raw.to_string())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int(_) => "int64",
            Self::Float(_) => "float64",
            Self::Bool(_) => "bool",
        }
    }
}

impl From<LeafValue> for YamlValue {
    fn from(leaf: LeafValue) -> Self {
        match leaf {
            LeafValue::String(s) => YamlValue::String(s),
            LeafValue::Int(i) => YamlValue::from(i),
            LeafValue::Float(f) => YamlValue::from(f),
            LeafValue::Bool(b) => YamlValue::Bool(b),
        }
    }
}

/// Boolean tokens accepted for string-encoded flags
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Shape of a mapping entry, decided before any rewriting happens
#[derive(Debug)]
enum Node {
    Leaf(LeafValue),
    Mapping(Mapping),
    Array(YamlValue),
    Unrecognized(YamlValue, &'static str),
}

impl Node {
    fn classify(value: YamlValue) -> Self {
        match value {
            YamlValue::String(s) => Node::Leaf(LeafValue::classify_str(&s)),
            YamlValue::Bool(b) => Node::Leaf(LeafValue::Bool(b)),
            YamlValue::Number(n) => match (n.as_i64(), n.is_f64()) {
                (Some(i), _) => Node::Leaf(LeafValue::Int(i)),
                (None, true) => Node::Leaf(LeafValue::Float(n.as_f64().unwrap_or(f64::NAN))),
                // u64 above i64::MAX has no lossless leaf type
                (None, false) => Node::Unrecognized(YamlValue::Number(n), "uint64"),
            },
            YamlValue::Mapping(map) => Node::Mapping(map),
            YamlValue::Sequence(_) => Node::Array(value),
            YamlValue::Null => Node::Unrecognized(value, "null"),
            YamlValue::Tagged(_) => Node::Unrecognized(value, "tagged"),
        }
    }
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// Output of one extraction run
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// The payload with configurable leaves replaced by placeholders
    pub payload: Mapping,
    /// Extracted values, addressed by the same paths as the placeholders
    pub values: Values,
    /// Entries that were left unmodified
    pub diagnostics: Diagnostics,
}

/// Extract every configurable leaf of `payload` under `root`
pub fn extract(payload: Mapping, root: &ValuePath) -> Extraction {
    let mut values = Values::new();
    let mut diagnostics = Diagnostics::new();

    let payload = match normalize_keys(payload) {
        Ok((entries, converted)) => {
            if converted {
                diagnostics.push(normalized_warning(root));
            }
            extract_entries(entries, root, &mut values, &mut diagnostics)
        }
        Err((original, reason)) => {
            diagnostics.push(unnormalizable_warning(root, &reason));
            original
        }
    };

    Extraction {
        payload,
        values,
        diagnostics,
    }
}

/// Rewrite one level of string-keyed entries, recursing into mappings
fn extract_entries(
    entries: Vec<(String, YamlValue)>,
    path: &ValuePath,
    values: &mut Values,
    diagnostics: &mut Diagnostics,
) -> Mapping {
    let mut out = Mapping::with_capacity(entries.len());

    for (key, value) in entries {
        if is_structural_key(&key) {
            out.insert(YamlValue::String(key), value);
            continue;
        }

        let child = path.child(key.as_str());
        let rewritten = match Node::classify(value) {
            Node::Leaf(leaf) => replace(&key, leaf, path, values),
            Node::Mapping(map) => match normalize_keys(map) {
                Ok((entries, converted)) => {
                    if converted {
                        diagnostics.push(normalized_warning(&child));
                    }
                    YamlValue::Mapping(extract_entries(entries, &child, values, diagnostics))
                }
                Err((original, reason)) => {
                    diagnostics.push(unnormalizable_warning(&child, &reason));
                    YamlValue::Mapping(original)
                }
            },
            Node::Array(array) => {
                diagnostics.push(ExtractionWarning::warning(
                    WarningCategory::UnsupportedArray,
                    child,
                    "arrays are not supported, left unmodified",
                ));
                array
            }
            Node::Unrecognized(other, type_tag) => {
                diagnostics.push(ExtractionWarning::warning(
                    WarningCategory::UnrecognizedValue,
                    child,
                    format!("unknown type {}, left unmodified", type_tag),
                ));
                other
            }
        };

        out.insert(YamlValue::String(key), rewritten);
    }

    out
}

/// Record `leaf` at `path.key` and return the placeholder that replaces it.
///
/// Structural keys keep their value and record nothing.
fn replace(key: &str, leaf: LeafValue, path: &ValuePath, values: &mut Values) -> YamlValue {
    if is_structural_key(key) {
        return leaf.into();
    }

    let value_path = path.child(key);
    let placeholder = value_path.placeholder();
    tracing::trace!(path = %value_path, kind = leaf.type_name(), "extracted value");
    values.set_path(&value_path, leaf);
    YamlValue::String(placeholder)
}

// =============================================================================
// KEY NORMALIZATION
// =============================================================================

/// Turn a mapping into string-keyed entries.
///
/// Scalar keys (numbers, booleans) are stringified; the flag is set when
/// that happened. Fails, handing back the untouched mapping, on null or
/// complex keys and on keys that collide once stringified.
fn normalize_keys(
    map: Mapping,
) -> std::result::Result<(Vec<(String, YamlValue)>, bool), (Mapping, String)> {
    let mut keys = Vec::with_capacity(map.len());
    let mut seen = HashSet::with_capacity(map.len());
    let mut converted = false;

    for key in map.keys() {
        let name = match key {
            YamlValue::String(s) => s.clone(),
            YamlValue::Number(n) => {
                converted = true;
                n.to_string()
            }
            YamlValue::Bool(b) => {
                converted = true;
                b.to_string()
            }
            other => return Err((map.clone(), format!("key of type {}", key_type(other)))),
        };
        if !seen.insert(name.clone()) {
            return Err((map.clone(), format!("duplicate key '{}' after conversion", name)));
        }
        keys.push(name);
    }

    let entries = keys.into_iter().zip(map.into_iter().map(|(_, v)| v)).collect();
    Ok((entries, converted))
}

fn key_type(key: &YamlValue) -> &'static str {
    match key {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "bool",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged",
    }
}

fn normalized_warning(path: &ValuePath) -> ExtractionWarning {
    ExtractionWarning::info(
        WarningCategory::NormalizedMap,
        path.clone(),
        "non-string keys converted to strings",
    )
}

fn unnormalizable_warning(path: &ValuePath, reason: &str) -> ExtractionWarning {
    ExtractionWarning::warning(
        WarningCategory::UnnormalizableMap,
        path.clone(),
        format!("unable to convert mapping to string keys ({}), left unmodified", reason),
    )
}
