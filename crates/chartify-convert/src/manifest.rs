//! Multi-document manifest parsing

use kube::core::DynamicObject;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

use crate::error::{ConvertError, Result};

/// Parse a `---` separated manifest stream into dynamic objects.
///
/// Empty documents are skipped. Document indexes in errors are 1-based and
/// count skipped documents too, so they match what an editor shows.
pub fn parse_manifests(content: &str) -> Result<Vec<DynamicObject>> {
    let mut objects = Vec::new();

    for (i, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let index = i + 1;
        let value = YamlValue::deserialize(document)
            .map_err(|source| ConvertError::InvalidManifest { index, source })?;
        if value.is_null() {
            continue;
        }
        let obj: DynamicObject = serde_yaml::from_value(value)
            .map_err(|source| ConvertError::InvalidManifest { index, source })?;
        objects.push(obj);
    }

    Ok(objects)
}
