//! Values store with path addressing and deep merge support

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value as YamlValue};

use crate::error::{CoreError, Result};
use crate::path::ValuePath;

/// Nested mapping of extracted default values.
///
/// Leaves keep their native YAML type (string, integer, float, bool) so that
/// `values.yaml` can be overridden without quoting numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub YamlValue);

impl Default for Values {
    fn default() -> Self {
        Self::new()
    }
}

impl Values {
    /// Create empty values
    pub fn new() -> Self {
        Self(YamlValue::Mapping(Mapping::new()))
    }

    /// Parse values from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: YamlValue = serde_yaml::from_str(yaml)?;
        Ok(Self(value))
    }

    /// Serialize to a YAML document
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.0)?)
    }

    /// Deep merge another Values into this one
    ///
    /// Rules:
    /// - Scalars: overlay replaces base
    /// - Mappings: recursive merge
    /// - Sequences: overlay replaces base (not appended)
    pub fn merge(&mut self, overlay: &Values) {
        deep_merge(&mut self.0, &overlay.0);
    }

    /// Merge multiple values in order
    pub fn merge_all(values: impl IntoIterator<Item = Values>) -> Self {
        let mut result = Values::new();
        for v in values {
            result.merge(&v);
        }
        result
    }

    /// Store `value` at `path`, creating intermediate mappings.
    ///
    /// A non-mapping value found on the way is replaced by a mapping.
    pub fn set_path(&mut self, path: &ValuePath, value: impl Into<YamlValue>) {
        set_nested(&mut self.0, path.segments(), value.into());
    }

    /// Set a value by dotted path (e.g., "image.tag")
    pub fn set(&mut self, dotted: &str, value: impl Into<YamlValue>) -> Result<()> {
        let path = ValuePath::parse(dotted).ok_or_else(|| CoreError::InvalidPath {
            path: dotted.to_string(),
        })?;
        self.set_path(&path, value);
        Ok(())
    }

    /// Get a value by dotted path
    pub fn get(&self, dotted: &str) -> Option<&YamlValue> {
        let parts: Vec<&str> = dotted.split('.').collect();
        get_nested(&self.0, &parts)
    }

    /// Check if values are empty
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            YamlValue::Mapping(map) => map.is_empty(),
            YamlValue::Null => true,
            _ => false,
        }
    }
}

/// Deep merge two YAML values
fn deep_merge(base: &mut YamlValue, overlay: &YamlValue) {
    match (base, overlay) {
        (YamlValue::Mapping(base_map), YamlValue::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// Set a nested value by path
fn set_nested(value: &mut YamlValue, path: &[String], new_value: YamlValue) {
    let Some((key, remaining)) = path.split_first() else {
        *value = new_value;
        return;
    };

    if !value.is_mapping() {
        *value = YamlValue::Mapping(Mapping::new());
    }
    let YamlValue::Mapping(map) = value else {
        return;
    };

    let key = YamlValue::String(key.clone());
    if remaining.is_empty() {
        map.insert(key, new_value);
    } else {
        let entry = map
            .entry(key)
            .or_insert_with(|| YamlValue::Mapping(Mapping::new()));
        set_nested(entry, remaining, new_value);
    }
}

/// Get a nested value by path
fn get_nested<'a>(value: &'a YamlValue, path: &[&str]) -> Option<&'a YamlValue> {
    let Some((key, remaining)) = path.split_first() else {
        return Some(value);
    };

    match value {
        YamlValue::Mapping(map) => map.get(*key).and_then(|v| get_nested(v, remaining)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_merge() {
        let mut base = Values::from_yaml(r#"
managerConfig:
  health:
    healthProbeBindAddress: ":8081"
  leaderElection:
    leaderElect: true
"#).unwrap();

        let overlay = Values::from_yaml(r#"
managerConfig:
  leaderElection:
    leaderElect: false
    resourceName: abc.example.com
"#).unwrap();

        base.merge(&overlay);

        assert_eq!(
            base.get("managerConfig.health.healthProbeBindAddress").and_then(|v| v.as_str()),
            Some(":8081")
        );
        assert_eq!(
            base.get("managerConfig.leaderElection.leaderElect").and_then(|v| v.as_bool()),
            Some(false)
        );
        assert_eq!(
            base.get("managerConfig.leaderElection.resourceName").and_then(|v| v.as_str()),
            Some("abc.example.com")
        );
    }

    #[test]
    fn test_set_path_keeps_native_types() {
        let mut values = Values::new();
        let root = ValuePath::root("managerConfig");
        values.set_path(&root.child("port"), 9443_i64);
        values.set_path(&root.child("ratio"), 0.5_f64);
        values.set_path(&root.child("enabled"), true);
        values.set_path(&root.child("name"), "manager");

        assert_eq!(values.get("managerConfig.port").unwrap().as_i64(), Some(9443));
        assert_eq!(values.get("managerConfig.ratio").unwrap().as_f64(), Some(0.5));
        assert_eq!(values.get("managerConfig.enabled").unwrap().as_bool(), Some(true));
        assert_eq!(values.get("managerConfig.name").unwrap().as_str(), Some("manager"));
    }

    #[test]
    fn test_set_replaces_scalar_intermediate() {
        let mut values = Values::new();
        values.set("a", "scalar").unwrap();
        values.set("a.b", 1_i64).unwrap();

        assert_eq!(values.get("a.b").unwrap().as_i64(), Some(1));
    }

    #[test]
    fn test_set_rejects_empty_segment() {
        let mut values = Values::new();
        assert!(values.set("a..b", 1_i64).is_err());
        assert!(values.is_empty());
    }

    #[test]
    fn test_merge_all() {
        let a = Values::from_yaml("one: 1\nshared: a").unwrap();
        let b = Values::from_yaml("two: 2\nshared: b").unwrap();

        let merged = Values::merge_all([a, b]);

        assert_eq!(merged.get("one").unwrap().as_i64(), Some(1));
        assert_eq!(merged.get("two").unwrap().as_i64(), Some(2));
        assert_eq!(merged.get("shared").and_then(|v| v.as_str()), Some("b"));
    }

    #[test]
    fn test_to_yaml() {
        let mut values = Values::new();
        values.set("managerConfig.webhook.port", 9443_i64).unwrap();
        values.set("managerConfig.leaderElection.leaderElect", true).unwrap();

        insta::assert_snapshot!(values.to_yaml().unwrap(), @r"
        managerConfig:
          webhook:
            port: 9443
          leaderElection:
            leaderElect: true
        ");
    }
}
