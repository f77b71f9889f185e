//! ConfigMap processor
//!
//! Turns a `v1/ConfigMap` into a Helm template. `data` entries are copied
//! verbatim, except the embedded controller-manager configuration document,
//! whose scalar settings are moved into `values.yaml` under `managerConfig`:
//!
//! ```yaml
//! # input
//! data:
//!   controller_manager_config.yaml: |
//!     health:
//!       healthProbeBindAddress: :8081
//!
//! # template
//! data:
//!   controller_manager_config.yaml: |
//!     health:
//!       healthProbeBindAddress: {{ .Values.managerConfig.health.healthProbeBindAddress }}
//!
//! # values
//! managerConfig:
//!   health:
//!     healthProbeBindAddress: :8081
//! ```

use chartify_core::{CHART_NAME_PLACEHOLDER, ChartData, Template, ValuePath, Values};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::core::{DynamicObject, GroupVersionKind};
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;
use std::io::Write;

use crate::error::{ConvertError, Diagnostics, ExtractionWarning, Result, WarningCategory};
use crate::extract::extract;
use crate::processor::{Processed, Processor, gvk_of};
use crate::yaml_format;

/// Data key holding the embedded controller-manager configuration
pub const EMBEDDED_CONFIG_KEY: &str = "controller_manager_config.yaml";

/// Root of the values extracted from the embedded configuration
pub const DEFAULT_VALUES_ROOT: &str = "managerConfig";

/// Token replaced by the derived resource name
const NAME_PLACEHOLDER: &str = "<NAME>";

const CONFIGMAP_TEMPLATE: &str = r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: {{ include "<CHART_NAME>.fullname" . }}-<NAME>
  labels:
  {{- include "<CHART_NAME>.labels" . | nindent 4 }}
data:
"#;

/// Group-Version-Kind handled by this processor
pub fn configmap_gvk() -> GroupVersionKind {
    GroupVersionKind::gvk("", "v1", "ConfigMap")
}

/// Options for the ConfigMap processor
#[derive(Debug, Clone)]
pub struct ConfigMapOptions {
    /// `data` key whose content is parsed and extracted
    pub embedded_config_key: String,
    /// First segment of every extracted value path
    pub values_root: String,
}

impl Default for ConfigMapOptions {
    fn default() -> Self {
        Self {
            embedded_config_key: EMBEDDED_CONFIG_KEY.to_string(),
            values_root: DEFAULT_VALUES_ROOT.to_string(),
        }
    }
}

/// Converts ConfigMaps into templates
#[derive(Debug, Clone, Default)]
pub struct ConfigMapProcessor {
    options: ConfigMapOptions,
}

impl ConfigMapProcessor {
    pub fn new(options: ConfigMapOptions) -> Self {
        Self { options }
    }

    /// Process `obj` into a concrete [`ConfigMapTemplate`]
    pub fn process_configmap(
        &self,
        obj: &DynamicObject,
    ) -> Result<Option<(ConfigMapTemplate, Diagnostics)>> {
        if gvk_of(obj) != Some(configmap_gvk()) {
            return Ok(None);
        }

        let cm = to_configmap(obj)?;
        let resource_name = cm.metadata.name.clone().ok_or_else(|| ConvertError::MissingField {
            kind: "ConfigMap".to_string(),
            field: "metadata.name".to_string(),
        })?;
        let name = derive_name(
            &resource_name,
            cm.metadata.namespace.as_deref().unwrap_or_default(),
        );
        check_file_name(&name).map_err(|reason| ConvertError::InvalidName {
            kind: "ConfigMap".to_string(),
            name: resource_name.clone(),
            reason,
        })?;

        let mut rendered = CONFIGMAP_TEMPLATE.replace(NAME_PLACEHOLDER, &name);
        let mut values = Values::new();
        let mut diagnostics = Diagnostics::new();

        if let Some(data) = cm.data.filter(|d| !d.is_empty()) {
            let (data, extracted, found) = self.parse_map_data(data);
            values = extracted;
            diagnostics = found;

            let body = serde_yaml::to_string(&data)?;
            let body = yaml_format::indent(&body, 2);
            rendered.push_str(yaml_format::trim_trailing(&body));
        }

        if !diagnostics.is_empty() {
            tracing::warn!(
                configmap = %resource_name,
                count = diagnostics.len(),
                "some configuration entries were left unmodified"
            );
        }

        Ok(Some((
            ConfigMapTemplate {
                filename: format!("{}.yaml", name),
                data: rendered,
                chart_name: None,
                values,
            },
            diagnostics,
        )))
    }

    /// Extract values from the embedded configuration document.
    ///
    /// Parse or serialize failures keep the original text and yield empty
    /// values; the failure is reported in the returned diagnostics.
    fn parse_map_data(
        &self,
        mut data: BTreeMap<String, String>,
    ) -> (BTreeMap<String, String>, Values, Diagnostics) {
        let key = &self.options.embedded_config_key;
        let root = ValuePath::root(self.options.values_root.as_str());
        let mut diagnostics = Diagnostics::new();

        let Some(config) = data.get(key).filter(|c| !c.is_empty()) else {
            return (data, Values::new(), diagnostics);
        };

        let payload = match serde_yaml::from_str::<YamlValue>(config) {
            Ok(YamlValue::Mapping(map)) => map,
            Ok(YamlValue::Null) => return (data, Values::new(), diagnostics),
            Ok(other) => {
                diagnostics.push(embedded_warning(
                    &root,
                    format!("{} is not a mapping ({}), left unmodified", key, yaml_kind(&other)),
                ));
                return (data, Values::new(), diagnostics);
            }
            Err(e) => {
                diagnostics.push(embedded_warning(
                    &root,
                    format!("unable to unmarshal {}: {}", key, e),
                ));
                return (data, Values::new(), diagnostics);
            }
        };

        let extraction = extract(payload, &root);
        diagnostics.extend(extraction.diagnostics);

        match serde_yaml::to_string(&YamlValue::Mapping(extraction.payload)) {
            Ok(serialized) => {
                data.insert(key.clone(), yaml_format::unquote_placeholders(&serialized));
                (data, extraction.values, diagnostics)
            }
            Err(e) => {
                diagnostics.push(embedded_warning(
                    &root,
                    format!("unable to marshal {}: {}", key, e),
                ));
                (data, Values::new(), diagnostics)
            }
        }
    }
}

impl Processor for ConfigMapProcessor {
    fn name(&self) -> &'static str {
        "configmap"
    }

    fn process(&self, obj: &DynamicObject) -> Result<Option<Processed>> {
        Ok(self
            .process_configmap(obj)?
            .map(|(template, diagnostics)| Processed {
                template: Box::new(template),
                diagnostics,
            }))
    }
}

/// Cast a dynamic object to the typed ConfigMap
fn to_configmap(obj: &DynamicObject) -> Result<ConfigMap> {
    let conversion_error = |source| ConvertError::ResourceConversion {
        kind: "ConfigMap".to_string(),
        name: obj.metadata.name.clone().unwrap_or_default(),
        source,
    };
    let raw = serde_json::to_value(obj).map_err(conversion_error)?;
    serde_json::from_value(raw).map_err(conversion_error)
}

/// Strip the namespace-derived prefix from a resource name.
///
/// `my-operator-manager-config` in `my-operator-system` becomes
/// `manager-config`.
pub fn derive_name(name: &str, namespace: &str) -> String {
    let prefix = namespace.strip_suffix("system").unwrap_or(namespace);
    name.strip_prefix(prefix).unwrap_or(name).to_string()
}

/// Reject derived names that would not stay a single file under `templates/`
fn check_file_name(name: &str) -> std::result::Result<(), &'static str> {
    if name.is_empty() {
        Err("derived name is empty")
    } else if name.contains(['/', '\\']) {
        Err("contains a path separator")
    } else if name.contains("..") {
        Err("contains '..'")
    } else if name.starts_with('.') {
        Err("derived name starts with '.'")
    } else {
        Ok(())
    }
}

fn embedded_warning(root: &ValuePath, message: String) -> ExtractionWarning {
    ExtractionWarning::warning(WarningCategory::EmbeddedConfig, root.clone(), message)
}

fn yaml_kind(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Tagged(_) => "tagged value",
        _ => "scalar",
    }
}

/// Template generated from a ConfigMap
#[derive(Debug, Clone)]
pub struct ConfigMapTemplate {
    filename: String,
    data: String,
    chart_name: Option<String>,
    values: Values,
}

impl ConfigMapTemplate {
    /// Rendered template, chart name still unresolved
    pub fn raw(&self) -> &str {
        &self.data
    }
}

impl Template for ConfigMapTemplate {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn gvk(&self) -> GroupVersionKind {
        configmap_gvk()
    }

    fn values(&self) -> &Values {
        &self.values
    }

    fn set_chart_name(&mut self, name: &str) {
        self.chart_name = Some(name.to_string());
    }

    fn post_process(&mut self, _data: &ChartData) {}

    fn write(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        let chart_name = self.chart_name.as_deref().ok_or_else(|| {
            std::io::Error::other(format!("chart name not set for {}", self.filename))
        })?;
        writer.write_all(self.data.replace(CHART_NAME_PLACEHOLDER, chart_name).as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::parse_manifests;

    fn object(yaml: &str) -> DynamicObject {
        parse_manifests(yaml).unwrap().remove(0)
    }

    fn process(yaml: &str) -> (ConfigMapTemplate, Diagnostics) {
        ConfigMapProcessor::default()
            .process_configmap(&object(yaml))
            .unwrap()
            .unwrap()
    }

    fn written(template: &ConfigMapTemplate) -> String {
        let mut out = Vec::new();
        template.write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_derive_name() {
        assert_eq!(
            derive_name("my-operator-manager-config", "my-operator-system"),
            "manager-config"
        );
        assert_eq!(derive_name("settings", "default"), "settings");
        assert_eq!(derive_name("settings", ""), "settings");
        // only one trailing "system" is removed
        assert_eq!(derive_name("a-systemcfg", "a-systemsystem"), "cfg");
    }

    #[test]
    fn test_manager_config_end_to_end() {
        let (mut template, diagnostics) = process(
            r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: my-operator-manager-config
  namespace: my-operator-system
data:
  controller_manager_config.yaml: "health: {healthProbeBindAddress: \":8081\"}"
"#,
        );

        assert!(diagnostics.is_empty());
        assert_eq!(template.filename(), "manager-config.yaml");
        assert_eq!(template.gvk(), configmap_gvk());
        assert!(template.raw().contains(
            "    health:\n      healthProbeBindAddress: {{ .Values.managerConfig.health.healthProbeBindAddress }}"
        ));
        assert_eq!(
            template
                .values()
                .get("managerConfig.health.healthProbeBindAddress")
                .and_then(|v| v.as_str()),
            Some(":8081")
        );

        template.set_chart_name("my-operator");
        let out = written(&template);
        assert!(out.contains(r#"name: {{ include "my-operator.fullname" . }}-manager-config"#));
        assert!(out.contains(r#"{{- include "my-operator.labels" . | nindent 4 }}"#));
        assert!(!out.contains(CHART_NAME_PLACEHOLDER));
    }

    #[test]
    fn test_embedded_config_is_unquoted() {
        let (template, _) = process(
            r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: demo-manager-config
  namespace: demo-system
data:
  controller_manager_config.yaml: |
    apiVersion: controller-runtime.sigs.k8s.io/v1alpha1
    kind: ControllerManagerConfig
    webhook:
      port: 9443
"#,
        );

        let body: BTreeMap<String, String> = serde_yaml::from_str(
            template.raw().split_once("data:\n").unwrap().1,
        )
        .unwrap();
        let config = &body[EMBEDDED_CONFIG_KEY];

        assert!(config.contains("port: {{ .Values.managerConfig.webhook.port }}"));
        assert!(config.contains("kind: ControllerManagerConfig"));
        assert_eq!(
            template.values().get("managerConfig.webhook.port").and_then(|v| v.as_i64()),
            Some(9443)
        );
    }

    #[test]
    fn test_plain_data_is_copied() {
        let (mut template, diagnostics) = process(
            r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: demo-settings
  namespace: demo-system
data:
  mode: fast
"#,
        );
        template.set_chart_name("demo");

        assert!(diagnostics.is_empty());
        assert!(template.values().is_empty());
        insta::assert_snapshot!(written(&template), @r#"
        apiVersion: v1
        kind: ConfigMap
        metadata:
          name: {{ include "demo.fullname" . }}-settings
          labels:
          {{- include "demo.labels" . | nindent 4 }}
        data:
          mode: fast
        "#);
    }

    #[test]
    fn test_empty_data_renders_header_only() {
        let (template, _) = process(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: empty\n",
        );

        assert!(template.raw().ends_with("data:\n"));
        assert!(template.values().is_empty());
    }

    #[test]
    fn test_other_kinds_are_not_applicable() {
        let processor = ConfigMapProcessor::default();
        let secret = object("apiVersion: v1\nkind: Secret\nmetadata:\n  name: s\n");
        let foreign = object("apiVersion: example.com/v1\nkind: ConfigMap\nmetadata:\n  name: c\n");

        assert!(processor.process_configmap(&secret).unwrap().is_none());
        assert!(processor.process_configmap(&foreign).unwrap().is_none());
    }

    #[test]
    fn test_malformed_configmap_is_an_error() {
        let processor = ConfigMapProcessor::default();
        let obj = object(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: bad\ndata:\n  nested:\n    not: a string\n",
        );

        let err = processor.process_configmap(&obj).unwrap_err();
        assert!(matches!(err, ConvertError::ResourceConversion { .. }));
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let processor = ConfigMapProcessor::default();
        let obj = object("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  namespace: x\n");

        let err = processor.process_configmap(&obj).unwrap_err();
        assert!(matches!(err, ConvertError::MissingField { .. }));
    }

    #[test]
    fn test_unsafe_names_are_rejected() {
        let processor = ConfigMapProcessor::default();
        let cases = [
            ("../../escaped", ""),
            ("a/b", ""),
            ("my-operator-", "my-operator-system"),
            ("x-.hidden", "x-system"),
        ];

        for (name, namespace) in cases {
            let obj = object(&format!(
                "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: \"{}\"\n  namespace: \"{}\"\ndata:\n  a: b\n",
                name, namespace
            ));
            let err = processor.process_configmap(&obj).unwrap_err();
            assert!(
                matches!(err, ConvertError::InvalidName { .. }),
                "{} should be rejected, got {:?}",
                name,
                err
            );
        }
    }

    #[test]
    fn test_index_placeholders_are_unquoted() {
        let (template, _) = process(
            r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: c
data:
  controller_manager_config.yaml: |
    my-key: 5
"#,
        );

        assert!(
            template
                .raw()
                .contains(r#"    my-key: {{ index .Values "managerConfig" "my-key" }}"#),
            "{}",
            template.raw()
        );
        assert_eq!(
            template.values().get("managerConfig.my-key").and_then(|v| v.as_i64()),
            Some(5)
        );
    }

    #[test]
    fn test_unparsable_embedded_config_is_kept() {
        let original = "health: [unclosed";
        let (template, diagnostics) = process(&format!(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: c\ndata:\n  controller_manager_config.yaml: \"{}\"\n",
            original
        ));

        assert_eq!(diagnostics.count(WarningCategory::EmbeddedConfig), 1);
        assert!(template.values().is_empty());
        assert!(template.raw().contains(original));
    }

    #[test]
    fn test_array_in_embedded_config_is_reported() {
        let (template, diagnostics) = process(
            r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: c
data:
  controller_manager_config.yaml: |
    cacheNamespaces:
    - a
    - b
    syncPeriod: 10h
"#,
        );

        assert_eq!(diagnostics.count(WarningCategory::UnsupportedArray), 1);
        assert!(
            template.raw().contains("    cacheNamespaces:\n    - a\n    - b\n"),
            "{}",
            template.raw()
        );
        assert!(template.values().get("managerConfig.cacheNamespaces").is_none());
        assert_eq!(
            template.values().get("managerConfig.syncPeriod").and_then(|v| v.as_str()),
            Some("10h")
        );
    }

    #[test]
    fn test_custom_options() {
        let processor = ConfigMapProcessor::new(ConfigMapOptions {
            embedded_config_key: "settings.yaml".to_string(),
            values_root: "settings".to_string(),
        });
        let obj = object(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: c\ndata:\n  settings.yaml: \"replicas: 3\"\n",
        );

        let (template, _) = processor.process_configmap(&obj).unwrap().unwrap();

        assert_eq!(
            template.values().get("settings.replicas").and_then(|v| v.as_i64()),
            Some(3)
        );
        assert!(template.raw().contains("replicas: {{ .Values.settings.replicas }}"));
    }

    #[test]
    fn test_write_without_chart_name_fails() {
        let (template, _) = process("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: c\n");

        let mut out = Vec::new();
        assert!(template.write(&mut out).is_err());
    }
}
