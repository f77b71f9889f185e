//! Chartify Convert - Kubernetes resources to Helm templates
//!
//! This crate turns deployed resources into parameterized Helm templates,
//! moving hardcoded configuration into `values.yaml` so the same chart can be
//! installed with different settings.
//!
//! # Example
//!
//! ```rust
//! use chartify_convert::{ConfigMapOptions, ProcessorRegistry, parse_manifests};
//! use chartify_core::Template;
//!
//! let manifest = r#"
//! apiVersion: v1
//! kind: ConfigMap
//! metadata:
//!   name: my-operator-manager-config
//!   namespace: my-operator-system
//! data:
//!   controller_manager_config.yaml: |
//!     health:
//!       healthProbeBindAddress: :8081
//! "#;
//!
//! let registry = ProcessorRegistry::with_defaults(ConfigMapOptions::default());
//! for obj in parse_manifests(manifest).unwrap() {
//!     if let Some(mut processed) = registry.process(&obj).unwrap() {
//!         processed.template.set_chart_name("my-operator");
//!
//!         let mut out = Vec::new();
//!         processed.template.write(&mut out).unwrap();
//!         println!("{}", String::from_utf8(out).unwrap());
//!
//!         for warning in processed.diagnostics.warnings() {
//!             eprintln!("{}", warning);
//!         }
//!     }
//! }
//! ```
//!
//! # Unsupported Shapes
//!
//! Extraction never fails. Entries it cannot turn into values are left
//! exactly as they were and reported:
//!
//! - **Arrays** → Helm has no agreed convention for overriding list items
//! - **Nulls and tagged values** → no native type to record
//! - **Mappings with complex keys** → no dotted path to address them

pub mod error;
pub mod extract;
pub mod manifest;
pub mod processor;
pub mod yaml_format;

// Re-exports
pub use error::{
    ConvertError, Diagnostics, ExtractionWarning, Result, WarningCategory, WarningSeverity,
};
pub use extract::{Extraction, LeafValue, extract};
pub use manifest::parse_manifests;
pub use processor::{
    ConfigMapOptions, ConfigMapProcessor, ConfigMapTemplate, Processed, Processor,
    ProcessorRegistry,
};
