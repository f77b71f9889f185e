//! Resource processors
//!
//! A [`Processor`] recognizes one kind of resource and turns it into a chart
//! [`Template`]. Resources it does not handle yield `Ok(None)`; an error means
//! the resource matched but could not be converted.

pub mod configmap;

use chartify_core::Template;
use kube::core::{DynamicObject, GroupVersionKind, TypeMeta};

use crate::error::{Diagnostics, Result};

pub use configmap::{ConfigMapOptions, ConfigMapProcessor, ConfigMapTemplate};

/// A converted resource and what was left unmodified while converting it
pub struct Processed {
    pub template: Box<dyn Template>,
    pub diagnostics: Diagnostics,
}

impl std::fmt::Debug for Processed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processed")
            .field("filename", &self.template.filename())
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

/// Converts one kind of resource into a chart template
pub trait Processor: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Process `obj`, returning `Ok(None)` if this processor does not apply
    fn process(&self, obj: &DynamicObject) -> Result<Option<Processed>>;
}

/// Ordered set of processors; the first one that applies wins
#[derive(Default)]
pub struct ProcessorRegistry {
    processors: Vec<Box<dyn Processor>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in processor
    pub fn with_defaults(configmap: ConfigMapOptions) -> Self {
        let mut registry = Self::new();
        registry.register(ConfigMapProcessor::new(configmap));
        registry
    }

    pub fn register(&mut self, processor: impl Processor + 'static) {
        self.processors.push(Box::new(processor));
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Run processors in registration order until one applies
    pub fn process(&self, obj: &DynamicObject) -> Result<Option<Processed>> {
        for processor in &self.processors {
            if let Some(processed) = processor.process(obj)? {
                tracing::debug!(
                    processor = processor.name(),
                    file = processed.template.filename(),
                    "resource processed"
                );
                return Ok(Some(processed));
            }
        }
        tracing::debug!(
            name = obj.metadata.name.as_deref().unwrap_or("unnamed"),
            "no processor applies"
        );
        Ok(None)
    }
}

/// Group-Version-Kind of a dynamic object, if it carries type information
pub fn gvk_of(obj: &DynamicObject) -> Option<GroupVersionKind> {
    obj.types.as_ref().map(gvk_from_type_meta)
}

/// Convert TypeMeta to GroupVersionKind
///
/// - "apps/v1" -> group="apps", version="v1"
/// - "v1" -> group="", version="v1" (core API)
fn gvk_from_type_meta(tm: &TypeMeta) -> GroupVersionKind {
    let (group, version) = match tm.api_version.rsplit_once('/') {
        Some((g, v)) => (g.to_string(), v.to_string()),
        None => (String::new(), tm.api_version.clone()),
    };

    GroupVersionKind {
        group,
        version,
        kind: tm.kind.clone(),
    }
}
