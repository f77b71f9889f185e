//! Contract between processed resources and the chart writer
//!
//! Processors produce [`Template`]s without knowing the final chart name.
//! The pipeline processes every resource first, then injects the chart name,
//! runs [`Template::post_process`] with the aggregated [`ChartData`] and
//! finally writes each template.

use kube::core::GroupVersionKind;
use std::io::Write;

use crate::values::Values;

/// Token left in rendered templates until the chart name is known
pub const CHART_NAME_PLACEHOLDER: &str = "<CHART_NAME>";

/// Chart-wide data handed to every template once all resources are processed
#[derive(Debug, Clone, Default)]
pub struct ChartData {
    /// Final chart name
    pub chart_name: String,

    /// Values of every processed resource, deep merged
    pub values: Values,
}

/// A processed resource, ready to be written into the chart
pub trait Template: Send {
    /// File name under `templates/`
    fn filename(&self) -> &str;

    /// Kind of the resource this template was generated from
    fn gvk(&self) -> GroupVersionKind;

    /// Values extracted from the resource
    fn values(&self) -> &Values;

    /// Inject the chart name; resolved when the template is written
    fn set_chart_name(&mut self, name: &str);

    /// Hook for cross-resource adjustments, called after every resource
    /// has been processed and before any template is written
    fn post_process(&mut self, data: &ChartData);

    /// Write the final template bytes
    fn write(&self, writer: &mut dyn Write) -> std::io::Result<()>;
}
