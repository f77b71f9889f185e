//! Convert command - turn manifests into a Helm chart
//!
//! Every resource is processed first. Only then is the chart name injected,
//! chart-wide data handed to each template, and output written, so templates
//! never depend on the order resources appear in.

use chartify_convert::{ConfigMapOptions, ProcessorRegistry, parse_manifests};
use chartify_core::{ChartData, Template, Values};
use kube::core::DynamicObject;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::display::{self, ConversionReport};
use crate::error::{CliError, Result};

pub fn run(
    input: &Path,
    chart_name: &str,
    output_dir: Option<&Path>,
    options: ConfigMapOptions,
    verbose: bool,
) -> Result<()> {
    let content = read_input(input)?;
    let objects = parse_manifests(&content).map_err(|e| {
        CliError::input_with_help(
            e.to_string(),
            "the input must be one or more YAML Kubernetes manifests separated by ---",
        )
    })?;
    tracing::debug!(resources = objects.len(), "parsed input manifests");

    let registry = ProcessorRegistry::with_defaults(options);
    let mut report = ConversionReport::new();
    let mut templates: Vec<Box<dyn Template>> = Vec::new();

    for obj in &objects {
        match registry.process(obj) {
            Ok(Some(processed)) => {
                let file = processed.template.filename().to_string();
                if report.converted.contains(&file) {
                    let label = resource_label(obj);
                    tracing::warn!(resource = %label, file = %file, "duplicate template file");
                    report.failed.push((
                        label,
                        format!("template {} is already generated by another resource", file),
                    ));
                    continue;
                }
                if !processed.diagnostics.is_empty() {
                    report.diagnostics.push((file.clone(), processed.diagnostics));
                }
                report.converted.push(file);
                templates.push(processed.template);
            }
            Ok(None) => report.skipped += 1,
            Err(e) => {
                let label = resource_label(obj);
                tracing::warn!(resource = %label, error = %e, "resource conversion failed");
                report.failed.push((label, e.to_string()));
            }
        }
    }

    let values = Values::merge_all(templates.iter().map(|t| t.values().clone()));
    let chart = ChartData {
        chart_name: chart_name.to_string(),
        values,
    };
    for template in &mut templates {
        template.set_chart_name(chart_name);
    }
    for template in &mut templates {
        template.post_process(&chart);
    }

    match output_dir {
        Some(dir) => write_chart_dir(dir, &templates, &chart)?,
        None => write_stdout(&templates, &chart)?,
    }

    display::print_failures(&report);
    display::print_warnings(&report, verbose);
    display::print_summary(&report);

    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::Conversion {
            failed: report.failed.len(),
            total: report.total(),
        })
    }
}

/// Read the manifest from a file, or from stdin when the path is `-`
fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        fs::read_to_string(input).map_err(|e| CliError::Io {
            message: format!("{}: {}", input.display(), e),
        })
    }
}

fn resource_label(obj: &DynamicObject) -> String {
    let kind = obj
        .types
        .as_ref()
        .map(|t| t.kind.as_str())
        .unwrap_or("Unknown");
    let name = obj.metadata.name.as_deref().unwrap_or("unnamed");
    format!("{}/{}", kind, name)
}

fn write_chart_dir(dir: &Path, templates: &[Box<dyn Template>], chart: &ChartData) -> Result<()> {
    let templates_dir = dir.join("templates");
    fs::create_dir_all(&templates_dir)?;

    for template in templates {
        let mut file = fs::File::create(templates_dir.join(template.filename()))?;
        template.write(&mut file)?;
        file.write_all(b"\n")?;
    }

    let values = chart
        .values
        .to_yaml()
        .map_err(|e| CliError::internal(e.to_string()))?;
    fs::write(dir.join("values.yaml"), values)?;

    Ok(())
}

fn write_stdout(templates: &[Box<dyn Template>], chart: &ChartData) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for template in templates {
        writeln!(out, "---")?;
        writeln!(out, "# Source: {}/templates/{}", chart.chart_name, template.filename())?;
        template.write(&mut out)?;
        writeln!(out)?;
    }

    let values = chart
        .values
        .to_yaml()
        .map_err(|e| CliError::internal(e.to_string()))?;
    writeln!(out, "---")?;
    writeln!(out, "# Source: {}/values.yaml", chart.chart_name)?;
    write!(out, "{}", values)?;
    out.flush()?;

    Ok(())
}
