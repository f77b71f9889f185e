//! Chartify CLI - turn Kubernetes manifests into Helm chart templates

use chartify_convert::ConfigMapOptions;
use chartify_convert::processor::configmap::{DEFAULT_VALUES_ROOT, EMBEDDED_CONFIG_KEY};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

mod commands;
mod display;
mod error;
mod exit_codes;

#[derive(Parser)]
#[command(name = "chartify")]
#[command(author = "Chartify Contributors")]
#[command(version)]
#[command(about = "Turn Kubernetes manifests into Helm chart templates", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert manifests into chart templates and values
    Convert {
        /// Manifest file, or `-` to read from stdin
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Chart name used by the generated include helpers
        #[arg(short = 'n', long, default_value = "chart")]
        chart_name: String,

        /// Write `templates/` and `values.yaml` here (stdout if not set)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// ConfigMap data key holding an embedded configuration document
        #[arg(long, default_value = EMBEDDED_CONFIG_KEY)]
        embedded_key: String,

        /// Values prefix for settings extracted from the embedded document
        #[arg(long, default_value = DEFAULT_VALUES_ROOT)]
        values_root: String,
    },
}

/// Log to stderr; stdout carries the rendered chart.
///
/// `CHARTIFY_LOG` overrides the filter. Diagnostics are printed by the
/// commands themselves, so logging stays quiet unless asked for.
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "error" };
    let env = std::env::var("CHARTIFY_LOG").unwrap_or_else(|_| default.to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::Convert {
            input,
            chart_name,
            output_dir,
            embedded_key,
            values_root,
        } => commands::convert::run(
            &input,
            &chart_name,
            output_dir.as_deref(),
            ConfigMapOptions {
                embedded_config_key: embedded_key,
                values_root,
            },
            cli.debug,
        ),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
