//! `smartlead-tools` CLI: list, inspect, call and verify SmartLead tools.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use smartlead_async::Gateway;
use smartlead_async::loader;
use smartlead_tools::verify::ProbeStatus;
use smartlead_tools::{Verifier, build_registry};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const DEFAULT_FILTER: &str = "smartlead_tools=info,smartlead_async=info";

#[derive(Parser)]
#[command(name = "smartlead-tools")]
#[command(about = "Call SmartLead API tools and verify endpoint coverage")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Extra config file layered over the global and local ones
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List every tool
    List {
        /// Print full descriptors, including input schemas, as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the input JSON schema of a tool
    Schema {
        /// Tool name
        tool: String,
    },
    /// Call a tool
    Call {
        /// Tool name
        tool: String,
        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Probe every read-only endpoint and write verification reports
    Verify {
        /// Directory for verification-report.json and verification-report.md
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Use default sample ids instead of reading them from the account
        #[arg(long)]
        skip_discovery: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => DEFAULT_FILTER,
        1 => "smartlead_tools=debug,smartlead_async=debug",
        _ => "smartlead_tools=trace,smartlead_async=trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let loaded = loader::load_merged(&cwd, cli.config.as_deref())
        .context("Failed to load SmartLead configuration")?;
    let gateway = Arc::new(Gateway::new(loaded.config).context("Failed to build gateway")?);
    let registry =
        Arc::new(build_registry(Arc::clone(&gateway)).context("Failed to build tool registry")?);

    match cli.command {
        Commands::List { json } => {
            if json {
                let descriptors = registry.descriptors();
                println!("{}", serde_json::to_string_pretty(&descriptors)?);
            } else {
                for d in registry.descriptors() {
                    println!("{:<64} {}", d.name.bold(), d.description);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Schema { tool } => {
            let t = registry
                .get(&tool)
                .with_context(|| format!("Unknown tool: {tool}"))?;
            println!("{}", serde_json::to_string_pretty(&t.input_schema())?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Call { tool, args, json } => {
            let args: Value = serde_json::from_str(&args).context("--args must be valid JSON")?;
            let response = registry.dispatch(&tool, args).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.text());
            }
            Ok(if response.is_error {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Verify {
            out_dir,
            skip_discovery,
        } => {
            let mut verifier = Verifier::new(gateway, Arc::clone(&registry));
            if !skip_discovery {
                verifier.discover_samples().await;
            }
            let report = verifier.run().await;
            let (json_path, md_path) = report.write_to(&out_dir)?;

            let s = &report.summary;
            println!("{}", "SmartLead tool verification".bold());
            println!("  total:   {}", s.total_tools);
            println!("  {} {}", "passed: ".green(), s.passed);
            println!("  {} {}", "failed: ".red(), s.failed);
            println!("  {} {}", "skipped:".yellow(), s.skipped);
            println!("  success rate: {:.1}%", s.success_rate);
            println!("  average response: {}ms", s.average_response_time_ms);
            for r in report
                .results
                .iter()
                .filter(|r| r.status == ProbeStatus::Fail)
            {
                let reason = r.error.as_ref().map_or("", |e| e.message.as_str());
                println!("  {} {} {}", "✗".red(), r.tool, reason.dimmed());
            }
            for rec in &report.recommendations {
                println!("  - {rec}");
            }
            println!("Reports: {} {}", json_path.display(), md_path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}
