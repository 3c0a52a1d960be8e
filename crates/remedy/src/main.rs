//! Remedy CLI - patch known-vulnerable installed packages in place.
//!
//! ```bash
//! # Patch the project in the current directory using ./.remedy
//! remedy
//!
//! # Patch a specific project with an explicit policy file
//! remedy ~/code/my-app --policy ~/code/my-app/.remedy
//!
//! # Point at a self-hosted vulnerability database
//! REMEDY_API_URL=https://vulndb.internal/api/v1 REMEDY_TOKEN=... remedy
//! ```

use std::path::PathBuf;

use clap::Parser;

use remedy::remediate_project;
use remedy_catalog::HttpPatchSource;

/// Remedy - patches known-vulnerable installed packages in place
#[derive(Parser, Debug, Clone)]
#[command(name = "remedy")]
#[command(version, about, long_about = None)]
struct Args {
    /// Project directory containing node_modules (default: current directory)
    #[arg(default_value = ".")]
    project: PathBuf,

    /// Policy file (default: <project>/.remedy)
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Base URL of the vulnerability database API
    #[arg(long, env = "REMEDY_API_URL", default_value = "https://api.remedy.dev/v1")]
    api_url: String,

    /// API token for the vulnerability database
    #[arg(long, env = "REMEDY_TOKEN")]
    token: Option<String>,

    /// Show verbose output (debug information)
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("remedy={}", log_level).parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    runtime.block_on(async move {
        if let Err(e) = run(args).await {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    });
}

async fn run(args: Args) -> anyhow::Result<()> {
    let policy_path = args
        .policy
        .unwrap_or_else(|| args.project.join(".remedy"));
    let source = HttpPatchSource::new(args.api_url, args.token);

    let summary = remediate_project(&source, &policy_path, &args.project).await?;

    if summary.nothing_to_patch() {
        println!("Nothing to patch, done");
        return Ok(());
    }

    println!(
        "Patched {} file(s) across {} module(s)",
        summary.files_patched, summary.modules_matched
    );
    for failure in &summary.failures {
        eprintln!("warning: could not patch {failure}");
    }

    Ok(())
}
