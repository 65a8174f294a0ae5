use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

use switchkit::detector::TrailingCommaDetector;
use switchkit::discovery::{self, DiscoveryConfig};
use switchkit::sanitizer::sanitize;

#[derive(Parser, Debug)]
#[command(name = "commalint")]
#[command(about = "Find trailing commas before closing brackets in source files")]
#[command(version)]
struct Args {
    /// Root directory to scan
    #[arg(default_value = ".")]
    root_dir: PathBuf,

    /// File extension to scan, repeatable (defaults to js, hh, cc)
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Abort on first traversal error
    #[arg(long)]
    fail_fast: bool,

    /// Use parallel directory traversal
    #[arg(long)]
    parallel: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: structured logs go to stderr so stdout carries only diagnostics
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    info!(?args, "Parsed CLI arguments");

    // WHY: validate root directory exists early to fail fast with clear error
    if !args.root_dir.exists() {
        anyhow::bail!("Root directory does not exist: {}", args.root_dir.display());
    }
    if !args.root_dir.is_dir() {
        anyhow::bail!("Root path is not a directory: {}", args.root_dir.display());
    }

    let mut config = DiscoveryConfig {
        fail_fast: args.fail_fast,
        ..DiscoveryConfig::default()
    };
    if !args.extensions.is_empty() {
        config.extensions = args.extensions.clone();
    }

    let files = if args.parallel {
        discovery::collect_source_files_parallel(&args.root_dir, config).await?
    } else {
        discovery::collect_source_files(&args.root_dir, config).await?
    };
    info!("Scanning {} candidate files", files.len());

    let detector = TrailingCommaDetector::new()?;
    let mut findings = 0usize;

    for path in &files {
        // An unreadable file aborts the whole scan; partial lint results
        // would be misleading.
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;

        let sanitized = sanitize(&contents);
        if let Some(m) = detector.first_match(&sanitized) {
            findings += 1;
            println!(
                "./{}: {:?}",
                relative_to(path, &args.root_dir).display(),
                m.text
            );
        }
    }

    info!("Scan complete: {} files, {} findings", files.len(), findings);
    Ok(())
}

fn relative_to<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
