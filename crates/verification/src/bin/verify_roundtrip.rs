//! Round-trip verification binary
//!
//! This binary loads each given project, saves it to a scratch directory,
//! reloads the copy and reports whether both loads agree.

use clap::Parser;
use sprj::CodecConfig;
use sprj_verification::round_trip;
use std::path::PathBuf;

/// Command-line arguments for the round-trip verifier
#[derive(Parser)]
#[command(version, about = "Verify that projects survive a save and reload unchanged")]
struct Args {
    /// Project files to verify
    #[arg(required = true)]
    projects: Vec<PathBuf>,

    /// YAML codec configuration
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    let subscriber = tracing_subscriber::fmt().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => CodecConfig::from_file(path)?,
        None => CodecConfig::default(),
    };

    let mut failures = 0;
    for project in &args.projects {
        match round_trip(project, &config) {
            Ok(report) if report.is_match() => println!("✓ {}", project.display()),
            Ok(report) => {
                failures += 1;
                println!("✗ {}", project.display());
                println!("    project:  {:?}", report.project);
                println!("    registry: {:?}", report.registry);
            }
            Err(e) => {
                failures += 1;
                eprintln!("✗ Error verifying {}: {e}", project.display());
            }
        }
    }

    if failures > 0 {
        eprintln!("{failures} of {} projects failed the round trip", args.projects.len());
        std::process::exit(1);
    }
    Ok(())
}
