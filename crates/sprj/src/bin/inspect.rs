//! Project inspector
//!
//! Opens a project with headless collaborators and dumps the resolved model,
//! the registry contents and the load diagnostics to stdout.
//!
//! # Usage
//! ```bash
//! inspect project.sprj --json
//! ```

use clap::Parser;
use sprj::{CodecConfig, ObjectRegistry, ProjectManager};
use std::path::PathBuf;

/// Command-line arguments for the project inspector
#[derive(Parser)]
#[command(version, about = "Dump the resolved contents of a shader project")]
struct Args {
    /// Project file path
    project: PathBuf,

    /// Print the project as JSON instead of Rust debug output
    #[arg(long, short)]
    json: bool,

    /// YAML codec configuration
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let subscriber = tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => CodecConfig::from_file(path)?,
        None => CodecConfig::default(),
    };

    let mut manager = ProjectManager::headless(config);
    manager.open(&args.project)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(manager.project())?);
    } else {
        println!("{:#?}", manager.project());

        println!("Objects:");
        for object in manager.registry().objects() {
            println!("  {} ({:?})", object.name(), object.kind());
        }
        for pass in &manager.project().passes {
            let textures = manager.registry().bind_list(&pass.name);
            let uniforms = manager.registry().uniform_bind_list(&pass.name);
            println!("Pass '{}': textures {textures:?}, buffers {uniforms:?}", pass.name);
        }
    }

    if manager.diagnostics().is_empty() {
        eprintln!("No diagnostics");
    } else {
        eprintln!("Diagnostics:");
        for diagnostic in manager.diagnostics().iter() {
            eprintln!("  {:?}: {diagnostic}", diagnostic.kind);
        }
    }

    Ok(())
}
