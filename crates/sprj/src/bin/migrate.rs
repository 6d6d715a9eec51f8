//! Project migration tool
//!
//! Opens a v1 or v2 project and writes it back in the current v2 layout,
//! either in place or to a new location. Shader and model paths are rebased
//! to the new location; with `--copy-shaders` the shader sources are copied
//! next to the new project file instead.

use clap::Parser;
use sprj::{CodecConfig, ProjectManager};
use std::path::PathBuf;

/// Command-line arguments for the migration tool
#[derive(Parser)]
#[command(version, about = "Rewrite a shader project in the current document layout")]
struct Args {
    /// Project file to migrate
    input: PathBuf,

    /// Destination project file (defaults to overwriting the input)
    output: Option<PathBuf>,

    /// Copy shader files into a `shaders` directory next to the output
    #[arg(long)]
    copy_shaders: bool,

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
    let subscriber = tracing_subscriber::fmt().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => CodecConfig::from_file(path)?,
        None => CodecConfig::default(),
    };

    let mut manager = ProjectManager::headless(config);
    manager.open(&args.input)?;

    for diagnostic in manager.diagnostics().iter() {
        tracing::warn!("{diagnostic}");
    }

    match &args.output {
        Some(output) => manager.save_as(output, args.copy_shaders)?,
        None if args.copy_shaders => manager.save_as(&args.input, true)?,
        None => manager.save()?,
    }

    println!("Migrated {} passes", manager.project().passes.len());
    Ok(())
}
