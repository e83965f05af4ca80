//! Frame Wizard CLI
//!
//! Usage:
//!   frame-wizard [OPTIONS] <PROJECT>
//!
//! Options:
//!   -o, --output <DIR>     Write one `<class><index>.gcode` file per document
//!   -c, --config <FILE>    Geometry and resolver configuration (TOML format)
//!   --variables            List the frame's system variables
//!   --placements           Print the computed component placements
//!   -h, --help             Print help

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use frame_wizard::batch::{frame_variables, BatchResult};
use frame_wizard::catalog::{format_number, DEFAULT_DECIMALS};
use frame_wizard::geometry::{self, FrameLayout};
use frame_wizard::{generate_with_config, GenerateConfig, Project};

#[derive(Parser)]
#[command(name = "frame-wizard")]
#[command(about = "Generate CNC G-code for door frames from profile templates")]
struct Cli {
    /// Project file (JSON) with the frame and its profiles
    project: PathBuf,

    /// Directory to write the generated documents to (prints to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file for geometry and number formatting (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List the frame's system variables and their values
    #[arg(long)]
    variables: bool,

    /// Print the computed component placements
    #[arg(long)]
    placements: bool,
}

fn init_logging() {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => match GenerateConfig::from_toml(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error loading config '{}': {}", path.display(), e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => GenerateConfig::default(),
    };

    let project = match fs::read_to_string(&cli.project) {
        Ok(content) => match Project::from_json(&content) {
            Ok(project) => project,
            Err(e) => {
                eprintln!("Error loading project '{}': {}", cli.project.display(), e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Error reading file '{}': {}", cli.project.display(), e);
            std::process::exit(1);
        }
    };

    if cli.variables || cli.placements {
        let layout = match geometry::solve(&project.frame, &config.geometry) {
            Ok(layout) => layout,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
        if cli.placements {
            print_placements(&layout);
        }
        if cli.variables {
            for (var, value) in frame_variables(&project.frame, &layout) {
                println!("${} = {}", var, value);
            }
        }
        return;
    }

    let result = match generate_with_config(&project, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let written = match &cli.output {
        Some(dir) => write_documents(&result, dir),
        None => {
            print_documents(&result);
            Ok(())
        }
    };
    if let Err(e) = written {
        eprintln!("Error writing output: {}", e);
        std::process::exit(1);
    }

    if !result.is_success() {
        report_failures(&result, &project);
        std::process::exit(1);
    }
}

fn print_placements(layout: &FrameLayout) {
    for instance in &layout.instances {
        println!(
            "{:<8} offset={:<10} frame={:<10} clearance={}..{}{}",
            instance.id.to_string(),
            format_number(instance.offset, DEFAULT_DECIMALS),
            format_number(instance.position, DEFAULT_DECIMALS),
            format_number(instance.clearance.start, DEFAULT_DECIMALS),
            format_number(instance.clearance.end, DEFAULT_DECIMALS),
            if instance.pinned { " (pinned)" } else { "" }
        );
    }
}

fn print_documents(result: &BatchResult) {
    for document in &result.documents {
        println!("; ==== {} ({}) ====", document.id, document.profile);
        println!("{}", document.text);
    }
}

fn write_documents(result: &BatchResult, dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    for document in &result.documents {
        let path = dir.join(document.file_name());
        fs::write(&path, &document.text)?;
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

fn report_failures(result: &BatchResult, project: &Project) {
    for failure in &result.failures {
        let source = project.profile(&failure.profile).map(|p| p.template.as_str());
        let filename = format!("{} ({})", failure.profile, failure.id);
        for error in &failure.errors {
            match source {
                Some(source) => eprint!("{}", error.report(source, &filename)),
                None => eprintln!("{}: {}", filename, error),
            }
        }
    }
}
