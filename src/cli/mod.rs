//! CLI module for docmap

mod args;

pub use args::{Args, Command};

use crate::analysis::{CoverageSummary, ParseFailure, ProjectScan, ProjectScanner};
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::model::{DocumentationItem, PRESETS};
use crate::output::{DiagramRenderer, FsStore, PlantUmlClient, TemplateEngine};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();
    init_logging(args.verbose);

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; `-v` raises the level to debug, otherwise `RUST_LOG`
/// applies with a warn default
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("docmap=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docmap=warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// JSON scan report
#[derive(Serialize)]
struct ScanReport<'a> {
    project: &'a str,
    summary: CoverageSummary,
    items: &'a [DocumentationItem],
    parse_errors: &'a [ParseFailure],
}

fn execute(args: Args) -> Result<()> {
    let verbose = args.verbose;

    match args.command {
        Command::Scan {
            path,
            out,
            format,
            exclude,
            config,
        } => {
            let format: OutputFormat = format.parse()?;
            let mut cfg = load_config(config.as_deref())?;
            cfg.merge_cli(exclude, None, None);

            let scanner = ProjectScanner::new(cfg)?.with_verbose(verbose);
            let scan = scanner.scan(&path)?;
            let project_name = project_name(scanner.config(), &path);

            let report = match format {
                OutputFormat::Json => {
                    let report = ScanReport {
                        project: &project_name,
                        summary: scan.summary(),
                        items: &scan.items,
                        parse_errors: &scan.parse_errors,
                    };
                    serde_json::to_string_pretty(&report)?
                }
                OutputFormat::Markdown => TemplateEngine::new()?.coverage_report(&project_name, &scan)?,
            };

            match out {
                Some(out) => {
                    write_output(&out, &report)?;
                    print_scan_summary(&scan);
                    println!("Report written to: {}", out.display());
                }
                None => println!("{}", report),
            }
            Ok(())
        }

        Command::Diagram {
            path,
            preset,
            max_classes,
            out,
            sequence,
            component,
            render,
            exclude,
            config,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            cfg.merge_cli(exclude, preset, max_classes);
            let diagram_config = cfg.diagram.diagram_config()?;

            let scanner = ProjectScanner::new(cfg)?.with_verbose(verbose);
            let scan = scanner.scan(&path)?;
            let graph = scanner.analyze(&scan);
            let project_name = project_name(scanner.config(), &path);

            let renderer = DiagramRenderer::new();
            let class_diagram = renderer.render(&graph, &diagram_config);
            let summary = renderer.summary(&graph, &diagram_config);

            let mut documents = vec![class_diagram.clone()];
            if sequence || component {
                let engine = TemplateEngine::new()?;
                if sequence {
                    for endpoint in scan.endpoints() {
                        documents.push(engine.sequence_diagram(endpoint)?);
                    }
                }
                if component {
                    documents.push(engine.component_diagram(&project_name, &scan.items)?);
                }
            }
            let text = documents.join("\n");

            match &out {
                Some(out) => {
                    write_output(out, &text)?;
                    println!(
                        "Diagram written to: {} ({} classes, {} relationships)",
                        out.display(),
                        summary.classes_found,
                        summary.relationships_found
                    );
                }
                None => print!("{}", text),
            }

            if render {
                let store = FsStore::new(scanner.config().render.cache_dir.clone());
                let client = PlantUmlClient::from_config(&scanner.config().render, store)?;
                let rendered = client.render(&class_diagram)?;

                let image_path = match &out {
                    Some(out) => {
                        let path = out.with_extension("png");
                        write_bytes(&path, &rendered.bytes)?;
                        path
                    }
                    None => client.store().dir().join(format!("{}.png", rendered.key)),
                };
                let origin = if rendered.cached { " (cached)" } else { "" };
                eprintln!("Image: {}{}", image_path.display(), origin);
            }
            Ok(())
        }

        Command::Presets => {
            for (name, description) in PRESETS {
                println!("{:<10} {}", name, description);
            }
            Ok(())
        }

        Command::Version => {
            println!("docmap {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Explicit config must exist; `docmap.toml` in the working directory is optional
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::load_or_default(Path::new("docmap.toml"))),
    }
}

/// Project name from config or the scanned directory
fn project_name(cfg: &Config, path: &Path) -> String {
    if cfg.project.name == "Untitled Project" || cfg.project.name.is_empty() {
        let dir = if path.is_file() { path.parent() } else { Some(path) };
        dir.and_then(|d| d.canonicalize().ok())
            .and_then(|d| d.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .unwrap_or_else(|| "Project".to_string())
    } else {
        cfg.project.name.clone()
    }
}

fn print_scan_summary(scan: &ProjectScan) {
    let summary = scan.summary();
    println!(
        "Scanned {} files: {} items, {} documented ({}%), average coverage {}",
        scan.files.len(),
        summary.total_items,
        summary.documented_items,
        summary.documented_percent,
        summary.average_coverage
    );

    if !scan.parse_errors.is_empty() {
        println!("\nParse errors ({}):", scan.parse_errors.len());
        for failure in scan.parse_errors.iter().take(5) {
            println!("  {}: {}", failure.path.display(), failure.message);
        }
        if scan.parse_errors.len() > 5 {
            println!("  ... and {} more", scan.parse_errors.len() - 5);
        }
    }
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    write_bytes(path, text.as_bytes())
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}
