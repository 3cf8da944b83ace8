//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Documentation coverage and class diagrams for Python projects
#[derive(Parser, Debug)]
#[command(name = "docmap")]
#[command(about = "Documentation coverage and class diagrams for Python projects")]
#[command(version)]
pub struct Args {
    /// Verbose output (debug logging, progress bar)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a project or single file and report documentation coverage
    Scan {
        /// Project directory or Python file
        path: PathBuf,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Report format (json, markdown)
        #[arg(long, default_value = "json")]
        format: String,

        /// Glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Render a PlantUML class diagram of a project
    Diagram {
        /// Project directory or Python file
        path: PathBuf,

        /// Diagram preset (see `docmap presets`)
        #[arg(short, long)]
        preset: Option<String>,

        /// Maximum number of classes shown
        #[arg(long)]
        max_classes: Option<usize>,

        /// Write the diagram to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also print a request-flow diagram for every endpoint
        #[arg(long)]
        sequence: bool,

        /// Also print a component diagram of the project
        #[arg(long)]
        component: bool,

        /// Render the diagram to PNG through a PlantUML server
        #[arg(long)]
        render: bool,

        /// Glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the diagram presets
    Presets,

    /// Show version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_defaults() {
        let args = Args::try_parse_from(["docmap", "scan", "./src"]).unwrap();
        assert!(!args.verbose);
        match args.command {
            Command::Scan { path, out, format, exclude, config } => {
                assert_eq!(path, PathBuf::from("./src"));
                assert_eq!(out, None);
                assert_eq!(format, "json");
                assert!(exclude.is_empty());
                assert_eq!(config, None);
            }
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn test_scan_with_options() {
        let args = Args::try_parse_from([
            "docmap", "scan", "./project",
            "--out", "report.md",
            "--format", "markdown",
            "--exclude", "tests/**",
            "--exclude", "scripts/**",
            "--config", "custom.toml",
            "-v",
        ]).unwrap();

        assert!(args.verbose);
        match args.command {
            Command::Scan { path, out, format, exclude, config } => {
                assert_eq!(path, PathBuf::from("./project"));
                assert_eq!(out, Some(PathBuf::from("report.md")));
                assert_eq!(format, "markdown");
                assert_eq!(exclude, vec!["tests/**".to_string(), "scripts/**".to_string()]);
                assert_eq!(config, Some(PathBuf::from("custom.toml")));
            }
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn test_diagram_defaults() {
        let args = Args::try_parse_from(["docmap", "diagram", "./app"]).unwrap();
        match args.command {
            Command::Diagram { path, preset, max_classes, sequence, component, render, .. } => {
                assert_eq!(path, PathBuf::from("./app"));
                assert_eq!(preset, None);
                assert_eq!(max_classes, None);
                assert!(!sequence);
                assert!(!component);
                assert!(!render);
            }
            _ => panic!("Expected Diagram command"),
        }
    }

    #[test]
    fn test_diagram_with_options() {
        let args = Args::try_parse_from([
            "docmap", "--verbose", "diagram", "./app",
            "--preset", "models",
            "--max-classes", "8",
            "--out", "models.puml",
            "--sequence",
            "--component",
            "--render",
        ]).unwrap();

        assert!(args.verbose);
        match args.command {
            Command::Diagram { preset, max_classes, out, sequence, component, render, .. } => {
                assert_eq!(preset.as_deref(), Some("models"));
                assert_eq!(max_classes, Some(8));
                assert_eq!(out, Some(PathBuf::from("models.puml")));
                assert!(sequence && component && render);
            }
            _ => panic!("Expected Diagram command"),
        }
    }

    #[test]
    fn test_invalid_max_classes() {
        let result = Args::try_parse_from(["docmap", "diagram", ".", "--max-classes", "many"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_presets_command() {
        let args = Args::try_parse_from(["docmap", "presets"]).unwrap();
        assert!(matches!(args.command, Command::Presets));
    }

    #[test]
    fn test_version_command() {
        let args = Args::try_parse_from(["docmap", "version"]).unwrap();
        assert!(matches!(args.command, Command::Version));
    }
}
