// Project pipeline: discovery, parallel per-file scan, relationship analysis

pub mod relationships;
pub mod summary;

pub use relationships::{parse_bases, RelationshipAnalyzer};
pub use summary::{CoverageSummary, GroupCoverage};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{DocumentationItem, ItemKind, RelationshipGraph};
use crate::scanner::{ScanOptions, Scanner};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One source file handed to the pipeline
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the project root
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// A file that could not be scanned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Result of scanning a project
#[derive(Debug, Clone, Serialize)]
pub struct ProjectScan {
    pub root: PathBuf,
    /// Scanned files, relative to the root, in scan order
    pub files: Vec<PathBuf>,
    /// Items of all files, concatenated in file order
    pub items: Vec<DocumentationItem>,
    /// Files that failed, in file order
    pub parse_errors: Vec<ParseFailure>,
}

impl ProjectScan {
    pub fn summary(&self) -> CoverageSummary {
        CoverageSummary::from_items(&self.items)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &DocumentationItem> {
        self.items.iter().filter(|i| i.kind == ItemKind::Endpoint)
    }
}

/// Runs the scanner over a project and analyzes the result
pub struct ProjectScanner {
    config: Config,
    options: ScanOptions,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    verbose: bool,
}

impl ProjectScanner {
    /// Create a project scanner with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let options = config.scan.options()?;
        let include = compile_patterns(&config.scan.include)?;
        let exclude = compile_patterns(&config.scan.exclude)?;

        Ok(Self {
            config,
            options,
            include,
            exclude,
            verbose: false,
        })
    }

    /// Show a progress bar while scanning
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scan a project directory, or a single file on its own
    pub fn scan(&self, path: &Path) -> Result<ProjectScan> {
        if !path.exists() {
            return Err(Error::PathNotFound(path.to_path_buf()));
        }

        let (root, files) = if path.is_file() {
            let root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .map(PathBuf::from)
                .ok_or_else(|| Error::PathNotFound(path.to_path_buf()))?;
            (root, vec![name])
        } else {
            let files = self.discover_files(path)?;
            if files.is_empty() {
                return Err(Error::analysis("No Python files found"));
            }
            (path.to_path_buf(), files)
        };

        let mut sources = Vec::with_capacity(files.len());
        let mut read_failures = Vec::new();
        for relative in files {
            match std::fs::read(root.join(&relative)) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => sources.push(SourceFile::new(relative, text)),
                    Err(_) => read_failures.push(ParseFailure {
                        path: relative,
                        message: "file is not valid UTF-8".to_string(),
                    }),
                },
                Err(e) => read_failures.push(ParseFailure {
                    path: relative,
                    message: e.to_string(),
                }),
            }
        }

        let mut scan = self.scan_sources(&root, sources)?;
        if !read_failures.is_empty() {
            for failure in &read_failures {
                warn!(path = %failure.path.display(), error = %failure.message, "could not read file");
            }
            scan.parse_errors.extend(read_failures);
            scan.parse_errors.sort_by(|a, b| a.path.cmp(&b.path));
        }
        Ok(scan)
    }

    /// Scan in-memory sources. Files are scanned in parallel, one scanner
    /// per worker, and results are concatenated in sorted path order.
    pub fn scan_sources(&self, root: &Path, mut sources: Vec<SourceFile>) -> Result<ProjectScan> {
        sources.sort_by(|a, b| a.path.cmp(&b.path));

        let progress = if self.verbose {
            let pb = ProgressBar::new(sources.len() as u64);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map(|s| s.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            Some(pb)
        } else {
            None
        };

        let results: Vec<(PathBuf, Result<Vec<DocumentationItem>>)> = sources
            .par_iter()
            .map_init(
                || Scanner::with_options(self.options.clone(), self.config.scoring.clone()),
                |scanner, source| {
                    let result = match scanner {
                        Ok(scanner) => scanner.scan(&source.text, &source.path),
                        Err(e) => Err(Error::parser(e.to_string())),
                    };
                    if let Some(pb) = &progress {
                        pb.inc(1);
                    }
                    (source.path.clone(), result)
                },
            )
            .collect();

        if let Some(pb) = progress {
            pb.finish_with_message("Scanning complete");
        }

        let mut scan = ProjectScan {
            root: root.to_path_buf(),
            files: sources.iter().map(|s| s.path.clone()).collect(),
            items: Vec::new(),
            parse_errors: Vec::new(),
        };

        for (path, result) in results {
            match result {
                Ok(items) => scan.items.extend(items),
                Err(e) if e.is_parse_failure() => {
                    warn!(path = %path.display(), error = %e, "skipping file that failed to parse");
                    scan.parse_errors.push(ParseFailure {
                        path,
                        message: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            files = scan.files.len(),
            items = scan.items.len(),
            errors = scan.parse_errors.len(),
            "project scan complete"
        );
        Ok(scan)
    }

    /// Python files under the root matching include and not exclude
    /// patterns, relative to the root and sorted
    pub fn discover_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if self.is_selected(relative) {
                files.push(relative.to_path_buf());
            } else {
                debug!(path = %relative.display(), "file not selected");
            }
        }

        files.sort();
        Ok(files)
    }

    fn is_selected(&self, relative: &Path) -> bool {
        let path = relative.to_string_lossy().replace('\\', "/");
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.include.iter().any(|p| p.matches_with(&path, options))
            && !self.exclude.iter().any(|p| p.matches_with(&path, options))
    }

    /// Relationship graph of a scan
    pub fn analyze(&self, scan: &ProjectScan) -> RelationshipGraph {
        RelationshipAnalyzer::new(self.options.model_bases.clone()).analyze(&scan.items)
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(Error::from))
        .collect()
}
