//! docmap - Documentation coverage and class diagrams for Python codebases
//!
//! Scans Python sources for docstrings, scores how complete they are, infers
//! the relationships between classes and renders them as PlantUML.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod scanner;

// Re-export main types
pub use analysis::{CoverageSummary, ProjectScan, ProjectScanner, RelationshipAnalyzer};
pub use config::Config;
pub use error::{Error, Result};
pub use model::{DiagramConfig, DocumentationItem, RelationshipGraph};
pub use output::DiagramRenderer;
pub use scanner::Scanner;
