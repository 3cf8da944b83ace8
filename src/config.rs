use crate::error::{Error, Result};
use crate::model::{DiagramConfig, HttpMethod, PRESETS};
use crate::scanner::{ScanOptions, ScoringPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration, read from `docmap.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub scan: ScanConfig,
    pub scoring: ScoringPolicy,
    pub diagram: DiagramSettings,
    pub render: RenderConfig,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
}

/// Source discovery and recognition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub model_bases: Vec<String>,
    pub http_verbs: Vec<String>,
    pub abstract_markers: Vec<String>,
    pub app_constructors: Vec<String>,
}

/// Default class diagram settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramSettings {
    pub preset: String,
    pub max_classes: Option<usize>,
    pub layout_direction: Option<String>,
    pub include_private: Option<bool>,
}

/// PlantUML render client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub servers: Vec<String>,
    pub cache_dir: PathBuf,
    pub timeout_secs: u64,
}

/// Scan report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(Error::config_validation(format!("unknown output format: {}", other))),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            description: None,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        let options = ScanOptions::default();
        Self {
            include: vec!["**/*.py".to_string()],
            exclude: vec![
                "**/__pycache__/**".to_string(),
                "**/.git/**".to_string(),
                "**/venv/**".to_string(),
                "**/.venv/**".to_string(),
                "**/node_modules/**".to_string(),
                "**/migrations/**".to_string(),
                "**/*.egg-info/**".to_string(),
            ],
            model_bases: options.model_bases,
            http_verbs: options.http_verbs.iter().map(|m| m.as_str().to_string()).collect(),
            abstract_markers: options.abstract_markers,
            app_constructors: options.app_constructors,
        }
    }
}

impl Default for DiagramSettings {
    fn default() -> Self {
        Self {
            preset: "overview".to_string(),
            max_classes: None,
            layout_direction: None,
            include_private: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            servers: vec![
                "https://www.plantuml.com/plantuml".to_string(),
                "https://kroki.io/plantuml".to_string(),
            ],
            cache_dir: PathBuf::from(".docmap/uml_cache"),
            timeout_secs: 30,
        }
    }
}

impl ScanConfig {
    /// Scanner options; unknown HTTP verbs are rejected
    pub fn options(&self) -> Result<ScanOptions> {
        let http_verbs = self
            .http_verbs
            .iter()
            .map(|v| {
                HttpMethod::from_name(v)
                    .ok_or_else(|| Error::config_validation(format!("unknown HTTP verb: {}", v)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ScanOptions {
            model_bases: self.model_bases.clone(),
            http_verbs,
            abstract_markers: self.abstract_markers.clone(),
            app_constructors: self.app_constructors.clone(),
        })
    }
}

impl DiagramSettings {
    /// Resolve the preset and apply overrides
    pub fn diagram_config(&self) -> Result<DiagramConfig> {
        let mut config = DiagramConfig::preset(&self.preset)?;
        if let Some(max) = self.max_classes {
            config = config.with_max_classes(max);
        }
        if let Some(direction) = &self.layout_direction {
            config = config.with_layout(direction.parse()?);
        }
        if let Some(private) = self.include_private {
            config = config.with_private(private);
        }
        Ok(config)
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(&mut self, exclude: Vec<String>, preset: Option<String>, max_classes: Option<usize>) {
        if !exclude.is_empty() {
            self.scan.exclude.extend(exclude);
        }

        if let Some(preset) = preset {
            self.diagram.preset = preset;
        }

        if let Some(max) = max_classes {
            self.diagram.max_classes = Some(max);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.scan.include.is_empty() {
            return Err(Error::config_validation("at least one include pattern required"));
        }

        if self.scan.http_verbs.is_empty() {
            return Err(Error::config_validation("at least one HTTP verb required"));
        }
        self.scan.options()?;

        if !PRESETS.iter().any(|(name, _)| *name == self.diagram.preset) {
            return Err(Error::config_validation(format!(
                "unknown diagram preset: {}",
                self.diagram.preset
            )));
        }

        if self.diagram.max_classes == Some(0) {
            return Err(Error::config_validation("max_classes must be at least 1"));
        }

        if let Some(direction) = &self.diagram.layout_direction {
            direction
                .parse::<crate::model::LayoutDirection>()
                .map_err(|e| Error::config_validation(e.to_string()))?;
        }

        if self.render.timeout_secs == 0 {
            return Err(Error::config_validation("render timeout must be at least 1 second"));
        }

        self.scoring.validate()
    }
}
