// Diagram configuration and named presets

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of class diagram to render
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiagramKind {
    #[default]
    ClassOverview,
    ClassDetailed,
    PackageStructure,
    FastapiArchitecture,
    ServiceLayer,
    DataModel,
}

impl DiagramKind {
    pub const ALL: [DiagramKind; 6] = [
        DiagramKind::ClassOverview,
        DiagramKind::ClassDetailed,
        DiagramKind::PackageStructure,
        DiagramKind::FastapiArchitecture,
        DiagramKind::ServiceLayer,
        DiagramKind::DataModel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramKind::ClassOverview => "class_overview",
            DiagramKind::ClassDetailed => "class_detailed",
            DiagramKind::PackageStructure => "package_structure",
            DiagramKind::FastapiArchitecture => "fastapi_architecture",
            DiagramKind::ServiceLayer => "service_layer",
            DiagramKind::DataModel => "data_model",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DiagramKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::render_config(format!("unknown diagram kind: {}", s)))
    }
}

/// Diagram layout direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutDirection {
    #[default]
    TopToBottom,
    LeftToRight,
}

impl LayoutDirection {
    /// PlantUML layout directive
    pub fn directive(&self) -> &'static str {
        match self {
            LayoutDirection::TopToBottom => "top to bottom direction",
            LayoutDirection::LeftToRight => "left to right direction",
        }
    }
}

impl FromStr for LayoutDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "top to bottom direction" | "top_to_bottom" | "top-to-bottom" | "tb" => {
                Ok(LayoutDirection::TopToBottom)
            }
            "left to right direction" | "left_to_right" | "left-to-right" | "lr" => {
                Ok(LayoutDirection::LeftToRight)
            }
            other => Err(Error::render_config(format!("unknown layout direction: {}", other))),
        }
    }
}

/// Named presets with a short description, in listing order
pub const PRESETS: [(&str, &str); 5] = [
    ("overview", "High-level class overview without members"),
    ("detailed", "Detailed class diagram with attributes and methods"),
    ("services", "Service layer classes and their collaborators"),
    ("models", "Data models and schemas with their fields"),
    ("fastapi", "FastAPI application architecture"),
];

/// Immutable diagram rendering configuration, built from a kind or preset
/// and the `with_*` builders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramConfig {
    kind: DiagramKind,
    include_methods: bool,
    include_attributes: bool,
    include_private: bool,
    max_classes: usize,
    focus_packages: Vec<String>,
    exclude_packages: Vec<String>,
    group_by_package: bool,
    show_stereotypes: bool,
    color_by_type: bool,
    layout_direction: LayoutDirection,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self::new(DiagramKind::default())
    }
}

impl DiagramConfig {
    /// Configuration of the given kind with default settings
    pub fn new(kind: DiagramKind) -> Self {
        Self {
            kind,
            include_methods: true,
            include_attributes: true,
            include_private: false,
            max_classes: 20,
            focus_packages: Vec::new(),
            exclude_packages: vec!["builtins".into(), "typing".into(), "collections".into()],
            group_by_package: true,
            show_stereotypes: true,
            color_by_type: true,
            layout_direction: LayoutDirection::TopToBottom,
        }
    }

    /// Configuration for a kind given by name
    pub fn for_kind(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// Configuration for a named preset
    pub fn preset(name: &str) -> Result<Self> {
        let config = match name {
            "overview" => Self::new(DiagramKind::ClassOverview)
                .with_methods(false)
                .with_attributes(false)
                .with_max_classes(15)
                .with_layout(LayoutDirection::LeftToRight),
            "detailed" => Self::new(DiagramKind::ClassDetailed).with_max_classes(10),
            "services" => Self::new(DiagramKind::ServiceLayer)
                .with_attributes(false)
                .with_max_classes(12)
                .with_focus(&["services"]),
            "models" => Self::new(DiagramKind::DataModel)
                .with_methods(false)
                .with_max_classes(15)
                .with_focus(&["models", "schemas"]),
            "fastapi" => Self::new(DiagramKind::FastapiArchitecture)
                .with_attributes(false)
                .with_max_classes(20),
            other => {
                return Err(Error::render_config(format!("unknown preset: {}", other)));
            }
        };
        Ok(config)
    }

    pub fn with_methods(mut self, include: bool) -> Self {
        self.include_methods = include;
        self
    }

    pub fn with_attributes(mut self, include: bool) -> Self {
        self.include_attributes = include;
        self
    }

    pub fn with_private(mut self, include: bool) -> Self {
        self.include_private = include;
        self
    }

    pub fn with_max_classes(mut self, max: usize) -> Self {
        self.max_classes = max;
        self
    }

    pub fn with_focus(mut self, packages: &[&str]) -> Self {
        self.focus_packages = packages.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_exclude(mut self, packages: &[&str]) -> Self {
        self.exclude_packages = packages.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_grouping(mut self, group: bool) -> Self {
        self.group_by_package = group;
        self
    }

    pub fn with_stereotypes(mut self, show: bool) -> Self {
        self.show_stereotypes = show;
        self
    }

    pub fn with_colors(mut self, color: bool) -> Self {
        self.color_by_type = color;
        self
    }

    pub fn with_layout(mut self, direction: LayoutDirection) -> Self {
        self.layout_direction = direction;
        self
    }

    pub fn kind(&self) -> DiagramKind {
        self.kind
    }

    pub fn include_methods(&self) -> bool {
        self.include_methods
    }

    pub fn include_attributes(&self) -> bool {
        self.include_attributes
    }

    pub fn include_private(&self) -> bool {
        self.include_private
    }

    pub fn max_classes(&self) -> usize {
        self.max_classes
    }

    pub fn focus_packages(&self) -> &[String] {
        &self.focus_packages
    }

    pub fn exclude_packages(&self) -> &[String] {
        &self.exclude_packages
    }

    pub fn group_by_package(&self) -> bool {
        self.group_by_package
    }

    pub fn show_stereotypes(&self) -> bool {
        self.show_stereotypes
    }

    pub fn color_by_type(&self) -> bool {
        self.color_by_type
    }

    pub fn layout_direction(&self) -> LayoutDirection {
        self.layout_direction
    }
}

/// Caller-supplied diagram settings, e.g. deserialized from JSON or TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramOptions {
    pub kind: String,
    pub include_methods: bool,
    pub include_attributes: bool,
    pub include_private: bool,
    pub max_classes: usize,
    pub focus_packages: Vec<String>,
    pub exclude_packages: Vec<String>,
    pub group_by_package: bool,
    pub show_stereotypes: bool,
    pub color_by_type: bool,
    pub layout_direction: String,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        let config = DiagramConfig::default();
        Self {
            kind: config.kind.as_str().to_string(),
            include_methods: config.include_methods,
            include_attributes: config.include_attributes,
            include_private: config.include_private,
            max_classes: config.max_classes,
            focus_packages: config.focus_packages,
            exclude_packages: config.exclude_packages,
            group_by_package: config.group_by_package,
            show_stereotypes: config.show_stereotypes,
            color_by_type: config.color_by_type,
            layout_direction: config.layout_direction.directive().to_string(),
        }
    }
}

impl TryFrom<DiagramOptions> for DiagramConfig {
    type Error = Error;

    fn try_from(options: DiagramOptions) -> Result<Self> {
        Ok(DiagramConfig {
            kind: options.kind.parse()?,
            include_methods: options.include_methods,
            include_attributes: options.include_attributes,
            include_private: options.include_private,
            max_classes: options.max_classes,
            focus_packages: options.focus_packages,
            exclude_packages: options.exclude_packages,
            group_by_package: options.group_by_package,
            show_stereotypes: options.show_stereotypes,
            color_by_type: options.color_by_type,
            layout_direction: options.layout_direction.parse()?,
        })
    }
}
