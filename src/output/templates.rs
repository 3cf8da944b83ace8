// Template engine for auxiliary diagrams and the markdown coverage report

use crate::analysis::{CoverageSummary, ParseFailure, ProjectScan};
use crate::error::{Error, Result};
use crate::model::{DocumentationItem, ItemKind};
use std::collections::HashMap;
use tera::{Context, Tera, Value};

/// Template engine wrapping Tera with embedded templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("sequence.puml", include_str!("../../templates/sequence.puml.tera")),
            ("component.puml", include_str!("../../templates/component.puml.tera")),
            ("coverage.md", include_str!("../../templates/coverage.md.tera")),
        ])?;

        tera.register_filter("pluralize", pluralize);

        Ok(Self { tera })
    }

    /// Request flow of one endpoint
    pub fn sequence_diagram(&self, endpoint: &DocumentationItem) -> Result<String> {
        let http = endpoint.http.as_ref().ok_or_else(|| {
            Error::render_config(format!("{} is not an HTTP endpoint", endpoint.qualname))
        })?;

        let status = http
            .status_codes
            .first()
            .map(|code| format!("HTTP {}", code))
            .unwrap_or_else(|| "HTTP Response".to_string());

        let mut context = Context::new();
        context.insert("name", endpoint.name());
        context.insert("method", http.method.as_str());
        context.insert("path", &http.path);
        context.insert("dependencies", &endpoint.dependencies);
        context.insert("status", &status);
        context.insert("response_model", &http.response_model);

        Ok(self.tera.render("sequence.puml", &context)?)
    }

    /// High-level layer diagram of a project
    pub fn component_diagram(&self, project: &str, items: &[DocumentationItem]) -> Result<String> {
        let endpoints = items.iter().filter(|i| i.kind == ItemKind::Endpoint).count();
        let models = items.iter().filter(|i| i.kind == ItemKind::Model).count();
        let services = items
            .iter()
            .filter(|i| i.kind == ItemKind::Class && i.name().to_lowercase().contains("service"))
            .count();

        let mut context = Context::new();
        context.insert("project", project);
        context.insert("endpoints", &endpoints);
        context.insert("services", &services);
        context.insert("models", &models);

        Ok(self.tera.render("component.puml", &context)?)
    }

    /// Markdown coverage report of a scan
    pub fn coverage_report(&self, project: &str, scan: &ProjectScan) -> Result<String> {
        let summary: CoverageSummary = scan.summary();
        let issues: Vec<&DocumentationItem> = scan
            .items
            .iter()
            .filter(|i| !i.completeness_issues.is_empty())
            .collect();
        let parse_errors: &[ParseFailure] = &scan.parse_errors;

        let mut context = Context::new();
        context.insert("project", project);
        context.insert("summary", &summary);
        context.insert("issues", &issues);
        context.insert("parse_errors", parse_errors);

        Ok(self.tera.render("coverage.md", &context)?)
    }
}

/// Count followed by the singular or plural noun
fn pluralize(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let count = value.as_u64().unwrap_or(0);
    let singular = args
        .get("singular")
        .and_then(|v| v.as_str())
        .unwrap_or("item");
    let default_plural = format!("{}s", singular);
    let plural = args
        .get("plural")
        .and_then(|v| v.as_str())
        .unwrap_or(&default_plural);

    if count == 1 {
        Ok(Value::String(format!("{} {}", count, singular)))
    } else {
        Ok(Value::String(format!("{} {}", count, plural)))
    }
}
