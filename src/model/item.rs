// Documentation records emitted by the scanner
//
// One record per documentable declaration: modules with a docstring,
// classes, validation models, functions, properties and HTTP endpoints.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kind of documented declaration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Module,
    Class,
    /// Class deriving from a validation-model base such as `BaseModel`
    Model,
    Function,
    Property,
    /// Route handler registered through an HTTP verb decorator
    Endpoint,
    /// Literal keyword argument of an application constructor such as `FastAPI(title=...)`
    Metadata,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Module => "module",
            ItemKind::Class => "class",
            ItemKind::Model => "model",
            ItemKind::Function => "function",
            ItemKind::Property => "property",
            ItemKind::Endpoint => "endpoint",
            ItemKind::Metadata => "metadata",
        }
    }

    /// Items scored with the callable rubric
    pub fn is_callable(&self) -> bool {
        matches!(self, ItemKind::Function | ItemKind::Property | ItemKind::Endpoint)
    }

    /// Items that become class nodes in relationship analysis
    pub fn is_class_like(&self) -> bool {
        matches!(self, ItemKind::Class | ItemKind::Model)
    }

    /// Items counted in coverage figures
    pub fn is_documentable(&self) -> bool {
        !matches!(self, ItemKind::Metadata)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HTTP verbs recognized on route decorators
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Parse a verb case-insensitively, e.g. `get` or `GET`
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(name))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Route metadata read from an endpoint decorator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpMetadata {
    pub method: HttpMethod,
    /// First positional string argument, empty when absent
    pub path: String,
    pub status_codes: Vec<u16>,
    pub response_model: Option<String>,
    pub tags: Vec<String>,
    pub operation_id: Option<String>,
}

impl HttpMetadata {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            status_codes: Vec::new(),
            response_model: None,
            tags: Vec::new(),
            operation_id: None,
        }
    }
}

/// Docstring convention detected in a docstring
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocstringStyle {
    Google,
    Numpy,
    Sphinx,
    /// Prose without any recognized section
    Plain,
    /// No docstring at all
    #[default]
    None,
}

impl DocstringStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocstringStyle::Google => "google",
            DocstringStyle::Numpy => "numpy",
            DocstringStyle::Sphinx => "sphinx",
            DocstringStyle::Plain => "plain",
            DocstringStyle::None => "none",
        }
    }
}

/// A validation-model field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelField {
    pub name: String,
    pub type_hint: String,
}

impl ModelField {
    pub fn new(name: &str, type_hint: &str) -> Self {
        Self {
            name: name.to_string(),
            type_hint: type_hint.to_string(),
        }
    }
}

/// A single documentable declaration and its assessment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentationItem {
    /// Dotted module path relative to the project root
    pub module: String,
    /// Nesting-aware dotted name, e.g. `UserService.get_user`
    pub qualname: String,
    pub kind: ItemKind,
    pub is_async: bool,
    pub signature: String,
    pub docstring: Option<String>,
    /// Description supplied by a decorator keyword
    pub description: Option<String>,
    /// Up to five source lines following the declaration header
    pub first_lines: Vec<String>,
    /// 1-based line number
    pub lineno: usize,
    pub file_path: PathBuf,
    pub decorators: Vec<String>,
    /// Qualname of the class whose body directly contains this declaration
    pub enclosing_class: Option<String>,

    pub actual_params: Vec<String>,
    pub documented_params: Vec<String>,
    pub missing_params: Vec<String>,
    pub extra_params: Vec<String>,
    pub has_return_doc: bool,
    /// Annotated parameters in declaration order
    pub param_types: IndexMap<String, String>,
    pub return_type: Option<String>,
    pub has_type_hints: bool,

    pub coverage_score: f64,
    pub quality_score: f64,
    pub completeness_issues: Vec<String>,
    pub docstring_style: DocstringStyle,
    pub style_issues: Vec<String>,
    pub documented_raises: Vec<String>,
    pub raised_exceptions: Vec<String>,

    pub http: Option<HttpMetadata>,
    pub dependencies: Vec<String>,
    /// Declared fields, models only
    pub fields: Vec<ModelField>,
    pub is_abstract: bool,

    pub complexity: usize,
    pub maintainability: f64,
}

impl DocumentationItem {
    /// Create an item with empty analysis results
    pub fn new(module: &str, qualname: &str, kind: ItemKind, file_path: PathBuf, lineno: usize) -> Self {
        Self {
            module: module.to_string(),
            qualname: qualname.to_string(),
            kind,
            is_async: false,
            signature: String::new(),
            docstring: None,
            description: None,
            first_lines: Vec::new(),
            lineno,
            file_path,
            decorators: Vec::new(),
            enclosing_class: None,
            actual_params: Vec::new(),
            documented_params: Vec::new(),
            missing_params: Vec::new(),
            extra_params: Vec::new(),
            has_return_doc: false,
            param_types: IndexMap::new(),
            return_type: None,
            has_type_hints: false,
            coverage_score: 0.0,
            quality_score: 0.0,
            completeness_issues: Vec::new(),
            docstring_style: DocstringStyle::None,
            style_issues: Vec::new(),
            documented_raises: Vec::new(),
            raised_exceptions: Vec::new(),
            http: None,
            dependencies: Vec::new(),
            fields: Vec::new(),
            is_abstract: false,
            complexity: 1,
            maintainability: 100.0,
        }
    }

    /// Identity of the item within a project scan
    pub fn key(&self) -> (&str, &str, usize) {
        (&self.module, &self.qualname, self.lineno)
    }

    /// Last segment of the qualname
    pub fn name(&self) -> &str {
        self.qualname.rsplit('.').next().unwrap_or(&self.qualname)
    }

    pub fn has_docstring(&self) -> bool {
        self.docstring.as_deref().map_or(false, |d| !d.trim().is_empty())
    }

    /// Dunder methods are public, single-underscore names are private
    pub fn is_private(&self) -> bool {
        let name = self.name();
        name.starts_with('_') && !(name.starts_with("__") && name.ends_with("__"))
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == ItemKind::Function && self.name() == "__init__"
    }

    /// Kind string in the report format: the HTTP verb for endpoints,
    /// `async_function` for coroutines.
    pub fn method_label(&self) -> String {
        match self.kind {
            ItemKind::Endpoint => self
                .http
                .as_ref()
                .map(|h| h.method.as_str().to_string())
                .unwrap_or_else(|| "endpoint".to_string()),
            ItemKind::Function if self.is_async => "async_function".to_string(),
            kind => kind.as_str().to_string(),
        }
    }
}
