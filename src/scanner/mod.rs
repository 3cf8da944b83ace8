// Scanner: Python source -> ordered documentation items
//
// Walks the syntax tree in document order, keeping a qualname scope
// stack, and emits one item per module docstring, class, model,
// function, property, HTTP endpoint and application metadata keyword.

pub mod docstring;
mod metrics;
pub mod scoring;

pub use docstring::{analyze as analyze_docstring, DocstringInfo};
pub use metrics::{maintainability, FunctionMetrics};
pub use scoring::{Assessment, LengthTier, ScoringPolicy};

use crate::error::Result;
use crate::model::{DocumentationItem, HttpMetadata, HttpMethod, ItemKind, ModelField};
use crate::parser::{
    block_docstring, compact_text, decorator_name, decorator_nodes, last_segment, line_of, node_text,
    render_type, statement_docstring, string_content, PythonParser,
};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use tree_sitter::Node;

/// Knobs controlling what the scanner recognizes
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// Base class names marking validation models, matched on the last segment
    pub model_bases: Vec<String>,
    /// Route decorator verbs that produce endpoint items
    pub http_verbs: Vec<HttpMethod>,
    /// Base or metaclass names marking abstract classes
    pub abstract_markers: Vec<String>,
    /// Application constructors whose literal keyword arguments become metadata items
    pub app_constructors: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            model_bases: vec!["BaseModel".to_string()],
            http_verbs: HttpMethod::ALL.to_vec(),
            abstract_markers: vec!["ABC".to_string(), "ABCMeta".to_string()],
            app_constructors: vec!["FastAPI".to_string()],
        }
    }
}

impl ScanOptions {
    /// True when a written base such as `pydantic.BaseModel` or
    /// `GenericModel[T]` is a validation-model marker
    pub fn is_model_base(&self, base: &str) -> bool {
        let name = last_segment(strip_generics(base));
        self.model_bases.iter().any(|m| last_segment(m) == name)
    }
}

/// Python documentation scanner. Holds one parser; not shared across threads.
pub struct Scanner {
    parser: PythonParser,
    options: ScanOptions,
    policy: ScoringPolicy,
}

impl Scanner {
    /// Scanner with default options and scoring policy
    pub fn new() -> Result<Self> {
        Self::with_options(ScanOptions::default(), ScoringPolicy::default())
    }

    pub fn with_options(options: ScanOptions, policy: ScoringPolicy) -> Result<Self> {
        Ok(Self {
            parser: PythonParser::new()?,
            options,
            policy,
        })
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan one file's text. `file_path` is project-relative and determines
    /// the dotted module name.
    pub fn scan(&mut self, source: &str, file_path: &Path) -> Result<Vec<DocumentationItem>> {
        if source.trim().is_empty() {
            return Ok(Vec::new());
        }

        let tree = self.parser.parse(source, file_path)?;
        let mut walker = Walker {
            source: source.as_bytes(),
            module: module_name(file_path),
            file_path: file_path.to_path_buf(),
            options: &self.options,
            policy: &self.policy,
            scope: Vec::new(),
            items: Vec::new(),
        };
        walker.visit_module(&tree.root_node());

        debug!(path = %file_path.display(), items = walker.items.len(), "scanned file");
        Ok(walker.items)
    }

    /// Read and scan a file; its module name comes from the file name alone
    pub fn scan_file(&mut self, path: &Path) -> Result<Vec<DocumentationItem>> {
        let source = std::fs::read_to_string(path)?;
        let relative = path.file_name().map(PathBuf::from).unwrap_or_else(|| path.to_path_buf());
        self.scan(&source, &relative)
    }
}

/// Dotted module name of a project-relative path, e.g. `app/models.py` ->
/// `app.models`, `app/__init__.py` -> `app`
pub fn module_name(file_path: &Path) -> String {
    let mut parts: Vec<String> = file_path
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.len() > 1 && parts.last().map_or(false, |p| p == "__init__") {
        parts.pop();
    }

    parts.join(".")
}

/// `Generic[T]` -> `Generic`
fn strip_generics(name: &str) -> &str {
    match name.find('[') {
        Some(idx) => name[..idx].trim(),
        None => name.trim(),
    }
}

#[derive(Debug)]
struct Frame {
    name: String,
    is_class: bool,
}

/// A parsed function parameter
struct Param {
    name: String,
    type_hint: Option<String>,
    default: Option<String>,
    dependency: Option<String>,
}

impl Param {
    fn display(&self) -> String {
        let mut out = self.name.clone();
        if let Some(t) = &self.type_hint {
            out.push_str(": ");
            out.push_str(t);
        }
        if let Some(d) = &self.default {
            out.push_str(if self.type_hint.is_some() { " = " } else { "=" });
            out.push_str(d);
        }
        out
    }

    fn is_variadic(&self) -> bool {
        self.name.starts_with('*')
    }
}

/// Route metadata plus decorator-level dependencies
struct Route {
    http: HttpMetadata,
    description: Option<String>,
    dependencies: Vec<String>,
}

struct Walker<'a> {
    source: &'a [u8],
    module: String,
    file_path: PathBuf,
    options: &'a ScanOptions,
    policy: &'a ScoringPolicy,
    scope: Vec<Frame>,
    items: Vec<DocumentationItem>,
}

impl<'a> Walker<'a> {
    fn qualname(&self, name: &str) -> String {
        let mut parts: Vec<&str> = self.scope.iter().map(|f| f.name.as_str()).collect();
        parts.push(name);
        parts.join(".")
    }

    /// Qualname of the class whose body is being walked, if any
    fn enclosing_class(&self) -> Option<String> {
        match self.scope.last() {
            Some(frame) if frame.is_class => {
                let parts: Vec<&str> = self.scope.iter().map(|f| f.name.as_str()).collect();
                Some(parts.join("."))
            }
            _ => None,
        }
    }

    fn text(&self, node: &Node) -> &'a str {
        node_text(node, self.source)
    }

    fn visit_module(&mut self, root: &Node) {
        let mut cursor = root.walk();
        let first = root
            .named_children(&mut cursor)
            .find(|c| c.kind() != "comment");

        if let Some(statement) = first {
            if let Some(docstring) = statement_docstring(&statement, self.source) {
                let mut item = DocumentationItem::new(
                    &self.module,
                    &self.module,
                    ItemKind::Module,
                    self.file_path.clone(),
                    line_of(&statement),
                );
                item.signature = format!("module {}", self.module);
                item.docstring = Some(docstring);
                self.finish(&mut item);
                self.items.push(item);
            }
        }

        self.walk_block(root);
    }

    fn walk_block(&mut self, block: &Node) {
        let mut cursor = block.walk();
        let children: Vec<Node> = block.named_children(&mut cursor).collect();
        for child in children {
            self.visit_statement(&child);
        }
    }

    fn visit_statement(&mut self, node: &Node) {
        match node.kind() {
            "class_definition" => self.visit_class(node, &[]),
            "function_definition" => self.visit_function(node, &[]),
            "decorated_definition" => {
                let decorators = decorator_nodes(node);
                if let Some(definition) = node.child_by_field_name("definition") {
                    match definition.kind() {
                        "class_definition" => self.visit_class(&definition, &decorators),
                        "function_definition" => self.visit_function(&definition, &decorators),
                        _ => {}
                    }
                }
            }
            "expression_statement" => {
                if let Some(assignment) = node.named_child(0).filter(|n| n.kind() == "assignment") {
                    self.visit_assignment(&assignment);
                }
            }
            "if_statement" | "for_statement" | "while_statement" | "try_statement" | "with_statement"
            | "match_statement" => self.walk_compound(node),
            kind if kind.ends_with("_clause") => self.walk_compound(node),
            _ => {}
        }
    }

    /// `app = FastAPI(title="...", version="1.0")`: one metadata item per
    /// literal keyword, qualname `<target>.<keyword>`
    fn visit_assignment(&mut self, assignment: &Node) {
        let Some(target) = assignment.child_by_field_name("left").filter(|n| n.kind() == "identifier") else {
            return;
        };
        let Some(call) = assignment.child_by_field_name("right").filter(|n| n.kind() == "call") else {
            return;
        };
        let Some(function) = call.child_by_field_name("function") else {
            return;
        };
        let constructor = last_segment(self.text(&function));
        if !self.options.app_constructors.iter().any(|c| last_segment(c) == constructor) {
            return;
        }
        let Some(arguments) = call.child_by_field_name("arguments") else {
            return;
        };

        let target = self.text(&target).to_string();
        let mut cursor = arguments.walk();
        let keywords: Vec<Node> = arguments
            .named_children(&mut cursor)
            .filter(|a| a.kind() == "keyword_argument")
            .collect();
        for keyword in keywords {
            let (Some(key), Some(value)) = (keyword.child_by_field_name("name"), keyword.child_by_field_name("value"))
            else {
                continue;
            };
            let Some(value) = self.literal(&value) else {
                continue;
            };
            let key = self.text(&key).to_string();

            let qualname = self.qualname(&format!("{}.{}", target, key));
            let mut item = DocumentationItem::new(
                &self.module,
                &qualname,
                ItemKind::Metadata,
                self.file_path.clone(),
                line_of(&keyword),
            );
            item.signature = key;
            item.docstring = Some(value);
            self.policy.apply(&mut item);
            self.items.push(item);
        }
    }

    /// Text of a constant: string contents, or the literal as written
    fn literal(&self, node: &Node) -> Option<String> {
        match node.kind() {
            "string" | "concatenated_string" if !has_interpolation(node) => string_content(node, self.source),
            "integer" | "float" | "true" | "false" | "none" => Some(self.text(node).to_string()),
            _ => None,
        }
    }

    /// Descend into the blocks and clauses of a compound statement
    fn walk_compound(&mut self, node: &Node) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        for child in children {
            if child.kind() == "block" {
                self.walk_block(&child);
            } else if child.kind().ends_with("_clause") {
                self.walk_compound(&child);
            }
        }
    }

    fn visit_class(&mut self, node: &Node, decorators: &[Node]) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(&name_node).to_string();
        let qualname = self.qualname(&name);

        let mut bases = Vec::new();
        let mut arguments = Vec::new();
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            let mut cursor = superclasses.walk();
            for arg in superclasses.named_children(&mut cursor) {
                match arg.kind() {
                    "comment" => {}
                    "keyword_argument" => arguments.push(compact_text(&arg, self.source)),
                    _ => {
                        let text = compact_text(&arg, self.source);
                        bases.push(text.clone());
                        arguments.push(text);
                    }
                }
            }
        }

        let body = node.child_by_field_name("body");
        let docstring = body.as_ref().and_then(|b| block_docstring(b, self.source));
        let is_model = bases.iter().any(|b| self.options.is_model_base(b));
        let kind = if is_model { ItemKind::Model } else { ItemKind::Class };

        let mut item = self.new_item(&qualname, kind, node);
        item.signature = if arguments.is_empty() {
            format!("class {}", name)
        } else {
            format!("class {}({})", name, arguments.join(", "))
        };
        item.decorators = decorators.iter().map(|d| decorator_name(d, self.source)).collect();
        item.enclosing_class = self.enclosing_class();
        item.is_abstract = self.is_abstract_class(&arguments, docstring.as_deref());
        item.docstring = docstring;
        if is_model {
            if let Some(body) = &body {
                item.fields = self.model_fields(body);
            }
        }
        self.finish(&mut item);
        self.items.push(item);

        if let Some(body) = body {
            self.scope.push(Frame { name, is_class: true });
            self.walk_block(&body);
            self.scope.pop();
        }
    }

    fn is_abstract_class(&self, arguments: &[String], docstring: Option<&str>) -> bool {
        let marked = arguments.iter().any(|arg| {
            let value = arg.rsplit('=').next().unwrap_or(arg).trim();
            self.options
                .abstract_markers
                .iter()
                .any(|m| last_segment(strip_generics(value)) == m)
        });
        marked || docstring.map_or(false, |d| d.to_lowercase().contains("abstract"))
    }

    /// Annotated assignments and unannotated field-builder calls in a model body
    fn model_fields(&self, body: &Node) -> Vec<ModelField> {
        let mut fields = Vec::new();
        let mut cursor = body.walk();
        for statement in body.named_children(&mut cursor) {
            if statement.kind() != "expression_statement" {
                continue;
            }
            let Some(assignment) = statement.named_child(0).filter(|n| n.kind() == "assignment") else {
                continue;
            };
            let Some(left) = assignment.child_by_field_name("left").filter(|n| n.kind() == "identifier") else {
                continue;
            };
            let name = self.text(&left);

            let type_hint = match assignment.child_by_field_name("type") {
                Some(t) => Some(render_type(&t, self.source)),
                None => assignment
                    .child_by_field_name("right")
                    .filter(|r| r.kind() == "call")
                    .and_then(|r| r.child_by_field_name("function"))
                    .filter(|f| last_segment(self.text(f)).eq_ignore_ascii_case("field"))
                    .map(|_| "Any".to_string()),
            };

            if let Some(type_hint) = type_hint {
                fields.push(ModelField::new(name, &type_hint));
            }
        }
        fields
    }

    fn visit_function(&mut self, node: &Node, decorators: &[Node]) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(&name_node).to_string();
        let qualname = self.qualname(&name);
        let enclosing_class = self.enclosing_class();

        let mut cursor = node.walk();
        let is_async = node.children(&mut cursor).any(|c| c.kind() == "async");
        let decorator_names: Vec<String> = decorators.iter().map(|d| decorator_name(d, self.source)).collect();
        let is_static = decorator_names.iter().any(|d| last_segment(d) == "staticmethod");

        let mut params = self.parameters(node);
        let takes_receiver = params.first().map_or(false, |p| {
            !p.is_variadic()
                && ((enclosing_class.is_some() && !is_static) || p.name == "self" || p.name == "cls")
        });
        let receiver = if takes_receiver { Some(params.remove(0)) } else { None };

        let return_type = node
            .child_by_field_name("return_type")
            .map(|t| render_type(&t, self.source));

        let body = node.child_by_field_name("body");
        let docstring = body.as_ref().and_then(|b| block_docstring(b, self.source));

        let kind = if is_property_decorator(&decorator_names) {
            ItemKind::Property
        } else {
            ItemKind::Function
        };

        let mut item = self.new_item(&qualname, kind, node);
        item.is_async = is_async;
        item.signature = signature(is_async, &name, receiver.as_ref(), &params, return_type.as_deref());
        item.enclosing_class = enclosing_class;
        item.is_abstract = decorator_names.iter().any(|d| last_segment(d) == "abstractmethod");
        item.actual_params = params.iter().map(|p| p.name.clone()).collect();
        item.param_types = params
            .iter()
            .filter_map(|p| p.type_hint.as_ref().map(|t| (p.name.clone(), t.clone())))
            .collect();
        item.has_type_hints = !item.param_types.is_empty() || return_type.is_some();
        item.return_type = return_type;
        for dependency in params.iter().filter_map(|p| p.dependency.clone()) {
            push_unique(&mut item.dependencies, dependency);
        }
        if let Some(body) = &body {
            item.raised_exceptions = self.raised_exceptions(body);
            let metrics = FunctionMetrics::measure(body, docstring.is_some());
            item.complexity = metrics.complexity;
            item.maintainability = metrics.maintainability;
        }
        item.docstring = docstring;
        item.decorators = decorator_names;
        self.finish(&mut item);

        let endpoints: Vec<DocumentationItem> = decorators
            .iter()
            .filter_map(|d| self.route(d).map(|route| (line_of(d), route)))
            .map(|(line, route)| {
                let mut endpoint = item.clone();
                endpoint.kind = ItemKind::Endpoint;
                endpoint.lineno = line;
                endpoint.description = route.description;
                endpoint.http = Some(route.http);
                for dependency in route.dependencies {
                    push_unique(&mut endpoint.dependencies, dependency);
                }
                self.policy.apply(&mut endpoint);
                endpoint
            })
            .collect();

        self.items.push(item);
        self.items.extend(endpoints);

        if let Some(body) = body {
            self.scope.push(Frame { name, is_class: false });
            self.walk_block(&body);
            self.scope.pop();
        }
    }

    fn parameters(&self, function: &Node) -> Vec<Param> {
        let Some(parameters) = function.child_by_field_name("parameters") else {
            return Vec::new();
        };

        let mut params = Vec::new();
        let mut cursor = parameters.walk();
        for child in parameters.named_children(&mut cursor) {
            let (name_node, type_node, default_node) = match child.kind() {
                "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => (Some(child), None, None),
                "typed_parameter" => (child.named_child(0), child.child_by_field_name("type"), None),
                "default_parameter" => (child.child_by_field_name("name"), None, child.child_by_field_name("value")),
                "typed_default_parameter" => (
                    child.child_by_field_name("name"),
                    child.child_by_field_name("type"),
                    child.child_by_field_name("value"),
                ),
                _ => continue,
            };
            let Some(name_node) = name_node else {
                continue;
            };

            let type_hint = type_node.map(|t| render_type(&t, self.source));
            let dependency = default_node
                .as_ref()
                .and_then(|d| self.dependency_call(d, type_hint.as_deref()));
            params.push(Param {
                name: self.param_name(&name_node),
                default: default_node.map(|d| compact_text(&d, self.source)),
                type_hint,
                dependency,
            });
        }
        params
    }

    fn param_name(&self, node: &Node) -> String {
        let inner = node.named_child(0).map(|n| self.text(&n)).unwrap_or("");
        match node.kind() {
            "list_splat_pattern" => format!("*{}", inner),
            "dictionary_splat_pattern" => format!("**{}", inner),
            _ => self.text(node).to_string(),
        }
    }

    /// Target of a `Depends(x)` / `Security(x)` call; a bare `Depends()`
    /// falls back to the parameter's annotation
    fn dependency_call(&self, node: &Node, type_hint: Option<&str>) -> Option<String> {
        if node.kind() != "call" {
            return None;
        }
        let function = node.child_by_field_name("function")?;
        if !matches!(last_segment(self.text(&function)), "Depends" | "Security") {
            return None;
        }

        let arguments = node.child_by_field_name("arguments")?;
        let mut cursor = arguments.walk();
        let first = arguments
            .named_children(&mut cursor)
            .find(|a| a.kind() != "keyword_argument" && a.kind() != "comment");

        match first {
            Some(arg) if arg.kind() == "call" => arg
                .child_by_field_name("function")
                .map(|f| self.text(&f).to_string()),
            Some(arg) => Some(self.text(&arg).to_string()),
            None => type_hint.map(str::to_string),
        }
    }

    /// Route metadata of an `@<router>.<verb>(...)` decorator
    fn route(&self, decorator: &Node) -> Option<Route> {
        let call = decorator.named_child(0).filter(|n| n.kind() == "call")?;
        let function = call.child_by_field_name("function").filter(|f| f.kind() == "attribute")?;
        let verb = function.child_by_field_name("attribute")?;
        let method = HttpMethod::from_name(self.text(&verb))?;
        if !self.options.http_verbs.contains(&method) {
            return None;
        }

        let mut route = Route {
            http: HttpMetadata::new(method, ""),
            description: None,
            dependencies: Vec::new(),
        };
        let mut summary = None;

        let Some(arguments) = call.child_by_field_name("arguments") else {
            return Some(route);
        };
        let mut cursor = arguments.walk();
        let mut path_found = false;
        for arg in arguments.named_children(&mut cursor) {
            if arg.kind() != "keyword_argument" {
                if !path_found {
                    if let Some(path) = string_content(&arg, self.source) {
                        route.http.path = path;
                    }
                    path_found = true;
                }
                continue;
            }

            let (Some(key), Some(value)) = (arg.child_by_field_name("name"), arg.child_by_field_name("value")) else {
                continue;
            };
            match self.text(&key) {
                "path" => {
                    if let Some(path) = string_content(&value, self.source) {
                        route.http.path = path;
                    }
                }
                "description" => route.description = string_content(&value, self.source),
                "summary" => summary = string_content(&value, self.source),
                "status_code" => {
                    if let Some(code) = status_code(self.text(&value)) {
                        push_unique(&mut route.http.status_codes, code);
                    }
                }
                "responses" => {
                    for code in self.response_codes(&value) {
                        push_unique(&mut route.http.status_codes, code);
                    }
                }
                "response_model" => route.http.response_model = Some(render_type(&value, self.source)),
                "tags" => route.http.tags = self.string_list(&value),
                "operation_id" => route.http.operation_id = string_content(&value, self.source),
                "dependencies" => {
                    let mut cursor = value.walk();
                    for element in value.named_children(&mut cursor) {
                        if let Some(dependency) = self.dependency_call(&element, None) {
                            push_unique(&mut route.dependencies, dependency);
                        }
                    }
                }
                _ => {}
            }
        }

        if route.description.is_none() {
            route.description = summary;
        }
        Some(route)
    }

    fn response_codes(&self, dictionary: &Node) -> Vec<u16> {
        if dictionary.kind() != "dictionary" {
            return Vec::new();
        }
        let mut cursor = dictionary.walk();
        dictionary
            .named_children(&mut cursor)
            .filter(|pair| pair.kind() == "pair")
            .filter_map(|pair| pair.child_by_field_name("key"))
            .filter_map(|key| {
                let text = string_content(&key, self.source).unwrap_or_else(|| self.text(&key).to_string());
                status_code(&text)
            })
            .collect()
    }

    fn string_list(&self, node: &Node) -> Vec<String> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter_map(|n| string_content(&n, self.source))
            .collect()
    }

    /// Exceptions raised directly in a body, nested definitions excluded
    fn raised_exceptions(&self, body: &Node) -> Vec<String> {
        let mut raised = Vec::new();
        self.collect_raises(body, &mut raised);
        raised
    }

    fn collect_raises(&self, node: &Node, raised: &mut Vec<String>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "function_definition" | "class_definition" | "decorated_definition" | "lambda" => {}
                "raise_statement" => {
                    let exception = child.named_child(0).map(|e| match e.kind() {
                        "call" => e
                            .child_by_field_name("function")
                            .map(|f| self.text(&f).to_string())
                            .unwrap_or_default(),
                        _ => self.text(&e).to_string(),
                    });
                    if let Some(name) = exception.filter(|n| !n.is_empty()) {
                        push_unique(raised, name);
                    }
                }
                _ => self.collect_raises(&child, raised),
            }
        }
    }

    fn new_item(&self, qualname: &str, kind: ItemKind, node: &Node) -> DocumentationItem {
        let mut item = DocumentationItem::new(&self.module, qualname, kind, self.file_path.clone(), line_of(node));
        item.first_lines = self
            .text(node)
            .lines()
            .skip(1)
            .take(5)
            .map(|l| l.trim_end().to_string())
            .collect();
        item
    }

    /// Docstring analysis, parameter reconciliation and scoring
    fn finish(&self, item: &mut DocumentationItem) {
        let info = analyze_docstring(item.docstring.as_deref());
        item.docstring_style = info.style;
        item.style_issues = info.style_issues;
        item.documented_raises = info.raises;

        if item.kind.is_callable() {
            let documented: Vec<&str> = info.params.iter().map(|p| bare_name(p)).collect();
            let actual: Vec<&str> = item.actual_params.iter().map(|p| bare_name(p)).collect();

            item.missing_params = item
                .actual_params
                .iter()
                .filter(|p| !documented.contains(&bare_name(p)))
                .cloned()
                .collect();
            item.extra_params = info
                .params
                .iter()
                .filter(|p| !actual.contains(&bare_name(p)))
                .cloned()
                .collect();
            item.documented_params = info.params;
            item.has_return_doc = info.has_return;
        }

        self.policy.apply(item);
    }
}

/// f-strings with replacement fields are not constants
fn has_interpolation(node: &Node) -> bool {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    children
        .iter()
        .any(|c| c.kind() == "interpolation" || (c.kind() == "string" && has_interpolation(c)))
}

/// Parameter name without `*` / `**` markers
fn bare_name(name: &str) -> &str {
    name.trim_start_matches('*')
}

fn is_property_decorator(decorators: &[String]) -> bool {
    decorators.iter().any(|d| {
        matches!(last_segment(d), "property" | "cached_property" | "abstractproperty")
            || d.ends_with(".setter")
            || d.ends_with(".getter")
            || d.ends_with(".deleter")
    })
}

fn signature(
    is_async: bool,
    name: &str,
    receiver: Option<&Param>,
    params: &[Param],
    return_type: Option<&str>,
) -> String {
    let rendered: Vec<String> = receiver.into_iter().chain(params.iter()).map(Param::display).collect();
    let mut out = format!(
        "{}def {}({})",
        if is_async { "async " } else { "" },
        name,
        rendered.join(", ")
    );
    if let Some(ret) = return_type {
        out.push_str(" -> ");
        out.push_str(ret);
    }
    out
}

/// `201`, `"404"` or `status.HTTP_201_CREATED` -> 201
fn status_code(text: &str) -> Option<u16> {
    let text = text.trim().trim_matches(|c: char| c == '"' || c == '\'');
    if let Ok(code) = text.parse::<u16>() {
        return Some(code);
    }
    last_segment(text)
        .split('_')
        .find_map(|part| part.parse::<u16>().ok())
        .filter(|code| (100..600).contains(code))
}

fn push_unique<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if !values.contains(&value) {
        values.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocstringStyle;

    fn scan(source: &str) -> Vec<DocumentationItem> {
        let mut scanner = Scanner::new().unwrap();
        scanner.scan(source, Path::new("app/main.py")).unwrap()
    }

    fn find<'a>(items: &'a [DocumentationItem], qualname: &str, kind: ItemKind) -> &'a DocumentationItem {
        items
            .iter()
            .find(|i| i.qualname == qualname && i.kind == kind)
            .unwrap_or_else(|| panic!("no {} item {}", kind, qualname))
    }

    #[test]
    fn test_module_name() {
        assert_eq!(module_name(Path::new("app/models.py")), "app.models");
        assert_eq!(module_name(Path::new("app/__init__.py")), "app");
        assert_eq!(module_name(Path::new("main.py")), "main");
        assert_eq!(module_name(Path::new("__init__.py")), "__init__");
    }

    #[test]
    fn test_empty_and_comment_only_files() {
        assert!(scan("").is_empty());
        assert!(scan("   \n\n").is_empty());
        assert!(scan("# just a comment\n").is_empty());
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let mut scanner = Scanner::new().unwrap();
        let err = scanner
            .scan("def broken(\n    return 1\n", Path::new("bad.py"))
            .unwrap_err();
        assert!(err.is_parse_failure());
    }

    #[test]
    fn test_module_docstring_item() {
        let items = scan("\"\"\"Main application module.\"\"\"\n\nx = 1\n");
        assert_eq!(items.len(), 1);
        let module = &items[0];
        assert_eq!(module.kind, ItemKind::Module);
        assert_eq!(module.module, "app.main");
        assert_eq!(module.lineno, 1);
        assert_eq!(module.coverage_score, 100.0);
        assert_eq!(module.quality_score, 100.0);
    }

    #[test]
    fn test_no_module_item_without_docstring() {
        let items = scan("def f():\n    pass\n");
        assert!(items.iter().all(|i| i.kind != ItemKind::Module));
    }

    #[test]
    fn test_function_params_and_types() {
        let source = r#"
def get_user(user_id: int, active: bool = True, *args, **kwargs) -> "User":
    """Get a user.

    Args:
        user_id: The ID.
    """
    return None
"#;
        let items = scan(source);
        let func = find(&items, "get_user", ItemKind::Function);
        assert_eq!(func.actual_params, vec!["user_id", "active", "*args", "**kwargs"]);
        assert_eq!(func.documented_params, vec!["user_id"]);
        assert_eq!(func.missing_params, vec!["active", "*args", "**kwargs"]);
        assert!(func.extra_params.is_empty());
        assert_eq!(func.param_types.get("user_id").map(String::as_str), Some("int"));
        assert_eq!(func.return_type.as_deref(), Some("User"));
        assert!(func.has_type_hints);
        assert_eq!(func.lineno, 2);
        assert_eq!(
            func.signature,
            "def get_user(user_id: int, active: bool = True, *args, **kwargs) -> User"
        );
        assert_eq!(func.docstring_style, DocstringStyle::Google);
    }

    #[test]
    fn test_missing_param_b() {
        let source = "def f(a, b):\n    \"\"\"Add.\n\n    Args:\n        a: First.\n    \"\"\"\n";
        let items = scan(source);
        let func = find(&items, "f", ItemKind::Function);
        assert_eq!(func.missing_params, vec!["b"]);
    }

    #[test]
    fn test_extra_documented_params() {
        let source = "def f(a):\n    \"\"\"Do.\n\n    Args:\n        a: First.\n        ghost: Not real.\n    \"\"\"\n";
        let items = scan(source);
        let func = find(&items, "f", ItemKind::Function);
        assert_eq!(func.extra_params, vec!["ghost"]);
        assert!(func
            .completeness_issues
            .contains(&"Documents unknown parameters: ghost".to_string()));
    }

    #[test]
    fn test_methods_and_nested_qualnames() {
        let source = r#"
class UserService:
    """Service for users."""

    def __init__(self, repo):
        self.repo = repo

    @staticmethod
    def build(name):
        pass

    class Config:
        pass

def outer_function():
    def inner_function():
        pass
"#;
        let items = scan(source);
        let init = find(&items, "UserService.__init__", ItemKind::Function);
        assert_eq!(init.actual_params, vec!["repo"]);
        assert_eq!(init.enclosing_class.as_deref(), Some("UserService"));
        assert_eq!(init.signature, "def __init__(self, repo)");

        let build = find(&items, "UserService.build", ItemKind::Function);
        assert_eq!(build.actual_params, vec!["name"]);

        let config = find(&items, "UserService.Config", ItemKind::Class);
        assert_eq!(config.enclosing_class.as_deref(), Some("UserService"));

        let inner = find(&items, "outer_function.inner_function", ItemKind::Function);
        assert_eq!(inner.enclosing_class, None);
    }

    #[test]
    fn test_async_function() {
        let items = scan("async def fetch():\n    \"\"\"Fetch.\"\"\"\n    return 1\n");
        let func = find(&items, "fetch", ItemKind::Function);
        assert!(func.is_async);
        assert_eq!(func.method_label(), "async_function");
        assert!(func.signature.starts_with("async def fetch("));
    }

    #[test]
    fn test_property_kind() {
        let source = r#"
class User:
    @property
    def full_name(self) -> str:
        return ""

    @full_name.setter
    def full_name(self, value):
        pass
"#;
        let items = scan(source);
        let props: Vec<_> = items.iter().filter(|i| i.kind == ItemKind::Property).collect();
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].qualname, "User.full_name");
        assert_eq!(props[0].return_type.as_deref(), Some("str"));
    }

    #[test]
    fn test_model_detection_and_fields() {
        let source = r#"
from pydantic import BaseModel, Field

class User(BaseModel):
    """A user."""
    name: str
    email: Optional[str] = None
    age = Field(default=0)
    model_config = ConfigDict(frozen=True)
"#;
        let items = scan(source);
        let model = find(&items, "User", ItemKind::Model);
        assert_eq!(model.signature, "class User(BaseModel)");
        let fields: Vec<(&str, &str)> = model
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.type_hint.as_str()))
            .collect();
        assert_eq!(fields, vec![("name", "str"), ("email", "Optional[str]"), ("age", "Any")]);
    }

    #[test]
    fn test_dotted_model_base() {
        let items = scan("class Item(pydantic.BaseModel):\n    pass\n");
        assert_eq!(items[0].kind, ItemKind::Model);
    }

    #[test]
    fn test_abstract_detection() {
        let items = scan("class Repo(ABC):\n    pass\n\nclass Base(metaclass=ABCMeta):\n    pass\n\nclass Plain:\n    \"\"\"Abstract helper.\"\"\"\n");
        assert!(find(&items, "Repo", ItemKind::Class).is_abstract);
        assert!(find(&items, "Base", ItemKind::Class).is_abstract);
        assert!(find(&items, "Plain", ItemKind::Class).is_abstract);
        assert_eq!(find(&items, "Base", ItemKind::Class).signature, "class Base(metaclass=ABCMeta)");
    }

    #[test]
    fn test_endpoint_items() {
        let source = r#"
@app.get("/users/{user_id}", response_model=User, tags=["users"], status_code=200)
@app.post("/users", description="Create a user", status_code=status.HTTP_201_CREATED)
async def user_route(user_id: int, db: Session = Depends(get_db)):
    """Handle users."""
    return None
"#;
        let items = scan(source);
        let func = find(&items, "user_route", ItemKind::Function);
        assert_eq!(func.lineno, 4);
        assert_eq!(func.dependencies, vec!["get_db"]);

        let endpoints: Vec<_> = items.iter().filter(|i| i.kind == ItemKind::Endpoint).collect();
        assert_eq!(endpoints.len(), 2);

        let get = endpoints[0];
        assert_eq!(get.lineno, 2);
        assert_eq!(get.method_label(), "GET");
        let http = get.http.as_ref().unwrap();
        assert_eq!(http.path, "/users/{user_id}");
        assert_eq!(http.response_model.as_deref(), Some("User"));
        assert_eq!(http.tags, vec!["users"]);
        assert_eq!(http.status_codes, vec![200]);

        let post = endpoints[1];
        assert_eq!(post.lineno, 3);
        assert_eq!(post.description.as_deref(), Some("Create a user"));
        assert_eq!(post.http.as_ref().unwrap().status_codes, vec![201]);
        assert_eq!(post.coverage_score, func.coverage_score);
    }

    #[test]
    fn test_endpoint_summary_and_dependencies() {
        let source = r#"
@router.delete("/items/{id}", summary="Remove item", dependencies=[Depends(verify_token)], responses={404: {"description": "Missing"}})
def remove(id: int, service: ItemService = Depends()):
    pass
"#;
        let items = scan(source);
        let endpoint = find(&items, "remove", ItemKind::Endpoint);
        assert_eq!(endpoint.description.as_deref(), Some("Remove item"));
        assert_eq!(endpoint.dependencies, vec!["ItemService", "verify_token"]);
        assert_eq!(endpoint.http.as_ref().unwrap().status_codes, vec![404]);
    }

    #[test]
    fn test_non_verb_decorator_is_not_endpoint() {
        let items = scan("@app.middleware(\"http\")\nasync def mw(request, call_next):\n    pass\n");
        assert!(items.iter().all(|i| i.kind != ItemKind::Endpoint));
    }

    #[test]
    fn test_restricted_verbs() {
        let options = ScanOptions {
            http_verbs: vec![HttpMethod::Post],
            ..Default::default()
        };
        let mut scanner = Scanner::with_options(options, ScoringPolicy::default()).unwrap();
        let items = scanner
            .scan("@app.get(\"/\")\ndef root():\n    pass\n", Path::new("main.py"))
            .unwrap();
        assert!(items.iter().all(|i| i.kind != ItemKind::Endpoint));
    }

    #[test]
    fn test_raised_exceptions() {
        let source = r#"
def load(key):
    """Load.

    Raises:
        KeyError: If missing.
    """
    if not key:
        raise KeyError(key)
    try:
        pass
    except OSError:
        raise
    raise errors.NotFound
    def helper():
        raise RuntimeError()
"#;
        let items = scan(source);
        let func = find(&items, "load", ItemKind::Function);
        assert_eq!(func.raised_exceptions, vec!["KeyError", "errors.NotFound"]);
        assert_eq!(func.documented_raises, vec!["KeyError"]);
        assert!(func
            .completeness_issues
            .contains(&"Undocumented exceptions: errors.NotFound".to_string()));
    }

    #[test]
    fn test_declarations_inside_compound_statements() {
        let source = r#"
if TYPE_CHECKING:
    class Hidden:
        pass
else:
    def fallback():
        pass

try:
    def tried():
        pass
except ImportError:
    pass
"#;
        let items = scan(source);
        assert!(items.iter().any(|i| i.qualname == "Hidden"));
        assert!(items.iter().any(|i| i.qualname == "fallback"));
        assert!(items.iter().any(|i| i.qualname == "tried"));
    }

    #[test]
    fn test_preview_lines() {
        let source = "def f():\n    a = 1\n    b = 2\n    c = 3\n    d = 4\n    e = 5\n    g = 6\n";
        let items = scan(source);
        assert_eq!(items[0].first_lines.len(), 5);
        assert_eq!(items[0].first_lines[0], "    a = 1");
    }

    #[test]
    fn test_complexity_recorded() {
        let items = scan("def f(x):\n    if x:\n        return 1\n    return 2\n");
        assert_eq!(items[0].complexity, 2);
        assert_eq!(items[0].maintainability, 95.0);
    }

    #[test]
    fn test_app_metadata_items() {
        let source = r#"
from fastapi import FastAPI

app = FastAPI(
    title="Users API",
    version="1.2.0",
    debug=False,
    openapi_tags=tags_metadata,
    description=f"Build {BUILD}",
)
"#;
        let items = scan(source);
        let metadata: Vec<(&str, &str, Option<&str>, usize)> = items
            .iter()
            .filter(|i| i.kind == ItemKind::Metadata)
            .map(|i| (i.qualname.as_str(), i.signature.as_str(), i.docstring.as_deref(), i.lineno))
            .collect();
        assert_eq!(
            metadata,
            vec![
                ("app.title", "title", Some("Users API"), 5),
                ("app.version", "version", Some("1.2.0"), 6),
                ("app.debug", "debug", Some("False"), 7),
            ]
        );
        assert!(items.iter().all(|i| i.completeness_issues.is_empty()));
    }

    #[test]
    fn test_app_metadata_in_factory_and_dotted_constructor() {
        let source = "def create_app():\n    application = fastapi.FastAPI(title='Factory')\n    return application\n\nrouter = APIRouter(prefix='/users')\n";
        let items = scan(source);
        let metadata: Vec<&DocumentationItem> = items.iter().filter(|i| i.kind == ItemKind::Metadata).collect();
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0].qualname, "create_app.application.title");
        assert_eq!(metadata[0].docstring.as_deref(), Some("Factory"));
    }

    #[test]
    fn test_param_types_keep_declaration_order() {
        let items = scan("def f(zeta: int, alpha: str, mid: float):\n    pass\n");
        let names: Vec<&str> = items[0].param_types.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_status_code_parsing() {
        assert_eq!(status_code("201"), Some(201));
        assert_eq!(status_code("\"404\""), Some(404));
        assert_eq!(status_code("status.HTTP_204_NO_CONTENT"), Some(204));
        assert_eq!(status_code("SOME_CONSTANT"), None);
    }
}
