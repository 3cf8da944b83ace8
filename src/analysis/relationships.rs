// Relationship inference between declared classes
//
// Phase 1 registers class and model items as nodes and attaches their
// members. A qualname declared in more than one module is qualified by its
// module so the classes stay apart. Phase 2 derives inheritance,
// composition, aggregation, association and dependency edges from
// signatures, annotations and dependency-injection calls, then router
// composition from endpoint tags. Ambiguous names are dropped, never guessed.

use crate::model::{
    ClassNode, DocumentationItem, ItemKind, Relationship, RelationshipGraph, RelationshipKind, Stereotype,
    UmlAttribute, UmlMethod,
};
use crate::parser::{last_segment, COMPLEX_TYPE};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Names never treated as project classes
const BUILTIN_TYPES: [&str; 45] = [
    "str", "int", "float", "bool", "bytes", "complex", "list", "dict", "tuple", "set", "frozenset",
    "object", "type", "None", "NoneType", "Any", "List", "Dict", "Tuple", "Set", "FrozenSet",
    "Optional", "Union", "Callable", "Iterable", "Iterator", "Sequence", "Mapping", "MutableMapping",
    "Generator", "AsyncGenerator", "AsyncIterator", "Awaitable", "Coroutine", "Type", "Literal",
    "Annotated", "ClassVar", "Final", "Self", "TypeVar", "Generic", "Protocol", "bytearray", "range",
];

/// Generic containers whose single parameter is held many times
const COLLECTION_TYPES: [&str; 13] = [
    "List", "list", "Sequence", "Set", "set", "FrozenSet", "frozenset", "Iterable", "Collection",
    "Tuple", "tuple", "Iterator", "MutableSequence",
];

/// How a type annotation refers to a class
#[derive(Debug, Clone, PartialEq)]
enum TypeRef {
    One(String),
    Optional(String),
    Many(String),
}

impl TypeRef {
    fn name(&self) -> &str {
        match self {
            TypeRef::One(n) | TypeRef::Optional(n) | TypeRef::Many(n) => n,
        }
    }
}

/// Infers class nodes and relationships from documentation items
#[derive(Debug, Clone)]
pub struct RelationshipAnalyzer {
    model_bases: Vec<String>,
}

impl Default for RelationshipAnalyzer {
    fn default() -> Self {
        Self::new(vec!["BaseModel".to_string()])
    }
}

impl RelationshipAnalyzer {
    pub fn new(model_bases: Vec<String>) -> Self {
        Self { model_bases }
    }

    /// Build the relationship graph of a whole project. Never fails.
    pub fn analyze(&self, items: &[DocumentationItem]) -> RelationshipGraph {
        let mut graph = RelationshipGraph::new();
        let owners = ClassOwners::new(items);
        let mut bases: Vec<(String, Vec<String>)> = Vec::new();

        for item in items.iter().filter(|i| i.kind.is_class_like()) {
            let name = owners.node_name(&item.module, &item.qualname);
            let mut node = ClassNode::new(&name, &item.module);
            let class_bases = parse_bases(&item.signature);
            node.stereotype = self.stereotype(&item.qualname, &class_bases);
            node.is_abstract = item.is_abstract;
            for field in &item.fields {
                node.attributes.push(UmlAttribute::new(&field.name, &field.type_hint));
            }
            if graph.add_node(node) {
                bases.push((name, class_bases));
            } else {
                debug!(class = %item.qualname, module = %item.module, "class redefined in module, first kept");
            }
        }

        for item in items {
            let Some(owner) = item.enclosing_class.as_deref() else {
                continue;
            };
            let Some(node) = graph.node_mut(&owners.node_name(&item.module, owner)) else {
                continue;
            };
            match item.kind {
                ItemKind::Property => {
                    if !node.attributes.iter().any(|a| a.name == item.name()) {
                        let type_hint = item.return_type.as_deref().unwrap_or("Any");
                        node.attributes.push(UmlAttribute::new(item.name(), type_hint));
                    }
                }
                ItemKind::Function => node.methods.push(uml_method(item)),
                _ => {}
            }
        }

        let resolver = Resolver::new(&graph);
        let mut edges = Vec::new();

        for (class, class_bases) in &bases {
            for base in class_bases {
                let Some(target) = resolver.resolve(base) else {
                    continue;
                };
                if &target == class {
                    continue;
                }
                let is_interface = graph
                    .node(&target)
                    .map_or(false, |n| n.stereotype == Some(Stereotype::Interface));
                let kind = if is_interface {
                    RelationshipKind::Implementation
                } else {
                    RelationshipKind::Inheritance
                };
                edges.push(Relationship::new(class, &target, kind));
            }
        }

        for item in items {
            let source = match item.enclosing_class.as_deref() {
                Some(owner) => owners.node_name(&item.module, owner),
                None => item.qualname.clone(),
            };
            match item.kind {
                ItemKind::Function if item.is_constructor() => {
                    for param in &item.actual_params {
                        let Some(type_hint) = item.param_types.get(param) else {
                            continue;
                        };
                        let Some(type_ref) = classify(type_hint) else {
                            continue;
                        };
                        let Some(target) = resolver.resolve(type_ref.name()) else {
                            continue;
                        };
                        edges.push(structural(&source, &target, &type_ref).with_label(param));
                    }
                }
                ItemKind::Function | ItemKind::Property => {
                    for param in &item.actual_params {
                        let Some(type_ref) = item.param_types.get(param).and_then(|t| classify(t)) else {
                            continue;
                        };
                        if let Some(target) = resolver.resolve(type_ref.name()) {
                            edges.push(association(&source, &target, &type_ref).with_label(&format!("uses({})", param)));
                        }
                    }
                    if let Some(type_ref) = item.return_type.as_deref().and_then(classify) {
                        if let Some(target) = resolver.resolve(type_ref.name()) {
                            edges.push(association(&source, &target, &type_ref).with_label("returns"));
                        }
                    }
                }
                ItemKind::Model => {
                    let model = owners.node_name(&item.module, &item.qualname);
                    for field in &item.fields {
                        let Some(type_ref) = classify(&field.type_hint) else {
                            continue;
                        };
                        let Some(target) = resolver.resolve(type_ref.name()) else {
                            continue;
                        };
                        edges.push(structural(&model, &target, &type_ref).with_label(&field.name));
                    }
                }
                _ => {}
            }

            for dependency in &item.dependencies {
                if let Some(target) = resolver.resolve(dependency) {
                    edges.push(
                        Relationship::new(&source, &target, RelationshipKind::Dependency).with_stereotype("depends"),
                    );
                }
            }
        }

        for router in routers(items, &resolver, &graph) {
            if !graph.contains(&router.name) {
                let mut node = ClassNode::new(&router.name, &router.package);
                node.stereotype = Some(Stereotype::Controller);
                graph.add_node(node);
            }
            for target in &router.targets {
                edges.push(
                    Relationship::new(&router.name, target, RelationshipKind::Composition).with_stereotype("router"),
                );
            }
        }

        for edge in edges {
            if edge.source != edge.target {
                graph.add_edge(edge);
            }
        }

        debug!(
            classes = graph.nodes().len(),
            relationships = graph.edges().len(),
            "relationship analysis complete"
        );
        graph
    }

    /// Stereotype from the qualname first, then from the declared bases
    fn stereotype(&self, qualname: &str, bases: &[String]) -> Option<Stereotype> {
        let name = qualname.to_lowercase();
        if name.contains("service") {
            return Some(Stereotype::Service);
        }
        if name.contains("model") || name.contains("schema") {
            return Some(Stereotype::Model);
        }
        if name.contains("repository") || name.contains("dao") {
            return Some(Stereotype::Repository);
        }
        if name.contains("controller") || name.contains("router") {
            return Some(Stereotype::Controller);
        }
        if name.contains("config") {
            return Some(Stereotype::Configuration);
        }

        for base in bases.iter().map(|b| last_segment(b)) {
            if base == "Schema" || self.model_bases.iter().any(|m| last_segment(m) == base) {
                return Some(Stereotype::Model);
            }
            if base == "Protocol" {
                return Some(Stereotype::Interface);
            }
        }
        None
    }
}

/// Composition for one or an optional reference, aggregation for many
fn structural(source: &str, target: &str, type_ref: &TypeRef) -> Relationship {
    match type_ref {
        TypeRef::One(_) => Relationship::new(source, target, RelationshipKind::Composition),
        TypeRef::Optional(_) => {
            Relationship::new(source, target, RelationshipKind::Composition).with_multiplicity("0..1")
        }
        TypeRef::Many(_) => Relationship::new(source, target, RelationshipKind::Aggregation).with_multiplicity("*"),
    }
}

fn association(source: &str, target: &str, type_ref: &TypeRef) -> Relationship {
    let edge = Relationship::new(source, target, RelationshipKind::Association);
    match type_ref {
        TypeRef::One(_) => edge,
        TypeRef::Optional(_) => edge.with_multiplicity("0..1"),
        TypeRef::Many(_) => edge.with_multiplicity("*"),
    }
}

fn uml_method(item: &DocumentationItem) -> UmlMethod {
    let mut method = UmlMethod::new(item.name());
    method.parameters = item
        .actual_params
        .iter()
        .map(|p| match item.param_types.get(p) {
            Some(t) => format!("{}: {}", p, t),
            None => p.clone(),
        })
        .collect();
    method.return_type = item.return_type.clone();
    method.is_static = item
        .decorators
        .iter()
        .any(|d| matches!(last_segment(d), "staticmethod" | "classmethod"));
    method.is_abstract = item.is_abstract;
    method.is_async = item.is_async;
    method
}

/// Node names of declared classes, keyed by module and qualname
struct ClassOwners {
    /// Qualnames declared as classes in more than one module
    shared: HashSet<String>,
}

impl ClassOwners {
    fn new(items: &[DocumentationItem]) -> Self {
        let mut modules: HashMap<&str, HashSet<&str>> = HashMap::new();
        for item in items.iter().filter(|i| i.kind.is_class_like()) {
            modules.entry(item.qualname.as_str()).or_default().insert(item.module.as_str());
        }
        let shared = modules
            .into_iter()
            .filter(|(_, declared_in)| declared_in.len() > 1)
            .map(|(qualname, _)| qualname.to_string())
            .collect();
        Self { shared }
    }

    /// The qualname, or `module.qualname` when other modules declare it too
    fn node_name(&self, module: &str, qualname: &str) -> String {
        if self.shared.contains(qualname) {
            format!("{}.{}", module, qualname)
        } else {
            qualname.to_string()
        }
    }
}

/// A router grouping the endpoints of one tag
struct Router {
    name: String,
    package: String,
    targets: Vec<String>,
}

/// `<Tag>Router` per endpoint tag with the declared classes its endpoints
/// use: response models, annotated parameters, return types and
/// dependencies. Tags whose endpoints use no declared class are skipped.
fn routers(items: &[DocumentationItem], resolver: &Resolver, graph: &RelationshipGraph) -> Vec<Router> {
    let mut routers: Vec<Router> = Vec::new();

    for item in items.iter().filter(|i| i.kind == ItemKind::Endpoint) {
        let Some(http) = &item.http else {
            continue;
        };
        if http.tags.is_empty() {
            continue;
        }

        let written = http
            .response_model
            .iter()
            .chain(item.param_types.values())
            .chain(item.return_type.iter())
            .filter_map(|t| classify(t).map(|r| r.name().to_string()))
            .chain(item.dependencies.iter().cloned());
        let mut used: Vec<String> = Vec::new();
        for name in written {
            if let Some(target) = resolver.resolve(&name).filter(|t| graph.contains(t)) {
                if !used.contains(&target) {
                    used.push(target);
                }
            }
        }
        if used.is_empty() {
            continue;
        }

        for name in http.tags.iter().filter_map(|t| router_name(t)) {
            let index = match routers.iter().position(|r| r.name == name) {
                Some(index) => index,
                None => {
                    routers.push(Router {
                        name,
                        package: item.module.clone(),
                        targets: Vec::new(),
                    });
                    routers.len() - 1
                }
            };
            let router = &mut routers[index];
            for target in &used {
                if *target != router.name && !router.targets.contains(target) {
                    router.targets.push(target.clone());
                }
            }
        }
    }
    routers
}

/// `users` -> `UsersRouter`, `user admin` -> `UserAdminRouter`
fn router_name(tag: &str) -> Option<String> {
    let words: String = tag
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() || words.starts_with(|c: char| c.is_numeric()) {
        None
    } else {
        Some(format!("{}Router", words))
    }
}

/// Resolves written type names to node names
struct Resolver {
    exact: Vec<String>,
    by_last: HashMap<String, Vec<String>>,
}

impl Resolver {
    fn new(graph: &RelationshipGraph) -> Self {
        let mut by_last: HashMap<String, Vec<String>> = HashMap::new();
        for node in graph.nodes() {
            by_last
                .entry(node.short_name().to_string())
                .or_default()
                .push(node.name.clone());
        }
        Self {
            exact: graph.nodes().iter().map(|n| n.name.clone()).collect(),
            by_last,
        }
    }

    /// Exact qualname, else a unique last-segment match, else the custom
    /// name as written. `None` for built-ins and ambiguous matches.
    fn resolve(&self, name: &str) -> Option<String> {
        let name = strip_generic_args(name.trim());
        if !is_custom(name) {
            return None;
        }
        if self.exact.iter().any(|n| n == name) {
            return Some(name.to_string());
        }
        match self.by_last.get(last_segment(name)).map(Vec::as_slice) {
            Some([only]) => Some(only.clone()),
            Some(_) => None,
            None => Some(name.to_string()),
        }
    }
}

/// Bases written in a class signature, keyword arguments and generic
/// parameters removed: `class A(Base[T], metaclass=M)` -> `["Base"]`
pub fn parse_bases(signature: &str) -> Vec<String> {
    let Some(open) = signature.find('(') else {
        return Vec::new();
    };
    let Some(close) = signature.rfind(')') else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }

    split_top_level(&signature[open + 1..close], ',')
        .into_iter()
        .map(str::trim)
        .filter(|arg| !arg.is_empty() && !arg.contains('='))
        .map(|arg| strip_generic_args(arg).to_string())
        .filter(|arg| !arg.is_empty())
        .collect()
}

fn strip_generic_args(name: &str) -> &str {
    match name.find('[') {
        Some(idx) => name[..idx].trim(),
        None => name,
    }
}

fn is_custom(name: &str) -> bool {
    let valid = name
        .chars()
        .next()
        .map_or(false, |c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.');
    valid && name != COMPLEX_TYPE && !BUILTIN_TYPES.contains(&last_segment(name)) && !name.starts_with("typing.")
}

/// Split on a separator outside of brackets
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        match c {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// `Outer[a, b]` -> (`Outer`, [`a`, `b`])
fn split_generic(text: &str) -> (&str, Vec<&str>) {
    let text = text.trim();
    match (text.find('['), text.ends_with(']')) {
        (Some(open), true) => {
            let args = split_top_level(&text[open + 1..text.len() - 1], ',')
                .into_iter()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .collect();
            (text[..open].trim(), args)
        }
        _ => (text, Vec::new()),
    }
}

/// Classify an annotation as one, optional or many references to a custom type
fn classify(type_hint: &str) -> Option<TypeRef> {
    let text = type_hint.trim();
    if text.is_empty() || text == COMPLEX_TYPE {
        return None;
    }

    let alternatives: Vec<&str> = split_top_level(text, '|').into_iter().map(str::trim).collect();
    if alternatives.len() > 1 {
        return classify_union(&alternatives);
    }

    let (base, args) = split_generic(text);
    match last_segment(base) {
        "Optional" if args.len() == 1 => match classify(args[0])? {
            TypeRef::One(name) => Some(TypeRef::Optional(name)),
            _ => None,
        },
        "Union" => classify_union(&args),
        "Annotated" => args.first().and_then(|first| classify(first)),
        collection if COLLECTION_TYPES.contains(&collection) => {
            let element = match args.as_slice() {
                [one] => *one,
                [one, "..."] => *one,
                _ => return None,
            };
            match classify(element)? {
                TypeRef::One(name) => Some(TypeRef::Many(name)),
                _ => None,
            }
        }
        _ if is_custom(base) => Some(TypeRef::One(base.to_string())),
        _ => None,
    }
}

/// `X | None` / `Union[X, None]` -> optional X; other unions are ambiguous
fn classify_union(alternatives: &[&str]) -> Option<TypeRef> {
    let non_none: Vec<&str> = alternatives.iter().copied().filter(|a| *a != "None").collect();
    let has_none = non_none.len() < alternatives.len();
    match (non_none.as_slice(), has_none) {
        ([only], true) => match classify(only)? {
            TypeRef::One(name) => Some(TypeRef::Optional(name)),
            _ => None,
        },
        ([only], false) => classify(only),
        _ => None,
    }
}
