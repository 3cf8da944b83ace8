// PlantUML class diagram rendering
//
// Renders a filtered view of a relationship graph. Output follows node and
// edge insertion order only, so identical input renders identical text.

use crate::model::{
    ClassNode, DiagramConfig, DiagramKind, DiagramSummary, Relationship, RelationshipGraph,
    RelationshipKind, Stereotype, UmlAttribute, UmlMethod,
};
use std::collections::{HashMap, HashSet};

const HEADER: [&str; 5] = [
    "@startuml",
    "!theme plain",
    "skinparam classAttributeIconSize 0",
    "skinparam classFontSize 12",
    "skinparam packageStyle rectangle",
];

/// Renders relationship graphs as PlantUML class diagrams
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagramRenderer;

impl DiagramRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render the graph under the given configuration. Never fails; edges
    /// whose endpoints were filtered out are dropped.
    pub fn render(&self, graph: &RelationshipGraph, config: &DiagramConfig) -> String {
        let nodes = self.filter_nodes(graph, config);
        let edges = filter_edges(graph, &nodes);
        let ids = ClassIds::new(&nodes);

        let mut lines: Vec<String> = HEADER.iter().map(|l| l.to_string()).collect();
        lines.push(String::new());

        if config.color_by_type() {
            lines.extend(stereotype_colors());
            lines.push(String::new());
        }

        lines.push(config.layout_direction().directive().to_string());
        lines.push(String::new());

        if config.group_by_package() || config.kind() == DiagramKind::PackageStructure {
            for (package, members) in group_by_package(&nodes) {
                lines.push(format!("package \"{}\" {{", package));
                for node in members {
                    for line in class_block(node, &ids, config) {
                        lines.push(format!("  {}", line));
                    }
                }
                lines.push("}".to_string());
                lines.push(String::new());
            }
        } else {
            for node in &nodes {
                lines.extend(class_block(node, &ids, config));
                lines.push(String::new());
            }
        }

        lines.push(String::new());
        for kind in RelationshipKind::ORDER {
            let group: Vec<&&Relationship> = edges.iter().filter(|e| e.kind == kind).collect();
            if group.is_empty() {
                continue;
            }
            lines.push(format!("' {} relationships", kind.title()));
            for edge in group {
                lines.push(relationship_line(edge, &ids));
            }
            lines.push(String::new());
        }

        lines.push("@enduml".to_string());

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Counts of what `render` would show for this configuration
    pub fn summary(&self, graph: &RelationshipGraph, config: &DiagramConfig) -> DiagramSummary {
        let nodes = self.filter_nodes(graph, config);
        let edges = filter_edges(graph, &nodes);

        DiagramSummary {
            classes_found: nodes.len(),
            relationships_found: edges.len(),
            packages: group_by_package(&nodes)
                .into_iter()
                .map(|(package, _)| package.to_string())
                .collect(),
        }
    }

    /// Surviving nodes, in graph order
    pub fn filter_nodes<'a>(&self, graph: &'a RelationshipGraph, config: &DiagramConfig) -> Vec<&'a ClassNode> {
        graph
            .nodes()
            .iter()
            .filter(|n| !config.exclude_packages().iter().any(|p| n.package.contains(p.as_str())))
            .filter(|n| {
                config.focus_packages().is_empty()
                    || config.focus_packages().iter().any(|p| n.package.contains(p.as_str()))
            })
            .filter(|n| config.include_private() || !n.is_private())
            .filter(|n| matches_kind(n, config.kind()))
            .take(config.max_classes())
            .collect()
    }
}

fn matches_kind(node: &ClassNode, kind: DiagramKind) -> bool {
    let name = node.name.to_lowercase();
    match kind {
        DiagramKind::ServiceLayer => {
            matches!(node.stereotype, Some(Stereotype::Service) | Some(Stereotype::Repository))
                || name.contains("service")
        }
        DiagramKind::DataModel => {
            node.stereotype == Some(Stereotype::Model) || name.contains("model") || name.contains("schema")
        }
        DiagramKind::FastapiArchitecture => ["router", "endpoint", "service", "model", "schema", "dependency"]
            .iter()
            .any(|k| name.contains(k)),
        DiagramKind::ClassOverview | DiagramKind::ClassDetailed | DiagramKind::PackageStructure => true,
    }
}

fn filter_edges<'a>(graph: &'a RelationshipGraph, nodes: &[&ClassNode]) -> Vec<&'a Relationship> {
    let kept: HashSet<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
    graph
        .edges()
        .iter()
        .filter(|e| kept.contains(e.source.as_str()) && kept.contains(e.target.as_str()))
        .collect()
}

/// Nodes grouped by package, packages in first-seen order
fn group_by_package<'a, 'b>(nodes: &'b [&'a ClassNode]) -> Vec<(&'a str, Vec<&'a ClassNode>)> {
    let mut groups: Vec<(&'a str, Vec<&'a ClassNode>)> = Vec::new();
    for &node in nodes {
        match groups.iter_mut().find(|(p, _)| *p == node.package) {
            Some((_, members)) => members.push(node),
            None => groups.push((node.package.as_str(), vec![node])),
        }
    }
    groups
}

fn stereotype_colors() -> Vec<String> {
    let mut lines = vec!["skinparam class {".to_string()];
    for stereotype in Stereotype::ALL {
        let (background, border) = stereotype_palette(stereotype);
        lines.push(format!("  BackgroundColor<<{}>> {}", stereotype, background));
        lines.push(format!("  BorderColor<<{}>> {}", stereotype, border));
    }
    lines.push("}".to_string());
    lines
}

fn stereotype_palette(stereotype: Stereotype) -> (&'static str, &'static str) {
    match stereotype {
        Stereotype::Service => ("#E1F5FE", "#2196F3"),
        Stereotype::Model => ("#E8F5E8", "#4CAF50"),
        Stereotype::Repository => ("#FFF3E0", "#FF9800"),
        Stereotype::Controller => ("#F3E5F5", "#9C27B0"),
        Stereotype::Configuration => ("#FFEBEE", "#F44336"),
        Stereotype::Interface => ("#F1F8E9", "#8BC34A"),
    }
}

fn class_block(node: &ClassNode, ids: &ClassIds, config: &DiagramConfig) -> Vec<String> {
    let class_type = if node.is_abstract { "abstract class" } else { "class" };
    let stereotype = match node.stereotype {
        Some(s) if config.show_stereotypes() => format!(" <<{}>>", s),
        _ => String::new(),
    };
    let id = ids.get(&node.name);
    let declaration = format!("{} {}{}", class_type, class_declaration(&node.name, &id), stereotype);

    if config.kind() == DiagramKind::PackageStructure {
        return vec![declaration];
    }

    let attributes: Vec<&UmlAttribute> = if config.include_attributes() {
        node.attributes
            .iter()
            .filter(|a| config.include_private() || !a.name.starts_with('_'))
            .collect()
    } else {
        Vec::new()
    };
    let methods: Vec<&UmlMethod> = if config.include_methods() {
        node.methods
            .iter()
            .filter(|m| config.include_private() || !m.name.starts_with('_'))
            .collect()
    } else {
        Vec::new()
    };

    let mut lines = vec![format!("{} {{", declaration)];
    for attribute in &attributes {
        lines.push(format!("  {}", attribute_line(attribute)));
    }
    if !attributes.is_empty() && !methods.is_empty() {
        lines.push("  --".to_string());
    }
    for method in &methods {
        let line = if config.kind() == DiagramKind::ClassOverview {
            overview_method_line(method)
        } else {
            method_line(method)
        };
        lines.push(format!("  {}", line));
    }
    lines.push("}".to_string());
    lines
}

/// PlantUML identifiers of the rendered classes, unique within one diagram.
///
/// Names that are already identifiers keep themselves; other names are
/// sanitized and suffixed `_2`, `_3`, ... in node order on collision.
struct ClassIds<'a> {
    ids: HashMap<&'a str, String>,
}

impl<'a> ClassIds<'a> {
    fn new(nodes: &[&'a ClassNode]) -> Self {
        let mut ids: HashMap<&'a str, String> = HashMap::new();
        let mut taken: HashSet<String> = HashSet::new();

        for node in nodes.iter().filter(|n| class_id(&n.name) == n.name) {
            taken.insert(node.name.clone());
            ids.insert(node.name.as_str(), node.name.clone());
        }
        for node in nodes {
            if ids.contains_key(node.name.as_str()) {
                continue;
            }
            let base = class_id(&node.name);
            let mut id = base.clone();
            let mut suffix = 2;
            while taken.contains(&id) {
                id = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            taken.insert(id.clone());
            ids.insert(node.name.as_str(), id);
        }
        Self { ids }
    }

    fn get(&self, name: &str) -> String {
        self.ids.get(name).cloned().unwrap_or_else(|| class_id(name))
    }
}

/// `Name`, or `"Outer.Inner" as Outer_Inner` when the id differs from the name
fn class_declaration(name: &str, id: &str) -> String {
    if id == name {
        id.to_string()
    } else {
        format!("\"{}\" as {}", name, id)
    }
}

/// Sanitized identifier of a class name
fn class_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn attribute_line(attribute: &UmlAttribute) -> String {
    if attribute.type_hint.is_empty() {
        format!("{} {}", attribute.visibility.symbol(), attribute.name)
    } else {
        format!(
            "{} {} : {}",
            attribute.visibility.symbol(),
            attribute.name,
            attribute.type_hint
        )
    }
}

fn overview_method_line(method: &UmlMethod) -> String {
    if method.is_async {
        format!("+ async {}()", method.name)
    } else {
        format!("+ {}()", method.name)
    }
}

fn method_line(method: &UmlMethod) -> String {
    let mut line = format!("{} ", method.visibility.symbol());
    if method.is_static {
        line.push_str("{static} ");
    }
    if method.is_abstract {
        line.push_str("{abstract} ");
    }
    if method.is_async {
        line.push_str("async ");
    }
    line.push_str(&method.name);
    line.push('(');
    line.push_str(&method.parameters.join(", "));
    line.push(')');
    if let Some(ret) = &method.return_type {
        line.push_str(" : ");
        line.push_str(ret);
    }
    line
}

fn relationship_line(edge: &Relationship, ids: &ClassIds) -> String {
    let mut line = format!("{} {} ", ids.get(&edge.source), edge.kind.arrow());
    if let Some(multiplicity) = &edge.multiplicity {
        line.push_str(&format!("\"{}\" ", multiplicity));
    }
    line.push_str(&ids.get(&edge.target));

    let label = match (&edge.stereotype, &edge.label) {
        (Some(s), Some(l)) => Some(format!("<<{}>> {}", s, l)),
        (Some(s), None) => Some(format!("<<{}>>", s)),
        (None, Some(l)) => Some(l.clone()),
        (None, None) => None,
    };
    if let Some(label) = label {
        line.push_str(" : ");
        line.push_str(&label);
    }
    line
}
