// Class relationship graph
//
// Nodes are classes and validation models; edges are the structural
// relationships inferred between them. Both are kept in insertion order
// so that rendering is deterministic.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Architectural role of a class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stereotype {
    Service,
    Model,
    Repository,
    Controller,
    Configuration,
    Interface,
}

impl Stereotype {
    /// All stereotypes in colour-directive order
    pub const ALL: [Stereotype; 6] = [
        Stereotype::Service,
        Stereotype::Model,
        Stereotype::Repository,
        Stereotype::Controller,
        Stereotype::Configuration,
        Stereotype::Interface,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stereotype::Service => "service",
            Stereotype::Model => "model",
            Stereotype::Repository => "repository",
            Stereotype::Controller => "controller",
            Stereotype::Configuration => "configuration",
            Stereotype::Interface => "interface",
        }
    }
}

impl fmt::Display for Stereotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// UML member visibility
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// Visibility implied by a Python member name
    pub fn of(name: &str) -> Self {
        if name.starts_with('_') && !(name.starts_with("__") && name.ends_with("__")) {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Visibility::Public => "+",
            Visibility::Private => "-",
        }
    }
}

/// Class attribute: a property or a model field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UmlAttribute {
    pub name: String,
    pub type_hint: String,
    pub visibility: Visibility,
}

impl UmlAttribute {
    pub fn new(name: &str, type_hint: &str) -> Self {
        Self {
            name: name.to_string(),
            type_hint: type_hint.to_string(),
            visibility: Visibility::of(name),
        }
    }
}

/// Class method
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UmlMethod {
    pub name: String,
    /// Rendered parameters, e.g. `user_id: int`
    pub parameters: Vec<String>,
    pub return_type: Option<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_async: bool,
}

impl UmlMethod {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parameters: Vec::new(),
            return_type: None,
            visibility: Visibility::of(name),
            is_static: false,
            is_abstract: false,
            is_async: false,
        }
    }
}

/// A class in the relationship graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassNode {
    /// Class qualname
    pub name: String,
    /// Module the class is declared in
    pub package: String,
    pub stereotype: Option<Stereotype>,
    pub is_abstract: bool,
    pub attributes: Vec<UmlAttribute>,
    pub methods: Vec<UmlMethod>,
}

impl ClassNode {
    pub fn new(name: &str, package: &str) -> Self {
        Self {
            name: name.to_string(),
            package: package.to_string(),
            stereotype: None,
            is_abstract: false,
            attributes: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Last segment of the qualname
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is_private(&self) -> bool {
        self.short_name().starts_with('_')
    }
}

/// Kind of structural relationship
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Inheritance,
    Implementation,
    Composition,
    Aggregation,
    Association,
    Dependency,
}

impl RelationshipKind {
    /// Rendering precedence
    pub const ORDER: [RelationshipKind; 6] = [
        RelationshipKind::Inheritance,
        RelationshipKind::Implementation,
        RelationshipKind::Composition,
        RelationshipKind::Aggregation,
        RelationshipKind::Association,
        RelationshipKind::Dependency,
    ];

    /// PlantUML arrow from source to target
    pub fn arrow(&self) -> &'static str {
        match self {
            RelationshipKind::Inheritance => "--|>",
            RelationshipKind::Implementation => "..|>",
            RelationshipKind::Composition => "*--",
            RelationshipKind::Aggregation => "o--",
            RelationshipKind::Association => "-->",
            RelationshipKind::Dependency => "..>",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RelationshipKind::Inheritance => "Inheritance",
            RelationshipKind::Implementation => "Implementation",
            RelationshipKind::Composition => "Composition",
            RelationshipKind::Aggregation => "Aggregation",
            RelationshipKind::Association => "Association",
            RelationshipKind::Dependency => "Dependency",
        }
    }
}

/// A directed relationship between two class names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub kind: RelationshipKind,
    pub multiplicity: Option<String>,
    pub label: Option<String>,
    pub stereotype: Option<String>,
}

impl Relationship {
    pub fn new(source: &str, target: &str, kind: RelationshipKind) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            kind,
            multiplicity: None,
            label: None,
            stereotype: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: &str) -> Self {
        self.multiplicity = Some(multiplicity.to_string());
        self
    }

    pub fn with_stereotype(mut self, stereotype: &str) -> Self {
        self.stereotype = Some(stereotype.to_string());
        self
    }
}

/// Summary counts of an analyzed graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DiagramSummary {
    pub classes_found: usize,
    pub relationships_found: usize,
    /// Packages in first-seen order
    pub packages: Vec<String>,
}

/// Ordered class nodes and relationships
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelationshipGraph {
    nodes: Vec<ClassNode>,
    edges: Vec<Relationship>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; a node with an already known name is ignored
    pub fn add_node(&mut self, node: ClassNode) -> bool {
        if self.index.contains_key(&node.name) {
            return false;
        }
        self.index.insert(node.name.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Add an edge unless an identical one (source, target, kind, label) exists
    pub fn add_edge(&mut self, edge: Relationship) -> bool {
        let duplicate = self.edges.iter().any(|e| {
            e.source == edge.source && e.target == edge.target && e.kind == edge.kind && e.label == edge.label
        });
        if duplicate {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn node(&self, name: &str) -> Option<&ClassNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut ClassNode> {
        match self.index.get(name) {
            Some(&i) => self.nodes.get_mut(i),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn nodes(&self) -> &[ClassNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Relationship] {
        &self.edges
    }

    pub fn edges_of_kind(&self, kind: RelationshipKind) -> impl Iterator<Item = &Relationship> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    pub fn summary(&self) -> DiagramSummary {
        let mut packages: Vec<String> = Vec::new();
        for node in &self.nodes {
            if !packages.contains(&node.package) {
                packages.push(node.package.clone());
            }
        }
        DiagramSummary {
            classes_found: self.nodes.len(),
            relationships_found: self.edges.len(),
            packages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_node_keeps_first() {
        let mut graph = RelationshipGraph::new();
        assert!(graph.add_node(ClassNode::new("User", "app.models")));
        assert!(!graph.add_node(ClassNode::new("User", "app.other")));
        assert_eq!(graph.nodes().len(), 1);
        assert_eq!(graph.node("User").unwrap().package, "app.models");
    }

    #[test]
    fn test_add_edge_dedupes() {
        let mut graph = RelationshipGraph::new();
        let edge = Relationship::new("B", "A", RelationshipKind::Composition).with_label("x");
        assert!(graph.add_edge(edge.clone()));
        assert!(!graph.add_edge(edge));
        let other = Relationship::new("B", "A", RelationshipKind::Composition).with_label("y");
        assert!(graph.add_edge(other));
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn test_summary_packages_first_seen() {
        let mut graph = RelationshipGraph::new();
        graph.add_node(ClassNode::new("User", "app.models"));
        graph.add_node(ClassNode::new("UserService", "app.services"));
        graph.add_node(ClassNode::new("Order", "app.models"));
        graph.add_edge(Relationship::new("UserService", "User", RelationshipKind::Association));

        let summary = graph.summary();
        assert_eq!(summary.classes_found, 3);
        assert_eq!(summary.relationships_found, 1);
        assert_eq!(summary.packages, vec!["app.models", "app.services"]);
    }

    #[test]
    fn test_visibility_of() {
        assert_eq!(Visibility::of("_cache"), Visibility::Private);
        assert_eq!(Visibility::of("__init__"), Visibility::Public);
        assert_eq!(Visibility::of("name"), Visibility::Public);
    }

    #[test]
    fn test_arrows() {
        assert_eq!(RelationshipKind::Inheritance.arrow(), "--|>");
        assert_eq!(RelationshipKind::Composition.arrow(), "*--");
        assert_eq!(RelationshipKind::Dependency.arrow(), "..>");
    }
}
