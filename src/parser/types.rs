// Type annotation pretty-printing

use super::python::{node_text, string_content};
use tree_sitter::Node;

/// Placeholder for annotations that cannot be printed structurally
pub const COMPLEX_TYPE: &str = "<complex_type>";

/// Render a type annotation node as a readable type string.
///
/// Names, dotted names, subscripted generics, `X | Y` unions, `None`,
/// string forward references and list/tuple literals are supported.
/// Anything else degrades to [`COMPLEX_TYPE`].
pub fn render_type(node: &Node, source: &[u8]) -> String {
    render(node, source).unwrap_or_else(|| COMPLEX_TYPE.to_string())
}

fn render(node: &Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "type" | "parenthesized_expression" => {
            let inner = node.named_child(0)?;
            render(&inner, source)
        }
        "identifier" | "integer" | "float" | "true" | "false" => {
            Some(node_text(node, source).to_string())
        }
        "none" => Some("None".to_string()),
        "ellipsis" => Some("...".to_string()),
        "string" => {
            let content = string_content(node, source)?;
            Some(content.trim().to_string())
        }
        "attribute" => {
            let object = node.child_by_field_name("object")?;
            let attr = node.child_by_field_name("attribute")?;
            Some(format!("{}.{}", render(&object, source)?, node_text(&attr, source)))
        }
        "member_type" => {
            let parts = named_children(node);
            let rendered: Option<Vec<String>> = parts.iter().map(|p| render(p, source)).collect();
            Some(rendered?.join("."))
        }
        "subscript" => {
            let value = node.child_by_field_name("value")?;
            let mut cursor = node.walk();
            let args: Option<Vec<String>> = node
                .children_by_field_name("subscript", &mut cursor)
                .map(|a| render(&a, source))
                .collect();
            Some(format!("{}[{}]", render(&value, source)?, args?.join(", ")))
        }
        "generic_type" => {
            let parts = named_children(node);
            let (head, rest) = parts.split_first()?;
            let params = rest.iter().find(|p| p.kind() == "type_parameter")?;
            Some(format!("{}[{}]", render(head, source)?, render(params, source)?))
        }
        "type_parameter" | "expression_list" => {
            let rendered: Option<Vec<String>> = named_children(node)
                .iter()
                .map(|p| render(p, source))
                .collect();
            Some(rendered?.join(", "))
        }
        "union_type" => {
            let rendered: Option<Vec<String>> = named_children(node)
                .iter()
                .map(|p| render(p, source))
                .collect();
            Some(rendered?.join(" | "))
        }
        "binary_operator" => {
            let operator = node.child_by_field_name("operator")?;
            if node_text(&operator, source) != "|" {
                return None;
            }
            let left = node.child_by_field_name("left")?;
            let right = node.child_by_field_name("right")?;
            Some(format!("{} | {}", render(&left, source)?, render(&right, source)?))
        }
        "list" => {
            let rendered: Option<Vec<String>> = named_children(node)
                .iter()
                .map(|p| render(p, source))
                .collect();
            Some(format!("[{}]", rendered?.join(", ")))
        }
        "tuple" => {
            let rendered: Option<Vec<String>> = named_children(node)
                .iter()
                .map(|p| render(p, source))
                .collect();
            Some(format!("({})", rendered?.join(", ")))
        }
        "splat_type" => {
            let inner = node.named_child(0)?;
            let prefix = if node_text(node, source).starts_with("**") { "**" } else { "*" };
            Some(format!("{}{}", prefix, render(&inner, source)?))
        }
        _ => None,
    }
}

fn named_children<'a>(node: &Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}
