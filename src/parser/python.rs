// Python parser using tree-sitter

use crate::error::{Error, Result};
use tree_sitter::{Node, Parser, Tree};

/// Parser for Python source files
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::language();
        parser.set_language(&language).map_err(|e| {
            Error::Parser(format!("Failed to set Python language: {}", e))
        })?;
        Ok(Self { parser })
    }

    /// Parse Python source into a syntax tree.
    ///
    /// Trees containing error or missing nodes are rejected with a
    /// [`Error::Parse`] naming the first offending position.
    pub fn parse(&mut self, source: &str, path: &std::path::Path) -> Result<Tree> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| Error::parse(path, "parser returned no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            let message = match first_error(&root) {
                Some(node) => format!(
                    "syntax error at line {}, column {}",
                    node.start_position().row + 1,
                    node.start_position().column + 1
                ),
                None => "syntax error".to_string(),
            };
            return Err(Error::parse(path, message));
        }

        Ok(tree)
    }
}

/// Find the first error or missing node in document order
fn first_error<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
    children.iter().find_map(first_error)
}

/// Source text of a node, empty on invalid UTF-8 boundaries
pub fn node_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Source text with all whitespace runs collapsed to single spaces
pub fn compact_text(node: &Node, source: &[u8]) -> String {
    node_text(node, source).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 1-based line number of a node
pub fn line_of(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Extract the literal content of a `string` or `concatenated_string` node
pub fn string_content(node: &Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => Some(strip_quotes(node_text(node, source)).to_string()),
        "concatenated_string" => {
            let mut cursor = node.walk();
            let parts: Vec<String> = node
                .named_children(&mut cursor)
                .filter(|c| c.kind() == "string")
                .map(|c| strip_quotes(node_text(&c, source)).to_string())
                .collect();
            Some(parts.concat())
        }
        _ => None,
    }
}

/// Remove string prefixes (r, b, u, f) and surrounding quotes
fn strip_quotes(text: &str) -> &str {
    let body = text.trim_start_matches(|c: char| matches!(c, 'r' | 'R' | 'b' | 'B' | 'u' | 'U' | 'f' | 'F'));

    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = body.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return inner;
        }
    }
    body
}

/// Docstring of a block: the first statement, when it is a bare string.
///
/// The text is normalized the way Python's `inspect.cleandoc` does it;
/// an empty docstring is reported as absent.
pub fn block_docstring(block: &Node, source: &[u8]) -> Option<String> {
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment")?;
    statement_docstring(&first, source)
}

/// Docstring carried by a single statement, if it is a bare string expression
pub fn statement_docstring(statement: &Node, source: &[u8]) -> Option<String> {
    if statement.kind() != "expression_statement" || statement.named_child_count() != 1 {
        return None;
    }
    let expr = statement.named_child(0)?;
    let raw = string_content(&expr, source)?;
    let cleaned = clean_docstring(&raw);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Normalize docstring indentation: strip the first line, dedent the rest
/// by their common margin, drop leading and trailing blank lines.
pub fn clean_docstring(raw: &str) -> String {
    let expanded = raw.replace('\t', "    ");
    let lines: Vec<&str> = expanded.lines().collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim()
            } else {
                line.get(margin..).unwrap_or_else(|| line.trim_start()).trim_end()
            }
        })
        .collect();

    while cleaned.first().map_or(false, |l| l.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().map_or(false, |l| l.is_empty()) {
        cleaned.pop();
    }

    cleaned.join("\n")
}

/// Decorator nodes of a `decorated_definition`, in source order
pub fn decorator_nodes<'a>(node: &Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| c.kind() == "decorator")
        .collect()
}

/// Decorator name without `@` and call arguments, e.g. `app.get`
pub fn decorator_name(decorator: &Node, source: &[u8]) -> String {
    let text = node_text(decorator, source).trim_start_matches('@');
    let name = match text.find('(') {
        Some(idx) => &text[..idx],
        None => text,
    };
    name.trim().to_string()
}

/// Last dotted segment of a name, e.g. `pydantic.BaseModel` -> `BaseModel`
pub fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn parse(source: &str) -> Tree {
        let mut parser = PythonParser::new().unwrap();
        parser.parse(source, Path::new("test.py")).unwrap()
    }

    #[test]
    fn test_parser_new() {
        let parser = PythonParser::new();
        assert!(parser.is_ok());
    }

    #[test]
    fn test_parse_valid_source() {
        let tree = parse("def hello():\n    return 1\n");
        assert_eq!(tree.root_node().kind(), "module");
    }

    #[test]
    fn test_parse_syntax_error() {
        let mut parser = PythonParser::new().unwrap();
        let result = parser.parse(
            "def broken_function(\n    \"\"\"Oops.\"\"\"\n    return 1\n",
            Path::new("broken.py"),
        );
        let err = result.unwrap_err();
        assert!(err.is_parse_failure());
        assert!(err.to_string().contains("broken.py"));
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"\"\"Doc.\"\"\""), "Doc.");
        assert_eq!(strip_quotes("'''Doc.'''"), "Doc.");
        assert_eq!(strip_quotes("'x'"), "x");
        assert_eq!(strip_quotes("r\"raw\\d\""), "raw\\d");
        assert_eq!(strip_quotes("f'{name}'"), "{name}");
    }

    #[test]
    fn test_clean_docstring_dedents() {
        let raw = "Summary line.\n\n    Args:\n        foo (int): bar\n    ";
        assert_eq!(clean_docstring(raw), "Summary line.\n\nArgs:\n    foo (int): bar");
    }

    #[test]
    fn test_clean_docstring_leading_newline() {
        let raw = "\n    Summary.\n\n    More text.\n    ";
        assert_eq!(clean_docstring(raw), "Summary.\n\nMore text.");
    }

    #[test]
    fn test_block_docstring() {
        let source = "def f():\n    \"\"\"Say hello.\"\"\"\n    return 1\n";
        let tree = parse(source);
        let func = tree.root_node().named_child(0).unwrap();
        let body = func.child_by_field_name("body").unwrap();
        assert_eq!(block_docstring(&body, source.as_bytes()), Some("Say hello.".to_string()));
    }

    #[test]
    fn test_block_docstring_absent() {
        let source = "def f():\n    x = \"not a docstring\"\n";
        let tree = parse(source);
        let func = tree.root_node().named_child(0).unwrap();
        let body = func.child_by_field_name("body").unwrap();
        assert_eq!(block_docstring(&body, source.as_bytes()), None);
    }

    #[test]
    fn test_empty_docstring_is_absent() {
        let source = "def f():\n    \"\"\"   \"\"\"\n";
        let tree = parse(source);
        let func = tree.root_node().named_child(0).unwrap();
        let body = func.child_by_field_name("body").unwrap();
        assert_eq!(block_docstring(&body, source.as_bytes()), None);
    }

    #[test]
    fn test_decorator_name() {
        let source = "@app.get(\"/users\")\ndef f(): pass\n";
        let tree = parse(source);
        let decorated = tree.root_node().named_child(0).unwrap();
        let decorators = decorator_nodes(&decorated);
        assert_eq!(decorators.len(), 1);
        assert_eq!(decorator_name(&decorators[0], source.as_bytes()), "app.get");
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("pydantic.BaseModel"), "BaseModel");
        assert_eq!(last_segment("BaseModel"), "BaseModel");
    }
}
