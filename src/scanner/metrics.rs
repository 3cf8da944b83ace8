// Complexity and maintainability of function bodies
//
// Complexity is 1 plus the number of decision points:
// - if / elif, loops, except clauses, case clauses
// - boolean operators and conditional expressions
// - comprehension for / if clauses
// Nested function, class and lambda bodies are not counted.

use tree_sitter::Node;

/// Body metrics of one function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionMetrics {
    pub complexity: usize,
    pub body_lines: usize,
    pub maintainability: f64,
}

impl FunctionMetrics {
    /// Measure a function body block
    pub fn measure(body: &Node, has_docstring: bool) -> Self {
        let complexity = 1 + decision_points(body);
        let body_lines = body.end_position().row - body.start_position().row + 1;
        Self {
            complexity,
            body_lines,
            maintainability: maintainability(complexity, body_lines, has_docstring),
        }
    }
}

fn decision_points(node: &Node) -> usize {
    let mut count = 0;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        count += match child.kind() {
            "function_definition" | "class_definition" | "decorated_definition" | "lambda" => continue,
            "if_statement" | "elif_clause" | "for_statement" | "while_statement" | "except_clause"
            | "except_group_clause" | "case_clause" | "boolean_operator" | "conditional_expression"
            | "for_in_clause" | "if_clause" => 1,
            _ => 0,
        };
        count += decision_points(&child);
    }
    count
}

/// `100 - 5(c - 1) - 0.5 max(0, lines - 25) + 10 [doc]`, clamped to [0, 100]
pub fn maintainability(complexity: usize, body_lines: usize, has_docstring: bool) -> f64 {
    let mut score = 100.0;
    score -= 5.0 * complexity.saturating_sub(1) as f64;
    score -= 0.5 * body_lines.saturating_sub(25) as f64;
    if has_docstring {
        score += 10.0;
    }
    let clamped = score.clamp(0.0, 100.0);
    (clamped * 10.0).round() / 10.0
}
