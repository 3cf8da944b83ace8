// Parser module for turning Python source into syntax trees

mod python;
pub mod types;

pub use python::{
    block_docstring, clean_docstring, compact_text, decorator_name, decorator_nodes, last_segment,
    line_of, node_text, statement_docstring, string_content, PythonParser,
};
pub use types::{render_type, COMPLEX_TYPE};
