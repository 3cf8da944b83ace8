// Shared entities passed between scanner, analyzer and renderer

mod diagram;
mod graph;
mod item;

pub use diagram::*;
pub use graph::*;
pub use item::*;
