// Output generation: PlantUML diagrams, templates and image rendering

pub mod diagrams;
pub mod store;
pub mod templates;

pub use diagrams::*;
pub use store::*;
pub use templates::*;
