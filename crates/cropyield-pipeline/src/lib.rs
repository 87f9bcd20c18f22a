pub mod model;
pub mod pipeline;

pub use model::*;
pub use pipeline::*;
