pub mod dataset;
pub mod classify;
pub mod features;
pub mod error;

pub use dataset::*;
pub use classify::*;
pub use features::*;
pub use error::DataError;
