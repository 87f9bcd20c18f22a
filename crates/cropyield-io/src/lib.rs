pub mod model_io;
pub mod error;

pub use model_io::*;
pub use error::ModelIoError;
