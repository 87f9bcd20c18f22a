pub mod imputer;
pub mod scaler;
pub mod encoder;
pub mod split;
pub mod column_transformer;

pub use imputer::*;
pub use scaler::*;
pub use encoder::*;
pub use split::*;
pub use column_transformer::*;
