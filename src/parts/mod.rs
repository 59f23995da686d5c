pub mod types;
pub mod registry;

pub use types::*;
pub use registry::*;
