pub mod types;
pub mod dispatcher;

pub use types::*;
pub use dispatcher::*;
