pub mod sources;
pub use sources::*;

pub mod services;
pub use services::*;
