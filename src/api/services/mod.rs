pub mod get_price;
pub use get_price::*;

pub mod prefetch;
pub use prefetch::*;

pub mod convert;
pub use convert::*;

pub mod market;
pub use market::*;
