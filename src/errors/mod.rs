pub mod api;
pub use api::*;

pub mod io_error;
pub use io_error::*;

pub mod parse;
pub use parse::*;

pub mod instrument;
pub use instrument::*;

pub mod ledger;
pub use ledger::*;

pub mod money;
pub use money::*;

pub mod app;
pub use app::*;
