pub mod pipeline;
pub use pipeline::*;

pub mod transactions_report;
pub use transactions_report::*;

pub mod portfolio;
pub use portfolio::*;

pub mod dividends;
pub use dividends::*;

pub mod deposits;
pub use deposits::*;

pub mod realized;
pub use realized::*;

pub mod check_portfolio;
pub use check_portfolio::*;
