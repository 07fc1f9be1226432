pub mod persistable;
pub use persistable::*;

pub mod instrument_manager;
pub use instrument_manager::*;

pub mod transactions_manager;
pub use transactions_manager::*;

pub mod corporate_action_manager;
pub use corporate_action_manager::*;

pub mod ledger_manager;
pub use ledger_manager::*;

pub mod price_manager;
pub use price_manager::*;

pub mod rate_manager;
pub use rate_manager::*;
