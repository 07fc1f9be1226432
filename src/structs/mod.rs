pub mod transaction;
pub use transaction::*;

pub mod instrument;
pub use instrument::*;

pub mod currency;
pub use currency::*;

pub mod money;
pub use money::*;

pub mod corporate_action;
pub use corporate_action::*;

pub mod position;
pub use position::*;

pub mod dividend;
pub use dividend::*;

pub mod money_move;
pub use money_move::*;

pub mod managers;
pub use managers::*;
