pub mod trades;
pub use trades::*;

pub mod instruments;
pub use instruments::*;

pub mod corporate_actions;
pub use corporate_actions::*;

pub mod dividends;
pub use dividends::*;

pub mod money_moves;
pub use money_moves::*;

pub mod positions;
pub use positions::*;
