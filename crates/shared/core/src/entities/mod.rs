pub mod direction;
pub mod position;
pub mod signal;

pub use direction::Direction;
pub use position::{ExitReason, Position};
pub use signal::Signal;
