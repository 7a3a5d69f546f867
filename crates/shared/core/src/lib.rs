//! Kestrel Core Domain
//!
//! Pure domain types shared by the regime classifier, signal generators,
//! risk engine and agent runtime.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod error;
pub mod stats;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{Direction, ExitReason, Position, Signal};
pub use error::{Error, Result};
pub use values::MarketWindow;
