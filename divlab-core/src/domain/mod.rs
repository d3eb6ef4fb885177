//! Domain types for DivLab

pub mod bar;
pub mod events;
pub mod info;

pub use bar::{Bar, TickerBar};
pub use events::{DividendEvent, SplitEvent};
pub use info::{TickerInfo, NOT_AVAILABLE};
