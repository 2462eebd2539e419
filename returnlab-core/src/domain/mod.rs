//! Domain types for returnlab

pub mod price;
pub mod series;

pub use price::{PriceField, PricePoint};
pub use series::{DateSet, TickerSeries};

/// Ticker type alias
pub type Ticker = String;
