//! Price sources and multi-ticker alignment

pub mod align;
pub mod provider;
pub mod synthetic;

pub use align::{
    align_series, intersect_dates, merge_on_common_dates, restrict_to_dates, AlignError,
};
pub use provider::{DataError, Interval, PriceSource};
pub use synthetic::SyntheticSource;
