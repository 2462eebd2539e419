//! Return statistics: pure helpers and the lazy summarizer

pub mod returns;
pub mod summarizer;

pub use returns::{
    annualize_return, annualize_std, mean_defined, sample_std, simple_returns, PERIODS_PER_YEAR,
};
pub use summarizer::ReturnsSummarizer;
