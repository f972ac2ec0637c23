//! Imputation module for handling missing values.
//!
//! Statistical imputation (median for numbers, mode for text) is the only
//! strategy the cleaner uses.

mod statistical;

pub use statistical::StatisticalImputer;
