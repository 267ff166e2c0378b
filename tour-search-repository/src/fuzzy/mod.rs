//! Weighted fuzzy-match index backed by `strsim`.

mod highlight;
mod index;

pub use highlight::highlight_ranges;
pub use index::WeightedFuzzyIndex;
