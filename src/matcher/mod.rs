//! Sequence alignment: sliding-window search scored by a hybrid similarity.

pub mod engine;
pub mod scoring;

pub use engine::{extract_intervals, MatchRequest, SequenceMatcher, TimeRange};
pub use scoring::{calculate_similarity, calculate_statistics, pearson_correlation};
