//! Deterministic hash-chain timeline primitives.
//!
//! This crate generates an infinite, fully reproducible sequence of timestamps
//! by repeatedly hashing the previous timestamp and deriving a bounded offset
//! from the digest. On top of the chain it provides a sliding-window matcher
//! that aligns an externally supplied interval sequence against generated
//! steps and scores the best alignment with a hybrid similarity metric.

pub mod chain;
pub mod error;
pub mod hasher;
pub mod matcher;
pub mod types;

pub use crate::chain::cache::StepCache;
pub use crate::chain::generator::StepGenerator;
pub use crate::error::{TimelineError, TimelineResult};
pub use crate::matcher::engine::{MatchRequest, SequenceMatcher, TimeRange};
pub use crate::types::{MatchResult, QuantumConfig, QuantumStep};
