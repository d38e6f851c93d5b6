//! Hash-chain step generation: digest → bounded duration → next timestamp.

pub mod cache;
pub mod duration;
pub mod generator;

pub use cache::{StepCache, CHECKPOINT_STRIDE, DEFAULT_CACHE_CAPACITY};
pub use duration::{format_duration, hash_to_duration, parse_duration};
pub use generator::{StepGenerator, MAX_WALK_STEPS};
