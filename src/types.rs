use chrono::{SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on any generated interval: 7 days in milliseconds. This is a
/// correctness-critical constant of the deployed chain, not a tunable.
pub const DEFAULT_MAX_INTERVAL_MS: u64 = 7 * 24 * 60 * 60 * 1_000;

/// One link of the hash chain.
///
/// `hash` is the digest of the *predecessor's* timestamp (for the origin, the
/// digest of its own start timestamp), and `interval_ms` is the duration that
/// digest produced. The chain is first-order Markov: any step can be rebuilt
/// from scratch by folding from the origin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantumStep {
    pub index: u64,
    pub timestamp_ms: i64,
    pub interval_ms: u64,
    pub hash: String,
}

impl QuantumStep {
    /// Canonical ISO-8601 rendering of `timestamp_ms`. Derived on demand,
    /// never stored alongside the raw value.
    pub fn iso_string(&self) -> String {
        Utc.timestamp_millis_opt(self.timestamp_ms)
            .single()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_else(|| format!("{}ms", self.timestamp_ms))
    }
}

/// Chain parameters. A cache instance primed under one config must not be
/// reused under another; the memoized steps would belong to a different chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantumConfig {
    pub max_interval_ms: u64,
    pub start_timestamp_ms: i64,
}

impl Default for QuantumConfig {
    fn default() -> Self {
        Self {
            max_interval_ms: DEFAULT_MAX_INTERVAL_MS,
            start_timestamp_ms: 0,
        }
    }
}

impl QuantumConfig {
    pub fn with_start_timestamp(mut self, start_ms: i64) -> Self {
        self.start_timestamp_ms = start_ms;
        self
    }

    pub fn with_max_interval(mut self, max_interval_ms: u64) -> Self {
        self.max_interval_ms = max_interval_ms;
        self
    }
}

/// Winning window position inside the candidate sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceAlignment {
    pub offset: usize,
    pub length: usize,
    pub aligned_steps: Vec<QuantumStep>,
}

/// Error statistics over one (user, aligned) interval pair. Computed once,
/// never mutated afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStatistics {
    pub mean_error: f64,
    pub std_deviation: f64,
    pub correlation: f64,
    pub rmse: f64,
    pub max_error: f64,
    pub min_error: f64,
}

/// Aggregate outcome of one match invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub similarity_score: f64,
    pub alignment: SequenceAlignment,
    pub matched_steps: Vec<QuantumStep>,
    pub statistics: MatchStatistics,
    pub user_intervals: Vec<u64>,
    pub aligned_intervals: Vec<u64>,
}
