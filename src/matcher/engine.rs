use crate::chain::generator::StepGenerator;
use crate::error::{TimelineError, TimelineResult};
use crate::matcher::scoring::{calculate_similarity, calculate_statistics};
use crate::types::{MatchResult, QuantumConfig, QuantumStep, SequenceAlignment};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Candidate window size when no explicit range is requested: the first
/// 10,000 steps from the origin.
pub const DEFAULT_CANDIDATE_STEPS: usize = 10_000;

/// Inclusive timestamp range used to bound the candidate window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

/// User input for one match invocation. Either raw intervals or a timestamp
/// list (differenced into intervals, negative gaps clamped to zero) must be
/// supplied; intervals take precedence when both are present.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MatchRequest {
    pub intervals: Option<Vec<u64>>,
    pub timestamps: Option<Vec<i64>>,
    pub range: Option<TimeRange>,
    pub window_size: Option<usize>,
}

/// Interval projection of a step slice: each step contributes its own
/// `interval_ms` (0 for the origin).
pub fn extract_intervals(steps: &[QuantumStep]) -> Vec<u64> {
    steps.iter().map(|step| step.interval_ms).collect()
}

/// Exhaustive sliding-window matcher over generated chain output.
pub struct SequenceMatcher {
    generator: StepGenerator,
}

impl SequenceMatcher {
    pub fn new(config: QuantumConfig) -> Self {
        Self {
            generator: StepGenerator::new(config),
        }
    }

    pub fn with_generator(generator: StepGenerator) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &StepGenerator {
        &self.generator
    }

    /// Score every offset of `candidate_steps` against `user_intervals` and
    /// return the best-scoring alignment. Scanning is strictly sequential and
    /// retains an offset only on a strictly greater score, so ties break
    /// toward the earliest offset.
    pub fn find_best_alignment(
        &self,
        user_intervals: &[u64],
        candidate_steps: &[QuantumStep],
        window_size: Option<usize>,
    ) -> TimelineResult<(SequenceAlignment, f64)> {
        if user_intervals.is_empty() {
            return Err(TimelineError::invalid_input(
                "user interval sequence is empty",
            ));
        }
        let window = window_size.unwrap_or(user_intervals.len());
        if window == 0 {
            return Err(TimelineError::invalid_input("window size must be positive"));
        }
        let candidate_intervals = extract_intervals(candidate_steps);
        if candidate_intervals.len() < window {
            return Err(TimelineError::invalid_input(format!(
                "candidate window ({} intervals) is shorter than the comparison window ({window})",
                candidate_intervals.len()
            )));
        }

        let max_interval = self.generator.config().max_interval_ms;
        let mut best_offset = 0_usize;
        let mut best_score = f64::NEG_INFINITY;
        for offset in 0..=candidate_intervals.len() - window {
            let score = calculate_similarity(
                user_intervals,
                &candidate_intervals[offset..offset + window],
                max_interval,
            );
            if score > best_score {
                best_score = score;
                best_offset = offset;
            }
        }
        debug!(
            offsets = candidate_intervals.len() - window + 1,
            best_offset, best_score, "alignment scan complete"
        );

        let alignment = SequenceAlignment {
            offset: best_offset,
            length: window,
            aligned_steps: candidate_steps[best_offset..best_offset + window].to_vec(),
        };
        Ok((alignment, best_score))
    }

    /// Normalize the request, obtain the candidate window, align, and rebuild
    /// statistics and similarity on the winning window so the returned result
    /// is self-consistent regardless of how the search loop scored it.
    pub fn match_sequence(&self, request: &MatchRequest) -> TimelineResult<MatchResult> {
        let user_intervals = normalize_intervals(request)?;
        if user_intervals.is_empty() {
            return Err(TimelineError::invalid_input(
                "input normalized to zero intervals",
            ));
        }

        let candidate_steps = match &request.range {
            Some(range) => self.generator.steps_in_range(range.start_ms, range.end_ms)?,
            None => {
                let origin = self.generator.initial_step()?;
                let mut steps = Vec::with_capacity(DEFAULT_CANDIDATE_STEPS);
                steps.push(origin.clone());
                steps.extend(
                    self.generator
                        .steps_forward(&origin, DEFAULT_CANDIDATE_STEPS - 1)?,
                );
                steps
            }
        };
        if candidate_steps.len() < user_intervals.len() {
            return Err(TimelineError::invalid_input(format!(
                "candidate window ({} steps) is shorter than the user sequence ({})",
                candidate_steps.len(),
                user_intervals.len()
            )));
        }

        let (alignment, _search_score) =
            self.find_best_alignment(&user_intervals, &candidate_steps, request.window_size)?;
        let aligned_intervals = extract_intervals(&alignment.aligned_steps);
        let statistics = calculate_statistics(&user_intervals, &aligned_intervals);
        let similarity_score = calculate_similarity(
            &user_intervals,
            &aligned_intervals,
            self.generator.config().max_interval_ms,
        );
        debug!(
            offset = alignment.offset,
            similarity_score, "sequence match complete"
        );

        Ok(MatchResult {
            similarity_score,
            matched_steps: alignment.aligned_steps.clone(),
            alignment,
            statistics,
            user_intervals,
            aligned_intervals,
        })
    }
}

fn normalize_intervals(request: &MatchRequest) -> TimelineResult<Vec<u64>> {
    if let Some(intervals) = &request.intervals {
        return Ok(intervals.clone());
    }
    if let Some(timestamps) = &request.timestamps {
        return Ok(timestamps
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).max(0) as u64)
            .collect());
    }
    Err(TimelineError::invalid_input(
        "match request carries neither intervals nor timestamps",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn steps_from_intervals(intervals: &[u64]) -> Vec<QuantumStep> {
        let mut timestamp = 0_i64;
        intervals
            .iter()
            .enumerate()
            .map(|(i, &interval)| {
                timestamp += interval as i64;
                QuantumStep {
                    index: i as u64,
                    timestamp_ms: timestamp,
                    interval_ms: interval,
                    hash: "cd".repeat(32),
                }
            })
            .collect()
    }

    #[test]
    fn tie_breaks_toward_earliest_offset() {
        let matcher = SequenceMatcher::new(QuantumConfig::default());
        let candidate = steps_from_intervals(&[10, 20, 30, 10, 20, 30]);
        let (alignment, score) = matcher
            .find_best_alignment(&[10, 20, 30], &candidate, None)
            .unwrap();
        assert!((score - 1.0).abs() < 1e-12);
        assert_eq!(alignment.offset, 0);
        assert_eq!(alignment.length, 3);
    }

    #[test]
    fn empty_user_sequence_is_rejected() {
        let matcher = SequenceMatcher::new(QuantumConfig::default());
        let candidate = steps_from_intervals(&[10, 20]);
        match matcher.find_best_alignment(&[], &candidate, None) {
            Err(TimelineError::InvalidInput(_)) => {}
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn short_candidate_window_is_rejected() {
        let matcher = SequenceMatcher::new(QuantumConfig::default());
        let candidate = steps_from_intervals(&[10]);
        match matcher.find_best_alignment(&[10, 20, 30], &candidate, None) {
            Err(TimelineError::InvalidInput(_)) => {}
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn timestamps_difference_into_intervals_with_negative_gaps_clamped() {
        let request = MatchRequest {
            timestamps: Some(vec![0, 100, 300, 250]),
            ..MatchRequest::default()
        };
        let intervals = normalize_intervals(&request).unwrap();
        assert_eq!(intervals, vec![100, 200, 0]);
    }

    #[test]
    fn request_without_input_is_rejected() {
        match normalize_intervals(&MatchRequest::default()) {
            Err(TimelineError::InvalidInput(_)) => {}
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }
}
