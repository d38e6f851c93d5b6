use crate::chain::cache::StepCache;
use crate::chain::duration::hash_to_duration;
use crate::error::{TimelineError, TimelineResult};
use crate::hasher::{validate_digest, Sha256Hasher, TimestampHasher};
use crate::types::{QuantumConfig, QuantumStep};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Hard ceiling on any single target-driven chain walk.
pub const MAX_WALK_STEPS: u64 = 1_000_000;

/// Advances the hash chain: digest the current timestamp, scale the digest
/// into a bounded duration, add it. Every operation is a pure fold over the
/// chain; the cache is an acceleration layer, never a correctness dependency.
pub struct StepGenerator {
    config: QuantumConfig,
    hasher: Arc<dyn TimestampHasher>,
    cache: Arc<Mutex<StepCache>>,
}

impl StepGenerator {
    pub fn new(config: QuantumConfig) -> Self {
        Self::with_hasher(config, Arc::new(Sha256Hasher))
    }

    pub fn with_hasher(config: QuantumConfig, hasher: Arc<dyn TimestampHasher>) -> Self {
        Self {
            config,
            hasher,
            cache: Arc::new(Mutex::new(StepCache::default())),
        }
    }

    /// Swap in a caller-owned cache, e.g. one shared across generators for the
    /// same config. The cache must have been primed under this config only.
    pub fn with_cache(mut self, cache: Arc<Mutex<StepCache>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &QuantumConfig {
        &self.config
    }

    pub fn cache(&self) -> Arc<Mutex<StepCache>> {
        Arc::clone(&self.cache)
    }

    /// Drop all memoized steps and checkpoints (new session).
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    /// The origin step: index 0, the configured start timestamp, interval 0,
    /// hash over its own timestamp.
    pub fn initial_step(&self) -> TimelineResult<QuantumStep> {
        if let Some(hit) = self.cache.lock().get(0) {
            return Ok(hit);
        }
        let hash = self.hasher.digest_timestamp(self.config.start_timestamp_ms)?;
        validate_digest(&hash)?;
        let step = QuantumStep {
            index: 0,
            timestamp_ms: self.config.start_timestamp_ms,
            interval_ms: 0,
            hash,
        };
        self.cache.lock().set(step.clone());
        Ok(step)
    }

    /// Derive the successor of `current`. Consults the cache before
    /// recomputing; on a miss the digest of `current.timestamp_ms` alone
    /// determines the result.
    pub fn next_step(&self, current: &QuantumStep) -> TimelineResult<QuantumStep> {
        let next_index = current.index + 1;
        if let Some(hit) = self.cache.lock().get(next_index) {
            return Ok(hit);
        }
        let digest = self.hasher.digest_timestamp(current.timestamp_ms)?;
        validate_digest(&digest)?;
        let interval_ms = hash_to_duration(&digest, self.config.max_interval_ms)?;
        let step = QuantumStep {
            index: next_index,
            timestamp_ms: current.timestamp_ms.saturating_add(interval_ms as i64),
            interval_ms,
            hash: digest,
        };
        self.cache.lock().set(step.clone());
        Ok(step)
    }

    /// Exactly `count` successive steps after `start`.
    pub fn steps_forward(
        &self,
        start: &QuantumStep,
        count: usize,
    ) -> TimelineResult<Vec<QuantumStep>> {
        let mut steps = Vec::with_capacity(count);
        let mut current = start.clone();
        for _ in 0..count {
            current = self.next_step(&current)?;
            steps.push(current.clone());
        }
        Ok(steps)
    }

    /// Successive steps while the chain timestamp stays below `target_ms`.
    /// The final collected step is the first one at or past the target.
    /// Bails out with `ResourceExhausted` after [`MAX_WALK_STEPS`] steps.
    pub fn steps_until(
        &self,
        start: &QuantumStep,
        target_ms: i64,
    ) -> TimelineResult<Vec<QuantumStep>> {
        let mut steps = Vec::new();
        let mut current = start.clone();
        let mut walked: u64 = 0;
        while current.timestamp_ms < target_ms {
            if walked >= MAX_WALK_STEPS {
                return Err(TimelineError::ResourceExhausted {
                    limit: MAX_WALK_STEPS,
                    target_ms,
                });
            }
            current = self.next_step(&current)?;
            steps.push(current.clone());
            walked += 1;
        }
        Ok(steps)
    }

    /// Walk forward from the origin until the chain reaches or passes
    /// `target_ms`, then return whichever of the last two candidates lies
    /// closer (ties go to the earlier step). A one-way hash chain cannot be
    /// binary-searched, so cost scales with chain distance to the target.
    pub fn find_nearest(&self, target_ms: i64) -> TimelineResult<QuantumStep> {
        let mut previous = self.initial_step()?;
        if previous.timestamp_ms >= target_ms {
            return Ok(previous);
        }
        loop {
            let next = self.next_step(&previous)?;
            if next.timestamp_ms >= target_ms {
                let before = (target_ms - previous.timestamp_ms).unsigned_abs();
                let after = (next.timestamp_ms - target_ms).unsigned_abs();
                debug!(
                    target = target_ms,
                    candidate = next.index,
                    "nearest search crossed target"
                );
                return Ok(if before <= after { previous } else { next });
            }
            previous = next;
        }
    }

    /// All steps whose timestamps fall inside `[start_ms, end_ms]`.
    pub fn steps_in_range(&self, start_ms: i64, end_ms: i64) -> TimelineResult<Vec<QuantumStep>> {
        if end_ms < start_ms {
            return Ok(Vec::new());
        }
        let mut current = self.find_nearest(start_ms)?;
        while current.timestamp_ms < start_ms {
            current = self.next_step(&current)?;
        }
        let mut steps = Vec::new();
        while current.timestamp_ms <= end_ms {
            steps.push(current.clone());
            current = self.next_step(&current)?;
        }
        Ok(steps)
    }

    /// Index-addressed lookup riding the checkpoint map: exact hit, else walk
    /// forward from the nearest checkpoint at or before `index`, else from the
    /// origin.
    pub fn step_at(&self, index: u64) -> TimelineResult<QuantumStep> {
        if let Some(hit) = self.cache.lock().get(index) {
            return Ok(hit);
        }
        let checkpoint = self.cache.lock().nearest_checkpoint(index);
        let mut current = match checkpoint {
            Some(step) if step.index <= index => step,
            _ => self.initial_step()?,
        };
        if current.index < index {
            debug!(
                from = current.index,
                to = index,
                "replaying chain from checkpoint"
            );
        }
        while current.index < index {
            current = self.next_step(&current)?;
        }
        Ok(current)
    }
}
