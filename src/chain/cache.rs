use crate::types::QuantumStep;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Entry limit before oldest-inserted eviction kicks in.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Every index divisible by this stride is also recorded as a checkpoint.
pub const CHECKPOINT_STRIDE: u64 = 1_000;

/// Memoized chain steps plus periodic checkpoints for long-range navigation.
///
/// Eviction is insertion-order based, not access-order: the chain's prevailing
/// access pattern is forward-sequential, so LRU promotion on read would buy
/// nothing. Checkpoints live in a separate map and survive entry eviction.
/// The cache is an optimization only; every evicted step is recomputable from
/// the chain's deterministic definition.
#[derive(Debug)]
pub struct StepCache {
    capacity: usize,
    entries: HashMap<u64, QuantumStep>,
    insertion_order: VecDeque<u64>,
    checkpoints: BTreeMap<u64, QuantumStep>,
}

impl Default for StepCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl StepCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            checkpoints: BTreeMap::new(),
        }
    }

    pub fn get(&self, index: u64) -> Option<QuantumStep> {
        self.entries.get(&index).cloned()
    }

    /// Insert or overwrite the entry at `step.index`, evicting the oldest
    /// inserted entry once capacity is exceeded.
    pub fn set(&mut self, step: QuantumStep) {
        if step.index % CHECKPOINT_STRIDE == 0 {
            self.checkpoints.insert(step.index, step.clone());
        }
        if !self.entries.contains_key(&step.index) {
            self.insertion_order.push_back(step.index);
        }
        self.entries.insert(step.index, step);
        while self.entries.len() > self.capacity {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Most recent checkpoint at or before `target_index`.
    pub fn nearest_checkpoint(&self, target_index: u64) -> Option<QuantumStep> {
        self.checkpoints
            .range(..=target_index)
            .next_back()
            .map(|(_, step)| step.clone())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
        self.checkpoints.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn step(index: u64) -> QuantumStep {
        QuantumStep {
            index,
            timestamp_ms: index as i64 * 10,
            interval_ms: 10,
            hash: "ab".repeat(32),
        }
    }

    #[test]
    fn eviction_is_oldest_inserted_first() {
        let mut cache = StepCache::new(3);
        for i in 1..=3 {
            cache.set(step(i));
        }
        // Reads must not promote: touching 1 then inserting should still evict 1.
        assert!(cache.get(1).is_some());
        cache.set(step(4));
        assert!(cache.get(1).is_none());
        assert!(cache.get(2).is_some());
        assert!(cache.get(4).is_some());
    }

    #[test]
    fn overwrite_does_not_duplicate_insertion_order() {
        let mut cache = StepCache::new(2);
        cache.set(step(1));
        cache.set(step(1));
        cache.set(step(2));
        cache.set(step(3));
        // 1 was inserted once; after the capacity breach only it is gone.
        assert!(cache.get(1).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn checkpoints_record_stride_multiples_and_survive_eviction() {
        let mut cache = StepCache::new(2);
        cache.set(step(0));
        cache.set(step(1_000));
        cache.set(step(1_500));
        cache.set(step(2_000));
        assert!(cache.get(0).is_none());
        assert_eq!(cache.nearest_checkpoint(999).unwrap().index, 0);
        assert_eq!(cache.nearest_checkpoint(1_999).unwrap().index, 1_000);
        assert_eq!(cache.nearest_checkpoint(5_000).unwrap().index, 2_000);
        assert_eq!(cache.nearest_checkpoint(2_000).unwrap().index, 2_000);
    }

    #[test]
    fn clear_resets_entries_and_checkpoints() {
        let mut cache = StepCache::default();
        cache.set(step(0));
        cache.set(step(7));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.nearest_checkpoint(u64::MAX).is_none());
    }
}
