//! Plain, non-atomic usage counters for a single buffer instance.
//!
//! Mirrors the counters-only `Metrics` struct used for channel throughput
//! observability elsewhere in this crate's lineage, adapted to the
//! operations a replay buffer exposes. Since every buffer is single-writer
//! and single-reader by construction, there is no need for atomics here.

/// Snapshot of a buffer's lifetime usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    /// Number of `add` calls that completed successfully.
    pub add_calls: u64,
    /// Total number of records written across all `add` calls.
    pub records_added: u64,
    /// Number of `sample` calls that completed successfully.
    pub sample_calls: u64,
    /// Total number of records returned across all `sample` calls.
    pub records_sampled: u64,
    /// Number of `update_priorities` calls (prioritized buffers only).
    pub priority_updates: u64,
    /// Number of times the write cursor has wrapped past capacity.
    pub wraps: u64,
}

impl Stats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_add(&mut self, n: usize, wrapped: bool) {
        self.add_calls += 1;
        self.records_added += n as u64;
        if wrapped {
            self.wraps += 1;
        }
    }

    pub(crate) fn record_sample(&mut self, n: usize) {
        self.sample_calls += 1;
        self.records_sampled += n as u64;
    }

    pub(crate) fn record_priority_update(&mut self) {
        self.priority_updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_across_calls() {
        let mut stats = Stats::new();
        stats.record_add(4, false);
        stats.record_add(4, true);
        stats.record_sample(8);
        assert_eq!(stats.add_calls, 2);
        assert_eq!(stats.records_added, 8);
        assert_eq!(stats.wraps, 1);
        assert_eq!(stats.sample_calls, 1);
        assert_eq!(stats.records_sampled, 8);
    }
}
