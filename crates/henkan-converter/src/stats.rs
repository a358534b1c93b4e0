//! Usage counters emitted at commit points.
//!
//! The converter only writes to a `StatsSink`; it never reads values back.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

pub const SUBMITTED_SEGMENT_LENGTH_X1000: &str = "SubmittedSegmentLengthx1000";
pub const SUBMITTED_LENGTH_X1000: &str = "SubmittedLengthx1000";
pub const SUBMITTED_SEGMENT_NUMBER_X1000: &str = "SubmittedSegmentNumberx1000";
pub const SUBMITTED_TOTAL_LENGTH: &str = "SubmittedTotalLength";
pub const COMMIT_PARTIAL_SUGGESTION: &str = "CommitPartialSuggestion";
pub const COMMIT_AUTO_PARTIAL_SUGGESTION: &str = "CommitAutoPartialSuggestion";

pub trait StatsSink: Send + Sync {
    fn increment_count_by(&self, name: &str, value: u64);

    fn update_timing(&self, name: &str, value: u64);

    fn increment_count(&self, name: &str) {
        self.increment_count_by(name, 1);
    }
}

/// Discards everything.
pub struct NullStatsSink;

impl StatsSink for NullStatsSink {
    fn increment_count_by(&self, _name: &str, _value: u64) {}

    fn update_timing(&self, _name: &str, _value: u64) {}
}

/// Aggregate of the values reported under one timing name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingStats {
    pub total: u64,
    pub num: u64,
    pub min: u64,
    pub max: u64,
}

impl TimingStats {
    fn record(&mut self, value: u64) {
        if self.num == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.total += value;
        self.num += 1;
    }

    pub fn average(&self) -> Option<u64> {
        (self.num > 0).then(|| self.total / self.num)
    }
}

/// In-memory sink for diagnostics and tests.
#[derive(Default)]
pub struct MemoryStatsSink {
    counts: Mutex<HashMap<String, u64>>,
    timings: Mutex<HashMap<String, TimingStats>>,
}

impl MemoryStatsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, name: &str) -> u64 {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    pub fn timing(&self, name: &str) -> Option<TimingStats> {
        self.timings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }

    /// All counters sorted by name.
    pub fn counts(&self) -> Vec<(String, u64)> {
        let map = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<(String, u64)> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
        out.sort();
        out
    }

    /// All timings sorted by name.
    pub fn timings(&self) -> Vec<(String, TimingStats)> {
        let map = self.timings.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<(String, TimingStats)> =
            map.iter().map(|(k, v)| (k.clone(), *v)).collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

impl StatsSink for MemoryStatsSink {
    fn increment_count_by(&self, name: &str, value: u64) {
        *self
            .counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default() += value;
    }

    fn update_timing(&self, name: &str, value: u64) {
        self.timings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .record(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let sink = MemoryStatsSink::new();
        sink.increment_count("a");
        sink.increment_count_by("a", 4);
        assert_eq!(sink.count("a"), 5);
        assert_eq!(sink.count("missing"), 0);
        assert_eq!(sink.counts(), vec![("a".to_string(), 5)]);
    }

    #[test]
    fn test_timing_aggregates() {
        let sink = MemoryStatsSink::new();
        sink.update_timing("t", 3000);
        sink.update_timing("t", 1000);
        sink.update_timing("t", 2000);
        let t = sink.timing("t").unwrap();
        assert_eq!(
            t,
            TimingStats {
                total: 6000,
                num: 3,
                min: 1000,
                max: 3000
            }
        );
        assert_eq!(t.average(), Some(2000));
        assert!(sink.timing("other").is_none());
    }
}
