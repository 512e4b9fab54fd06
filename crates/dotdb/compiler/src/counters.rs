// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Per-statement-type counters.

use metrics::{counter, describe_counter};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

/// Name of the exported counter; the statement label goes in the `type` label.
pub const STATEMENT_COUNTER: &str = "dotdb_executor_statement_total";

/// Sink for statement counts. Implementations must tolerate concurrent increments.
#[cfg_attr(test, mockall::automock)]
pub trait StatementMetrics: Send + Sync {
    fn increment_statement_counter(&self, label: &'static str);
}

/// Forwards counts to whatever `metrics` recorder the process installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsStatementCounter;

impl MetricsStatementCounter {
    pub fn new() -> Self {
        describe_counter!(STATEMENT_COUNTER, "Number of compiled statements, by statement type");
        Self
    }
}

impl StatementMetrics for MetricsStatementCounter {
    fn increment_statement_counter(&self, label: &'static str) {
        counter!(STATEMENT_COUNTER, 1, "type" => label);
    }
}

/// In-process counts, readable back without a metrics exporter.
#[derive(Debug, Default)]
pub struct StatementCounter {
    counts: RwLock<HashMap<&'static str, AtomicU64>>,
}

impl StatementCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: &str) -> u64 {
        self.counts.read().get(label).map_or(0, |count| count.load(Ordering::Relaxed))
    }

    pub fn total(&self) -> u64 {
        self.counts.read().values().map(|count| count.load(Ordering::Relaxed)).sum()
    }

    /// Point-in-time copy of all counts, sorted by label.
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        self.counts.read().iter().map(|(label, count)| (*label, count.load(Ordering::Relaxed))).collect()
    }
}

impl StatementMetrics for StatementCounter {
    fn increment_statement_counter(&self, label: &'static str) {
        if let Some(count) = self.counts.read().get(label) {
            count.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.counts.write().entry(label).or_default().fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counter_accumulates_per_label() {
        let counter = StatementCounter::new();
        counter.increment_statement_counter("Select");
        counter.increment_statement_counter("Select");
        counter.increment_statement_counter("Insert");

        assert_eq!(counter.get("Select"), 2);
        assert_eq!(counter.get("Insert"), 1);
        assert_eq!(counter.get("Delete"), 0);
        assert_eq!(counter.total(), 3);
        assert_eq!(counter.snapshot().into_iter().collect::<Vec<_>>(), vec![("Insert", 1), ("Select", 2)]);
    }

    #[test]
    fn test_concurrent_increments() {
        let counter = Arc::new(StatementCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    let label = if i % 2 == 0 { "Select" } else { "Update" };
                    for _ in 0..1000 {
                        counter.increment_statement_counter(label);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.get("Select"), 4000);
        assert_eq!(counter.get("Update"), 4000);
        assert_eq!(counter.total(), 8000);
    }

    #[test]
    fn test_metrics_counter_without_recorder() {
        // No recorder installed: increments are dropped silently.
        let counter = MetricsStatementCounter::new();
        counter.increment_statement_counter("Select");
    }
}
