use memory_stats::memory_stats;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Minimum gap between two progress lines.
const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// Node counters of a single search run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeCounts {
    pub expanded: usize,
    /// Nodes scored by the priority function or heuristic.
    pub evaluated: usize,
    pub generated: usize,
    /// Successors dropped because a path at least as cheap was known.
    pub pruned: usize,
}

/// Counters and timing for one search, with a progress line at info level
/// every [`PROGRESS_INTERVAL`].
#[derive(Debug, Clone)]
pub struct SearchStatistics {
    counts: NodeCounts,
    peak_memory_mb: Option<usize>,
    started: Instant,
    last_progress: Instant,
}

fn resident_memory_mb() -> Option<usize> {
    memory_stats().map(|usage| usage.physical_mem / (1024 * 1024))
}

impl SearchStatistics {
    pub fn new() -> Self {
        debug!("starting search");
        let now = Instant::now();
        Self {
            counts: NodeCounts::default(),
            peak_memory_mb: None,
            started: now,
            last_progress: now,
        }
    }

    pub fn increment_expanded_nodes(&mut self) {
        self.counts.expanded += 1;
        self.maybe_report_progress();
    }

    pub fn increment_evaluated_nodes(&mut self) {
        self.counts.evaluated += 1;
        self.maybe_report_progress();
    }

    pub fn increment_generated_nodes(&mut self, num_nodes: usize) {
        self.counts.generated += num_nodes;
        self.maybe_report_progress();
    }

    pub fn increment_pruned_nodes(&mut self) {
        self.counts.pruned += 1;
    }

    pub fn counts(&self) -> NodeCounts {
        self.counts
    }

    pub fn expanded_nodes(&self) -> usize {
        self.counts.expanded
    }

    pub fn evaluated_nodes(&self) -> usize {
        self.counts.evaluated
    }

    pub fn generated_nodes(&self) -> usize {
        self.counts.generated
    }

    pub fn pruned_nodes(&self) -> usize {
        self.counts.pruned
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn sample_memory(&mut self) -> Option<usize> {
        let current = resident_memory_mb();
        self.peak_memory_mb = self.peak_memory_mb.max(current);
        current
    }

    fn maybe_report_progress(&mut self) {
        if self.last_progress.elapsed() >= PROGRESS_INTERVAL {
            self.report_progress();
        }
    }

    pub fn report_progress(&mut self) {
        self.last_progress = Instant::now();
        let memory_mb = self.sample_memory();
        let NodeCounts {
            expanded,
            evaluated,
            generated,
            pruned,
        } = self.counts;
        info!(
            expanded,
            evaluated,
            generated,
            pruned,
            memory_mb,
            elapsed_secs = self.elapsed().as_secs_f64(),
            "search progress"
        );
    }

    /// Logs a summary at debug level. Nested searches (e.g. demonstration
    /// planning inside policy scoring) finish often, so this stays quiet at
    /// the default verbosity.
    pub fn finalise_search(&mut self) {
        self.sample_memory();
        let NodeCounts {
            expanded,
            evaluated,
            generated,
            pruned,
        } = self.counts;
        debug!(
            expanded,
            evaluated,
            generated,
            pruned,
            peak_memory_mb = self.peak_memory_mb,
            elapsed_secs = self.elapsed().as_secs_f64(),
            "finished search"
        );
    }
}

impl Default for SearchStatistics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let mut statistics = SearchStatistics::new();
        statistics.increment_expanded_nodes();
        statistics.increment_generated_nodes(3);
        statistics.increment_evaluated_nodes();
        statistics.increment_evaluated_nodes();
        statistics.increment_pruned_nodes();
        statistics.report_progress();
        statistics.finalise_search();

        assert_eq!(
            statistics.counts(),
            NodeCounts {
                expanded: 1,
                evaluated: 2,
                generated: 3,
                pruned: 1,
            }
        );
    }
}
