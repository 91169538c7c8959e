use crate::search::SearchStatistics;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why a search stopped without reaching a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetExhausted {
    Expansions,
    Evaluations,
    TimeLimit,
}

/// Limits on a single search. The clock is checked between expansions and
/// between generated successors, so a search may overrun the time limit by
/// the cost of one successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchBudget {
    pub max_expansions: usize,
    pub max_evaluations: usize,
    #[serde(with = "humantime_serde_compat")]
    pub timeout: Option<Duration>,
}

impl SearchBudget {
    pub const UNLIMITED: SearchBudget = SearchBudget {
        max_expansions: 10_000_000,
        max_evaluations: 10_000_000,
        timeout: None,
    };

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_out_of_time(&self, statistics: &SearchStatistics) -> bool {
        self.timeout
            .is_some_and(|timeout| statistics.elapsed() >= timeout)
    }

    /// Checked before each expansion.
    pub fn should_terminate(&self, statistics: &SearchStatistics) -> Option<BudgetExhausted> {
        if self.is_out_of_time(statistics) {
            Some(BudgetExhausted::TimeLimit)
        } else if statistics.expanded_nodes() >= self.max_expansions {
            Some(BudgetExhausted::Expansions)
        } else if statistics.evaluated_nodes() >= self.max_evaluations {
            Some(BudgetExhausted::Evaluations)
        } else {
            None
        }
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self::UNLIMITED
    }
}

/// Reads and writes optional durations as human readable strings such as
/// `"30s"` or `"1h 30m"`.
mod humantime_serde_compat {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => {
                serializer.serialize_some(&humantime::format_duration(*duration).to_string())
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| humantime::parse_duration(&text).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_budget() {
        let budget = SearchBudget::default().with_max_expansions(0);
        let statistics = SearchStatistics::new();
        assert_eq!(
            budget.should_terminate(&statistics),
            Some(BudgetExhausted::Expansions)
        );
        assert_eq!(SearchBudget::default().should_terminate(&statistics), None);
    }

    #[test]
    fn zero_timeout_is_immediately_exhausted() {
        let budget = SearchBudget::default().with_timeout(Some(Duration::ZERO));
        assert_eq!(
            budget.should_terminate(&SearchStatistics::new()),
            Some(BudgetExhausted::TimeLimit)
        );
    }

    #[test]
    fn budgets_load_from_toml() {
        let budget: SearchBudget = toml::from_str("max-expansions = 5\ntimeout = \"2s\"").unwrap();
        assert_eq!(budget.max_expansions, 5);
        assert_eq!(budget.max_evaluations, SearchBudget::UNLIMITED.max_evaluations);
        assert_eq!(budget.timeout, Some(Duration::from_secs(2)));
    }
}
