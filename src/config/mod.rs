//! Configuration loading and management
//!
//! A [`QueryConfig`] value is threaded into each
//! [`DataSource`](crate::query::DataSource) at construction time. There is
//! no process-wide parser state.

use anyhow::Result;
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::core::QueryError;
use crate::core::descriptor::DEFAULT_SEARCH_DEPTH;

/// Whether list requests compute a total count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Count matching rows before paging
    #[default]
    Exact,
    /// Skip counting; results report `-1` and paging is best-effort
    Skip,
}

/// Tuning knobs of the query pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size when the request does not give one
    pub default_page_size: i64,

    /// Upper bound for any requested page size
    pub max_page_size: i64,

    /// Maximum number of distinct search tokens considered
    pub max_search_terms: usize,

    /// How many levels of nested objects general search descends into
    pub search_max_depth: usize,

    /// Offset of the zone used to localize naive dates compared against
    /// offset-aware timestamps, in minutes east of UTC
    pub utc_offset_minutes: i32,

    /// Total count strategy for list requests
    pub count_mode: CountMode,

    /// Marker turning a string filter into a prefix match
    pub wildcard: char,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            max_page_size: 10_000,
            max_search_terms: 6,
            search_max_depth: DEFAULT_SEARCH_DEPTH,
            utc_offset_minutes: 0,
            count_mode: CountMode::Exact,
            wildcard: '*',
        }
    }
}

impl QueryConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<(), QueryError> {
        let fail = |message: &str| {
            Err(QueryError::Config {
                message: message.to_string(),
            })
        };
        if self.max_page_size < 1 {
            return fail("max_page_size must be at least 1");
        }
        if self.default_page_size < 1 {
            return fail("default_page_size must be at least 1");
        }
        if self.max_search_terms < 1 {
            return fail("max_search_terms must be at least 1");
        }
        if FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).is_none() {
            return fail("utc_offset_minutes is out of range");
        }
        Ok(())
    }

    /// Zone used to localize naive date input
    pub fn time_zone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix())
    }

    /// Whether list requests compute a total count
    pub fn counts_total(&self) -> bool {
        self.count_mode == CountMode::Exact
    }
}
