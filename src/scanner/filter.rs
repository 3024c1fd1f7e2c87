//! Category allow/deny filters and the idle-time (stale) boundary filter.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::time::{Duration, SystemTime};

use crate::core::errors::{Result, SweepError};
use crate::scanner::engine::ArtifactRecord;
use crate::scanner::patterns::ArtifactPatternRegistry;

/// Category filter applied during the walk. `Only` and `Exclude` are
/// mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    Only(Vec<String>),
    Exclude(Vec<String>),
}

impl CategoryFilter {
    /// Resolve the filter into the set of basenames allowed to match.
    ///
    /// Unknown category names contribute nothing; reject them beforehand with
    /// [`CategoryFilter::validate`].
    #[must_use]
    pub fn allowed_basenames(&self, registry: &ArtifactPatternRegistry) -> HashSet<String> {
        match self {
            Self::Only(categories) => categories
                .iter()
                .filter_map(|name| registry.category(name))
                .flatten()
                .cloned()
                .collect(),
            Self::Exclude(categories) => {
                let excluded: HashSet<&str> = categories
                    .iter()
                    .filter_map(|name| registry.category(name))
                    .flatten()
                    .map(String::as_str)
                    .collect();
                registry
                    .basenames()
                    .filter(|basename| !excluded.contains(basename))
                    .map(str::to_string)
                    .collect()
            }
        }
    }

    /// Category names carried by the filter.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        match self {
            Self::Only(categories) | Self::Exclude(categories) => categories,
        }
    }

    /// Reject category names the registry does not know.
    pub fn validate(&self, registry: &ArtifactPatternRegistry) -> Result<()> {
        for name in self.categories() {
            if registry.category(name).is_none() {
                return Err(SweepError::UnknownCategory {
                    name: name.clone(),
                    known: registry.category_names().collect::<Vec<_>>().join(", "),
                });
            }
        }
        Ok(())
    }

    /// Build a filter from the two mutually exclusive option lists.
    ///
    /// Both empty means no filter.
    pub fn from_lists(only: &[String], exclude: &[String]) -> Result<Option<Self>> {
        match (only.is_empty(), exclude.is_empty()) {
            (true, true) => Ok(None),
            (false, true) => Ok(Some(Self::Only(only.to_vec()))),
            (true, false) => Ok(Some(Self::Exclude(exclude.to_vec()))),
            (false, false) => Err(SweepError::InvalidConfig {
                details: "only and exclude category lists cannot both be set".to_string(),
            }),
        }
    }
}

/// Keeps only artifacts whose newest file is at least `min_idle` old.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleFilter {
    min_idle: Duration,
}

impl StaleFilter {
    #[must_use]
    pub const fn new(min_idle: Duration) -> Self {
        Self { min_idle }
    }

    #[must_use]
    pub const fn min_idle(&self) -> Duration {
        self.min_idle
    }

    /// Whether a record has been idle long enough. Unknown timestamps pass.
    #[must_use]
    pub fn is_stale(&self, record: &ArtifactRecord, now: SystemTime) -> bool {
        record.last_modified.is_none_or(|modified| {
            now.duration_since(modified)
                .is_ok_and(|idle| idle >= self.min_idle)
        })
    }

    /// Filter a result list, preserving its order.
    #[must_use]
    pub fn retain(&self, mut records: Vec<ArtifactRecord>, now: SystemTime) -> Vec<ArtifactRecord> {
        records.retain(|record| self.is_stale(record, now));
        records
    }
}

/// Parse a duration such as `30d`, `2w`, `12h`, `90m`, `3600s` or `1y`.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let trimmed = raw.trim();
    let invalid = |details: &str| SweepError::InvalidDuration {
        raw: raw.to_string(),
        details: details.to_string(),
    };

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| invalid("missing unit (s, m, h, d, w, y)"))?;
    let (digits, unit) = trimmed.split_at(split);
    if digits.is_empty() {
        return Err(invalid("missing number"));
    }
    let value: u64 = digits.parse().map_err(|_| invalid("number out of range"))?;
    let unit_secs: u64 = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 3_600,
        "d" => 86_400,
        "w" => 7 * 86_400,
        "y" => 365 * 86_400,
        _ => return Err(invalid("unknown unit (s, m, h, d, w, y)")),
    };
    value
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(|| invalid("duration overflows"))
}
