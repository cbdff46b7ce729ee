use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;

/// Maximum number of content descriptions carried by a [`Filter`].
pub const MAX_FILE_CONTENT: usize = 5;

/// One of the `year`, `month` or `day` constraints of a filter.
///
/// Serializes back to the array shapes the model emits: `[]`, `[-1, -1]`,
/// `[0, 0]` or `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateRange {
    /// `[]`: the query carries no temporal constraint.
    Unconstrained,
    /// `[-1, -1]`: time matters to the query but was not stated.
    Unknown,
    /// `[0, 0]`: the most recent files are wanted.
    Latest,
    /// `[start, end]` with `start <= end`.
    Between { start: i64, end: i64 },
}

impl DateRange {
    pub fn as_pair(&self) -> Option<(i64, i64)> {
        match self {
            DateRange::Unconstrained => None,
            DateRange::Unknown => Some((-1, -1)),
            DateRange::Latest => Some((0, 0)),
            DateRange::Between { start, end } => Some((*start, *end)),
        }
    }

    /// Bounds usable as a range predicate, only for explicit ranges.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match self {
            DateRange::Between { start, end } => Some((*start, *end)),
            _ => None,
        }
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, DateRange::Latest)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_pair() {
            None => write!(f, "[]"),
            Some((start, end)) => write!(f, "[{}, {}]", start, end),
        }
    }
}

impl Serialize for DateRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_pair() {
            None => serializer.serialize_seq(Some(0))?.end(),
            Some((start, end)) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(&start)?;
                seq.serialize_element(&end)?;
                seq.end()
            }
        }
    }
}

/// Canonical structured description extracted from a user query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub year: DateRange,
    pub month: DateRange,
    pub day: DateRange,
    pub file_content: Vec<String>,
    pub file_type: Vec<String>,
}

impl Filter {
    pub fn has_date_constraint(&self) -> bool {
        [self.year, self.month, self.day]
            .iter()
            .any(|range| *range != DateRange::Unconstrained)
    }

    pub fn prefers_latest(&self) -> bool {
        self.year.is_latest() || self.month.is_latest() || self.day.is_latest()
    }
}

/// Result of running the extraction pipeline.
///
/// `Empty` means nothing trustworthy could be extracted and the caller should
/// search without structured constraints. It is distinct from a `Filter`
/// whose fields all happen to be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Filter(Filter),
    Empty,
}

impl FilterOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, FilterOutcome::Empty)
    }

    pub fn filter(&self) -> Option<&Filter> {
        match self {
            FilterOutcome::Filter(filter) => Some(filter),
            FilterOutcome::Empty => None,
        }
    }

    pub fn into_filter(self) -> Option<Filter> {
        match self {
            FilterOutcome::Filter(filter) => Some(filter),
            FilterOutcome::Empty => None,
        }
    }
}

impl From<Option<Filter>> for FilterOutcome {
    fn from(filter: Option<Filter>) -> Self {
        filter.map_or(FilterOutcome::Empty, FilterOutcome::Filter)
    }
}

// Empty serializes as `null` so consumers never mistake it for a filter.
impl Serialize for FilterOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterOutcome::Filter(filter) => filter.serialize(serializer),
            FilterOutcome::Empty => serializer.serialize_none(),
        }
    }
}
