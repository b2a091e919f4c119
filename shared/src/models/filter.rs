//! Report list filter models

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::datetime::parse_local_date;

/// Filter applied to a report list. Empty fields mean "no constraint".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    pub search_term: Option<String>,
    pub kebun: Option<String>,
    pub afdeling: Option<String>,
    pub blok: Option<String>,
    pub temporal: TemporalFilter,
}

/// Date constraint; range and month/year are mutually exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TemporalFilter {
    #[default]
    None,
    /// Inclusive on both ends, compared by calendar day
    Range { start: NaiveDate, end: NaiveDate },
    /// Month is 0-based (January = 0)
    MonthYear { month: Option<u32>, year: Option<i32> },
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn with_kebun(mut self, kebun: impl Into<String>) -> Self {
        self.kebun = Some(kebun.into());
        self
    }

    pub fn with_afdeling(mut self, afdeling: impl Into<String>) -> Self {
        self.afdeling = Some(afdeling.into());
        self
    }

    pub fn with_blok(mut self, blok: impl Into<String>) -> Self {
        self.blok = Some(blok.into());
        self
    }

    pub fn with_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.temporal = TemporalFilter::Range { start, end };
        self
    }

    pub fn with_month_year(mut self, month: Option<u32>, year: Option<i32>) -> Self {
        self.temporal = TemporalFilter::MonthYear { month, year };
        self
    }

    /// True when no constraint is active
    pub fn is_empty(&self) -> bool {
        active(&self.search_term).is_none()
            && active(&self.kebun).is_none()
            && active(&self.afdeling).is_none()
            && active(&self.blok).is_none()
            && !self.temporal.is_active()
    }
}

impl TemporalFilter {
    pub fn is_active(&self) -> bool {
        match self {
            TemporalFilter::None => false,
            TemporalFilter::Range { .. } => true,
            TemporalFilter::MonthYear { month, year } => month.is_some() || year.is_some(),
        }
    }
}

/// A constraint value, or `None` when empty
pub(crate) fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Flat filter form as sent by the list and map pages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    #[serde(default, alias = "searchTerm")]
    pub search: Option<String>,
    #[serde(default)]
    pub kebun: Option<String>,
    #[serde(default)]
    pub afdeling: Option<String>,
    #[serde(default)]
    pub blok: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub date_range: bool,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub month: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub year: Option<i32>,
}

impl From<FilterQuery> for FilterSpec {
    fn from(query: FilterQuery) -> Self {
        let temporal = if query.date_range {
            let start = query.start_date.as_deref().and_then(parse_boundary);
            let end = query.end_date.as_deref().and_then(parse_boundary);
            match (start, end) {
                (Some(start), Some(end)) => TemporalFilter::Range { start, end },
                _ => TemporalFilter::None,
            }
        } else if query.month.is_some() || query.year.is_some() {
            TemporalFilter::MonthYear {
                month: query.month,
                year: query.year,
            }
        } else {
            TemporalFilter::None
        };

        FilterSpec {
            search_term: query.search.filter(|s| !s.is_empty()),
            kebun: query.kebun.filter(|s| !s.is_empty()),
            afdeling: query.afdeling.filter(|s| !s.is_empty()),
            blok: query.blok.filter(|s| !s.is_empty()),
            temporal,
        }
    }
}

/// Range boundaries come from a date picker as `YYYY-MM-DD` or a full ISO
/// timestamp; only the calendar day is kept.
fn parse_boundary(text: &str) -> Option<NaiveDate> {
    parse_local_date(text).or_else(|| text.get(..10).and_then(parse_local_date))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

/// Accepts a number or a numeric string; empty strings read as absent
fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
{
    Ok(match Option::<NumberOrText<T>>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagOrText {
        Flag(bool),
        Text(String),
    }

    Ok(match Option::<FlagOrText>::deserialize(deserializer)? {
        Some(FlagOrText::Flag(b)) => b,
        Some(FlagOrText::Text(s)) => matches!(s.as_str(), "true" | "1" | "on"),
        None => false,
    })
}
