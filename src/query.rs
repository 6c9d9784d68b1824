//! Translates the filter selection into backend query parameters.

use crate::filter::{DateRange, FilterState};
use std::fmt::{Display, Formatter};

/// Ordered query parameters for a backend request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: &'static str, value: impl Into<String>) {
        self.pairs.push((key, value.into()));
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[cfg(test)]
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// `key=value&...` with values percent-encoded. Empty when there are no parameters.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Appends the query string to `endpoint`, adding `?` only when needed.
    pub fn apply_to(&self, endpoint: &str) -> String {
        if self.is_empty() {
            endpoint.to_string()
        } else {
            format!("{}?{}", endpoint, self.to_query_string())
        }
    }
}

impl Display for QueryParams {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "?{}", self.to_query_string())
    }
}

/// Builds the canonical parameter set for the current filter.
///
/// Sample mode always adds `demo=true` first. A preset adds `days`; a complete
/// custom range adds `start_date` and `end_date` instead. An incomplete custom
/// range adds neither.
pub fn build_query(filter: &FilterState) -> QueryParams {
    let mut params = QueryParams::new();

    if filter.mode().is_sample() {
        params.append("demo", "true");
    }

    match filter.range() {
        DateRange::LastNDays(days) => params.append("days", days.to_string()),
        range @ DateRange::Custom { .. } => {
            if let Some((start, end)) = range.custom_bounds() {
                params.append("start_date", start.format("%Y-%m-%d").to_string());
                params.append("end_date", end.format("%Y-%m-%d").to_string());
            }
        }
    }

    params
}

/// Parameters of the public landing view: sample data over a fixed window.
pub fn public_query(days: u32) -> QueryParams {
    build_query(&FilterState::new(
        crate::filter::Mode::Sample,
        DateRange::LastNDays(days),
    ))
}
