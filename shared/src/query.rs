//! List query types
//!
//! Filters for `GET /api/admin/recargas` and `GET /api/admin/export`, plus
//! the paginated response envelope.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::models::{Carrier, OrderStatus};

/// Error parsing an operator-supplied value
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown status: {0}")]
    UnknownStatus(String),
    #[error("unknown carrier: {0}")]
    UnknownCarrier(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("unknown period: {0}")]
    UnknownPeriod(String),
}

/// Submission period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    /// Since Monday of the current week
    Week,
    /// Since the first day of the current month
    Month,
    /// Explicit range; only sent when both ends are set
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl FromStr for Period {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "custom" => Ok(Self::Custom {
                start: None,
                end: None,
            }),
            other => Err(ParseError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Filter bag rebuilt from the operator's inputs on every query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub carrier: Option<Carrier>,
    pub period: Option<Period>,
}

impl OrderFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_carrier(mut self, carrier: Carrier) -> Self {
        self.carrier = Some(carrier);
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }

    /// Query-string pairs for this filter.
    ///
    /// Blank search text and half-filled custom ranges produce nothing.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if let Some(search) = self.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            params.push(("search", search.to_string()));
        }
        if let Some(status) = &self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(carrier) = &self.carrier {
            params.push(("operadora", carrier.as_str().to_string()));
        }
        match self.period {
            Some(Period::Today) => params.push(("period", "today".to_string())),
            Some(Period::Week) => params.push(("period", "week".to_string())),
            Some(Period::Month) => params.push(("period", "month".to_string())),
            Some(Period::Custom {
                start: Some(start),
                end: Some(end),
            }) => {
                params.push(("dateStart", start.format("%Y-%m-%d").to_string()));
                params.push(("dateEnd", end.format("%Y-%m-%d").to_string()));
            }
            Some(Period::Custom { .. }) | None => {}
        }

        params
    }
}

/// Paginated list envelope.
///
/// Older backends omit `total_pages` (and sometimes `page`/`limit`); the
/// client derives what is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct PaginatedResponse<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
}

/// `null` reads as an empty list
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
