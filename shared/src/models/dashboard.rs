//! Dashboard aggregate model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Carrier, OrderStatus};

/// Period-over-period percentage changes
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Variations {
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub completed: f64,
    #[serde(default)]
    pub pending: f64,
    #[serde(default)]
    pub error: f64,
}

/// Response of `GET /api/admin/dashboard`, replaced wholesale on each fetch
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    #[serde(default)]
    pub total: u64,
    /// Keyed by status wire value
    #[serde(rename = "statusCounts", default)]
    pub status_counts: BTreeMap<String, u64>,
    /// Keyed by carrier name as stored by the backend
    #[serde(rename = "operatorCounts", default)]
    pub operator_counts: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variations: Option<Variations>,
}

impl DashboardSummary {
    pub fn status_count(&self, status: &OrderStatus) -> u64 {
        self.status_counts.get(status.as_str()).copied().unwrap_or(0)
    }

    /// Count for a carrier, tolerating any key casing
    pub fn carrier_count(&self, carrier: &Carrier) -> u64 {
        self.operator_counts
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(carrier.as_str()))
            .map(|(_, v)| *v)
            .sum()
    }

    pub fn completed(&self) -> u64 {
        self.status_count(&OrderStatus::Completed)
    }

    /// Orders still in flight: processing plus queued
    pub fn pending(&self) -> u64 {
        self.status_count(&OrderStatus::Processing) + self.status_count(&OrderStatus::Queued)
    }

    pub fn errors(&self) -> u64 {
        self.status_count(&OrderStatus::Error)
    }

    /// Status chart series, in [`OrderStatus::ALL`] order
    pub fn status_series(&self) -> [u64; 4] {
        OrderStatus::ALL.map(|s| self.status_count(&s))
    }

    /// Carrier chart series, in [`Carrier::KNOWN`] order
    pub fn carrier_series(&self) -> [u64; 3] {
        Carrier::KNOWN.map(|c| self.carrier_count(&c))
    }
}
