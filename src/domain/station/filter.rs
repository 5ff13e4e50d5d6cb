//! Station list filtering
//!
//! Each predicate is independent; a station is kept only when every
//! configured predicate accepts it.

use std::fmt;
use std::str::FromStr;

use super::model::{ConnectorType, StationWithConnectors};
use crate::shared::errors::DomainError;

/// Power output bucket of a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerBand {
    /// Below 22 kW
    Ac,
    /// 22 kW up to 50 kW
    Fast,
    /// 50 kW up to 150 kW
    Rapid,
    /// 150 kW and above
    Ultra,
}

impl PowerBand {
    pub fn contains(&self, kw: f64) -> bool {
        match self {
            Self::Ac => kw < 22.0,
            Self::Fast => (22.0..50.0).contains(&kw),
            Self::Rapid => (50.0..150.0).contains(&kw),
            Self::Ultra => kw >= 150.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ac => "ac",
            Self::Fast => "fast",
            Self::Rapid => "rapid",
            Self::Ultra => "ultra",
        }
    }
}

impl fmt::Display for PowerBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerBand {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ac" => Ok(Self::Ac),
            "fast" => Ok(Self::Fast),
            "rapid" => Ok(Self::Rapid),
            "ultra" => Ok(Self::Ultra),
            _ => Err(DomainError::Validation(format!("unknown power band: {}", s))),
        }
    }
}

/// Client-side style filter over the in-memory station list
#[derive(Debug, Clone, Default)]
pub struct StationFilter {
    pub connector_type: Option<ConnectorType>,
    pub power_band: Option<PowerBand>,
    /// Keep only stations flagged available with at least one free connector
    pub available_only: bool,
    /// Keep only stations charging nothing per kWh
    pub free_only: bool,
    /// Case-insensitive substring of name or address
    pub query: Option<String>,
}

impl StationFilter {
    pub fn is_empty(&self) -> bool {
        self.connector_type.is_none()
            && self.power_band.is_none()
            && !self.available_only
            && !self.free_only
            && self.query.as_deref().map_or(true, |q| q.trim().is_empty())
    }

    pub fn matches(&self, s: &StationWithConnectors) -> bool {
        if let Some(t) = self.connector_type {
            if !s.has_connector_type(t) {
                return false;
            }
        }

        if let Some(band) = self.power_band {
            if !s.connectors.iter().any(|c| band.contains(c.power_output)) {
                return false;
            }
        }

        if self.available_only && !(s.station.available && s.has_available_connector()) {
            return false;
        }

        if self.free_only && s.station.price_per_kwh > 0.0 {
            return false;
        }

        if let Some(q) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            if !s.station.name.to_lowercase().contains(&q)
                && !s.station.address.to_lowercase().contains(&q)
            {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, stations: Vec<StationWithConnectors>) -> Vec<StationWithConnectors> {
        if self.is_empty() {
            return stations;
        }
        stations.into_iter().filter(|s| self.matches(s)).collect()
    }
}
