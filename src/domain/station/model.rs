//! Station and connector domain entities

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::geo::Coordinates;
use crate::shared::errors::DomainError;

/// Charging standard of a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorType {
    DcFast,
    Type2,
    Ccs,
    Chademo,
    Ac,
}

impl ConnectorType {
    pub const ALL: [ConnectorType; 5] = [
        Self::DcFast,
        Self::Type2,
        Self::Ccs,
        Self::Chademo,
        Self::Ac,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DcFast => "DC Fast",
            Self::Type2 => "Type 2",
            Self::Ccs => "CCS",
            Self::Chademo => "CHAdeMO",
            Self::Ac => "AC",
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConnectorType {
    type Err = DomainError;

    /// Accepts the canonical labels case-insensitively, ignoring spaces,
    /// dashes and underscores ("dc_fast", "type-2", "chademo").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "dcfast" => Ok(Self::DcFast),
            "type2" => Ok(Self::Type2),
            "ccs" => Ok(Self::Ccs),
            "chademo" => Ok(Self::Chademo),
            "ac" => Ok(Self::Ac),
            _ => Err(DomainError::Validation(format!(
                "unknown connector type: {}",
                s
            ))),
        }
    }
}

/// A physical charging location
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Price in currency units per kWh
    pub price_per_kwh: f64,
    pub available: bool,
    /// Mean review rating (0.0 - 5.0)
    pub rating: f64,
    pub total_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Station {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        latitude: f64,
        longitude: f64,
        price_per_kwh: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            latitude,
            longitude,
            price_per_kwh,
            available: true,
            rating: 0.0,
            total_reviews: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A charging port belonging to exactly one station
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub id: String,
    pub station_id: String,
    pub connector_type: ConnectorType,
    /// Power output in kW
    pub power_output: f64,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl Connector {
    pub fn new(
        id: impl Into<String>,
        station_id: impl Into<String>,
        connector_type: ConnectorType,
        power_output: f64,
    ) -> Self {
        Self {
            id: id.into(),
            station_id: station_id.into(),
            connector_type,
            power_output,
            available: true,
            created_at: Utc::now(),
        }
    }

    /// A connector can be booked as `wanted` only when it is free and of that type.
    pub fn is_bookable_as(&self, wanted: ConnectorType) -> bool {
        self.available && self.connector_type == wanted
    }
}

/// Station joined with its connectors (the read model used by every listing)
#[derive(Debug, Clone, PartialEq)]
pub struct StationWithConnectors {
    pub station: Station,
    pub connectors: Vec<Connector>,
}

impl StationWithConnectors {
    pub fn has_connector_type(&self, connector_type: ConnectorType) -> bool {
        self.connectors
            .iter()
            .any(|c| c.connector_type == connector_type)
    }

    pub fn bookable_connectors(
        &self,
        connector_type: ConnectorType,
    ) -> impl Iterator<Item = &Connector> {
        self.connectors
            .iter()
            .filter(move |c| c.is_bookable_as(connector_type))
    }

    pub fn has_available_connector(&self) -> bool {
        self.connectors.iter().any(|c| c.available)
    }

    /// Group `connectors` under their stations, keeping the stations' order.
    pub fn join(stations: Vec<Station>, connectors: Vec<Connector>) -> Vec<Self> {
        let mut by_station: HashMap<String, Vec<Connector>> = HashMap::new();
        for connector in connectors {
            by_station
                .entry(connector.station_id.clone())
                .or_default()
                .push(connector);
        }

        stations
            .into_iter()
            .map(|station| {
                let connectors = by_station.remove(&station.id).unwrap_or_default();
                Self {
                    station,
                    connectors,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_type_labels_roundtrip() {
        for t in ConnectorType::ALL {
            assert_eq!(t.as_str().parse::<ConnectorType>().unwrap(), t);
        }
    }

    #[test]
    fn connector_type_parse_is_lenient() {
        assert_eq!("dc_fast".parse::<ConnectorType>().unwrap(), ConnectorType::DcFast);
        assert_eq!("type-2".parse::<ConnectorType>().unwrap(), ConnectorType::Type2);
        assert_eq!("chademo".parse::<ConnectorType>().unwrap(), ConnectorType::Chademo);
        assert!("Tesla".parse::<ConnectorType>().is_err());
    }

    #[test]
    fn bookable_requires_type_and_availability() {
        let mut c = Connector::new("c1", "s1", ConnectorType::Ccs, 50.0);
        assert!(c.is_bookable_as(ConnectorType::Ccs));
        assert!(!c.is_bookable_as(ConnectorType::Ac));
        c.available = false;
        assert!(!c.is_bookable_as(ConnectorType::Ccs));
    }

    #[test]
    fn join_groups_connectors_and_keeps_order() {
        let stations = vec![
            Station::new("b", "Alpha", "1 Road", 0.0, 0.0, 0.3),
            Station::new("a", "Beta", "2 Road", 0.0, 0.0, 0.3),
        ];
        let connectors = vec![
            Connector::new("a1", "a", ConnectorType::Ac, 7.0),
            Connector::new("b1", "b", ConnectorType::Ccs, 50.0),
            Connector::new("a2", "a", ConnectorType::Type2, 22.0),
            Connector::new("x1", "missing", ConnectorType::Ac, 7.0),
        ];

        let joined = StationWithConnectors::join(stations, connectors);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].station.id, "b");
        assert_eq!(joined[0].connectors.len(), 1);
        assert_eq!(joined[1].station.id, "a");
        let ids: Vec<&str> = joined[1].connectors.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }
}
