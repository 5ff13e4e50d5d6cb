use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::ListedStation;
use crate::domain::station::{Connector, StationWithConnectors};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConnectorDto {
    pub id: String,
    pub station_id: String,
    /// Display label, e.g. `Type 2`, `CCS`
    pub connector_type: String,
    /// kW
    pub power_output: f64,
    pub available: bool,
    pub created_at: String,
}

impl From<Connector> for ConnectorDto {
    fn from(c: Connector) -> Self {
        Self {
            id: c.id,
            station_id: c.station_id,
            connector_type: c.connector_type.as_str().to_string(),
            power_output: c.power_output,
            available: c.available,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationDto {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_kwh: f64,
    pub available: bool,
    pub rating: f64,
    pub total_reviews: i32,
    pub connectors: Vec<ConnectorDto>,
    /// Present when the listing was asked for distances
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl StationDto {
    pub fn with_distance(station: StationWithConnectors, distance_km: Option<f64>) -> Self {
        let StationWithConnectors {
            station,
            connectors,
        } = station;
        Self {
            id: station.id,
            name: station.name,
            address: station.address,
            latitude: station.latitude,
            longitude: station.longitude,
            price_per_kwh: station.price_per_kwh,
            available: station.available,
            rating: station.rating,
            total_reviews: station.total_reviews,
            connectors: connectors.into_iter().map(ConnectorDto::from).collect(),
            distance_km: distance_km.map(|d| (d * 100.0).round() / 100.0),
        }
    }
}

impl From<StationWithConnectors> for StationDto {
    fn from(s: StationWithConnectors) -> Self {
        Self::with_distance(s, None)
    }
}

impl From<ListedStation> for StationDto {
    fn from(l: ListedStation) -> Self {
        Self::with_distance(l.station, l.distance_km)
    }
}

/// All parameters are optional and combine with AND
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListStationsQuery {
    /// `Type 2`, `CCS`, `CHAdeMO`, `DC Fast` or `AC` (case and separators ignored)
    pub connector_type: Option<String>,
    /// Power band: `ac`, `fast`, `rapid` or `ultra`
    pub power: Option<String>,
    /// Only stations with a free connector
    pub available: Option<bool>,
    /// Only stations that charge nothing
    pub free_only: Option<bool>,
    /// Substring of name or address
    pub q: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Requires `lat` and `lng`
    pub radius_km: Option<f64>,
}
