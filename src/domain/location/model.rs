use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GeolocationError;
use crate::domain::geo::Coordinates;

/// What a client reports: a fix or the error it got instead
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionReport {
    Fix(Coordinates),
    Failed(GeolocationError),
}

/// Last reported position of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastKnownLocation {
    pub user_id: String,
    pub coordinates: Coordinates,
    pub recorded_at: DateTime<Utc>,
}
