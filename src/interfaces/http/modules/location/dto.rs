use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::geo::Coordinates;
use crate::domain::location::{GeolocationError, LastKnownLocation, PositionReport};
use crate::shared::errors::DomainError;

/// Either a fix (`latitude` + `longitude`) or the browser's error code
/// (1 permission denied, 2 position unavailable, 3 timeout)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct LocationReportRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub error_code: Option<u16>,
}

impl LocationReportRequest {
    pub fn to_report(&self) -> Result<PositionReport, DomainError> {
        if let Some(code) = self.error_code {
            return Ok(PositionReport::Failed(GeolocationError::from_code(code)));
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Ok(PositionReport::Fix(Coordinates::new(lat, lng)?)),
            _ => Err(DomainError::Validation(
                "latitude and longitude, or error_code, are required".into(),
            )),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationDto {
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_at: String,
}

impl From<LastKnownLocation> for LocationDto {
    fn from(l: LastKnownLocation) -> Self {
        Self {
            latitude: l.coordinates.latitude,
            longitude: l.coordinates.longitude,
            recorded_at: l.recorded_at.to_rfc3339(),
        }
    }
}
