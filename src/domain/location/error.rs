use thiserror::Error;

/// Why a position could not be obtained.
///
/// Codes 1-3 follow the browser geolocation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Please allow location access to find nearby stations")]
    PermissionDenied,
    #[error("Location information is unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Geolocation is not supported")]
    Unsupported,
}

impl GeolocationError {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Unsupported,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::PermissionDenied => 1,
            Self::PositionUnavailable => 2,
            Self::Timeout => 3,
            Self::Unsupported => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_messages() {
        assert_eq!(
            GeolocationError::from_code(1).to_string(),
            "Please allow location access to find nearby stations"
        );
        assert_eq!(GeolocationError::from_code(2), GeolocationError::PositionUnavailable);
        assert_eq!(GeolocationError::from_code(3).to_string(), "Location request timed out");
        assert_eq!(GeolocationError::from_code(42), GeolocationError::Unsupported);
        assert_eq!(GeolocationError::Timeout.code(), 3);
    }
}
