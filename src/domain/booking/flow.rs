//! Booking submission state machine
//!
//! `Selecting -> Submitting -> Confirmed`. A failed submission drops back
//! to `Selecting` and its error is reported exactly once.

use chrono::NaiveDate;

use super::form::{BookingForm, CompleteForm};
use crate::domain::station::StationWithConnectors;
use crate::shared::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BookingPhase {
    #[default]
    Selecting,
    Submitting,
    Confirmed { booking_id: String },
}

#[derive(Debug, Default)]
pub struct BookingFlow {
    phase: BookingPhase,
    last_error: Option<String>,
}

impl BookingFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &BookingPhase {
        &self.phase
    }

    /// Guard for `Selecting -> Submitting`.
    ///
    /// The form must be complete and the station must have an available
    /// connector of the requested type. The phase is unchanged on error.
    pub fn begin_submit(
        &mut self,
        form: &BookingForm,
        station: &StationWithConnectors,
        today: NaiveDate,
    ) -> Result<CompleteForm, DomainError> {
        if self.phase != BookingPhase::Selecting {
            return Err(DomainError::Conflict(
                "a submission is already in progress or completed".into(),
            ));
        }
        if form.station_id != station.station.id {
            return Err(DomainError::Validation(format!(
                "form is for station {} but station {} was given",
                form.station_id, station.station.id
            )));
        }

        let complete = form.complete(today)?;

        if station
            .bookable_connectors(complete.connector_type)
            .next()
            .is_none()
        {
            return Err(DomainError::Validation(format!(
                "no available {} connector at this station",
                complete.connector_type
            )));
        }

        self.phase = BookingPhase::Submitting;
        Ok(complete)
    }

    pub fn confirm(&mut self, booking_id: impl Into<String>) {
        self.phase = BookingPhase::Confirmed {
            booking_id: booking_id.into(),
        };
        self.last_error = None;
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.phase = BookingPhase::Selecting;
        self.last_error = Some(error.into());
    }

    /// The last submission error, cleared once read
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::{SessionDuration, VehicleType};
    use crate::domain::station::{Connector, ConnectorType, Station};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, 1).unwrap()
    }

    fn station(connector_available: bool) -> StationWithConnectors {
        let mut connector = Connector::new("c1", "s1", ConnectorType::Ccs, 50.0);
        connector.available = connector_available;
        StationWithConnectors {
            station: Station::new("s1", "Depot", "1 Main St", 0.0, 0.0, 0.45),
            connectors: vec![connector],
        }
    }

    fn full_form() -> BookingForm {
        BookingForm {
            station_id: "s1".into(),
            date: Some(today()),
            time_slot: Some("10:00 AM".parse().unwrap()),
            duration: SessionDuration::Min60,
            vehicle_type: Some(VehicleType::new("Polestar 2").unwrap()),
            connector_type: Some(ConnectorType::Ccs),
            special_requests: None,
        }
    }

    #[test]
    fn happy_path_reaches_confirmed() {
        let mut flow = BookingFlow::new();
        flow.begin_submit(&full_form(), &station(true), today()).unwrap();
        assert_eq!(flow.phase(), &BookingPhase::Submitting);

        flow.confirm("b1");
        assert_eq!(
            flow.phase(),
            &BookingPhase::Confirmed {
                booking_id: "b1".into()
            }
        );
    }

    #[test]
    fn missing_field_keeps_selecting() {
        let mut flow = BookingFlow::new();
        let mut form = full_form();
        form.vehicle_type = None;

        assert!(flow.begin_submit(&form, &station(true), today()).is_err());
        assert_eq!(flow.phase(), &BookingPhase::Selecting);
    }

    #[test]
    fn no_available_connector_is_rejected() {
        let mut flow = BookingFlow::new();
        let err = flow
            .begin_submit(&full_form(), &station(false), today())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut form = full_form();
        form.connector_type = Some(ConnectorType::Chademo);
        assert!(flow.begin_submit(&form, &station(true), today()).is_err());
        assert_eq!(flow.phase(), &BookingPhase::Selecting);
    }

    #[test]
    fn failure_returns_to_selecting_and_reports_once() {
        let mut flow = BookingFlow::new();
        flow.begin_submit(&full_form(), &station(true), today()).unwrap();
        flow.fail("network down");

        assert_eq!(flow.phase(), &BookingPhase::Selecting);
        assert_eq!(flow.take_error().as_deref(), Some("network down"));
        assert_eq!(flow.take_error(), None);

        assert!(flow.begin_submit(&full_form(), &station(true), today()).is_ok());
    }

    #[test]
    fn cannot_submit_twice() {
        let mut flow = BookingFlow::new();
        flow.begin_submit(&full_form(), &station(true), today()).unwrap();
        assert!(flow.begin_submit(&full_form(), &station(true), today()).is_err());
    }
}
