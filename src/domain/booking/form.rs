//! Multi-step booking form
//!
//! Holds the user's selections (date, time slot, duration, vehicle,
//! connector type) and turns a complete form into concrete 24-hour times.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::domain::station::ConnectorType;
use crate::shared::errors::DomainError;

/// Slots offered by the booking form
pub const OFFERED_TIME_SLOTS: [&str; 6] = [
    "09:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "01:00 PM", "02:00 PM",
];

/// A user-facing 12-hour slot such as `"01:00 PM"`, stored as a 24-hour time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    pub fn start(&self) -> NaiveTime {
        self.0
    }

    /// Start time plus `duration`, carrying minute overflow into the hour.
    ///
    /// Sessions may not run past midnight.
    pub fn end_after(&self, duration: SessionDuration) -> Result<NaiveTime, DomainError> {
        let total_minutes = self.0.minute() + duration.minutes();
        let hour = self.0.hour() + total_minutes / 60;
        let minute = total_minutes % 60;
        if hour > 23 {
            return Err(DomainError::Validation(format!(
                "session starting at {} for {} minutes runs past midnight",
                self, duration
            )));
        }
        NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| DomainError::Validation(format!("invalid end time {}:{}", hour, minute)))
    }
}

impl FromStr for TimeSlot {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::Validation(format!("invalid time slot: {:?}", s));

        let (clock, meridiem) = s.trim().split_once(' ').ok_or_else(invalid)?;
        let (h, m) = clock.split_once(':').ok_or_else(invalid)?;
        let hour: u32 = h.parse().map_err(|_| invalid())?;
        let minute: u32 = m.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&hour) || minute > 59 {
            return Err(invalid());
        }

        let hour24 = match meridiem.trim().to_ascii_uppercase().as_str() {
            "AM" => hour % 12,
            "PM" => hour % 12 + 12,
            _ => return Err(invalid()),
        };

        NaiveTime::from_hms_opt(hour24, minute, 0)
            .map(TimeSlot)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%I:%M %p"))
    }
}

/// Allowed session lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionDuration {
    #[default]
    Min30,
    Min60,
    Min90,
    Min120,
}

impl SessionDuration {
    pub const ALL: [SessionDuration; 4] = [Self::Min30, Self::Min60, Self::Min90, Self::Min120];

    pub fn from_minutes(minutes: u32) -> Result<Self, DomainError> {
        match minutes {
            30 => Ok(Self::Min30),
            60 => Ok(Self::Min60),
            90 => Ok(Self::Min90),
            120 => Ok(Self::Min120),
            other => Err(DomainError::Validation(format!(
                "duration must be one of 30, 60, 90, 120 minutes (got {})",
                other
            ))),
        }
    }

    pub fn minutes(&self) -> u32 {
        match self {
            Self::Min30 => 30,
            Self::Min60 => 60,
            Self::Min90 => 90,
            Self::Min120 => 120,
        }
    }

    pub fn hours(&self) -> f64 {
        self.minutes() as f64 / 60.0
    }
}

impl fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.minutes())
    }
}

/// Vehicle make/model as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleType(String);

impl VehicleType {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(DomainError::Validation("vehicle type is empty".into()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_tesla(&self) -> bool {
        self.0.to_lowercase().contains("tesla")
    }
}

/// The booking form as filled in so far
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub station_id: String,
    pub date: Option<NaiveDate>,
    pub time_slot: Option<TimeSlot>,
    pub duration: SessionDuration,
    pub vehicle_type: Option<VehicleType>,
    pub connector_type: Option<ConnectorType>,
    pub special_requests: Option<String>,
}

/// A form with every required selection made
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteForm {
    pub station_id: String,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub duration: SessionDuration,
    pub vehicle_type: VehicleType,
    pub connector_type: ConnectorType,
    pub special_requests: Option<String>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl BookingForm {
    pub fn for_station(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            ..Default::default()
        }
    }

    /// Names of the required selections still missing
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.date.is_none() {
            missing.push("date");
        }
        if self.time_slot.is_none() {
            missing.push("time_slot");
        }
        if self.vehicle_type.is_none() {
            missing.push("vehicle_type");
        }
        if self.connector_type.is_none() {
            missing.push("connector_type");
        }
        missing
    }

    /// Check the form and derive start/end times. `today` bounds the date.
    pub fn complete(&self, today: NaiveDate) -> Result<CompleteForm, DomainError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(DomainError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let (Some(date), Some(time_slot), Some(vehicle_type), Some(connector_type)) = (
            self.date,
            self.time_slot,
            self.vehicle_type.clone(),
            self.connector_type,
        ) else {
            return Err(DomainError::Validation("incomplete booking form".into()));
        };

        if date < today {
            return Err(DomainError::Validation(format!(
                "booking date {} is in the past",
                date
            )));
        }

        let end_time = time_slot.end_after(self.duration)?;

        Ok(CompleteForm {
            station_id: self.station_id.clone(),
            date,
            time_slot,
            duration: self.duration,
            vehicle_type,
            connector_type,
            special_requests: self
                .special_requests
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            start_time: time_slot.start(),
            end_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(t: NaiveTime) -> (u32, u32) {
        (t.hour(), t.minute())
    }

    #[test]
    fn twelve_hour_slots_convert_to_24_hour() {
        let cases = [
            ("09:00 AM", (9, 0)),
            ("12:00 PM", (12, 0)),
            ("12:30 AM", (0, 30)),
            ("01:00 PM", (13, 0)),
            ("02:45 pm", (14, 45)),
        ];
        for (input, expected) in cases {
            let slot: TimeSlot = input.parse().unwrap();
            assert_eq!(hm(slot.start()), expected, "{}", input);
        }
    }

    #[test]
    fn malformed_slots_are_rejected() {
        for input in ["", "9", "13:00 PM", "00:10 AM", "09:60 AM", "09:00", "09:00 XM"] {
            assert!(input.parse::<TimeSlot>().is_err(), "{:?}", input);
        }
    }

    #[test]
    fn offered_slots_all_parse_and_display_back() {
        for s in OFFERED_TIME_SLOTS {
            let slot: TimeSlot = s.parse().unwrap();
            assert_eq!(slot.to_string(), s);
        }
    }

    #[test]
    fn end_time_carries_minutes_into_hours() {
        let slot: TimeSlot = "10:45 AM".parse().unwrap();
        assert_eq!(hm(slot.end_after(SessionDuration::Min30).unwrap()), (11, 15));
        assert_eq!(hm(slot.end_after(SessionDuration::Min90).unwrap()), (12, 15));
        assert_eq!(hm(slot.end_after(SessionDuration::Min120).unwrap()), (12, 45));
    }

    #[test]
    fn session_may_not_cross_midnight() {
        let slot: TimeSlot = "10:30 PM".parse().unwrap();
        assert_eq!(hm(slot.end_after(SessionDuration::Min60).unwrap()), (23, 30));
        assert!(slot.end_after(SessionDuration::Min90).is_err());
    }

    #[test]
    fn only_fixed_durations() {
        assert_eq!(SessionDuration::from_minutes(90).unwrap().hours(), 1.5);
        assert!(SessionDuration::from_minutes(45).is_err());
        assert_eq!(SessionDuration::default().minutes(), 30);
    }

    #[test]
    fn tesla_is_detected_case_insensitively() {
        assert!(VehicleType::new("Tesla Model 3").unwrap().is_tesla());
        assert!(VehicleType::new("TESLA").unwrap().is_tesla());
        assert!(!VehicleType::new("Nissan Leaf").unwrap().is_tesla());
        assert!(VehicleType::new("   ").is_err());
    }

    #[test]
    fn missing_fields_are_listed() {
        let mut form = BookingForm::for_station("s1");
        assert_eq!(
            form.missing_fields(),
            vec!["date", "time_slot", "vehicle_type", "connector_type"]
        );
        form.connector_type = Some(ConnectorType::Ccs);
        form.vehicle_type = Some(VehicleType::new("Kia").unwrap());
        assert_eq!(form.missing_fields(), vec!["date", "time_slot"]);

        let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let err = form.complete(today).unwrap_err();
        assert!(err.to_string().contains("date, time_slot"));
    }

    #[test]
    fn complete_form_derives_times() {
        let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let form = BookingForm {
            station_id: "s1".into(),
            date: Some(today),
            time_slot: Some("01:00 PM".parse().unwrap()),
            duration: SessionDuration::Min90,
            vehicle_type: Some(VehicleType::new("Tesla").unwrap()),
            connector_type: Some(ConnectorType::Type2),
            special_requests: Some("   ".into()),
        };
        let complete = form.complete(today).unwrap();
        assert_eq!(hm(complete.start_time), (13, 0));
        assert_eq!(hm(complete.end_time), (14, 30));
        assert_eq!(complete.special_requests, None);
    }

    #[test]
    fn past_dates_are_rejected() {
        let today = NaiveDate::from_ymd_opt(2030, 1, 2).unwrap();
        let form = BookingForm {
            station_id: "s1".into(),
            date: NaiveDate::from_ymd_opt(2030, 1, 1),
            time_slot: Some("09:00 AM".parse().unwrap()),
            duration: SessionDuration::Min30,
            vehicle_type: Some(VehicleType::new("Kia").unwrap()),
            connector_type: Some(ConnectorType::Ac),
            special_requests: None,
        };
        assert!(form.complete(today).is_err());
    }
}
