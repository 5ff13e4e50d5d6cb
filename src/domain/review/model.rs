use chrono::{DateTime, Utc};

use crate::shared::errors::DomainError;

/// Star rating, 1 to 5 inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: i32) -> Result<Self, DomainError> {
        match u8::try_from(value) {
            Ok(v) if (1..=5).contains(&v) => Ok(Self(v)),
            _ => Err(DomainError::Validation(format!(
                "rating must be between 1 and 5 (got {})",
                value
            ))),
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub station_id: String,
    pub booking_id: Option<String>,
    pub rating: Rating,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Mean rating rounded to one decimal, and the review count.
/// No reviews gives `(0.0, 0)`.
pub fn aggregate_rating<'a>(ratings: impl IntoIterator<Item = &'a Rating>) -> (f64, i32) {
    let (sum, count) = ratings
        .into_iter()
        .fold((0u32, 0i32), |(s, c), r| (s + r.value() as u32, c + 1));
    if count == 0 {
        return (0.0, 0);
    }
    let mean = sum as f64 / count as f64;
    ((mean * 10.0).round() / 10.0, count)
}
