use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::NewReview;
use crate::domain::review::Review;

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewDto {
    pub id: String,
    pub user_id: String,
    pub station_id: String,
    pub booking_id: Option<String>,
    /// 1 to 5
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<Review> for ReviewDto {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            station_id: r.station_id,
            booking_id: r.booking_id,
            rating: r.rating.value(),
            comment: r.comment,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    #[validate(length(min = 1, message = "station_id is required"))]
    pub station_id: String,
    /// Ties the review to one of the caller's bookings at this station
    pub booking_id: Option<String>,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 2000, message = "comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

impl From<CreateReviewRequest> for NewReview {
    fn from(r: CreateReviewRequest) -> Self {
        Self {
            station_id: r.station_id,
            booking_id: r.booking_id.filter(|b| !b.trim().is_empty()),
            rating: r.rating,
            comment: r.comment,
        }
    }
}
