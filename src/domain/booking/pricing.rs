//! Charging cost estimate

use super::form::{SessionDuration, VehicleType};

/// Assumed charging draw per vehicle class, in kW
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    pub default_draw_kw: f64,
    pub tesla_draw_kw: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            default_draw_kw: 7.0,
            tesla_draw_kw: 9.0,
        }
    }
}

impl PricingPolicy {
    pub fn draw_for(&self, vehicle: &VehicleType) -> f64 {
        if vehicle.is_tesla() {
            self.tesla_draw_kw
        } else {
            self.default_draw_kw
        }
    }

    /// `price_per_kwh * hours * draw`, rounded to cents
    pub fn estimate(
        &self,
        price_per_kwh: f64,
        duration: SessionDuration,
        vehicle: &VehicleType,
    ) -> f64 {
        round_cents(price_per_kwh * duration.hours() * self.draw_for(vehicle))
    }
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
