use chrono::{DateTime, Utc};

/// Public details of a user; `id` equals the auth identity id
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile change. `None` leaves a field untouched, an empty string clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

impl Profile {
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.full_name {
            self.full_name = non_blank(name);
        }
        if let Some(phone) = update.phone {
            self.phone = non_blank(phone);
        }
        self.updated_at = Utc::now();
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
