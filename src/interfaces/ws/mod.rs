//! WebSocket interfaces
//!
//! - `notifications`: live booking, review and catalog events for clients

pub mod notifications;

pub use notifications::{create_notification_state, ws_notifications_handler, NotificationState};
