//! Delivery layer: REST API and the notification stream

pub mod http;
pub mod ws;
