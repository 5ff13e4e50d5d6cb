//! # EV Charge Platform
//!
//! Headless backend for finding EV charging stations and booking charging
//! slots.
//!
//! ## Architecture
//!
//! - **domain**: entities, value objects, booking rules and repository traits
//! - **application**: use-case services, the places port and the event bus
//! - **infrastructure**: SeaORM storage, the places client, JWT and bcrypt
//! - **interfaces**: REST API with Swagger docs and the notification WebSocket
//! - **server**: process lifecycle and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, resolve_config_path, AppConfig, ConfigError};

pub use infrastructure::{init_database, migrate, DatabaseConfig};

pub use interfaces::http::create_api_router;

pub use application::{create_event_bus, Event, EventBus, SharedEventBus};

pub use server::{init_tracing, ServerHandle, ServerOptions};

pub use shared::errors::{AppError, DomainError};
