//! Station aggregate
//!
//! Stations, their connectors, list filtering and the repository interface.

pub mod filter;
pub mod model;
pub mod repository;

pub use filter::{PowerBand, StationFilter};
pub use model::{Connector, ConnectorType, Station, StationWithConnectors};
pub use repository::StationRepository;
