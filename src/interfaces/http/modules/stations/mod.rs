//! Station catalog, filters and the nearby-search proxy

pub mod dto;
pub mod handlers;
pub mod nearby;

pub use dto::*;
pub use handlers::*;
pub use nearby::*;
