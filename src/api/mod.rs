//! API Module
//!
//! Read-mostly HTTP surface over the content cache, used to inspect and
//! warm it.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
