//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Version refresh: re-reads the latest published version at a fixed interval

mod version_refresh;

pub use version_refresh::spawn_version_refresh_task;
