pub mod api_client;
pub mod config;
pub mod distance;
mod error;
mod matcher;
mod os_detector;
pub mod redirect;
pub mod reporter;
mod rules;
pub mod server;
mod types;

pub use error::{Error, GeolocationError, Result};
pub use os_detector::{detect, OsDetector};
pub use types::*;
