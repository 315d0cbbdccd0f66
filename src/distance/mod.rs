//! Great-circle distance from the device to a point, formatted per locale.

mod calculator;
mod format;
mod haversine;

pub use calculator::{
    DistanceCalculator, FixedPosition, Geolocator, PendingDistance, SessionStore, Translator,
    LOCATION_ERROR_KEY,
};
pub use format::{format_distance, format_feet, format_meters, FEET_PER_METER, FEET_PER_MILE};
pub use haversine::{haversine_meters, EARTH_RADIUS_M};
