mod geo_point;
mod os_class;
mod ua_signal;
mod unit_system;

pub use geo_point::*;
pub use os_class::*;
pub use ua_signal::*;
pub use unit_system::*;
