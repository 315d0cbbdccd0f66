use crate::types::UnitSystem;

pub const FEET_PER_METER: f64 = 3.28084;
pub const FEET_PER_MILE: f64 = 5280.0;

/// Format a distance given in meters for display.
///
/// Thresholds are strict: a value exactly on a boundary uses the larger unit.
pub fn format_distance(meters: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Metric => format_meters(meters),
        UnitSystem::Imperial => format_feet(meters * FEET_PER_METER),
    }
}

/// `m` below 1 km, one decimal of `km` below 10 km, whole `km` above.
pub fn format_meters(meters: f64) -> String {
    if meters < 1000.0 {
        return format!("{} m", meters.round());
    }
    let km = meters / 1000.0;
    if km < 10.0 {
        format!("{:.1} km", km)
    } else {
        format!("{} km", km.round())
    }
}

/// `ft` below one mile, one decimal of `mi` below 10 mi, whole `mi` above.
pub fn format_feet(feet: f64) -> String {
    if feet < FEET_PER_MILE {
        return format!("{} ft", feet.round());
    }
    let miles = feet / FEET_PER_MILE;
    if miles < 10.0 {
        format!("{:.1} mi", miles)
    } else {
        format!("{} mi", miles.round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_boundaries() {
        assert_eq!(format_meters(999.0), "999 m");
        assert_eq!(format_meters(1000.0), "1.0 km");
        assert_eq!(format_meters(9999.0), "10.0 km");
        assert_eq!(format_meters(10000.0), "10 km");
    }

    #[test]
    fn metric_rounds_half_up() {
        assert_eq!(format_meters(0.0), "0 m");
        assert_eq!(format_meters(12.5), "13 m");
        assert_eq!(format_meters(15_499.0), "15 km");
        assert_eq!(format_meters(15_500.0), "16 km");
    }

    #[test]
    fn imperial_boundaries() {
        assert_eq!(format_feet(5279.0), "5279 ft");
        assert_eq!(format_feet(5280.0), "1.0 mi");
        assert_eq!(format_feet(9.5 * FEET_PER_MILE), "9.5 mi");
        assert_eq!(format_feet(10.0 * FEET_PER_MILE), "10 mi");
    }

    #[test]
    fn imperial_from_meters() {
        // 1609 m is just under a mile.
        assert_eq!(format_distance(1609.0, UnitSystem::Imperial), "5279 ft");
        assert_eq!(format_distance(1609.35, UnitSystem::Imperial), "1.0 mi");
        assert_eq!(format_distance(100.0, UnitSystem::Imperial), "328 ft");
    }

    #[test]
    fn thresholds_compare_unrounded_values() {
        // Under a mile, but rounds to a full mile of feet.
        assert_eq!(format_distance(1609.34, UnitSystem::Imperial), "5280 ft");
        assert_eq!(format_feet(9.94 * FEET_PER_MILE), "9.9 mi");
        assert_eq!(format_feet(52_536.0), "9.9 mi");
        assert_eq!(format_feet(9.96 * FEET_PER_MILE), "10.0 mi");
        assert_eq!(format_meters(999.6), "1000 m");
    }

    #[test]
    fn metric_dispatch() {
        assert_eq!(format_distance(2500.0, UnitSystem::Metric), "2.5 km");
    }
}
