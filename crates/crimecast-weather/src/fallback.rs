//! Static monthly weather averages
//!
//! Used whenever live weather is unavailable. Values are °F and inches.

use crimecast_core::WeatherObservation;

/// (avg temperature, precipitation) for January through December
pub const MONTHLY_FALLBACK: [(f64, f64); 12] = [
    (32.0, 0.8),
    (35.0, 0.7),
    (45.0, 1.0),
    (60.0, 1.2),
    (70.0, 1.3),
    (80.0, 1.4),
    (85.0, 1.5),
    (83.0, 1.4),
    (75.0, 1.3),
    (60.0, 1.0),
    (45.0, 0.9),
    (35.0, 0.8),
];

/// Used for a month outside 1-12
const OUT_OF_RANGE: (f64, f64) = (60.0, 1.0);

/// Fallback observation for a calendar month (1-12)
pub fn monthly_fallback(month: u32) -> WeatherObservation {
    let (tavg, prcp) = month
        .checked_sub(1)
        .and_then(|idx| MONTHLY_FALLBACK.get(idx as usize))
        .copied()
        .unwrap_or(OUT_OF_RANGE);
    WeatherObservation::new(tavg, prcp)
}
