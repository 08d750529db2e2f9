//! Unit conversion utilities
//!
//! Observations are carried in US units (°F, inches) because the estimators
//! were trained on them. Live providers that report metric values are
//! converted on the way in.

/// Convert °C to °F
pub fn celsius_to_fahrenheit(value: f64) -> f64 {
    value * 9.0 / 5.0 + 32.0
}

/// Convert millimetres to inches
pub fn millimeters_to_inches(value: f64) -> f64 {
    value / 25.4
}
