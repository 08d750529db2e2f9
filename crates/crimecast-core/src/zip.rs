//! ZIP code normalization
//!
//! Upstream callers hand us ZIP codes as strings, integers, or floats that
//! went through a spreadsheet (`60601.0`, `2134` for `02134`). Every lookup
//! table in the system is keyed by the canonical 5-character form.

use serde::{Deserialize, Serialize};

/// Width of a canonical ZIP code
pub const ZIP_WIDTH: usize = 5;

/// A ZIP code in whatever representation it arrived in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZipInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ZipInput {
    /// Canonical 5-character, zero-padded form. Never fails.
    pub fn normalize(&self) -> String {
        match self {
            ZipInput::Integer(v) => pad(&v.to_string()),
            ZipInput::Float(v) if v.is_finite() && v.fract() == 0.0 => {
                pad(&format!("{:.0}", v))
            }
            ZipInput::Float(v) => normalize_text(&v.to_string()),
            ZipInput::Text(s) => normalize_text(s),
        }
    }
}

impl From<&str> for ZipInput {
    fn from(s: &str) -> Self {
        ZipInput::Text(s.to_string())
    }
}

impl From<String> for ZipInput {
    fn from(s: String) -> Self {
        ZipInput::Text(s)
    }
}

impl From<&String> for ZipInput {
    fn from(s: &String) -> Self {
        ZipInput::Text(s.clone())
    }
}

impl From<i64> for ZipInput {
    fn from(v: i64) -> Self {
        ZipInput::Integer(v)
    }
}

impl From<i32> for ZipInput {
    fn from(v: i32) -> Self {
        ZipInput::Integer(i64::from(v))
    }
}

impl From<u32> for ZipInput {
    fn from(v: u32) -> Self {
        ZipInput::Integer(i64::from(v))
    }
}

impl From<f64> for ZipInput {
    fn from(v: f64) -> Self {
        ZipInput::Float(v)
    }
}

/// Normalize any ZIP representation to its canonical 5-character key
pub fn normalize_zip(input: impl Into<ZipInput>) -> String {
    input.into().normalize()
}

fn normalize_text(raw: &str) -> String {
    let mut z = raw.trim();
    // "60601.0" -> "60601"
    if let Some(idx) = z.find('.') {
        z = &z[..idx];
    }
    // ZIP+4: "60601-1234" -> "60601"
    if let Some(idx) = z.find('-') {
        if idx > 0 {
            z = &z[..idx];
        }
    }
    pad(z)
}

fn pad(z: &str) -> String {
    let len = z.chars().count();
    if len >= ZIP_WIDTH {
        return z.chars().take(ZIP_WIDTH).collect();
    }
    let mut out = "0".repeat(ZIP_WIDTH - len);
    out.push_str(z);
    out
}
