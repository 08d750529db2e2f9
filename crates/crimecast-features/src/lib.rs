//! Feature computation for crimecast
//!
//! Turns a (ZIP, date, time) query into the 14 named features the
//! estimators were trained on, and serializes them in training order.

pub mod computer;
pub mod vector;

pub use computer::*;
pub use vector::*;
