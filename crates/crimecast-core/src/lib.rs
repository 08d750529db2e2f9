//! Core data types, calendar decomposition and ZIP handling for crimecast
//!
//! This crate holds the request-scoped data model shared by the feature
//! pipeline and the prediction layer. It performs no I/O.

pub mod calendar;
pub mod error;
pub mod types;
pub mod units;
pub mod zip;

pub use calendar::*;
pub use error::*;
pub use types::*;
pub use units::*;
pub use zip::*;
