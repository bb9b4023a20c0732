//! es-core: stable foundation for the building energy simulator.
//!
//! Contains:
//! - batch (batch counts, period allocations, simulation jobs)
//! - catalog (building types, construction periods, weather stations, locked design parameters)
//! - params (custom real-time parameters and their bounds)
//! - calendar (non-leap-year hour/month layout)
//! - numeric (float helpers, report rounding and fixed-point formatting)
//! - units (uom SI types + constructors)
//! - error (shared error types)

pub mod batch;
pub mod calendar;
pub mod catalog;
pub mod error;
pub mod numeric;
pub mod params;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use batch::*;
pub use calendar::*;
pub use catalog::*;
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use params::*;
