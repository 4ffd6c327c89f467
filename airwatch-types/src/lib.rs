//! # airwatch-types
//!
//! Core types for air-quality telemetry feeds. This crate defines the wire
//! schema of a ThingSpeak-style channel carrying six air-quality readings,
//! shared by the HTTP adapters and the monitor itself.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature to decode provider JSON
//! - **Lenient fields**: Readings travel as text; absent, empty or malformed
//!   values are reported as missing, never as errors
//! - **Ergonomic builders**: Fluent API for constructing snapshots in tests and replays
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: JSON decoding/encoding of snapshots and feeds via serde
//!
//! ## Example
//!
//! ```rust
//! use airwatch_types::{Parameter, SensorSnapshot};
//!
//! let snapshot = SensorSnapshot::builder()
//!     .created_at("2025-03-01T12:00:00Z")
//!     .entry_id(42)
//!     .reading(Parameter::Temperature, 22.5)
//!     .reading(Parameter::Co2, 512.0)
//!     .build();
//!
//! assert_eq!(snapshot.get(Parameter::Co2), Some(512.0));
//! assert_eq!(snapshot.get(Parameter::Butane), None);
//! assert_eq!(snapshot.value_or_zero(Parameter::Butane), 0.0);
//! ```
//!
//! ## Field mapping
//!
//! | Wire field | Parameter     | Unit |
//! |------------|---------------|------|
//! | `field1`   | Temperature   | °C   |
//! | `field2`   | Humidity      | %    |
//! | `field3`   | CO₂           | ppm  |
//! | `field4`   | LPG           | ppm  |
//! | `field5`   | Propane       | ppm  |
//! | `field6`   | Butane        | ppm  |

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod feed;
mod parameter;
mod snapshot;

pub use feed::*;
pub use parameter::*;
pub use snapshot::*;

/// Number of samples a channel records per day (one every ten minutes).
pub const SAMPLES_PER_DAY: usize = 24 * 6;
