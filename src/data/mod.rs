//! Derived data computed from sensor snapshots.
//!
//! Everything in this module is pure: given the same snapshot it produces the
//! same result and performs no I/O (except [`Report::write_to`]).
//!
//! ## Submodules
//!
//! - [`thresholds`]: Warning/critical table and the separate alert cutoffs
//! - [`index`]: Per-parameter contributions and the composite index
//! - [`status`]: Overall status and recommendations
//! - [`history`]: Historical window with per-parameter averages
//! - [`report`]: JSON export
//!
//! ## Data Flow
//!
//! ```text
//! SensorSnapshot
//!        │
//!        ├──▶ derive_metrics() ──▶ Contributions + CompositeIndex
//!        │
//!        ├──▶ parameter_statuses() (per-parameter HealthStatus from Thresholds)
//!        │
//!        └──▶ AirQualityStatus::assess() ──▶ recommendations()
//! ```

pub mod history;
pub mod index;
pub mod report;
pub mod status;
pub mod thresholds;

pub use history::{samples_for_days, HistoricalWindow, ParameterSummary, DEFAULT_HISTORY_DAYS};
pub use index::{
    derive_metrics, AqiCategory, CompositeIndex, Contribution, Contributions, DerivedMetrics, Rgb,
    MAX_INDEX,
};
pub use report::Report;
pub use status::{parameter_statuses, AirQualityStatus, Tip};
pub use thresholds::{HealthStatus, Threshold, Thresholds};
