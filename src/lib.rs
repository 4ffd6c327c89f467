//! # airwatch
//!
//! Air-quality telemetry monitor: polls a ThingSpeak-compatible channel for
//! sensor readings, derives a composite air-quality index, evaluates alert
//! cutoffs and dispatches sound, notification and SMS side effects.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          PollingSession                          │
//! │  ┌──────────┐   latest() / history()   ┌────────────────────┐   │
//! │  │  source  │─────────────────────────▶│ current + history  │   │
//! │  │ (input)  │                          │     FeedState      │   │
//! │  └──────────┘                          └─────────┬──────────┘   │
//! │                                                  │ evaluate()   │
//! └──────────────────────────────────────────────────┼──────────────┘
//!                                   SessionEvent     │
//!                     ┌──────────────────────────────┼──────────┐
//!                     ▼                              ▼          │
//!             ┌───────────────┐              ┌─────────────┐    │
//!             │AlertDispatcher│              │     App     │◀───┘
//!             │ sound/notify/ │              │  (console)  │
//!             │      SMS      │              │ derive_metrics
//!             └───────────────┘              └─────────────┘
//! ```
//!
//! - **[`data`]**: Threshold table, index derivation, status and
//!   recommendations, historical averages, JSON report
//! - **[`alert`]**: Pure alert evaluation and the stateful dispatcher
//! - **[`session`]**: Polling lifecycle of the current and historical feeds
//! - **[`source`]**: [`TelemetrySource`] trait with the ThingSpeak adapter and
//!   a file replay source
//! - **[`settings`]**: Persisted notification toggles and phone number
//! - **[`config`]**: Layered file + environment configuration
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a channel (credentials from airwatch.toml or AIRWATCH_* env vars)
//! airwatch watch
//!
//! # Replay a recorded feed offline
//! airwatch --replay feeds.json current
//!
//! # Export the last 14 days to JSON
//! airwatch history --days 14 --export report.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use airwatch::{derive_metrics, evaluate, Parameter, SensorSnapshot};
//!
//! let snapshot = SensorSnapshot::builder()
//!     .reading(Parameter::Temperature, 22.0)
//!     .reading(Parameter::Humidity, 45.0)
//!     .reading(Parameter::Co2, 500.0)
//!     .build();
//!
//! let derived = derive_metrics(&snapshot);
//! assert_eq!(derived.contributions.co2.score, 8);
//!
//! let alerts = evaluate(&snapshot);
//! assert!(alerts.co2_alert && alerts.any_alert());
//! ```

pub mod alert;
pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod session;
pub mod settings;
pub mod source;

// Re-export main types for convenience
pub use airwatch_types::{Feed, Parameter, SensorSnapshot, SAMPLES_PER_DAY};
pub use alert::{evaluate, AlertDispatcher, AlertState, DispatchSummary};
pub use app::App;
pub use config::AppConfig;
pub use data::{
    derive_metrics, AirQualityStatus, AqiCategory, CompositeIndex, DerivedMetrics, HealthStatus,
    HistoricalWindow, Report, Thresholds,
};
pub use events::{FeedKind, SessionEvent};
pub use session::{FeedState, PollingSession, SessionConfig, ViewportClass};
pub use settings::{JsonFileStore, MemoryStore, NotificationSettings, SettingsStore, SharedSettings};
pub use source::{ReplaySource, TelemetrySource};
