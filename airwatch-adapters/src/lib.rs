//! # airwatch-adapters
//!
//! HTTP adapters for the external services an air-quality monitor talks to.
//!
//! ## Supported Services
//!
//! - **ThingSpeak** (`thingspeak` feature) - Reads the latest entry and the
//!   recent history of a channel via the public REST API
//! - **Twilio** (`twilio` feature) - Sends SMS alert messages via the
//!   Messages REST API
//!
//! ## Quick Start (ThingSpeak)
//!
//! ```rust,no_run
//! use airwatch_adapters::thingspeak::ThingSpeakAdapter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = ThingSpeakAdapter::builder()
//!         .channel_id("2943472")
//!         .api_key("READ_API_KEY")
//!         .build()?;
//!
//!     let latest = adapter.latest().await?;
//!     println!("Entry {} at {}", latest.entry_id, latest.created_at);
//!
//!     let history = adapter.history(144).await?;
//!     println!("Fetched {} entries", history.len());
//!     Ok(())
//! }
//! ```

pub mod error;

#[cfg(feature = "thingspeak")]
pub mod thingspeak;

#[cfg(feature = "twilio")]
pub mod twilio;

pub use error::AdapterError;

// Re-export types for convenience
pub use airwatch_types::{Feed, Parameter, SensorSnapshot};
