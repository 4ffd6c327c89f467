//! Alert evaluation and dispatch.
//!
//! ```text
//! SensorSnapshot ──▶ evaluate() ──▶ AlertState ──▶ AlertDispatcher::dispatch()
//!                                                        │
//!                                     ┌──────────────────┼──────────────────┐
//!                                     ▼                  ▼                  ▼
//!                                AlertSound          Notifier           Messenger
//!                             (every evaluation)   (rising edge)   (15 min cooldown)
//! ```

pub mod dispatcher;
pub mod evaluator;
pub mod outputs;

pub use dispatcher::{AlertDispatcher, DispatchSummary, MESSAGE_COOLDOWN};
pub use evaluator::{evaluate, AlertState};
pub use outputs::{AlertSound, LogNotifier, Messenger, Notification, Notifier, TerminalBell};
