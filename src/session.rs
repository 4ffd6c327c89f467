//! Polling session: owns the current reading and the historical window.
//!
//! A session runs two feeds against one [`TelemetrySource`]:
//!
//! - **current**: fetched on [`PollingSession::start`] and then every
//!   [`POLL_INTERVAL`]. Each successful fetch replaces the snapshot and is
//!   evaluated for alerts.
//! - **historical**: fetched once on start for the configured number of days
//!   and afterwards only on [`PollingSession::fetch_historical`].
//!
//! Each feed has its own gate so two fetches of the same kind are never in
//! flight at once. Every state change is published as a [`SessionEvent`].
//!
//! # Example
//!
//! ```rust,no_run
//! use airwatch::{PollingSession, ReplaySource, SessionConfig, SessionEvent};
//!
//! # tokio_test::block_on(async {
//! let session = PollingSession::builder()
//!     .source(ReplaySource::new("feeds.json"))
//!     .config(SessionConfig::default())
//!     .build()?;
//!
//! let mut events = session.subscribe();
//! session.start();
//!
//! while let Ok(event) = events.recv().await {
//!     if let SessionEvent::AlertEvaluated { alerts, .. } = event {
//!         println!("any alert: {}", alerts.any_alert());
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! # });
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use airwatch_types::SensorSnapshot;
use anyhow::{anyhow, bail, Result};
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;

use crate::alert::{evaluate, AlertState};
use crate::data::{samples_for_days, HistoricalWindow, DEFAULT_HISTORY_DAYS};
use crate::events::{FeedKind, SessionEvent};
use crate::source::TelemetrySource;

/// Interval between current-reading fetches.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Viewports narrower than this many pixels are [`ViewportClass::Narrow`].
pub const NARROW_VIEWPORT_WIDTH: u32 = 768;

const EVENT_CAPACITY: usize = 64;

/// Layout class of the consumer.
///
/// Narrow consumers do not surface transient current-reading errors; the
/// failure is only logged and the next tick recovers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewportClass {
    Narrow,
    #[default]
    Wide,
}

impl ViewportClass {
    pub fn from_width(width: u32) -> Self {
        if width < NARROW_VIEWPORT_WIDTH {
            ViewportClass::Narrow
        } else {
            ViewportClass::Wide
        }
    }
}

/// Latest value of a feed with its loading flag and error.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState<T> {
    pub value: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            value: None,
            loading: false,
            error: None,
        }
    }
}

/// Session settings fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub poll_interval: Duration,
    /// Days loaded by the initial historical fetch.
    pub history_days: u32,
    pub viewport: ViewportClass,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            history_days: DEFAULT_HISTORY_DAYS,
            viewport: ViewportClass::Wide,
        }
    }
}

/// A polling session against one telemetry source.
///
/// Cheap to clone; all clones drive the same session.
#[derive(Debug, Clone)]
pub struct PollingSession {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    source: Arc<dyn TelemetrySource>,
    config: SessionConfig,
    current: Mutex<FeedState<Arc<SensorSnapshot>>>,
    alerts: Mutex<AlertState>,
    history: Mutex<FeedState<Arc<HistoricalWindow>>>,
    current_gate: tokio::sync::Mutex<()>,
    history_gate: tokio::sync::Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
    stop_tx: watch::Sender<bool>,
    started: AtomicBool,
    stopped: AtomicBool,
}

impl PollingSession {
    /// Create a builder for configuring the session.
    pub fn builder() -> PollingSessionBuilder {
        PollingSessionBuilder::default()
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Returns a description of the telemetry source.
    pub fn source_description(&self) -> String {
        self.inner.source.description()
    }

    pub fn current(&self) -> FeedState<Arc<SensorSnapshot>> {
        lock(&self.inner.current).clone()
    }

    /// Alert state of the current reading.
    pub fn alerts(&self) -> AlertState {
        *lock(&self.inner.alerts)
    }

    pub fn history(&self) -> FeedState<Arc<HistoricalWindow>> {
        lock(&self.inner.history).clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Start polling.
    ///
    /// Fetches the current reading immediately and then every poll interval,
    /// and loads the historical window once. A slow fetch delays the next
    /// tick rather than overlapping it. Calling `start` twice, or after
    /// [`stop`](Self::stop), does nothing.
    pub fn start(&self) {
        if self.is_stopped() || self.inner.started.swap(true, Ordering::AcqRel) {
            tracing::warn!("Polling session already started or stopped");
            return;
        }

        tracing::info!(
            source = %self.source_description(),
            interval_secs = self.inner.config.poll_interval.as_secs(),
            "Starting polling session"
        );

        // The loop only holds a weak reference: dropping every session handle
        // closes the stop channel and ends it.
        let weak = Arc::downgrade(&self.inner);
        let mut stop_rx = self.inner.stop_tx.subscribe();
        let period = self.inner.config.poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(session) = upgrade(&weak) else {
                            break;
                        };
                        if session.is_stopped() {
                            break;
                        }
                        // Errors are recorded in the feed state.
                        let _ = session.refresh_current().await;
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Current-reading timer stopped");
        });

        let session = self.clone();
        let days = self.inner.config.history_days;
        tokio::spawn(async move {
            let _ = session.fetch_historical(days).await;
        });
    }

    /// Stop polling.
    ///
    /// Cancels the timer and emits [`SessionEvent::Stopped`]. Fetches still
    /// in flight complete, but their results are discarded.
    pub fn stop(&self) {
        if self.inner.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.inner.stop_tx.send(true);
        self.emit(SessionEvent::Stopped);
        tracing::info!("Polling session stopped");
    }

    /// Fetch the current reading now.
    ///
    /// Waits for an in-flight current fetch to finish first. On success the
    /// snapshot is replaced and alerts are re-evaluated. On failure the
    /// previous snapshot is kept and the error is recorded, except on a
    /// narrow viewport where it is only logged.
    pub async fn refresh_current(&self) -> Result<Arc<SensorSnapshot>> {
        let _gate = self.inner.current_gate.lock().await;
        if self.is_stopped() {
            bail!("Polling session is stopped");
        }

        lock(&self.inner.current).loading = true;
        let result = self.inner.source.latest().await;

        if self.is_stopped() {
            lock(&self.inner.current).loading = false;
            tracing::debug!("Discarding current reading fetched after stop");
            bail!("Polling session is stopped");
        }

        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let alerts = evaluate(&snapshot);
                let error_cleared = {
                    let mut state = lock(&self.inner.current);
                    state.value = Some(Arc::clone(&snapshot));
                    state.loading = false;
                    state.error.take().is_some()
                };
                *lock(&self.inner.alerts) = alerts;

                tracing::debug!(
                    entry_id = snapshot.entry_id,
                    any_alert = alerts.any_alert(),
                    "Current reading updated"
                );

                self.emit(SessionEvent::SnapshotUpdated(Arc::clone(&snapshot)));
                self.emit(SessionEvent::AlertEvaluated {
                    snapshot: Arc::clone(&snapshot),
                    alerts,
                });
                if error_cleared {
                    self.emit(SessionEvent::ErrorChanged {
                        feed: FeedKind::Current,
                        error: None,
                    });
                }
                Ok(snapshot)
            }
            Err(e) => {
                let message = format!("Failed to fetch current data: {:#}", e);
                let changed = {
                    let mut state = lock(&self.inner.current);
                    state.loading = false;
                    match self.inner.config.viewport {
                        ViewportClass::Narrow => false,
                        ViewportClass::Wide => replace_error(&mut state.error, &message),
                    }
                };

                tracing::warn!("{}", message);
                if changed {
                    self.emit(SessionEvent::ErrorChanged {
                        feed: FeedKind::Current,
                        error: Some(message),
                    });
                }
                Err(e)
            }
        }
    }

    /// Fetch the last `days` days of readings, replacing the window.
    ///
    /// Requests `days × 144` results; zero days is rejected without a fetch.
    /// Failures are recorded as the historical feed's error and are not
    /// retried.
    pub async fn fetch_historical(&self, days: u32) -> Result<Arc<HistoricalWindow>> {
        if days == 0 {
            bail!("History days must be at least 1");
        }
        let _gate = self.inner.history_gate.lock().await;
        if self.is_stopped() {
            bail!("Polling session is stopped");
        }

        let results = samples_for_days(days);
        lock(&self.inner.history).loading = true;
        tracing::debug!(days, results, "Fetching historical data");
        let result = self.inner.source.history(results).await;

        if self.is_stopped() {
            lock(&self.inner.history).loading = false;
            tracing::debug!("Discarding historical data fetched after stop");
            bail!("Polling session is stopped");
        }

        match result {
            Ok(entries) => {
                let window = Arc::new(HistoricalWindow::new(days, entries));
                let error_cleared = {
                    let mut state = lock(&self.inner.history);
                    state.value = Some(Arc::clone(&window));
                    state.loading = false;
                    state.error.take().is_some()
                };

                tracing::info!(days, samples = window.len(), "Historical window updated");
                self.emit(SessionEvent::HistoryUpdated(Arc::clone(&window)));
                if error_cleared {
                    self.emit(SessionEvent::ErrorChanged {
                        feed: FeedKind::Historical,
                        error: None,
                    });
                }
                Ok(window)
            }
            Err(e) => {
                let message = format!("Failed to fetch historical data: {:#}", e);
                let changed = {
                    let mut state = lock(&self.inner.history);
                    state.loading = false;
                    replace_error(&mut state.error, &message)
                };

                tracing::warn!("{}", message);
                if changed {
                    self.emit(SessionEvent::ErrorChanged {
                        feed: FeedKind::Historical,
                        error: Some(message),
                    });
                }
                Err(e)
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine.
        let _ = self.inner.events.send(event);
    }
}

/// Builder for PollingSession.
#[derive(Debug, Default)]
pub struct PollingSessionBuilder {
    source: Option<Arc<dyn TelemetrySource>>,
    config: Option<SessionConfig>,
}

impl PollingSessionBuilder {
    /// Set the telemetry source.
    pub fn source<S: TelemetrySource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Set an already shared telemetry source.
    pub fn shared_source(mut self, source: Arc<dyn TelemetrySource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the session configuration (default: [`SessionConfig::default`]).
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the viewport class of the configuration.
    pub fn viewport(mut self, viewport: ViewportClass) -> Self {
        self.config.get_or_insert_with(SessionConfig::default).viewport = viewport;
        self
    }

    /// Build the session.
    ///
    /// Fails if no source was given, the poll interval is zero or no history
    /// days are configured.
    pub fn build(self) -> Result<PollingSession> {
        let source = self
            .source
            .ok_or_else(|| anyhow!("A telemetry source is required"))?;
        let config = self.config.unwrap_or_default();
        if config.poll_interval.is_zero() {
            bail!("Poll interval must be greater than zero");
        }
        if config.history_days == 0 {
            bail!("History days must be at least 1");
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (stop_tx, _) = watch::channel(false);

        Ok(PollingSession {
            inner: Arc::new(Inner {
                source,
                config,
                current: Mutex::new(FeedState::default()),
                alerts: Mutex::new(AlertState::default()),
                history: Mutex::new(FeedState::default()),
                current_gate: tokio::sync::Mutex::new(()),
                history_gate: tokio::sync::Mutex::new(()),
                events,
                stop_tx,
                started: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
            }),
        })
    }
}

fn upgrade(weak: &Weak<Inner>) -> Option<PollingSession> {
    weak.upgrade().map(|inner| PollingSession { inner })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store `message` as the error; returns whether it changed.
fn replace_error(slot: &mut Option<String>, message: &str) -> bool {
    if slot.as_deref() == Some(message) {
        return false;
    }
    *slot = Some(message.to_string());
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_from_width() {
        assert_eq!(ViewportClass::from_width(375), ViewportClass::Narrow);
        assert_eq!(ViewportClass::from_width(767), ViewportClass::Narrow);
        assert_eq!(ViewportClass::from_width(768), ViewportClass::Wide);
        assert_eq!(ViewportClass::from_width(1920), ViewportClass::Wide);
    }

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.history_days, 7);
        assert_eq!(config.viewport, ViewportClass::Wide);
    }

    #[test]
    fn test_builder_requires_source() {
        let err = PollingSession::builder().build().unwrap_err();
        assert!(err.to_string().contains("telemetry source"));
    }

    #[derive(Debug)]
    struct NoSource;

    #[async_trait::async_trait]
    impl TelemetrySource for NoSource {
        async fn latest(&self) -> Result<SensorSnapshot> {
            bail!("no readings")
        }

        async fn history(&self, _results: usize) -> Result<Vec<SensorSnapshot>> {
            bail!("no readings")
        }

        fn description(&self) -> String {
            "none".to_string()
        }
    }

    #[test]
    fn test_builder_rejects_zero_history_days() {
        let config = SessionConfig {
            history_days: 0,
            ..SessionConfig::default()
        };
        let err = PollingSession::builder()
            .source(NoSource)
            .config(config)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("History days"));
    }

    #[tokio::test]
    async fn test_fetch_historical_rejects_zero_days() {
        let session = PollingSession::builder().source(NoSource).build().unwrap();
        let err = session.fetch_historical(0).await.unwrap_err();
        assert!(err.to_string().contains("History days"));
        assert!(session.history().error.is_none());
    }

    #[test]
    fn test_replace_error_reports_changes() {
        let mut slot = None;
        assert!(replace_error(&mut slot, "boom"));
        assert!(!replace_error(&mut slot, "boom"));
        assert!(replace_error(&mut slot, "bang"));
        assert_eq!(slot.as_deref(), Some("bang"));
    }

    #[test]
    fn test_feed_state_default() {
        let state: FeedState<Arc<SensorSnapshot>> = FeedState::default();
        assert!(state.value.is_none());
        assert!(!state.loading);
        assert!(state.error.is_none());
    }
}
