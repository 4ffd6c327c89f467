//! Turns alert evaluations into sound, notifications and outbound messages.
//!
//! The dispatcher owns the only mutable alert state in the system: whether
//! the previous evaluation was alerting and when the last outbound message
//! was sent. Evaluation itself stays pure (see [`evaluate`](super::evaluate)).

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::Local;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;

use super::evaluator::AlertState;
use super::outputs::{AlertSound, Messenger, Notification, Notifier};
use crate::events::SessionEvent;
use crate::settings::SharedSettings;

/// Minimum spacing between two outbound messages.
pub const MESSAGE_COOLDOWN: Duration = Duration::from_secs(15 * 60);

/// How long a notification stays up.
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Title of alert notifications.
pub const NOTIFICATION_TITLE: &str = "Air Quality Alert";

const CRITICAL_STATUS: &str = "Critical - Take Action Now";
const CRITICAL_SUGGESTION: &str = "Ventilate the area immediately and check for gas leaks.";

/// Side effects fired by a single dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sound: bool,
    pub notification: bool,
    /// An outbound message delivery was started.
    pub message: bool,
}

/// Decides and fires alert side effects.
#[derive(Debug)]
pub struct AlertDispatcher {
    settings: SharedSettings,
    sound: Arc<dyn AlertSound>,
    notifier: Arc<dyn Notifier>,
    messenger: Option<Arc<dyn Messenger>>,
    last_message: Arc<Mutex<Option<Instant>>>,
    alert_active: bool,
    shut_down: bool,
}

impl AlertDispatcher {
    pub fn new(
        settings: SharedSettings,
        sound: Arc<dyn AlertSound>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            sound,
            notifier,
            messenger: None,
            last_message: Arc::new(Mutex::new(None)),
            alert_active: false,
            shut_down: false,
        }
    }

    /// Attach a messenger for outbound alert messages.
    pub fn with_messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    /// Fire side effects for one evaluation.
    ///
    /// Must be called from within a tokio runtime: message delivery runs on a
    /// spawned task.
    pub fn dispatch(&mut self, alerts: &AlertState) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        // Tracked before any settings gate.
        let rising = alerts.any_alert() && !self.alert_active;
        self.alert_active = alerts.any_alert();
        if !alerts.any_alert() {
            return summary;
        }

        let settings = self.settings.notification();
        if self.shut_down || !settings.enable_alerts {
            return summary;
        }

        if settings.sound_alerts {
            self.sound.play();
            summary.sound = true;
        }

        if settings.push_notifications && rising {
            let body = alerts.message().unwrap_or_default();
            self.notifier.notify(&Notification {
                title: NOTIFICATION_TITLE.to_string(),
                body,
                timeout: NOTIFICATION_TIMEOUT,
            });
            summary.notification = true;
        }

        if settings.sms_alerts {
            summary.message = self.send_alert_message();
        }

        summary
    }

    /// Send a test message to the configured number, bypassing the cooldown.
    pub async fn send_test_message(&self) -> Result<()> {
        let Some(messenger) = &self.messenger else {
            bail!("No messaging provider configured");
        };
        let phone_number = self.settings.phone_number();
        if phone_number.is_empty() {
            bail!("No phone number configured");
        }

        let body = report_body(
            "Good - Test Message",
            "This is a test SMS from your Air Quality Monitor",
        );
        messenger.send(&phone_number, &body).await?;
        tracing::info!("Test message sent to {}", phone_number);
        Ok(())
    }

    /// Consume session events until the session stops.
    pub async fn run(mut self, mut events: broadcast::Receiver<SessionEvent>) {
        loop {
            match events.recv().await {
                Ok(SessionEvent::AlertEvaluated { alerts, .. }) => {
                    let summary = self.dispatch(&alerts);
                    if summary != DispatchSummary::default() {
                        tracing::debug!(?summary, "Dispatched alert side effects");
                    }
                }
                Ok(SessionEvent::Stopped) | Err(RecvError::Closed) => break,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Alert dispatcher lagged, skipped {} events", skipped);
                }
            }
        }
        self.shutdown();
    }

    /// Release the output devices. Later dispatches fire nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.sound.release();
        self.notifier.close();
    }

    fn send_alert_message(&self) -> bool {
        let Some(messenger) = &self.messenger else {
            return false;
        };
        let phone_number = self.settings.phone_number();
        if phone_number.is_empty() {
            return false;
        }

        let Some((reserved_at, previous)) = self.reserve_message_slot() else {
            tracing::debug!("Message already sent in the last 15 minutes, skipping");
            return false;
        };

        let messenger = Arc::clone(messenger);
        let last_message = Arc::clone(&self.last_message);
        let body = report_body(CRITICAL_STATUS, CRITICAL_SUGGESTION);

        tokio::spawn(async move {
            match messenger.send(&phone_number, &body).await {
                Ok(()) => tracing::info!("Alert message sent"),
                Err(e) => {
                    tracing::error!("Failed to send alert message: {:#}", e);
                    let mut last = last_message.lock().unwrap_or_else(PoisonError::into_inner);
                    if *last == Some(reserved_at) {
                        *last = previous;
                    }
                }
            }
        });
        true
    }

    // Check-then-set under one lock so concurrent dispatches cannot both send.
    fn reserve_message_slot(&self) -> Option<(Instant, Option<Instant>)> {
        let mut last = self.last_message.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        if let Some(sent_at) = *last {
            if now.duration_since(sent_at) < MESSAGE_COOLDOWN {
                return None;
            }
        }
        let previous = last.replace(now);
        Some((now, previous))
    }
}

fn report_body(status: &str, suggestion: &str) -> String {
    let time = Local::now().format("%-m/%-d/%Y, %-I:%M:%S %p");
    format!("Air Quality Report:\nTime: {time}\nStatus: {status}\nSuggestion: {suggestion}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingSound {
        plays: AtomicUsize,
        released: AtomicBool,
    }

    impl AlertSound for CountingSound {
        fn play(&self) {
            self.plays.fetch_add(1, Ordering::SeqCst);
        }

        fn release(&self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        shown: Mutex<Vec<Notification>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: &Notification) {
            self.shown.lock().unwrap().push(notification.clone());
        }
    }

    #[derive(Debug, Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<(String, String)>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send(&self, to: &str, body: &str) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                bail!("provider unavailable");
            }
            self.sent.lock().unwrap().push((to.to_string(), body.to_string()));
            Ok(())
        }
    }

    struct Harness {
        dispatcher: AlertDispatcher,
        settings: SharedSettings,
        sound: Arc<CountingSound>,
        notifier: Arc<RecordingNotifier>,
        messenger: Arc<RecordingMessenger>,
    }

    fn harness() -> Harness {
        let settings = SharedSettings::in_memory();
        let sound = Arc::new(CountingSound::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let messenger = Arc::new(RecordingMessenger::default());
        let dispatcher = AlertDispatcher::new(settings.clone(), sound.clone(), notifier.clone())
            .with_messenger(messenger.clone());
        Harness {
            dispatcher,
            settings,
            sound,
            notifier,
            messenger,
        }
    }

    fn enable_sms(settings: &SharedSettings) {
        settings.update(|s| s.set("smsAlerts", true)).unwrap();
        settings.set_phone_number("+15551234567").unwrap();
    }

    const CO2: AlertState = AlertState {
        co2_alert: true,
        propane_alert: false,
        butane_alert: false,
    };

    const QUIET: AlertState = AlertState {
        co2_alert: false,
        propane_alert: false,
        butane_alert: false,
    };

    // Let spawned deliveries run.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_evaluation_fires_nothing() {
        let mut h = harness();
        enable_sms(&h.settings);
        assert_eq!(h.dispatcher.dispatch(&QUIET), DispatchSummary::default());
        assert_eq!(h.sound.plays.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sound_plays_every_alerting_evaluation() {
        let mut h = harness();
        for _ in 0..3 {
            assert!(h.dispatcher.dispatch(&CO2).sound);
        }
        assert_eq!(h.sound.plays.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_on_rising_edge_only() {
        let mut h = harness();

        assert!(h.dispatcher.dispatch(&CO2).notification);
        assert!(!h.dispatcher.dispatch(&CO2).notification);
        h.dispatcher.dispatch(&QUIET);
        assert!(h.dispatcher.dispatch(&CO2).notification);

        let shown = h.notifier.shown.lock().unwrap();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].title, "Air Quality Alert");
        assert_eq!(shown[0].timeout, Duration::from_secs(5));
        assert!(shown[0].body.starts_with("ALERT: CO₂ levels above 400ppm!"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_enabling_notifications_mid_alert_does_not_notify() {
        let mut h = harness();
        h.settings.update(|s| s.set("pushNotifications", false)).unwrap();
        assert!(!h.dispatcher.dispatch(&CO2).notification);

        h.settings.update(|s| s.set("pushNotifications", true)).unwrap();
        assert!(!h.dispatcher.dispatch(&CO2).notification);
        assert!(h.notifier.shown.lock().unwrap().is_empty());

        h.dispatcher.dispatch(&QUIET);
        assert!(h.dispatcher.dispatch(&CO2).notification);
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_started_while_disabled_is_not_a_new_edge() {
        let mut h = harness();
        h.settings.update(|s| s.set("enableAlerts", false)).unwrap();
        assert_eq!(h.dispatcher.dispatch(&CO2), DispatchSummary::default());

        h.settings.update(|s| s.set("enableAlerts", true)).unwrap();
        let summary = h.dispatcher.dispatch(&CO2);
        assert!(summary.sound);
        assert!(!summary.notification);
    }

    #[tokio::test(start_paused = true)]
    async fn test_master_switch_gates_everything() {
        let mut h = harness();
        enable_sms(&h.settings);
        h.settings.update(|s| s.set("enableAlerts", false)).unwrap();

        assert_eq!(h.dispatcher.dispatch(&CO2), DispatchSummary::default());
        settle().await;
        assert!(h.messenger.sent.lock().unwrap().is_empty());
        assert!(h.notifier.shown.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_requires_phone_number() {
        let mut h = harness();
        h.settings.update(|s| s.set("smsAlerts", true)).unwrap();
        assert!(!h.dispatcher.dispatch(&CO2).message);
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_cooldown() {
        let mut h = harness();
        enable_sms(&h.settings);

        assert!(h.dispatcher.dispatch(&CO2).message);
        settle().await;

        // Every 5 seconds for just under 15 minutes
        for _ in 0..179 {
            tokio::time::advance(Duration::from_secs(5)).await;
            assert!(!h.dispatcher.dispatch(&CO2).message);
        }

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(h.dispatcher.dispatch(&CO2).message);
        settle().await;

        let sent = h.messenger.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "+15551234567");
        assert!(sent[0].1.starts_with("Air Quality Report:\nTime: "));
        assert!(sent[0].1.contains("\nStatus: Critical - Take Action Now\n"));
        assert!(sent[0]
            .1
            .ends_with("Suggestion: Ventilate the area immediately and check for gas leaks."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_message_releases_cooldown() {
        let mut h = harness();
        enable_sms(&h.settings);
        h.messenger.fail.store(true, Ordering::SeqCst);

        assert!(h.dispatcher.dispatch(&CO2).message);
        settle().await;

        h.messenger.fail.store(false, Ordering::SeqCst);
        assert!(h.dispatcher.dispatch(&CO2).message);
        settle().await;
        assert_eq!(h.messenger.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_releases_outputs() {
        let mut h = harness();
        h.dispatcher.shutdown();
        assert!(h.sound.released.load(Ordering::SeqCst));
        assert_eq!(h.dispatcher.dispatch(&CO2), DispatchSummary::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_test_message() {
        let h = harness();
        let err = h.dispatcher.send_test_message().await.unwrap_err();
        assert!(err.to_string().contains("phone number"));

        h.settings.set_phone_number("+15551234567").unwrap();
        h.dispatcher.send_test_message().await.unwrap();

        let sent = h.messenger.sent.lock().unwrap();
        assert!(sent[0].1.contains("Status: Good - Test Message"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_stopped_event() {
        let h = harness();
        let (tx, rx) = broadcast::channel(16);
        let task = tokio::spawn(h.dispatcher.run(rx));

        let snapshot = Arc::new(airwatch_types::SensorSnapshot::default());
        tx.send(SessionEvent::AlertEvaluated {
            snapshot,
            alerts: CO2,
        })
        .unwrap();
        tx.send(SessionEvent::Stopped).unwrap();
        task.await.unwrap();

        assert_eq!(h.sound.plays.load(Ordering::SeqCst), 1);
        assert!(h.sound.released.load(Ordering::SeqCst));
    }
}
