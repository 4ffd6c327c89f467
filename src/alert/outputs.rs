//! Output devices the dispatcher drives: sound, notifications and outbound
//! messages.

use std::fmt::Debug;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// Audible alert.
pub trait AlertSound: Send + Sync + Debug {
    /// Play the alert sound once.
    fn play(&self);

    /// Release the underlying audio handle. Later calls to `play` are no-ops.
    fn release(&self) {}
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// How long the notification stays up before it is dismissed.
    pub timeout: Duration,
}

/// Shows notifications to the user.
pub trait Notifier: Send + Sync + Debug {
    fn notify(&self, notification: &Notification);

    /// Close any open notification and release resources.
    fn close(&self) {}
}

/// Delivers outbound text messages.
#[async_trait]
pub trait Messenger: Send + Sync + Debug {
    async fn send(&self, to: &str, body: &str) -> Result<()>;
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default)]
pub struct TerminalBell {
    released: AtomicBool,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertSound for TerminalBell {
    fn play(&self) {
        if self.released.load(Ordering::Acquire) {
            return;
        }
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
            tracing::debug!("Failed to ring terminal bell: {}", e);
        }
    }

    fn release(&self) {
        self.released.store(true, Ordering::Release);
    }
}

/// Writes notifications to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::warn!(
            title = %notification.title,
            timeout_secs = notification.timeout.as_secs(),
            "{}",
            notification.body
        );
    }
}

#[async_trait]
impl Messenger for airwatch_adapters::twilio::TwilioMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<()> {
        let receipt = airwatch_adapters::twilio::TwilioMessenger::send(self, to, body).await?;
        tracing::debug!(sid = ?receipt.sid, status = ?receipt.status, "Message accepted");
        Ok(())
    }
}
