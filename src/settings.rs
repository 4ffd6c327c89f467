//! Notification settings and their persistence.
//!
//! Settings live in a key/value [`SettingsStore`] under two keys:
//!
//! | Key                    | Value                                         |
//! |------------------------|-----------------------------------------------|
//! | `notificationSettings` | JSON object with camelCase boolean toggles    |
//! | `phoneNumber`          | Destination number for outbound alerts        |
//!
//! [`SharedSettings`] loads them once and writes through on every change. It
//! is cheap to clone and is handed to the dispatcher at construction.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Store key of the notification toggles.
pub const NOTIFICATION_SETTINGS_KEY: &str = "notificationSettings";

/// Store key of the destination phone number.
pub const PHONE_NUMBER_KEY: &str = "phoneNumber";

/// Shortest phone number accepted when saving.
pub const MIN_PHONE_NUMBER_LEN: usize = 10;

/// User-controlled alert toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    /// Master switch for every alert side effect.
    pub enable_alerts: bool,
    pub sound_alerts: bool,
    pub push_notifications: bool,
    /// Stored for the settings screen; dispatch does not consult it.
    pub critical_alerts_only: bool,
    pub sms_alerts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enable_alerts: true,
            sound_alerts: true,
            push_notifications: true,
            critical_alerts_only: false,
            sms_alerts: false,
        }
    }
}

impl NotificationSettings {
    /// Names accepted by [`NotificationSettings::set`].
    pub const KEYS: [&'static str; 5] = [
        "enableAlerts",
        "soundAlerts",
        "pushNotifications",
        "criticalAlertsOnly",
        "smsAlerts",
    ];

    /// Set a toggle by name.
    ///
    /// Accepts the stored camelCase name as well as snake_case and kebab-case.
    pub fn set(&mut self, key: &str, value: bool) -> Result<()> {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        let field = match normalized.as_str() {
            "enablealerts" => &mut self.enable_alerts,
            "soundalerts" => &mut self.sound_alerts,
            "pushnotifications" => &mut self.push_notifications,
            "criticalalertsonly" => &mut self.critical_alerts_only,
            "smsalerts" => &mut self.sms_alerts,
            _ => bail!(
                "Unknown setting '{}' (expected one of: {})",
                key,
                Self::KEYS.join(", ")
            ),
        };
        *field = value;
        Ok(())
    }
}

/// Key/value persistence for settings.
pub trait SettingsStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// The whole file is rewritten on every change. A missing file reads as an
/// empty store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, reading any existing content.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse settings file {}", path.display()))?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write settings file {}", self.path.display()))
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }
}

#[derive(Debug, Default)]
struct SettingsState {
    notification: NotificationSettings,
    phone_number: String,
}

/// Settings loaded from a store, shared between the session and dispatcher.
#[derive(Debug, Clone)]
pub struct SharedSettings {
    store: Arc<dyn SettingsStore>,
    state: Arc<RwLock<SettingsState>>,
}

impl SharedSettings {
    /// Load settings from `store`.
    ///
    /// Missing keys fall back to defaults. A malformed settings object is
    /// logged and replaced by defaults.
    pub fn load(store: Arc<dyn SettingsStore>) -> Result<Self> {
        let notification = match store.get(NOTIFICATION_SETTINGS_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed notification settings: {}", e);
                NotificationSettings::default()
            }),
            None => NotificationSettings::default(),
        };
        let phone_number = store.get(PHONE_NUMBER_KEY)?.unwrap_or_default();

        Ok(Self {
            store,
            state: Arc::new(RwLock::new(SettingsState {
                notification,
                phone_number,
            })),
        })
    }

    /// Settings backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            state: Arc::new(RwLock::new(SettingsState::default())),
        }
    }

    pub fn notification(&self) -> NotificationSettings {
        self.state.read().unwrap_or_else(PoisonError::into_inner).notification
    }

    pub fn phone_number(&self) -> String {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .phone_number
            .clone()
    }

    /// Apply a change to the toggles and persist the result.
    pub fn update<F>(&self, change: F) -> Result<NotificationSettings>
    where
        F: FnOnce(&mut NotificationSettings) -> Result<()>,
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut updated = state.notification;
        change(&mut updated)?;

        let json = serde_json::to_string(&updated)?;
        self.store.set(NOTIFICATION_SETTINGS_KEY, &json)?;
        state.notification = updated;
        Ok(updated)
    }

    /// Save the destination phone number.
    ///
    /// An empty value clears it; anything shorter than
    /// [`MIN_PHONE_NUMBER_LEN`] characters is rejected.
    pub fn set_phone_number(&self, phone_number: &str) -> Result<()> {
        let phone_number = phone_number.trim();
        if !phone_number.is_empty() && phone_number.chars().count() < MIN_PHONE_NUMBER_LEN {
            bail!(
                "Phone number '{}' is too short (at least {} characters)",
                phone_number,
                MIN_PHONE_NUMBER_LEN
            );
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        self.store.set(PHONE_NUMBER_KEY, phone_number)?;
        state.phone_number = phone_number.to_string();
        Ok(())
    }
}
