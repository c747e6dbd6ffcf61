//! User-facing alerts raised by the request engine.
//!
//! On the device these are blocking dialogs owned by the host UI; the core
//! only decides whether to raise one and with what text.

use std::sync::Mutex;

pub const SUCCESS_TITLE: &str = "Success";
pub const ERROR_TITLE: &str = "Error";
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            title: SUCCESS_TITLE.to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            title: ERROR_TITLE.to_string(),
            message: message.into(),
        }
    }
}

pub trait Alerter: Send + Sync {
    fn alert(&self, alert: &Alert);
}

/// Writes alerts to the log. Used when no UI is attached.
#[derive(Debug, Default)]
pub struct LogAlerter;

impl Alerter for LogAlerter {
    fn alert(&self, alert: &Alert) {
        match alert.kind {
            AlertKind::Success => tracing::info!(title = %alert.title, "{}", alert.message),
            AlertKind::Error => tracing::warn!(title = %alert.title, "{}", alert.message),
        }
    }
}

/// Keeps every alert in memory, for hosts that drain alerts on their own
/// schedule.
#[derive(Debug, Default)]
pub struct QueuedAlerter {
    alerts: Mutex<Vec<Alert>>,
}

impl QueuedAlerter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the alerts raised so far.
    pub fn drain(&self) -> Vec<Alert> {
        match self.alerts.lock() {
            Ok(mut alerts) => std::mem::take(&mut *alerts),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Alerter for QueuedAlerter {
    fn alert(&self, alert: &Alert) {
        match self.alerts.lock() {
            Ok(mut alerts) => alerts.push(alert.clone()),
            Err(poisoned) => poisoned.into_inner().push(alert.clone()),
        }
    }
}

impl<A: Alerter + ?Sized> Alerter for std::sync::Arc<A> {
    fn alert(&self, alert: &Alert) {
        (**self).alert(alert)
    }
}
