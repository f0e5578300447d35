//! Notification dispatch.
//!
//! Every alert the monitor raises goes through [`Dispatcher`], which applies
//! the delivery contract:
//! - an in-app toast is always shown
//! - a system notification is shown only when the user enabled it and the
//!   platform granted permission
//! - a chime plays only when sound is enabled
//!
//! Delivery is fire-and-forget. A failed system notification is logged and
//! otherwise ignored.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// User-controlled preference flags. The three flags are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_true")]
    pub notifications: bool,
    #[serde(default = "default_true")]
    pub sound: bool,
    /// Night mode: suppresses the rotating health tips.
    #[serde(default)]
    pub reduced_alerts: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            notifications: true,
            sound: true,
            reduced_alerts: false,
        }
    }
}

/// Platform answer to a notification permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not asked yet.
    Default,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BreakReminder,
    LowBlinkRate,
    HealthTip,
    Fatigue,
    Drowsiness,
    Camera,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub severity: Severity,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        severity: Severity,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Which channels a notification actually reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub toast: bool,
    pub system: bool,
    pub chime: bool,
}

/// Output capabilities of the host.
pub trait Notifier: Send {
    /// Ask the platform for permission to show system notifications.
    fn request_permission(&mut self) -> Permission;

    /// Transient in-app message.
    fn toast(&mut self, notification: &Notification);

    /// System-level notification.
    fn system(&mut self, notification: &Notification) -> Result<()>;

    /// Short audible tone.
    fn chime(&mut self);
}

pub struct Dispatcher {
    notifier: Box<dyn Notifier>,
    permission: Permission,
}

impl Dispatcher {
    pub fn new(notifier: Box<dyn Notifier>) -> Self {
        Self {
            notifier,
            permission: Permission::Default,
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Ask for permission. Only the first call reaches the notifier.
    pub fn request_permission(&mut self) -> Permission {
        if self.permission == Permission::Default {
            self.permission = self.notifier.request_permission();
            tracing::info!(permission = ?self.permission, "notification permission resolved");
        }
        self.permission
    }

    /// Standard delivery: toast, system iff enabled and permitted, chime iff
    /// sound is on.
    pub fn notify(&mut self, notification: &Notification, prefs: &Preferences) -> Delivery {
        let mut delivery = self.toast(notification);
        if prefs.notifications {
            delivery.system = self.try_system(notification);
        }
        if prefs.sound {
            self.notifier.chime();
            delivery.chime = true;
        }
        delivery
    }

    /// Urgent delivery for fatigue alerts: toast plus a system notification
    /// whenever permission is granted, regardless of the preference flag.
    /// No chime.
    pub fn alert(&mut self, notification: &Notification) -> Delivery {
        let mut delivery = self.toast(notification);
        delivery.system = self.try_system(notification);
        delivery
    }

    /// In-app message only.
    pub fn toast(&mut self, notification: &Notification) -> Delivery {
        self.notifier.toast(notification);
        Delivery {
            toast: true,
            ..Delivery::default()
        }
    }

    fn try_system(&mut self, notification: &Notification) -> bool {
        if self.permission != Permission::Granted {
            return false;
        }
        match self.notifier.system(notification) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, kind = ?notification.kind, "system notification failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

/// Notifier that only writes to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier {
    pub permission: Option<Permission>,
}

impl Notifier for TracingNotifier {
    fn request_permission(&mut self) -> Permission {
        self.permission.unwrap_or(Permission::Denied)
    }

    fn toast(&mut self, notification: &Notification) {
        tracing::info!(title = %notification.title, body = %notification.body, "toast");
    }

    fn system(&mut self, notification: &Notification) -> Result<()> {
        tracing::info!(title = %notification.title, "system notification");
        Ok(())
    }

    fn chime(&mut self) {
        tracing::debug!("chime");
    }
}

/// A single recorded output call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    Toast(Notification),
    System(Notification),
    Chime,
}

/// Notifier that records every call into a shared log. Clones share the log.
#[derive(Debug, Clone)]
pub struct RecordingNotifier {
    permission: Permission,
    fail_system: bool,
    log: Arc<Mutex<Vec<Delivered>>>,
}

impl RecordingNotifier {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            fail_system: false,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every system notification fail, as if permission was revoked.
    pub fn failing_system(mut self) -> Self {
        self.fail_system = true;
        self
    }

    pub fn delivered(&self) -> Vec<Delivered> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn toasts(&self) -> Vec<Notification> {
        self.delivered()
            .into_iter()
            .filter_map(|d| match d {
                Delivered::Toast(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    fn push(&self, entry: Delivered) {
        if let Ok(mut log) = self.log.lock() {
            log.push(entry);
        }
    }
}

impl Notifier for RecordingNotifier {
    fn request_permission(&mut self) -> Permission {
        self.permission
    }

    fn toast(&mut self, notification: &Notification) {
        self.push(Delivered::Toast(notification.clone()));
    }

    fn system(&mut self, notification: &Notification) -> Result<()> {
        if self.fail_system {
            return Err(crate::error::PermissionError::Notifications.into());
        }
        self.push(Delivered::System(notification.clone()));
        Ok(())
    }

    fn chime(&mut self) {
        self.push(Delivered::Chime);
    }
}
