//! User-facing notifications.
//!
//! Workflows never present anything themselves; they hand a [`Notification`] to the
//! injected [`Notifier`] from inside an effect.

use eventdesk_core::async_effect;
use eventdesk_core::effect::Effect;
use std::sync::{Arc, Mutex, PoisonError};

/// Severity of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
}

/// A short title/description message for the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: Level,
    /// Headline
    pub title: String,
    /// Detail line
    pub description: String,
}

impl Notification {
    /// Success notification
    #[must_use]
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Error notification
    #[must_use]
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Delivers notifications to whatever presents them
pub trait Notifier: Send + Sync {
    /// Present one notification
    fn notify(&self, notification: Notification);
}

/// Notifier that writes every notification to the log
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => tracing::info!(
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
            Level::Error => tracing::warn!(
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
        }
    }
}

/// Notifier that keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything notified so far, oldest first
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Titles notified so far, oldest first
    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        self.notifications().into_iter().map(|n| n.title).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

/// Effect that presents `notification` and produces no follow-up action
pub fn notify_effect<A>(notifier: &Arc<dyn Notifier>, notification: Notification) -> Effect<A>
where
    A: Send + 'static,
{
    let notifier = Arc::clone(notifier);
    async_effect! {
        notifier.notify(notification);
        None
    }
}
