//! Organizer settings: profile, notification preferences, event defaults and
//! security options, edited as a form and saved as one record.
//!
//! Saved event defaults feed new drafts: `auto_publish` decides whether a new event
//! starts out published.

use crate::json_file;
use crate::notify::{Notification, Notifier, notify_effect};
use eventdesk_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};
use eventdesk_runtime::Store;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Timezones offered for new events
pub const TIMEZONES: [&str; 7] = [
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "Europe/London",
    "Europe/Paris",
    "Asia/Tokyo",
];

/// Allowed default event lengths, in hours
pub const EVENT_DURATIONS: [u32; 5] = [1, 2, 4, 8, 24];

/// Allowed session timeouts, in hours
pub const SESSION_TIMEOUTS: [u32; 5] = [1, 8, 24, 168, 720];

// ============================================================================
// Record
// ============================================================================

/// Organizer profile
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Company or group
    pub organization: String,
    /// Short biography
    pub bio: String,
}

/// Which notifications the organizer wants
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct NotificationPreferences {
    /// Email notifications
    pub email: bool,
    /// Text message notifications
    pub sms: bool,
    /// Reminders before own events
    pub event_reminders: bool,
    /// New registrations and check-ins
    pub attendee_updates: bool,
    /// Product news
    pub marketing: bool,
}

/// Ticket price currency
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US dollar
    #[default]
    Usd,
    /// Euro
    Eur,
    /// Pound sterling
    Gbp,
    /// Canadian dollar
    Cad,
    /// Australian dollar
    Aud,
}

/// Defaults applied to new events
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefaults {
    /// IANA timezone name, one of [`TIMEZONES`]
    pub timezone: String,
    /// Ticket currency
    pub currency: Currency,
    /// Default length, one of [`EVENT_DURATIONS`]
    pub duration_hours: u32,
    /// New events start out published
    pub auto_publish: bool,
}

/// Account security options
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    /// Second factor on sign-in
    pub two_factor: bool,
    /// Idle sign-out, one of [`SESSION_TIMEOUTS`]
    pub session_timeout_hours: u32,
}

/// Everything on the settings page
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerSettings {
    /// Profile
    pub profile: Profile,
    /// Notification preferences
    pub notifications: NotificationPreferences,
    /// New event defaults
    pub event_defaults: EventDefaults,
    /// Security
    pub security: SecuritySettings,
}

impl Default for OrganizerSettings {
    fn default() -> Self {
        Self {
            profile: Profile {
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                email: "john.doe@example.com".to_string(),
                organization: "Event Pro Inc.".to_string(),
                bio: "Experienced event organizer specializing in tech conferences and \
                      corporate events."
                    .to_string(),
            },
            notifications: NotificationPreferences {
                email: true,
                sms: false,
                event_reminders: true,
                attendee_updates: true,
                marketing: false,
            },
            event_defaults: EventDefaults {
                timezone: "America/New_York".to_string(),
                currency: Currency::Usd,
                duration_hours: 2,
                auto_publish: false,
            },
            security: SecuritySettings {
                two_factor: false,
                session_timeout_hours: 24,
            },
        }
    }
}

impl OrganizerSettings {
    /// Problems that block saving, in form order
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let email = self.profile.email.trim();
        if email.is_empty() || !email.contains('@') {
            problems.push("A valid email address is required".to_string());
        }
        if !TIMEZONES.contains(&self.event_defaults.timezone.as_str()) {
            problems.push(format!("Unknown timezone {}", self.event_defaults.timezone));
        }
        if !EVENT_DURATIONS.contains(&self.event_defaults.duration_hours) {
            problems.push(format!(
                "Unsupported event duration of {} hours",
                self.event_defaults.duration_hours
            ));
        }
        if !SESSION_TIMEOUTS.contains(&self.security.session_timeout_hours) {
            problems.push(format!(
                "Unsupported session timeout of {} hours",
                self.security.session_timeout_hours
            ));
        }
        problems
    }
}

// ============================================================================
// Persistence
// ============================================================================

/// Settings persistence failures
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Reading or writing the settings file failed
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file does not hold a valid record
    #[error("malformed settings record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Keeps the organizer's settings record
pub trait SettingsRepository: Send + Sync {
    /// Stored settings, `None` before the first save
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if a stored record cannot be read.
    fn load(&self) -> BoxFuture<'static, Result<Option<OrganizerSettings>, SettingsError>>;

    /// Replace the stored settings
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the record cannot be written.
    fn save(&self, settings: OrganizerSettings) -> BoxFuture<'static, Result<(), SettingsError>>;
}

/// Settings kept as a JSON file
#[derive(Clone, Debug)]
pub struct FileSettingsRepository {
    path: PathBuf,
}

impl FileSettingsRepository {
    /// Repository backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsRepository for FileSettingsRepository {
    fn load(&self) -> BoxFuture<'static, Result<Option<OrganizerSettings>, SettingsError>> {
        let path = self.path.clone();
        Box::pin(async move { json_file::read(&path).await })
    }

    fn save(&self, settings: OrganizerSettings) -> BoxFuture<'static, Result<(), SettingsError>> {
        let path = self.path.clone();
        Box::pin(async move {
            json_file::write::<_, SettingsError>(&path, &settings).await?;
            tracing::debug!(path = %path.display(), "Settings saved");
            Ok(())
        })
    }
}

/// In-memory settings, optionally failing every save
#[derive(Clone, Debug, Default)]
pub struct MemorySettingsRepository {
    stored: Arc<Mutex<Option<OrganizerSettings>>>,
    read_only: bool,
}

impl MemorySettingsRepository {
    /// Empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository whose saves fail with a permission error
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// Last saved settings
    #[must_use]
    pub fn stored(&self) -> Option<OrganizerSettings> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SettingsRepository for MemorySettingsRepository {
    fn load(&self) -> BoxFuture<'static, Result<Option<OrganizerSettings>, SettingsError>> {
        let stored = self.stored();
        Box::pin(async move { Ok(stored) })
    }

    fn save(&self, settings: OrganizerSettings) -> BoxFuture<'static, Result<(), SettingsError>> {
        if self.read_only {
            let error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
            return Box::pin(async move { Err(error.into()) });
        }
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(settings);
        Box::pin(async { Ok(()) })
    }
}

// ============================================================================
// Form workflow
// ============================================================================

/// Settings form phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SettingsPhase {
    /// Form open
    #[default]
    Editing,
    /// Waiting for the repository
    Saving,
}

/// Settings form state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsState {
    /// Values shown in the form
    pub form: OrganizerSettings,
    /// Last successfully saved values
    pub saved: OrganizerSettings,
    /// Phase
    pub phase: SettingsPhase,
    /// Last rejected save or failure
    pub last_error: Option<String>,
}

impl SettingsState {
    /// Form showing `settings` as saved
    #[must_use]
    pub fn new(settings: OrganizerSettings) -> Self {
        Self {
            form: settings.clone(),
            saved: settings,
            ..Self::default()
        }
    }

    /// Returns `true` when the form differs from the saved values
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.form != self.saved
    }
}

/// Inputs of the settings form
#[derive(Clone, Debug)]
pub enum SettingsAction {
    /// Replace the profile section
    UpdateProfile(Profile),
    /// Replace the notification section
    UpdateNotifications(NotificationPreferences),
    /// Replace the event defaults section
    UpdateEventDefaults(EventDefaults),
    /// Replace the security section
    UpdateSecurity(SecuritySettings),
    /// Drop unsaved changes
    Revert,
    /// Validate and store
    Save,
    /// Repository accepted the settings
    Saved {
        /// Stored values
        settings: OrganizerSettings,
    },
    /// Repository refused the settings
    SaveFailed {
        /// Failure description
        reason: String,
    },
}

/// Environment dependencies for the settings form
#[derive(Clone)]
pub struct SettingsEnvironment {
    /// Where settings are kept
    pub repository: Arc<dyn SettingsRepository>,
    /// User-facing notifications
    pub notifier: Arc<dyn Notifier>,
}

/// Reducer for the settings form
#[derive(Clone, Copy, Debug, Default)]
pub struct SettingsReducer;

impl SettingsReducer {
    /// Creates a new `SettingsReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for SettingsReducer {
    type State = SettingsState;
    type Action = SettingsAction;
    type Environment = SettingsEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if state.phase == SettingsPhase::Saving
            && !matches!(
                action,
                SettingsAction::Saved { .. } | SettingsAction::SaveFailed { .. }
            )
        {
            tracing::debug!("Ignoring settings input while saving");
            return SmallVec::new();
        }

        match action {
            SettingsAction::UpdateProfile(profile) => state.form.profile = profile,
            SettingsAction::UpdateNotifications(notifications) => {
                state.form.notifications = notifications;
            },
            SettingsAction::UpdateEventDefaults(defaults) => state.form.event_defaults = defaults,
            SettingsAction::UpdateSecurity(security) => state.form.security = security,
            SettingsAction::Revert => {
                state.form = state.saved.clone();
                state.last_error = None;
            },
            SettingsAction::Save => {
                let problems = state.form.problems();
                if !problems.is_empty() {
                    let error = problems.join("; ");
                    tracing::warn!(%error, "Settings rejected");
                    state.last_error = Some(error);
                    return SmallVec::new();
                }

                state.phase = SettingsPhase::Saving;
                state.last_error = None;
                let repository = Arc::clone(&env.repository);
                let settings = state.form.clone();
                return smallvec![async_effect! {
                    Some(match repository.save(settings.clone()).await {
                        Ok(()) => SettingsAction::Saved { settings },
                        Err(error) => SettingsAction::SaveFailed {
                            reason: error.to_string(),
                        },
                    })
                }];
            },
            SettingsAction::Saved { settings } => {
                if state.phase != SettingsPhase::Saving {
                    return SmallVec::new();
                }
                tracing::info!(
                    auto_publish = settings.event_defaults.auto_publish,
                    "Settings saved"
                );
                state.phase = SettingsPhase::Editing;
                state.saved = settings;
                return smallvec![notify_effect(
                    &env.notifier,
                    Notification::success(
                        "Settings saved",
                        "Your settings have been updated successfully.",
                    ),
                )];
            },
            SettingsAction::SaveFailed { reason } => {
                if state.phase != SettingsPhase::Saving {
                    return SmallVec::new();
                }
                tracing::warn!(%reason, "Settings save failed");
                state.phase = SettingsPhase::Editing;
                state.last_error = Some(reason);
                return smallvec![notify_effect(
                    &env.notifier,
                    Notification::error("Error", "Failed to save settings. Please try again."),
                )];
            },
        }
        SmallVec::new()
    }
}

/// Store running the settings form
pub type SettingsStore = Store<SettingsState, SettingsAction, SettingsEnvironment, SettingsReducer>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use eventdesk_testing::{ReducerTest, assertions};

    fn test_env() -> SettingsEnvironment {
        SettingsEnvironment {
            repository: Arc::new(MemorySettingsRepository::new()),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    fn defaults_with(auto_publish: bool) -> EventDefaults {
        EventDefaults {
            auto_publish,
            ..OrganizerSettings::default().event_defaults
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = OrganizerSettings::default();
        assert!(settings.problems().is_empty());
        assert!(!settings.event_defaults.auto_publish);
        assert_eq!(settings.security.session_timeout_hours, 24);
    }

    #[test]
    fn test_json_uses_camel_case_and_currency_codes() {
        let json = serde_json::to_value(OrganizerSettings::default()).unwrap();
        assert_eq!(json["profile"]["firstName"], "John");
        assert_eq!(json["eventDefaults"]["autoPublish"], false);
        assert_eq!(json["eventDefaults"]["currency"], "USD");
        assert_eq!(json["security"]["sessionTimeoutHours"], 24);
    }

    #[test]
    fn test_save_rejects_invalid_form() {
        let mut bad = OrganizerSettings::default();
        bad.profile.email = "john".to_string();
        bad.event_defaults.timezone = "Mars/Olympus".to_string();

        ReducerTest::new(SettingsReducer::new())
            .with_env(test_env())
            .given_state(SettingsState::default())
            .when_action(SettingsAction::UpdateProfile(bad.profile))
            .when_action(SettingsAction::UpdateEventDefaults(bad.event_defaults))
            .when_action(SettingsAction::Save)
            .then_state(|state| {
                assert_eq!(state.phase, SettingsPhase::Editing);
                assert_eq!(
                    state.last_error.as_deref(),
                    Some("A valid email address is required; Unknown timezone Mars/Olympus")
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_save_starts_write() {
        ReducerTest::new(SettingsReducer::new())
            .with_env(test_env())
            .given_state(SettingsState::default())
            .when_action(SettingsAction::UpdateEventDefaults(defaults_with(true)))
            .when_action(SettingsAction::Save)
            .then_state(|state| {
                assert_eq!(state.phase, SettingsPhase::Saving);
                assert!(state.is_dirty());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_input_ignored_while_saving() {
        let state = SettingsState {
            phase: SettingsPhase::Saving,
            ..SettingsState::default()
        };
        ReducerTest::new(SettingsReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(SettingsAction::UpdateEventDefaults(defaults_with(true)))
            .then_state(|state| assert!(!state.form.event_defaults.auto_publish))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_saved_updates_saved_values() {
        let mut settings = OrganizerSettings::default();
        settings.event_defaults.auto_publish = true;
        let state = SettingsState {
            form: settings.clone(),
            phase: SettingsPhase::Saving,
            ..SettingsState::default()
        };

        ReducerTest::new(SettingsReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(SettingsAction::Saved { settings })
            .then_state(|state| {
                assert_eq!(state.phase, SettingsPhase::Editing);
                assert!(state.saved.event_defaults.auto_publish);
                assert!(!state.is_dirty());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_revert_drops_unsaved_changes() {
        ReducerTest::new(SettingsReducer::new())
            .with_env(test_env())
            .given_state(SettingsState::default())
            .when_action(SettingsAction::UpdateSecurity(SecuritySettings {
                two_factor: true,
                session_timeout_hours: 8,
            }))
            .when_action(SettingsAction::Revert)
            .then_state(|state| {
                assert!(!state.is_dirty());
                assert!(!state.form.security.two_factor);
            })
            .run();
    }

    #[tokio::test]
    async fn test_file_repository_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("settings.json");
        let repository = FileSettingsRepository::new(path);
        assert!(repository.load().await.unwrap().is_none());

        let mut settings = OrganizerSettings::default();
        settings.event_defaults.currency = Currency::Eur;
        repository.save(settings.clone()).await.unwrap();
        assert_eq!(repository.load().await.unwrap(), Some(settings));
    }
}
