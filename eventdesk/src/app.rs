//! Composition root: builds every workflow store from one [`Config`] and wires
//! them together.

use crate::catalog::{self, EventLanding, EventRepository, InMemoryEventRepository, SaveError};
use crate::config::Config;
use crate::desk::{
    AttendeeDeskState, DeskAction, DeskEnvironment, DeskReducer, DeskStore, Roster,
    SimulatedMessageGateway,
};
use crate::editor::{EditorEnvironment, EditorReducer, EditorStore, EventEditorState};
use crate::notify::{Notification, Notifier};
use crate::registration::{
    RegistrationAction, RegistrationEnvironment, RegistrationReducer, RegistrationState,
    RegistrationStore, SimulatedRegistrationGateway,
};
use crate::seed;
use crate::session::{
    FileSessionStore, LoginEnvironment, LoginReducer, LoginState, LoginStore, MockAuthenticator,
    Session, SessionError, SessionStore,
};
use crate::settings::{
    FileSettingsRepository, OrganizerSettings, SettingsEnvironment, SettingsReducer,
    SettingsRepository, SettingsState, SettingsStore,
};
use crate::types::{EventId, EventRecord};
use eventdesk_core::environment::{Clock, IdGenerator, SystemClock, UuidGenerator};
use eventdesk_runtime::Store;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Shared services every workflow is built from
#[derive(Clone)]
pub struct EventDesk {
    config: Config,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    notifier: Arc<dyn Notifier>,
    repository: Arc<dyn EventRepository>,
    sessions: Arc<dyn SessionStore>,
    settings: Arc<dyn SettingsRepository>,
}

impl EventDesk {
    /// Production wiring: system clock, UUID ids, the seeded catalog and the session
    /// file named in `config`
    #[must_use]
    pub fn new(config: Config, notifier: Arc<dyn Notifier>) -> Self {
        let sessions = Arc::new(FileSessionStore::new(config.session_path.clone()));
        let settings = Arc::new(FileSettingsRepository::new(config.settings_path.clone()));
        Self {
            config,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
            notifier,
            repository: Arc::new(InMemoryEventRepository::seeded()),
            sessions,
            settings,
        }
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the id generator
    #[must_use]
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Replace the session store
    #[must_use]
    pub fn with_session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Replace the settings repository
    #[must_use]
    pub fn with_settings_repository(mut self, settings: Arc<dyn SettingsRepository>) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the event catalog
    #[must_use]
    pub fn with_repository(mut self, repository: Arc<dyn EventRepository>) -> Self {
        self.repository = repository;
        self
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Event catalog
    #[must_use]
    pub fn repository(&self) -> Arc<dyn EventRepository> {
        Arc::clone(&self.repository)
    }

    /// A fresh sign-in form
    #[must_use]
    pub fn login(&self) -> LoginStore {
        Store::new(
            LoginState::default(),
            LoginReducer::new(),
            LoginEnvironment {
                authenticator: Arc::new(MockAuthenticator::new(self.config.delays.login)),
                sessions: Arc::clone(&self.sessions),
                notifier: Arc::clone(&self.notifier),
            },
        )
    }

    /// A closed registration dialog
    #[must_use]
    pub fn registration(&self) -> RegistrationStore {
        Store::new(
            RegistrationState::default(),
            RegistrationReducer::new(),
            RegistrationEnvironment {
                gateway: Arc::new(SimulatedRegistrationGateway::new(
                    self.config.delays.register,
                    Arc::clone(&self.clock),
                    Arc::clone(&self.ids),
                )),
                notifier: Arc::clone(&self.notifier),
            },
        )
    }

    /// Published events matching `term`, for the public listing
    pub async fn public_events(&self, term: &str) -> Vec<EventRecord> {
        let events = self.repository.list().await;
        catalog::public_search(&events, term)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Landing page of one published event; `None` for drafts and unknown ids
    pub async fn public_event(&self, id: &EventId) -> Option<EventLanding> {
        let record = self.repository.get(id).await?;
        if !record.draft.published {
            tracing::debug!(event_id = %id, "Draft event is not public");
            return None;
        }
        Some(EventLanding::new(record, self.clock.now()))
    }

    /// Open the organizer console for the signed-in user
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SignedOut`] when no session is stored, or the store's
    /// error when the record cannot be read.
    pub async fn console(&self) -> Result<OrganizerConsole, SessionError> {
        OrganizerConsole::start(self.clone()).await
    }

    fn editor(&self, state: EventEditorState) -> EditorStore {
        Store::new(
            state,
            EditorReducer::new(),
            EditorEnvironment {
                ids: Arc::clone(&self.ids),
                repository: Arc::clone(&self.repository),
                notifier: Arc::clone(&self.notifier),
                save_delay: self.config.delays.save,
            },
        )
    }
}

/// Organizer screens, available only with a stored session
pub struct OrganizerConsole {
    services: EventDesk,
    session: Session,
    desk: DeskStore,
    settings: SettingsStore,
    forwarders: Vec<JoinHandle<()>>,
}

impl OrganizerConsole {
    /// Load the session and build the attendee desk
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SignedOut`] when no session is stored.
    pub async fn start(services: EventDesk) -> Result<Self, SessionError> {
        let session = services
            .sessions
            .load()
            .await?
            .ok_or(SessionError::SignedOut)?;
        tracing::info!(user_id = %session.id, name = %session.name, "Organizer console opened");

        let environment = DeskEnvironment::new(
            Arc::clone(&services.clock),
            Arc::new(SimulatedMessageGateway::new(services.config.delays.send)),
            Arc::clone(&services.notifier),
        )
        .with_selection_policy(services.config.selection_policy);
        let desk = Store::new(
            AttendeeDeskState::new(Roster::new(seed::attendees())),
            DeskReducer::new(),
            environment,
        );

        let saved = match services.settings.load().await {
            Ok(saved) => saved.unwrap_or_default(),
            Err(error) => {
                tracing::warn!(%error, "Stored settings unreadable, using defaults");
                OrganizerSettings::default()
            },
        };
        let settings = Store::new(
            SettingsState::new(saved),
            SettingsReducer::new(),
            SettingsEnvironment {
                repository: Arc::clone(&services.settings),
                notifier: Arc::clone(&services.notifier),
            },
        );

        Ok(Self {
            services,
            session,
            desk,
            settings,
            forwarders: Vec::new(),
        })
    }

    /// The signed-in organizer
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The attendee desk
    #[must_use]
    pub const fn desk(&self) -> &DeskStore {
        &self.desk
    }

    /// The settings form
    #[must_use]
    pub const fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Feed every completed registration into the desk roster
    pub fn forward_registrations(&mut self, registrations: &RegistrationStore) {
        let mut actions = registrations.subscribe_actions();
        let desk = self.desk.clone();
        self.forwarders.push(tokio::spawn(async move {
            loop {
                match actions.recv().await {
                    Ok(RegistrationAction::Registered { attendee }) => {
                        tracing::debug!(attendee_id = %attendee.id, "Forwarding registration");
                        if let Err(error) = desk.send(DeskAction::AddAttendee(attendee)).await {
                            tracing::warn!(%error, "Desk stopped accepting registrations");
                            break;
                        }
                    },
                    Ok(_) => {},
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Registration forwarder lagged");
                    },
                    Err(RecvError::Closed) => break,
                }
            }
        }));
    }

    /// Organizer event list filtered by name or location
    pub async fn search_events(&self, term: &str) -> Vec<EventRecord> {
        let events = self.services.repository.list().await;
        catalog::organizer_search(&events, term)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Editor for a brand new event, following the saved event defaults
    pub async fn create_event(&self) -> EditorStore {
        let defaults = self.settings.state(|s| s.saved.event_defaults.clone()).await;
        self.services.editor(EventEditorState::from_defaults(&defaults))
    }

    /// Editor seeded from a saved event
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::NotFound`] for an unknown id.
    pub async fn edit_event(&self, id: &EventId) -> Result<EditorStore, SaveError> {
        let record = self
            .services
            .repository
            .get(id)
            .await
            .ok_or_else(|| SaveError::NotFound(id.clone()))?;
        Ok(self.services.editor(EventEditorState::from_record(record)))
    }

    /// Remove an event from the catalog
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::NotFound`] for an unknown id.
    pub async fn delete_event(&self, id: &EventId) -> Result<EventRecord, SaveError> {
        let removed = self.services.repository.delete(id).await?;
        self.services.notifier.notify(Notification::success(
            "Event deleted",
            "The event has been successfully deleted.",
        ));
        Ok(removed)
    }

    /// Clear the stored session and close the console
    ///
    /// # Errors
    ///
    /// Returns the session store's error if the record cannot be removed.
    pub async fn sign_out(self) -> Result<(), SessionError> {
        for forwarder in &self.forwarders {
            forwarder.abort();
        }
        self.services.sessions.clear().await?;
        tracing::info!(user_id = %self.session.id, "Signed out");
        Ok(())
    }
}

impl Drop for OrganizerConsole {
    fn drop(&mut self) {
        for forwarder in &self.forwarders {
            forwarder.abort();
        }
    }
}
