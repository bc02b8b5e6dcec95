//! Sign-in workflow: `Idle -> Authenticating -> SignedIn`.

use super::{Role, Session, SessionStore};
use crate::notify::{Notification, Notifier, notify_effect};
use eventdesk_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};
use eventdesk_runtime::Store;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Sign-in failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Email/password pair not accepted
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Signed in, but the session could not be kept
    #[error("could not store session: {reason}")]
    SessionNotStored {
        /// Underlying store error
        reason: String,
    },
}

/// Checks credentials
pub trait Authenticator: Send + Sync {
    /// Exchange credentials for a session
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the pair is refused.
    fn authenticate(
        &self,
        email: String,
        password: String,
    ) -> BoxFuture<'static, Result<Session, AuthError>>;
}

/// Authenticator that accepts any credentials as the demo organizer
#[derive(Clone, Copy, Debug, Default)]
pub struct MockAuthenticator {
    delay: Duration,
}

impl MockAuthenticator {
    /// Creates an authenticator that answers after `delay`
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Authenticator for MockAuthenticator {
    fn authenticate(
        &self,
        email: String,
        _password: String,
    ) -> BoxFuture<'static, Result<Session, AuthError>> {
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(Session {
                id: "1".to_string(),
                email,
                name: "John Doe".to_string(),
                role: Role::Organizer,
            })
        })
    }
}

/// Login phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoginPhase {
    /// Form shown
    #[default]
    Idle,
    /// Waiting for the authenticator
    Authenticating,
    /// Session established
    SignedIn,
}

/// Login form state
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginState {
    /// Email field
    pub email: String,
    /// Password field
    pub password: String,
    /// Phase
    pub phase: LoginPhase,
    /// Established session
    pub session: Option<Session>,
    /// Last rejected command or failed sign-in
    pub last_error: Option<String>,
}

impl fmt::Debug for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginState")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phase", &self.phase)
            .field("session", &self.session)
            .field("last_error", &self.last_error)
            .finish()
    }
}

/// Inputs of the login form
#[derive(Clone)]
pub enum LoginAction {
    /// Edit the email
    SetEmail(String),
    /// Edit the password
    SetPassword(String),
    /// Sign in
    Submit,
    /// Authenticator accepted and the session was stored
    Authenticated {
        /// New session
        session: Session,
    },
    /// Sign-in failed
    AuthenticationFailed {
        /// Failure
        error: AuthError,
    },
}

impl fmt::Debug for LoginAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetEmail(email) => f.debug_tuple("SetEmail").field(email).finish(),
            Self::SetPassword(_) => f.debug_tuple("SetPassword").field(&"<redacted>").finish(),
            Self::Submit => f.write_str("Submit"),
            Self::Authenticated { session } => f
                .debug_struct("Authenticated")
                .field("session", session)
                .finish(),
            Self::AuthenticationFailed { error } => f
                .debug_struct("AuthenticationFailed")
                .field("error", error)
                .finish(),
        }
    }
}

/// Environment dependencies for login
#[derive(Clone)]
pub struct LoginEnvironment {
    /// Credential check
    pub authenticator: Arc<dyn Authenticator>,
    /// Where the session is kept
    pub sessions: Arc<dyn SessionStore>,
    /// User-facing notifications
    pub notifier: Arc<dyn Notifier>,
}

/// Reducer for the login form
#[derive(Clone, Debug, Default)]
pub struct LoginReducer;

impl LoginReducer {
    /// Creates a new `LoginReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn reject(state: &mut LoginState, error: &str) -> SmallVec<[Effect<LoginAction>; 4]> {
        tracing::warn!(error, "Login command rejected");
        state.last_error = Some(error.to_string());
        SmallVec::new()
    }
}

impl Reducer for LoginReducer {
    type State = LoginState;
    type Action = LoginAction;
    type Environment = LoginEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            LoginAction::SetEmail(email) => {
                if state.phase != LoginPhase::Authenticating {
                    state.email = email;
                }
                SmallVec::new()
            },
            LoginAction::SetPassword(password) => {
                if state.phase != LoginPhase::Authenticating {
                    state.password = password;
                }
                SmallVec::new()
            },
            LoginAction::Submit => {
                if state.phase == LoginPhase::Authenticating {
                    return SmallVec::new();
                }
                if state.email.trim().is_empty() {
                    return Self::reject(state, "Email is required");
                }
                if state.password.is_empty() {
                    return Self::reject(state, "Password is required");
                }

                tracing::info!(email = %state.email, "Signing in");
                state.phase = LoginPhase::Authenticating;
                state.last_error = None;

                let authenticator = Arc::clone(&env.authenticator);
                let sessions = Arc::clone(&env.sessions);
                let email = state.email.trim().to_string();
                let password = state.password.clone();
                smallvec![async_effect! {
                    let result = match authenticator.authenticate(email, password).await {
                        Ok(session) => sessions
                            .save(session.clone())
                            .await
                            .map(|()| session)
                            .map_err(|e| AuthError::SessionNotStored {
                                reason: e.to_string(),
                            }),
                        Err(error) => Err(error),
                    };
                    Some(match result {
                        Ok(session) => LoginAction::Authenticated { session },
                        Err(error) => LoginAction::AuthenticationFailed { error },
                    })
                }]
            },
            LoginAction::Authenticated { session } => {
                if state.phase != LoginPhase::Authenticating {
                    tracing::warn!(
                        user_id = %session.id,
                        "Sign-in result without a submit in flight"
                    );
                    return SmallVec::new();
                }
                tracing::info!(user_id = %session.id, role = ?session.role, "Signed in");
                state.phase = LoginPhase::SignedIn;
                state.password.clear();
                state.session = Some(session);
                smallvec![notify_effect(
                    &env.notifier,
                    Notification::success("Welcome back!", "You have been successfully signed in."),
                )]
            },
            LoginAction::AuthenticationFailed { error } => {
                if state.phase != LoginPhase::Authenticating {
                    return SmallVec::new();
                }
                tracing::warn!(%error, "Sign-in failed");
                state.phase = LoginPhase::Idle;
                state.last_error = Some(error.to_string());
                smallvec![notify_effect(
                    &env.notifier,
                    Notification::error("Error", "Invalid credentials. Please try again."),
                )]
            },
        }
    }
}

/// Store running the login form
pub type LoginStore = Store<LoginState, LoginAction, LoginEnvironment, LoginReducer>;
