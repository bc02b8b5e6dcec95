//! EventDesk walk-through.
//!
//! Signs in, edits an event, saves organizer settings, registers a guest and runs the
//! attendee desk, logging every step. Delays come from the `EVENTDESK_*_DELAY_MS` variables.

use eventdesk::desk::EventFilter;
use eventdesk::editor::EditorPhase;
use eventdesk::registration::RegistrationPhase;
use eventdesk::session::{LoginAction, LoginPhase};
use eventdesk::{
    AttendeeId, Config, DeskAction, EditorAction, EventDesk, EventId, MessageChannel,
    MessageTemplate, RegistrationAction, SettingsAction, TicketTypeId, TracingNotifier,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upper bound for any one simulated step
const STEP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventdesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        session_path = %config.session_path.display(),
        settings_path = %config.settings_path.display(),
        selection_policy = ?config.selection_policy,
        "Configuration loaded"
    );

    let app = EventDesk::new(config, Arc::new(TracingNotifier));

    // Sign in
    let login = app.login();
    login
        .send(LoginAction::SetEmail("john@example.com".to_string()))
        .await?;
    login
        .send(LoginAction::SetPassword("password".to_string()))
        .await?;
    login
        .send_and_wait_for(
            LoginAction::Submit,
            |a| {
                matches!(
                    a,
                    LoginAction::Authenticated { .. } | LoginAction::AuthenticationFailed { .. }
                )
            },
            STEP_TIMEOUT,
        )
        .await?;
    if login.state(|s| s.phase).await != LoginPhase::SignedIn {
        return Err("sign-in failed".into());
    }

    let mut console = app.console().await?;
    info!(organizer = %console.session().name, "Signed in");

    // Publish the draft event
    let editor = console.edit_event(&EventId::new("2")).await?;
    editor.send(EditorAction::SetPublished(true)).await?;
    editor.send(EditorAction::AddTag("product".to_string())).await?;
    editor
        .send_and_wait_for(
            EditorAction::Submit,
            |a| matches!(a, EditorAction::Saved { .. } | EditorAction::SaveFailed { .. }),
            STEP_TIMEOUT,
        )
        .await?;
    editor.wait_idle(STEP_TIMEOUT).await?;
    info!(
        phase = ?editor.state(|s| s.phase).await,
        matching = console.search_events("launch").await.len(),
        "Event editor finished"
    );
    if editor.state(|s| s.phase).await != EditorPhase::Saved {
        return Err("event save failed".into());
    }

    // New events start out published from now on
    let settings = console.settings().clone();
    let mut defaults = settings.state(|s| s.form.event_defaults.clone()).await;
    defaults.auto_publish = true;
    settings
        .send(SettingsAction::UpdateEventDefaults(defaults))
        .await?;
    settings
        .send_and_wait_for(
            SettingsAction::Save,
            |a| matches!(a, SettingsAction::Saved { .. } | SettingsAction::SaveFailed { .. }),
            STEP_TIMEOUT,
        )
        .await?;
    let draft = console.create_event().await;
    info!(
        published = draft.state(|s| s.draft.published).await,
        "New draft follows the event defaults"
    );

    // Public registration, forwarded into the desk roster
    let registration = app.registration();
    console.forward_registrations(&registration);
    let listing = app.public_events("").await;
    info!(published = listing.len(), "Public listing");
    if let Some(event) = listing.into_iter().next() {
        if let Some(landing) = app.public_event(&event.id).await {
            info!(
                event = %landing.record.draft.name,
                price = %landing.price_label,
                starts_in_days = landing.countdown.map_or(0, |c| c.days),
                "Event landing page"
            );
        }
        registration.send(RegistrationAction::Open { event }).await?;
        for action in [
            RegistrationAction::SelectTicket(TicketTypeId::new("1")),
            RegistrationAction::SetFirstName("Ada".to_string()),
            RegistrationAction::SetLastName("Lovelace".to_string()),
            RegistrationAction::SetEmail("ada@example.com".to_string()),
            RegistrationAction::SetPhone("555-0100".to_string()),
        ] {
            registration.send(action).await?;
        }
        registration
            .send_and_wait_for(
                RegistrationAction::Submit,
                |a| {
                    matches!(
                        a,
                        RegistrationAction::Registered { .. }
                            | RegistrationAction::RegistrationFailed { .. }
                    )
                },
                STEP_TIMEOUT,
            )
            .await?;
        if registration.state(|s| s.phase).await != RegistrationPhase::Closed {
            info!("Registration did not complete");
        }
    }

    // Attendee desk
    let desk = console.desk().clone();
    desk.wait_idle(STEP_TIMEOUT).await?;
    desk.send(DeskAction::SetEventFilter(EventFilter::from(
        "Tech Conference 2024",
    )))
    .await?;
    desk.send(DeskAction::CheckIn {
        id: AttendeeId::new("2"),
    })
    .await?;
    desk.send(DeskAction::SelectAll { checked: true }).await?;
    desk.send(DeskAction::OpenBulkMessage).await?;
    desk.send(DeskAction::SetChannel(MessageChannel::Email))
        .await?;
    desk.send(DeskAction::ApplyTemplate(MessageTemplate::Reminder))
        .await?;
    desk.send_and_wait_for(
        DeskAction::SendBulkMessage,
        |a| matches!(a, DeskAction::MessagesSent { .. } | DeskAction::DeliveryFailed { .. }),
        STEP_TIMEOUT,
    )
    .await?;
    desk.wait_idle(STEP_TIMEOUT).await?;

    let (roster, checked_in, visible) = desk
        .state(|s| {
            (
                s.roster.len(),
                s.roster.iter().filter(|a| a.check_in.is_checked_in()).count(),
                s.visible().len(),
            )
        })
        .await;
    info!(roster, checked_in, visible, "Desk summary");

    console.sign_out().await?;
    for store_shutdown in [
        login.shutdown(STEP_TIMEOUT).await,
        registration.shutdown(STEP_TIMEOUT).await,
        editor.shutdown(STEP_TIMEOUT).await,
        settings.shutdown(STEP_TIMEOUT).await,
        desk.shutdown(STEP_TIMEOUT).await,
    ] {
        store_shutdown?;
    }
    info!("Walk-through complete");
    Ok(())
}
