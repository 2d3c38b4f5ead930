//! Event handling: the "calling view" of the repositories.
//!
//! Presentation turns user input into [`Event`]s. [`handle_event`] checks
//! preconditions, drives the matching repository operation, and reports the
//! outcome through the notification queue:
//!
//! ```text
//! Event ──► precondition / admin check ──► repository call ──► toast ──► (re-render, actions)
//!                   │ fails: error toast or redirect, no network call
//! ```
//!
//! Read paths never produce toasts; they degrade to empty state inside the
//! repositories. Every failed write produces an error toast carrying the
//! underlying error's description.

use std::fmt::Display;

use crate::app::router::ENTRY_PATH;
use crate::app::{Action, AppState};
use crate::domain::error::{FolioError, Result};
use crate::domain::{ImageFile, NewMessage, NewProject, SiteContent};

/// Inputs from presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The application became visible: resolve the gate and load data.
    Mount,
    /// The application is going away; in-flight results are discarded.
    Unmount,
    Navigate {
        path: String,
    },
    /// Password submitted on the login view.
    Login {
        password: String,
    },
    Logout,

    /// Admin: create a project. `image` is required; `None` is rejected
    /// before any network call.
    AddProject {
        project: NewProject,
        image: Option<ImageFile>,
    },
    /// Admin: delete a project and its image.
    DeleteProject {
        id: String,
    },
    /// Admin: save the site content, optionally replacing the about image.
    SaveContent {
        content: SiteContent,
        image: Option<ImageFile>,
    },
    /// Admin: delete a contact message.
    DeleteMessage {
        id: String,
    },

    /// Public contact form submission.
    SubmitMessage {
        message: NewMessage,
    },
    DismissToast {
        id: u64,
    },
}

impl Event {
    /// Whether the event needs an authenticated gate.
    #[must_use]
    pub const fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::AddProject { .. } | Self::DeleteProject { .. } | Self::SaveContent { .. } | Self::DeleteMessage { .. }
        )
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Mount => "mount",
            Self::Unmount => "unmount",
            Self::Navigate { .. } => "navigate",
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::AddProject { .. } => "add_project",
            Self::DeleteProject { .. } => "delete_project",
            Self::SaveContent { .. } => "save_content",
            Self::DeleteMessage { .. } => "delete_message",
            Self::SubmitMessage { .. } => "submit_message",
            Self::DismissToast { .. } => "dismiss_toast",
        }
    }
}

/// Processes an event and returns whether to re-render plus the actions the
/// host must carry out.
///
/// # Errors
///
/// Write failures are reported as error toasts and do not make this call
/// fail.
#[allow(clippy::too_many_lines)]
#[tracing::instrument(level = "debug", skip_all, fields(event_type = event.name()))]
pub async fn handle_event(state: &mut AppState, event: Event) -> Result<(bool, Vec<Action>)> {
    if event.requires_admin() && !state.is_authenticated() {
        tracing::warn!(event_type = event.name(), "admin operation refused, not authenticated");
        let login = state.routes.login_path.clone();
        state.navigate(&login);
        return Ok((true, vec![Action::navigate(login)]));
    }

    match event {
        Event::Mount => {
            state.mount();
            state.gate.resolve();
            let actions = redirect_action(state.refresh_route());

            tokio::join!(state.projects.list(), state.content.fetch());
            if state.is_authenticated() {
                state.messages.list().await;
            }

            Ok((true, actions))
        }
        Event::Unmount => {
            state.unmount();
            Ok((false, vec![]))
        }
        Event::Navigate { path } => {
            let redirect = state.navigate(&path);
            Ok((true, redirect_action(redirect)))
        }
        Event::Login { password } => {
            if !state.gate.login(&password) {
                state.toasts.error("Incorrect password, try again");
                return Ok((true, vec![]));
            }

            let admin = state.routes.admin_path.clone();
            state.navigate(&admin);
            state.messages.list().await;
            Ok((true, vec![Action::navigate(admin)]))
        }
        Event::Logout => {
            state.gate.logout();
            state.navigate(ENTRY_PATH);
            Ok((true, vec![Action::navigate(ENTRY_PATH)]))
        }
        Event::AddProject { project, image } => {
            let Some(image) = image else {
                tracing::debug!(title = %project.title, "project submitted without image");
                report(state, "Could not add project", &FolioError::MissingImage);
                return Ok((true, vec![]));
            };

            match state.projects.add(project, image).await {
                Ok(created) => {
                    tracing::info!(project_id = %created.id, "project added");
                    state.toasts.success("Project added");
                }
                Err(e) => report(state, "Could not add project", &e),
            }
            Ok((true, vec![]))
        }
        Event::DeleteProject { id } => {
            match state.projects.delete(&id).await {
                Ok(()) => {
                    tracing::info!(project_id = %id, "project deleted");
                    state.toasts.success("Project deleted");
                }
                Err(e) => report(state, "Could not delete project", &e),
            }
            Ok((true, vec![]))
        }
        Event::SaveContent { content, image } => {
            match state.content.update(content, image).await {
                Ok(_) => {
                    tracing::info!("site content saved");
                    state.toasts.success("Content saved");
                }
                Err(e) => report(state, "Could not save content", &e),
            }
            Ok((true, vec![]))
        }
        Event::DeleteMessage { id } => {
            match state.messages.delete(&id).await {
                Ok(()) => {
                    state.toasts.success("Message deleted");
                }
                Err(e) => report(state, "Could not delete message", &e),
            }
            Ok((true, vec![]))
        }
        Event::SubmitMessage { message } => {
            match state.messages.submit(message).await {
                Ok(stored) => {
                    tracing::info!(message_id = %stored.id, "contact message received");
                    state.toasts.success("Message sent");
                }
                Err(e) => report(state, "Could not send message", &e),
            }
            Ok((true, vec![]))
        }
        Event::DismissToast { id } => {
            state.toasts.remove(id);
            Ok((true, vec![]))
        }
    }
}

fn redirect_action(redirect: Option<String>) -> Vec<Action> {
    redirect.map(Action::navigate).into_iter().collect()
}

fn report(state: &AppState, context: &str, error: &impl Display) {
    tracing::error!(error = %error, "{context}");
    state.toasts.error(format!("{context}: {error}"));
}
