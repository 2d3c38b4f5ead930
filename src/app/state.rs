//! Application state and the presentation snapshot.
//!
//! [`AppState`] ties the repositories, the notification queue, and the session
//! gate to the current location. Presentation never reads the repositories
//! directly; it renders a [`DashboardSnapshot`] taken after each handled
//! event.

use std::sync::Arc;

use serde::Serialize;

use super::router::{resolve_route, Route, Routes};
use super::session::{AuthStatus, SessionGate, SessionStorage};
use super::toast::{NotificationQueue, Toast};
use crate::domain::{ContactMessage, Project, SiteContent};
use crate::repository::{MessageRepository, ProjectRepository, SiteContentRepository};
use crate::storage::RemoteStore;
use crate::Config;

/// Central application state container.
///
/// Repositories are shared behind `Arc` so a host can keep driving them from
/// other tasks while the state itself is borrowed by the handler.
#[derive(Debug)]
pub struct AppState {
    pub projects: Arc<ProjectRepository>,
    pub content: Arc<SiteContentRepository>,
    pub messages: Arc<MessageRepository>,
    pub toasts: NotificationQueue,
    pub gate: SessionGate,
    pub routes: Routes,

    /// Current location, after redirects.
    pub path: String,

    /// View selected for `path`.
    pub route: Route,
}

/// Everything presentation needs to render one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub route: Route,
    pub auth: AuthStatus,
    pub projects: Vec<Project>,
    pub projects_loading: bool,

    /// `None` both before the first fetch and when no row exists yet.
    pub content: Option<SiteContent>,
    pub content_loading: bool,

    /// Empty unless the gate is authenticated.
    pub messages: Vec<ContactMessage>,
    pub messages_loading: bool,
    pub toasts: Vec<Toast>,
}

impl AppState {
    /// Builds the state over `store`, with the session marker kept in
    /// `session`.
    ///
    /// The gate starts unresolved and the route is [`Route::Loading`] until
    /// the first [`Event::Mount`](super::Event::Mount).
    pub fn new(config: &Config, store: Arc<dyn RemoteStore>, session: Arc<dyn SessionStorage>) -> Self {
        let routes = Routes {
            admin_path: config.admin_path.clone(),
            login_path: config.login_path.clone(),
        };

        Self {
            projects: Arc::new(ProjectRepository::new(
                Arc::clone(&store),
                &config.projects_table,
                &config.project_bucket,
            )),
            content: Arc::new(SiteContentRepository::new(
                Arc::clone(&store),
                &config.content_table,
                &config.content_bucket,
            )),
            messages: Arc::new(MessageRepository::new(store, &config.messages_table)),
            toasts: NotificationQueue::new(config.toast_ttl()),
            gate: SessionGate::new(session, config.admin_secret.clone()),
            routes,
            path: super::router::ENTRY_PATH.to_string(),
            route: Route::Loading,
        }
    }

    /// Moves to `path` and selects its view.
    ///
    /// A redirect is followed once and the final path returned, so the
    /// caller can update the visible location.
    pub fn navigate(&mut self, path: &str) -> Option<String> {
        self.path = path.to_string();
        self.refresh_route()
    }

    /// Re-selects the view for the current path, e.g. after the gate changed.
    ///
    /// Returns the redirect target if one was followed.
    pub fn refresh_route(&mut self) -> Option<String> {
        let route = resolve_route(&self.path, self.gate.status(), &self.routes);

        if let Route::Redirect { to } = route {
            tracing::debug!(from = %self.path, to = %to, "following redirect");
            self.path.clone_from(&to);
            self.route = resolve_route(&self.path, self.gate.status(), &self.routes);
            return Some(to);
        }

        self.route = route;
        None
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.gate.is_authenticated()
    }

    /// Stops all repositories from applying in-flight results.
    pub fn unmount(&self) {
        self.projects.unmount();
        self.content.unmount();
        self.messages.unmount();
    }

    pub fn mount(&self) {
        self.projects.mount();
        self.content.mount();
        self.messages.mount();
    }

    /// Current view of the whole application.
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        let authenticated = self.is_authenticated();

        DashboardSnapshot {
            route: self.route.clone(),
            auth: self.gate.status(),
            projects: self.projects.projects(),
            projects_loading: self.projects.is_loading(),
            content: self.content.content(),
            content_loading: self.content.is_loading(),
            messages: if authenticated { self.messages.messages() } else { Vec::new() },
            messages_loading: authenticated && self.messages.is_loading(),
            toasts: self.toasts.toasts(),
        }
    }
}
