//! Side effects requested by the event handler.
//!
//! [`handle_event`](super::handle_event) mutates [`AppState`](super::AppState)
//! directly for everything it owns. What it cannot do itself, such as changing
//! the address shown by the host, is returned as an [`Action`] for the caller
//! to carry out.

/// Commands for the host that embeds the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replaces the current location with `path`.
    ///
    /// Emitted on login, logout, redirects, and when an unauthenticated
    /// caller attempts an admin operation.
    Navigate {
        path: String,
    },
}

impl Action {
    pub fn navigate(path: impl Into<String>) -> Self {
        Self::Navigate { path: path.into() }
    }
}
