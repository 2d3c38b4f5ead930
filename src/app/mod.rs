//! Application layer: the calling side of the repositories.
//!
//! Presentation sends [`Event`]s to [`handle_event`], which mutates
//! [`AppState`] and returns a re-render flag plus [`Action`]s for the host:
//!
//! ```text
//! Input → Event → handle_event → repository call → toast / route change → (render?, Actions)
//! ```
//!
//! # Modules
//!
//! - [`actions`]: side effects requested from the host
//! - [`handler`]: event processing and write-failure reporting
//! - [`router`]: path to view selection
//! - [`session`]: single-secret admin gate
//! - [`state`]: application state and the presentation snapshot
//! - [`toast`]: notification queue with auto-expiry

pub mod actions;
pub mod handler;
pub mod router;
pub mod session;
pub mod state;
pub mod toast;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use router::{resolve_route, Route, Routes};
pub use session::{AuthStatus, MemorySessionStorage, SessionGate, SessionStorage};
pub use state::{AppState, DashboardSnapshot};
pub use toast::{NotificationQueue, Toast, ToastKind};
