//! Path-based selection of the top-level view.
//!
//! Only "which view is active" is decided here. The admin view requires an
//! authenticated gate; the login view redirects to the admin view once the
//! gate is authenticated; every other path shows the public portfolio. While
//! the gate is still resolving no decision is made at all.

use serde::{Deserialize, Serialize};

use super::session::AuthStatus;

/// Default path of the admin dashboard.
pub const DEFAULT_ADMIN_PATH: &str = "/admin";

/// Default path of the login view.
pub const DEFAULT_LOGIN_PATH: &str = "/login-55";

/// Entry path shown after logout.
pub const ENTRY_PATH: &str = "/";

/// Configured paths of the gated views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routes {
    pub admin_path: String,
    pub login_path: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            admin_path: DEFAULT_ADMIN_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

/// Top-level view for a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum Route {
    /// The session gate has not settled yet.
    Loading,
    /// Public portfolio.
    Portfolio,
    /// Password prompt.
    Login,
    /// Admin dashboard.
    Admin,
    /// The path must be replaced by `to` before rendering.
    Redirect { to: String },
}

/// Maps `path` to a view given the gate status.
///
/// Paths are matched exactly; a trailing slash or query string selects the
/// portfolio.
#[must_use]
pub fn resolve_route(path: &str, status: AuthStatus, routes: &Routes) -> Route {
    let authenticated = match status {
        AuthStatus::Resolving => return Route::Loading,
        AuthStatus::Anonymous => false,
        AuthStatus::Authenticated => true,
    };

    if path == routes.admin_path {
        if authenticated { Route::Admin } else { Route::Login }
    } else if path == routes.login_path {
        if authenticated {
            Route::Redirect {
                to: routes.admin_path.clone(),
            }
        } else {
            Route::Login
        }
    } else {
        Route::Portfolio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolving_gate_yields_loading_everywhere() {
        let routes = Routes::default();
        for path in ["/", "/admin", "/login-55"] {
            assert_eq!(resolve_route(path, AuthStatus::Resolving, &routes), Route::Loading);
        }
    }

    #[test]
    fn admin_requires_authentication() {
        let routes = Routes::default();
        assert_eq!(resolve_route("/admin", AuthStatus::Anonymous, &routes), Route::Login);
        assert_eq!(resolve_route("/admin", AuthStatus::Authenticated, &routes), Route::Admin);
    }

    #[test]
    fn login_redirects_once_authenticated() {
        let routes = Routes::default();
        assert_eq!(resolve_route("/login-55", AuthStatus::Anonymous, &routes), Route::Login);
        assert_eq!(
            resolve_route("/login-55", AuthStatus::Authenticated, &routes),
            Route::Redirect { to: "/admin".into() }
        );
    }

    #[test]
    fn unknown_paths_show_portfolio() {
        let routes = Routes::default();
        assert_eq!(resolve_route("/", AuthStatus::Authenticated, &routes), Route::Portfolio);
        assert_eq!(resolve_route("/login", AuthStatus::Anonymous, &routes), Route::Portfolio);
        assert_eq!(resolve_route("/admin/", AuthStatus::Authenticated, &routes), Route::Portfolio);
    }

    #[test]
    fn custom_paths_are_honored() {
        let routes = Routes {
            admin_path: "/dashboard".into(),
            login_path: "/sign-in".into(),
        };
        assert_eq!(resolve_route("/dashboard", AuthStatus::Authenticated, &routes), Route::Admin);
        assert_eq!(resolve_route("/admin", AuthStatus::Authenticated, &routes), Route::Portfolio);
        assert_eq!(resolve_route("/sign-in", AuthStatus::Anonymous, &routes), Route::Login);
    }
}
