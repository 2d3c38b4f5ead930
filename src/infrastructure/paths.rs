//! Filesystem locations.
//!
//! Span logs and the local JSON store live under a per-user data directory.
//! Paths from configuration may start with `~`, which is expanded against the
//! home directory reported by the platform.

use std::path::{Path, PathBuf};

/// Name of the per-user application directory.
const APP_DIR_NAME: &str = "folio";

/// Returns the default data directory.
///
/// Resolves to `<platform data dir>/folio`, e.g. `~/.local/share/folio` on
/// Linux. Falls back to a relative `.folio` directory when the platform
/// reports no data directory.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from(format!(".{APP_DIR_NAME}")),
        |base| base.join(APP_DIR_NAME),
    )
}

/// Data directory to use: `configured` (tilde-expanded) or the default.
#[must_use]
pub fn resolve_data_dir(configured: Option<&Path>) -> PathBuf {
    configured.map_or_else(default_data_dir, expand_tilde)
}

/// Expands a leading `~` to the home directory.
///
/// Paths without a leading `~` component, and all paths when no home
/// directory is known, are returned unchanged.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use folio::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde(Path::new("/srv/folio")), Path::new("/srv/folio"));
/// assert_eq!(expand_tilde(Path::new("data/~")), Path::new("data/~"));
/// ```
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) if rest.as_os_str().is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_expands_against_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_tilde(Path::new("~")), home);
        assert_eq!(expand_tilde(Path::new("~/sites/folio")), home.join("sites/folio"));
    }

    #[test]
    fn non_tilde_paths_are_untouched() {
        assert_eq!(expand_tilde(Path::new("/var/lib/folio")), PathBuf::from("/var/lib/folio"));
        assert_eq!(expand_tilde(Path::new("~user/data")), PathBuf::from("~user/data"));
    }

    #[test]
    fn configured_dir_wins_over_default() {
        assert_eq!(resolve_data_dir(Some(Path::new("/tmp/folio-data"))), PathBuf::from("/tmp/folio-data"));
        assert!(resolve_data_dir(None).ends_with(APP_DIR_NAME));
    }
}
