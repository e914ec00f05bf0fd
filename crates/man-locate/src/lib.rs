//! # man-locate
//!
//! Environment discovery for `fetchman`: find the manual-page renderer on
//! the executable search path and resolve the per-user cache directory the
//! converted pages are written to.
//!
//! Both lookups are cheap and side-effect free. Nothing here creates
//! directories or spawns processes; callers decide when to do that.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use man_locate::{fetchman_cache_dir, locate_renderer, DEFAULT_RENDERER};
//!
//! let man = locate_renderer(DEFAULT_RENDERER).expect("man is not installed");
//! let cache = fetchman_cache_dir().expect("no cache directory");
//! println!("{} -> {}", man.display(), cache.display());
//! ```
//!
//! ## Default locations
//!
//! | OS      | Cache directory                          |
//! |---------|------------------------------------------|
//! | Linux   | `$XDG_CACHE_HOME/fetchman` or `~/.cache/fetchman` |
//! | macOS   | `~/Library/Caches/fetchman`              |
//! | Windows | `%LOCALAPPDATA%\fetchman`                |
//!
//! ## Environment variable overrides
//!
//! - `FETCHMAN_CACHE_DIR` — use this directory instead of the default.

use std::path::{Path, PathBuf};

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Renderer program looked up when nothing else is configured.
pub const DEFAULT_RENDERER: &str = "man";

/// Directory name created under the user cache directory.
pub const APP_DIR_NAME: &str = "fetchman";

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "FETCHMAN_CACHE_DIR";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by man-locate lookups.
#[derive(Error, Debug)]
pub enum LocateError {
    /// The renderer program is not on the executable search path.
    #[error("'{program}' command not found in PATH: {reason}")]
    NotFound { program: String, reason: String },

    /// Neither the platform nor `$HOME` yields a cache directory.
    #[error("Could not determine a user cache directory (set {CACHE_DIR_ENV})")]
    NoCacheDir,
}

// ── Renderer lookup ──────────────────────────────────────────────────────────

/// Resolves `program` to an executable path.
///
/// Bare names are searched on `PATH`; names containing a path separator are
/// checked directly.
pub fn locate_renderer(program: &str) -> Result<PathBuf, LocateError> {
    if program.trim().is_empty() {
        return Err(LocateError::NotFound {
            program: program.to_string(),
            reason: "empty program name".to_string(),
        });
    }

    which::which(program).map_err(|e| LocateError::NotFound {
        program: program.to_string(),
        reason: e.to_string(),
    })
}

// ── Cache directory resolution ───────────────────────────────────────────────

/// Returns the directory `fetchman` writes converted pages to.
///
/// `FETCHMAN_CACHE_DIR` is used verbatim when set; otherwise
/// `<user-cache-dir>/fetchman`.
pub fn fetchman_cache_dir() -> Result<PathBuf, LocateError> {
    let override_dir = std::env::var_os(CACHE_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    resolve_cache_dir(override_dir, dirs::cache_dir(), dirs::home_dir())
}

fn resolve_cache_dir(
    override_dir: Option<PathBuf>,
    platform_cache: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf, LocateError> {
    if let Some(dir) = override_dir {
        return Ok(dir);
    }

    platform_cache
        .or_else(|| home.map(|h| h.join(".cache")))
        .map(|base| app_dir(&base))
        .ok_or(LocateError::NoCacheDir)
}

fn app_dir(base: &Path) -> PathBuf {
    base.join(APP_DIR_NAME)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins() {
        let d = resolve_cache_dir(
            Some(PathBuf::from("/tmp/fetchman_override")),
            Some(PathBuf::from("/home/u/.cache")),
            None,
        )
        .unwrap();
        assert_eq!(d, PathBuf::from("/tmp/fetchman_override"));
    }

    #[test]
    fn platform_cache_gets_app_dir() {
        let d = resolve_cache_dir(None, Some(PathBuf::from("/home/u/.cache")), None).unwrap();
        assert_eq!(d, PathBuf::from("/home/u/.cache/fetchman"));
    }

    #[test]
    fn home_fallback() {
        let d = resolve_cache_dir(None, None, Some(PathBuf::from("/home/u"))).unwrap();
        assert_eq!(d, PathBuf::from("/home/u/.cache/fetchman"));
    }

    #[test]
    fn no_cache_dir_at_all() {
        let err = resolve_cache_dir(None, None, None).unwrap_err();
        assert!(matches!(err, LocateError::NoCacheDir));
        assert!(err.to_string().contains(CACHE_DIR_ENV));
    }

    #[test]
    fn missing_renderer_is_not_found() {
        let err = locate_renderer("fetchman-no-such-renderer-4242").unwrap_err();
        match err {
            LocateError::NotFound { ref program, .. } => {
                assert_eq!(program, "fetchman-no-such-renderer-4242")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("not found in PATH"));
    }

    #[test]
    fn empty_program_is_not_found() {
        assert!(matches!(
            locate_renderer("  "),
            Err(LocateError::NotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn explicit_path_is_accepted() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-man");
        std::fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let found = locate_renderer(script.to_str().unwrap()).unwrap();
        assert_eq!(found, script);
    }
}
