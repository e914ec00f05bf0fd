//! Persistence Writer: put the converted page where the config says.
//!
//! ## Permissions
//!
//! Files are `rw-r--r--` and a cache directory we create is `rwxr-xr-x`.
//! Both are set explicitly after creation, so the process umask does not
//! change them. This covers every parent directory created on the way to
//! the cache directory. An existing directory keeps whatever mode it has.
//!
//! ## Atomic writes
//!
//! Each file is written to a temporary file in the target directory and
//! renamed over the final name. Readers see the old file or the new one,
//! never a partial write. Two runs for the same topic race and the last
//! rename wins.

use crate::config::{FetchConfig, OutputMode};
use crate::error::FetchmanError;
use crate::output::Artifacts;
use crate::topic::ManTopic;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Mode bits for a created cache directory.
pub const DIR_MODE: u32 = 0o755;
/// Mode bits for written files.
pub const FILE_MODE: u32 = 0o644;

/// Placeholder path used in errors about standard output.
const STDOUT_PATH: &str = "<stdout>";

/// Resolved destination for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// An existing directory that `<topic>.md`/`<topic>.html` go into.
    Directory(PathBuf),
    /// Standard output.
    Stdout,
}

/// Resolve and prepare the output target.
///
/// In cache mode this creates the directory (recursively) if needed.
pub fn resolve_target(config: &FetchConfig) -> Result<OutputTarget, FetchmanError> {
    match config.output {
        OutputMode::Stdout => Ok(OutputTarget::Stdout),
        OutputMode::Cache => {
            let dir = match config.cache_dir {
                Some(ref dir) => dir.clone(),
                None => man_locate::fetchman_cache_dir()?,
            };
            ensure_dir(&dir)?;
            Ok(OutputTarget::Directory(dir))
        }
    }
}

/// Create `dir` and its parents if absent.
///
/// Every directory created here gets [`DIR_MODE`], not only the leaf.
pub fn ensure_dir(dir: &Path) -> Result<(), FetchmanError> {
    if dir.is_dir() {
        return Ok(());
    }

    let map_err = |e| FetchmanError::CreateDirFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    // Innermost first; stops at the first ancestor that already exists.
    let missing: Vec<&Path> = dir
        .ancestors()
        .take_while(|p| !p.as_os_str().is_empty() && !p.exists())
        .collect();

    std::fs::create_dir_all(dir).map_err(map_err)?;
    for path in missing.iter().rev() {
        set_mode(path, DIR_MODE).map_err(map_err)?;
    }
    info!("Created cache directory: {}", dir.display());
    Ok(())
}

/// `<dir>/<stem>.md` and `<dir>/<stem>.html` for a topic.
pub fn artifact_paths(dir: &Path, topic: &ManTopic, keep_html: bool) -> Artifacts {
    let stem = topic.file_stem();
    Artifacts {
        markdown: dir.join(format!("{stem}.md")),
        html: keep_html.then(|| dir.join(format!("{stem}.html"))),
    }
}

/// Write `bytes` to `path` atomically with [`FILE_MODE`].
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), FetchmanError> {
    let map_err = |e| FetchmanError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(map_err)?;
    tmp.write_all(bytes).map_err(map_err)?;
    tmp.as_file().sync_all().map_err(map_err)?;
    set_mode(tmp.path(), FILE_MODE).map_err(map_err)?;
    tmp.persist(path).map_err(|e| map_err(e.error))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Write the Markdown to `out`, adding a trailing newline if missing.
pub fn write_stream<W: Write>(out: &mut W, markdown: &str) -> Result<(), FetchmanError> {
    let map_err = |e| FetchmanError::OutputWriteFailed {
        path: PathBuf::from(STDOUT_PATH),
        source: e,
    };

    out.write_all(markdown.as_bytes()).map_err(map_err)?;
    if !markdown.ends_with('\n') {
        out.write_all(b"\n").map_err(map_err)?;
    }
    out.flush().map_err(map_err)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdout_mode_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("never-created");
        let config = FetchConfig::builder()
            .output(OutputMode::Stdout)
            .cache_dir(&cache)
            .build()
            .unwrap();
        assert_eq!(resolve_target(&config).unwrap(), OutputTarget::Stdout);
        assert!(!cache.exists());
    }

    #[test]
    fn cache_mode_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("a/b/fetchman");
        let config = FetchConfig::builder().cache_dir(&cache).build().unwrap();
        assert_eq!(
            resolve_target(&config).unwrap(),
            OutputTarget::Directory(cache.clone())
        );
        assert!(cache.is_dir());
    }

    #[test]
    fn dir_creation_failure_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let err = ensure_dir(&blocker.join("sub")).unwrap_err();
        assert!(matches!(err, FetchmanError::CreateDirFailed { .. }));
        assert_eq!(err.exit_code(), crate::error::EXIT_PERSISTENCE);
    }

    #[test]
    fn artifact_paths_are_topic_qualified() {
        let topic = ManTopic::new("grep").unwrap();
        let a = artifact_paths(Path::new("/c"), &topic, true);
        assert_eq!(a.markdown, PathBuf::from("/c/grep.md"));
        assert_eq!(a.html, Some(PathBuf::from("/c/grep.html")));

        let a = artifact_paths(Path::new("/c"), &topic, false);
        assert_eq!(a.html, None);
    }

    #[test]
    fn write_file_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ls.md");
        write_file(&path, b"first").unwrap();
        write_file(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        // no temp files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn modes_are_exact() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("fetchman");
        ensure_dir(&cache).unwrap();
        let path = cache.join("grep.md");
        write_file(&path, b"# GREP\n").unwrap();

        let dir_mode = std::fs::metadata(&cache).unwrap().permissions().mode() & 0o777;
        let file_mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, DIR_MODE);
        assert_eq!(file_mode, FILE_MODE);
    }

    #[cfg(unix)]
    #[test]
    fn created_parents_get_dir_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let outer = dir.path().join("home");
        let cache = outer.join(".cache/fetchman");
        ensure_dir(&cache).unwrap();

        for path in [&outer, &outer.join(".cache"), &cache] {
            let mode = std::fs::metadata(path).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, DIR_MODE, "{}", path.display());
        }
    }

    #[cfg(unix)]
    #[test]
    fn existing_parent_mode_is_left_alone() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("private");
        std::fs::create_dir(&parent).unwrap();
        std::fs::set_permissions(&parent, std::fs::Permissions::from_mode(0o700)).unwrap();

        ensure_dir(&parent.join("fetchman")).unwrap();
        let mode = std::fs::metadata(&parent).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }

    #[test]
    fn write_file_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_file(&dir.path().join("nope/ls.md"), b"x").unwrap_err();
        assert!(matches!(err, FetchmanError::OutputWriteFailed { .. }));
    }

    #[test]
    fn write_stream_adds_newline() {
        let mut buf = Vec::new();
        write_stream(&mut buf, "# LS").unwrap();
        assert_eq!(buf, b"# LS\n");

        let mut buf = Vec::new();
        write_stream(&mut buf, "# LS\n").unwrap();
        assert_eq!(buf, b"# LS\n");
    }
}
