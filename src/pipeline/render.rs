//! Process Invoker: run the system `man` with HTML output requested.
//!
//! `man -Thtml -- <topic>` writes the formatted page as HTML to stdout. When
//! the topic has no page, man-db prints `No manual entry for <topic>` to
//! stderr and exits 16; mandoc prints a similar line and exits 1. The exit
//! status and that message are the only "not found" signals, so both are
//! checked and nothing else about the topic is validated here.
//!
//! The call blocks until the renderer exits. There is no timeout.

use crate::error::FetchmanError;
use crate::topic::ManTopic;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Flag asking `man` for HTML output.
pub const HTML_FLAG: &str = "-Thtml";

/// Prefix of the renderer's "topic not found" message.
const NO_ENTRY_PREFIX: &str = "No manual entry for";

/// Raw renderer output (HTML bytes). Read-only once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Something that turns a topic into HTML.
///
/// [`SystemMan`] is the real implementation; tests substitute fakes so no
/// process is spawned.
pub trait ManRenderer {
    fn render(&self, topic: &ManTopic) -> Result<RawDocument, FetchmanError>;
}

/// Renders pages by spawning the system `man`.
#[derive(Debug, Clone)]
pub struct SystemMan {
    program: PathBuf,
}

impl SystemMan {
    /// Look `program` up on the executable search path.
    ///
    /// Fails with [`FetchmanError::RendererNotFound`], which callers treat
    /// as a configuration error separate from "topic not found".
    pub fn locate(program: &str) -> Result<Self, FetchmanError> {
        let path = man_locate::locate_renderer(program)?;
        debug!("Renderer resolved: {}", path.display());
        Ok(Self { program: path })
    }

    /// Use an already-resolved executable without searching `PATH`.
    pub fn from_path(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl ManRenderer for SystemMan {
    fn render(&self, topic: &ManTopic) -> Result<RawDocument, FetchmanError> {
        info!("Rendering man page: {}", topic);

        let output = Command::new(&self.program)
            .arg(HTML_FLAG)
            .arg("--")
            .arg(topic.as_str())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| FetchmanError::RendererSpawnFailed {
                program: self.program.display().to_string(),
                topic: topic.to_string(),
                source: e,
            })?;

        let status = output.status.to_string();
        interpret_output(
            topic,
            output.status.success(),
            &status,
            output.stdout,
            &output.stderr,
        )
    }
}

/// Decide whether a finished renderer run produced a page.
///
/// stdout is the document. stderr is only diagnostics: logged on success,
/// folded into the error detail on failure.
fn interpret_output(
    topic: &ManTopic,
    success: bool,
    status: &str,
    stdout: Vec<u8>,
    stderr: &[u8],
) -> Result<RawDocument, FetchmanError> {
    let not_found = String::from_utf8_lossy(&stdout)
        .trim_start()
        .starts_with(NO_ENTRY_PREFIX);

    if !success || not_found || stdout.iter().all(u8::is_ascii_whitespace) {
        return Err(FetchmanError::RendererFailed {
            topic: topic.to_string(),
            status: status.to_string(),
            detail: combined_detail(&stdout, stderr),
        });
    }

    let diagnostics = String::from_utf8_lossy(stderr);
    let diagnostics = diagnostics.trim();
    if !diagnostics.is_empty() {
        warn!("Renderer reported for '{}': {}", topic, diagnostics);
    }

    debug!("Renderer produced {} bytes of HTML", stdout.len());
    Ok(RawDocument::new(stdout))
}

fn combined_detail(stdout: &[u8], stderr: &[u8]) -> String {
    let mut combined = String::from_utf8_lossy(stdout).trim().to_string();
    let err = String::from_utf8_lossy(stderr);
    let err = err.trim();
    if !err.is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(err);
    }
    if combined.is_empty() {
        "renderer produced no output".to_string()
    } else {
        combined
    }
}
