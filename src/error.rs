//! Error types for the fetchman library.
//!
//! Every failure is terminal for the run: there is no partial success and no
//! retry. Variants are grouped by the category the CLI reports and maps to an
//! exit code:
//!
//! | Category      | Variants | Exit code |
//! |---------------|----------|-----------|
//! | usage         | [`FetchmanError::EmptyTopic`], [`FetchmanError::InvalidConfig`] | 2 |
//! | environment   | [`FetchmanError::RendererNotFound`], [`FetchmanError::CacheDirUnavailable`] | 3 |
//! | invocation    | [`FetchmanError::RendererSpawnFailed`], [`FetchmanError::RendererFailed`] | 4 |
//! | conversion    | [`FetchmanError::ConversionFailed`] | 5 |
//! | persistence   | [`FetchmanError::CreateDirFailed`], [`FetchmanError::OutputWriteFailed`] | 6 |

use man_locate::LocateError;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for anything that does not fit a category below.
pub const EXIT_OTHER: u8 = 1;
/// Exit code for a bad or missing argument.
pub const EXIT_USAGE: u8 = 2;
/// Exit code for a missing renderer or cache directory.
pub const EXIT_ENVIRONMENT: u8 = 3;
/// Exit code for a renderer that failed to run or found no page.
pub const EXIT_INVOCATION: u8 = 4;
/// Exit code for an HTML → Markdown failure.
pub const EXIT_CONVERSION: u8 = 5;
/// Exit code for a directory or file write failure.
pub const EXIT_PERSISTENCE: u8 = 6;

/// All fatal errors returned by the fetchman library.
#[derive(Debug, Error)]
pub enum FetchmanError {
    // ── Usage errors ──────────────────────────────────────────────────────
    /// The topic argument was empty.
    #[error("Topic must not be empty\nUsage: fetchman <topic>")]
    EmptyTopic,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Environment errors ────────────────────────────────────────────────
    /// The renderer program is not on the executable search path.
    #[error("Error: '{program}' command not found in PATH ({reason})")]
    RendererNotFound { program: String, reason: String },

    /// No user cache directory could be resolved.
    #[error("Could not resolve a cache directory: {0}")]
    CacheDirUnavailable(String),

    // ── Invocation errors ─────────────────────────────────────────────────
    /// The renderer process could not be started.
    #[error("Failed to run '{program}' for topic '{topic}': {source}")]
    RendererSpawnFailed {
        program: String,
        topic: String,
        #[source]
        source: std::io::Error,
    },

    /// The renderer ran but reported no page (or exited abnormally).
    #[error("Failed to generate html for '{topic}' ({status}): {detail}")]
    RendererFailed {
        topic: String,
        status: String,
        detail: String,
    },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// HTML → Markdown conversion failed.
    #[error("Failed to generate markdown for '{topic}': {detail}")]
    ConversionFailed { topic: String, detail: String },

    // ── Persistence errors ────────────────────────────────────────────────
    /// Could not create the output directory.
    #[error("Error making cache dir '{path}': {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write an output artifact (file or stdout).
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchmanError {
    /// Short category name, used in log fields and JSON error output.
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyTopic | Self::InvalidConfig(_) => "usage",
            Self::RendererNotFound { .. } | Self::CacheDirUnavailable(_) => "environment",
            Self::RendererSpawnFailed { .. } | Self::RendererFailed { .. } => "invocation",
            Self::ConversionFailed { .. } => "conversion",
            Self::CreateDirFailed { .. } | Self::OutputWriteFailed { .. } => "persistence",
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::EmptyTopic | Self::InvalidConfig(_) => EXIT_USAGE,
            Self::RendererNotFound { .. } | Self::CacheDirUnavailable(_) => EXIT_ENVIRONMENT,
            Self::RendererSpawnFailed { .. } | Self::RendererFailed { .. } => EXIT_INVOCATION,
            Self::ConversionFailed { .. } => EXIT_CONVERSION,
            Self::CreateDirFailed { .. } | Self::OutputWriteFailed { .. } => EXIT_PERSISTENCE,
        }
    }
}

impl From<LocateError> for FetchmanError {
    fn from(e: LocateError) -> Self {
        match e {
            LocateError::NotFound { program, reason } => {
                FetchmanError::RendererNotFound { program, reason }
            }
            other @ LocateError::NoCacheDir => FetchmanError::CacheDirUnavailable(other.to_string()),
        }
    }
}
