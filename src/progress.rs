//! Stage-transition callbacks for a fetch run.
//!
//! A run walks `ResolveOutputTarget → Invoke → Convert → Persist` and then
//! either finishes or fails at one of those stages. Inject an
//! [`Arc<dyn FetchProgressCallback>`] via [`crate::Fetcher::with_progress`]
//! to observe the transitions, e.g. to drive a terminal spinner.
//!
//! # Example
//!
//! ```rust
//! use fetchman::{FetchProgressCallback, Stage};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<Stage>>);
//!
//! impl FetchProgressCallback for Recorder {
//!     fn on_stage(&self, stage: Stage) {
//!         self.0.lock().unwrap().push(stage);
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One step of the fetch pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Work out where the output goes and create the cache directory.
    ResolveOutputTarget,
    /// Run the renderer.
    Invoke,
    /// Turn the HTML into Markdown.
    Convert,
    /// Write the artifacts.
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::ResolveOutputTarget => "resolving output target",
            Stage::Invoke => "rendering man page",
            Stage::Convert => "converting to markdown",
            Stage::Persist => "writing output",
        };
        f.write_str(s)
    }
}

/// Called by the pipeline as it moves between stages.
///
/// All methods have default no-op implementations.
pub trait FetchProgressCallback: Send + Sync {
    /// Called when `stage` begins.
    fn on_stage(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called once after the last stage succeeded.
    ///
    /// # Arguments
    /// * `topic`        — the fetched topic
    /// * `markdown_len` — byte length of the produced Markdown
    fn on_complete(&self, topic: &str, markdown_len: usize) {
        let _ = (topic, markdown_len);
    }

    /// Called once when `stage` failed; the run stops there.
    fn on_failed(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl FetchProgressCallback for NoopProgressCallback {}

/// Convenience alias for the type stored in [`crate::Fetcher`].
pub type ProgressCallback = Arc<dyn FetchProgressCallback>;
