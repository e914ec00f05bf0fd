//! Result types returned by a successful fetch.

use crate::config::OutputMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOutput {
    /// The topic as given to the renderer.
    pub topic: String,
    /// Where the Markdown went.
    pub output: OutputMode,
    /// The converted page.
    pub markdown: String,
    /// Size of the raw HTML the renderer produced.
    pub html_bytes: usize,
    /// Files written in cache mode; `None` in stdout mode.
    pub artifacts: Option<Artifacts>,
    /// Per-stage timings.
    pub stats: FetchStats,
}

/// Paths of the files written into the cache directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    /// `<topic>.md`
    pub markdown: PathBuf,
    /// `<topic>.html`, when the raw HTML is kept.
    pub html: Option<PathBuf>,
}

/// Wall-clock timings for one run, in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchStats {
    pub render_duration_ms: u64,
    pub convert_duration_ms: u64,
    pub persist_duration_ms: u64,
    pub total_duration_ms: u64,
}
