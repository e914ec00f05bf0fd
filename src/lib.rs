//! # fetchman
//!
//! Fetch a manual page from the system `man`, convert it to Markdown, and
//! keep it in a per-user cache directory (or print it).
//!
//! ## Pipeline Overview
//!
//! ```text
//! topic
//!  │
//!  ├─ 1. Resolve  pick the output target, create the cache dir
//!  ├─ 2. Render   man -Thtml -- <topic>  (blocking, one process)
//!  ├─ 3. Convert  HTML → Markdown via html2md + layout cleanup
//!  └─ 4. Persist  <cache>/<topic>.html + <cache>/<topic>.md, or stdout
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fetchman::{fetch, FetchConfig, OutputMode};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FetchConfig::builder().output(OutputMode::Cache).build()?;
//!     let output = fetch("ls", &config)?;
//!     if let Some(artifacts) = output.artifacts {
//!         println!("{}", artifacts.markdown.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without `man`
//!
//! [`Fetcher`] takes any [`ManRenderer`] and [`MarkdownConverter`], so tests
//! can feed fixture HTML without spawning a process.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `fetchman` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod topic;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{FetchConfig, FetchConfigBuilder, OutputMode};
pub use error::FetchmanError;
pub use fetch::{fetch, Fetcher};
pub use output::{Artifacts, FetchOutput, FetchStats};
pub use pipeline::markdown::{ConvertError, Html2MdConverter, MarkdownConverter};
pub use pipeline::render::{ManRenderer, RawDocument, SystemMan};
pub use progress::{FetchProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
pub use topic::ManTopic;
