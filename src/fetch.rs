//! Pipeline orchestration: one topic in, one converted page out.
//!
//! A run is strictly sequential:
//!
//! ```text
//! Start → ResolveOutputTarget → Invoke → Convert → Persist → Done
//!                  │               │         │         │
//!                  └───────────────┴─────────┴─────────┴──▶ Failed
//! ```
//!
//! Nothing is retried or skipped, and the first error ends the run. Files
//! are only written in the `Persist` stage, so a failed render or
//! conversion leaves no artifact behind.

use crate::config::FetchConfig;
use crate::error::FetchmanError;
use crate::output::{FetchOutput, FetchStats};
use crate::pipeline::markdown::{Html2MdConverter, MarkdownConverter};
use crate::pipeline::persist::{self, OutputTarget};
use crate::pipeline::postprocess;
use crate::pipeline::render::{ManRenderer, SystemMan};
use crate::progress::{NoopProgressCallback, ProgressCallback, Stage};
use crate::topic::ManTopic;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Fetch `topic` with the system renderer and the default converter.
///
/// In stdout mode the Markdown goes to this process's standard output.
///
/// # Errors
/// Returns the first error of the run; see [`FetchmanError`] for the
/// categories.
pub fn fetch(topic: &str, config: &FetchConfig) -> Result<FetchOutput, FetchmanError> {
    let fetcher = Fetcher::system(config.clone())?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    fetcher.fetch_to(topic, &mut handle)
}

/// The fetch pipeline with an injectable renderer and converter.
pub struct Fetcher<R = SystemMan, C = Html2MdConverter> {
    renderer: R,
    converter: C,
    config: FetchConfig,
    progress: ProgressCallback,
}

impl Fetcher<SystemMan, Html2MdConverter> {
    /// Locate the configured renderer on `PATH`.
    ///
    /// A missing renderer fails here, before any file I/O.
    pub fn system(config: FetchConfig) -> Result<Self, FetchmanError> {
        let renderer = SystemMan::locate(&config.renderer)?;
        Ok(Self::new(renderer, Html2MdConverter, config))
    }
}

impl<R: ManRenderer, C: MarkdownConverter> Fetcher<R, C> {
    pub fn new(renderer: R, converter: C, config: FetchConfig) -> Self {
        Self {
            renderer,
            converter,
            config,
            progress: Arc::new(NoopProgressCallback),
        }
    }

    /// Report stage transitions to `callback`.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = callback;
        self
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Run the whole pipeline for `topic`.
    ///
    /// `out` receives the Markdown in stdout mode and is untouched in cache
    /// mode.
    pub fn fetch_to<W: Write>(&self, topic: &str, out: &mut W) -> Result<FetchOutput, FetchmanError> {
        let total_start = Instant::now();
        let topic = ManTopic::new(topic)?;
        info!("Fetching man page '{}' (output: {})", topic, self.config.output);

        // ── Step 1: Resolve output target ────────────────────────────────────
        let target = self.stage(Stage::ResolveOutputTarget, || {
            persist::resolve_target(&self.config)
        })?;

        // ── Step 2: Render ───────────────────────────────────────────────────
        let render_start = Instant::now();
        let raw = self.stage(Stage::Invoke, || self.renderer.render(&topic))?;
        let render_duration_ms = render_start.elapsed().as_millis() as u64;

        // ── Step 3: Convert ──────────────────────────────────────────────────
        let convert_start = Instant::now();
        let markdown = self.stage(Stage::Convert, || {
            let converted = self
                .converter
                .convert(&raw)
                .map_err(|e| FetchmanError::ConversionFailed {
                    topic: topic.to_string(),
                    detail: e.to_string(),
                })?;
            if self.config.normalize_markdown {
                Ok(postprocess::clean_markdown(&converted))
            } else {
                Ok(converted)
            }
        })?;
        let convert_duration_ms = convert_start.elapsed().as_millis() as u64;

        // ── Step 4: Persist ──────────────────────────────────────────────────
        let persist_start = Instant::now();
        let artifacts = self.stage(Stage::Persist, || match target {
            OutputTarget::Directory(ref dir) => {
                let artifacts = persist::artifact_paths(dir, &topic, self.config.keep_html);
                if let Some(ref html_path) = artifacts.html {
                    persist::write_file(html_path, raw.as_bytes())?;
                }
                persist::write_file(&artifacts.markdown, markdown.as_bytes())?;
                info!("Wrote {}", artifacts.markdown.display());
                Ok(Some(artifacts))
            }
            OutputTarget::Stdout => {
                persist::write_stream(out, &markdown)?;
                Ok(None)
            }
        })?;
        let persist_duration_ms = persist_start.elapsed().as_millis() as u64;

        let stats = FetchStats {
            render_duration_ms,
            convert_duration_ms,
            persist_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        info!(
            "Fetched '{}': {} bytes HTML → {} bytes Markdown in {}ms",
            topic,
            raw.len(),
            markdown.len(),
            stats.total_duration_ms
        );
        self.progress.on_complete(topic.as_str(), markdown.len());

        Ok(FetchOutput {
            topic: topic.to_string(),
            output: self.config.output,
            markdown,
            html_bytes: raw.len(),
            artifacts,
            stats,
        })
    }

    fn stage<T>(
        &self,
        stage: Stage,
        run: impl FnOnce() -> Result<T, FetchmanError>,
    ) -> Result<T, FetchmanError> {
        debug!("Stage: {}", stage);
        self.progress.on_stage(stage);
        run().inspect_err(|e| {
            debug!("Stage '{}' failed: {}", stage, e);
            self.progress.on_failed(stage, &e.to_string());
        })
    }
}
