//! Configuration types for a fetch run.
//!
//! Everything that varies between runs lives in [`FetchConfig`], built via
//! [`FetchConfigBuilder`]. The output target is a single selector
//! ([`OutputMode`]) rather than separate code paths per behaviour.

use crate::error::FetchmanError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration for fetching one manual page.
///
/// # Example
/// ```rust
/// use fetchman::{FetchConfig, OutputMode};
///
/// let config = FetchConfig::builder()
///     .output(OutputMode::Stdout)
///     .renderer("man")
///     .build()
///     .unwrap();
/// assert_eq!(config.output, OutputMode::Stdout);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Where the converted page goes. Default: [`OutputMode::Cache`].
    pub output: OutputMode,

    /// Cache directory to write into. `None` resolves the per-user default
    /// (`<user-cache-dir>/fetchman`, or `FETCHMAN_CACHE_DIR`).
    pub cache_dir: Option<PathBuf>,

    /// Renderer program name or path. Default: `man`.
    pub renderer: String,

    /// Keep the raw HTML next to the Markdown in cache mode. Default: true.
    ///
    /// The HTML is the only record of what the renderer actually produced,
    /// which makes it the first thing to look at when a conversion reads
    /// wrong. Ignored in stdout mode, which never writes files.
    pub keep_html: bool,

    /// Run the layout cleanup over the converter's output. Default: true.
    ///
    /// Turns setext headings into `#` headings and tidies whitespace; see
    /// [`crate::pipeline::postprocess`]. Disable to get the converter's
    /// output byte for byte.
    pub normalize_markdown: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            output: OutputMode::default(),
            cache_dir: None,
            renderer: man_locate::DEFAULT_RENDERER.to_string(),
            keep_html: true,
            normalize_markdown: true,
        }
    }
}

impl FetchConfig {
    /// Create a new builder for `FetchConfig`.
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`FetchConfig`].
#[derive(Debug)]
pub struct FetchConfigBuilder {
    config: FetchConfig,
}

impl FetchConfigBuilder {
    pub fn output(mut self, mode: OutputMode) -> Self {
        self.config.output = mode;
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = Some(dir.into());
        self
    }

    pub fn renderer(mut self, program: impl Into<String>) -> Self {
        self.config.renderer = program.into();
        self
    }

    pub fn keep_html(mut self, v: bool) -> Self {
        self.config.keep_html = v;
        self
    }

    pub fn normalize_markdown(mut self, v: bool) -> Self {
        self.config.normalize_markdown = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<FetchConfig, FetchmanError> {
        let c = &self.config;
        if c.renderer.trim().is_empty() {
            return Err(FetchmanError::InvalidConfig(
                "renderer program must not be empty".into(),
            ));
        }
        if let Some(ref dir) = c.cache_dir {
            if dir.as_os_str().is_empty() {
                return Err(FetchmanError::InvalidConfig(
                    "cache directory must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output target for the converted page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Write `<topic>.md` (and `<topic>.html`) into the cache directory. (default)
    #[default]
    Cache,
    /// Print the Markdown to standard output; no files are written.
    Stdout,
}

impl FromStr for OutputMode {
    type Err = FetchmanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cache" | "file" => Ok(OutputMode::Cache),
            "stdout" | "-" => Ok(OutputMode::Stdout),
            other => Err(FetchmanError::InvalidConfig(format!(
                "unknown output mode '{other}' (expected 'cache' or 'stdout')"
            ))),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Cache => f.write_str("cache"),
            OutputMode::Stdout => f.write_str("stdout"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = FetchConfig::default();
        assert_eq!(c.output, OutputMode::Cache);
        assert_eq!(c.renderer, "man");
        assert!(c.keep_html);
        assert!(c.normalize_markdown);
        assert!(c.cache_dir.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let c = FetchConfig::builder()
            .output(OutputMode::Stdout)
            .cache_dir("/tmp/fm")
            .renderer("/usr/bin/man")
            .keep_html(false)
            .normalize_markdown(false)
            .build()
            .unwrap();
        assert_eq!(c.output, OutputMode::Stdout);
        assert_eq!(c.cache_dir, Some(PathBuf::from("/tmp/fm")));
        assert_eq!(c.renderer, "/usr/bin/man");
        assert!(!c.keep_html);
        assert!(!c.normalize_markdown);
    }

    #[test]
    fn empty_renderer_rejected() {
        let err = FetchConfig::builder().renderer(" ").build().unwrap_err();
        assert!(matches!(err, FetchmanError::InvalidConfig(_)));
    }

    #[test]
    fn empty_cache_dir_rejected() {
        assert!(FetchConfig::builder().cache_dir("").build().is_err());
    }

    #[test]
    fn output_mode_parse() {
        assert_eq!("cache".parse::<OutputMode>().unwrap(), OutputMode::Cache);
        assert_eq!("STDOUT".parse::<OutputMode>().unwrap(), OutputMode::Stdout);
        assert_eq!("-".parse::<OutputMode>().unwrap(), OutputMode::Stdout);
        assert!("printer".parse::<OutputMode>().is_err());
    }

    #[test]
    fn output_mode_serde_lowercase() {
        let json = serde_json::to_string(&OutputMode::Stdout).unwrap();
        assert_eq!(json, "\"stdout\"");
        assert_eq!(OutputMode::Cache.to_string(), "cache");
    }
}
