//! Content Converter: HTML → Markdown.
//!
//! The tag mapping belongs to [`html2md`]; this module only prepares its
//! input. Layout cleanup of the result is a separate step
//! ([`crate::pipeline::postprocess`]) applied by the fetcher. groff's HTML carries an inline stylesheet
//! in `<head>`, which would otherwise come through as a paragraph of CSS, so
//! `<style>` and `<script>` blocks are dropped before conversion.

use crate::pipeline::render::RawDocument;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Why a conversion produced no Markdown.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The renderer's bytes are not UTF-8 text.
    #[error("input is not valid UTF-8 (invalid byte at offset {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    /// The converter ran but the page has no text content.
    #[error("conversion produced no content")]
    Empty,

    /// Any other converter failure.
    #[error("{0}")]
    Converter(String),
}

/// Something that turns HTML into Markdown. Must be pure: the same input
/// always yields the same output.
pub trait MarkdownConverter {
    fn convert(&self, html: &RawDocument) -> Result<String, ConvertError>;
}

/// Converts with [`html2md::parse_html`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Html2MdConverter;

impl MarkdownConverter for Html2MdConverter {
    fn convert(&self, html: &RawDocument) -> Result<String, ConvertError> {
        let text = std::str::from_utf8(html.as_bytes()).map_err(|e| ConvertError::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        })?;

        let body = strip_non_content(text);
        let markdown = html2md::parse_html(&body);

        if markdown.trim().is_empty() {
            return Err(ConvertError::Empty);
        }

        debug!(
            "Converted {} bytes of HTML into {} bytes of Markdown",
            html.len(),
            markdown.len()
        );
        Ok(markdown)
    }
}

static RE_NON_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>|<script\b[^>]*>.*?</script\s*>").unwrap()
});

fn strip_non_content(html: &str) -> String {
    RE_NON_CONTENT.replace_all(html, "").into_owned()
}
