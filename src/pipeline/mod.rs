//! Pipeline stages for man-page → Markdown conversion.
//!
//! Each submodule implements exactly one step, so each can be tested alone
//! and the renderer and converter can be swapped for fakes.
//!
//! ## Data Flow
//!
//! ```text
//! topic ──▶ render ──▶ markdown ──▶ postprocess ──▶ persist
//!           (man -Thtml) (html2md)   (cleanup)       (cache dir / stdout)
//! ```
//!
//! 1. [`render`]      — spawn the renderer and capture its HTML
//! 2. [`markdown`]    — convert HTML to Markdown via html2md
//! 3. [`postprocess`] — deterministic layout cleanup of the Markdown
//! 4. [`persist`]     — resolve the output target and write atomically

pub mod markdown;
pub mod persist;
pub mod postprocess;
pub mod render;
