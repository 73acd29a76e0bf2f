//! Trait-based HTML renderer for parsed markdown documents.
//!
//! This crate provides a generic [`MarkdownRenderer`] that walks an
//! [`mdit_parser::Document`] and produces output through the
//! [`RenderBackend`] trait.
//!
//! # Architecture
//!
//! Document structure (block nesting, list tightness, tables, inline
//! markup) is handled by the generic renderer. Format-specific elements
//! (code blocks, block quotes, images, link destinations, the table tag)
//! are delegated to the backend:
//! - [`HtmlBackend`]: markdown-it compatible HTML with base URL rewriting
//!
//! The three [`RenderConfig`] options are applied here and only here:
//! heading level offset, base URL for internal destinations, and the
//! table class. The base URL also decides which links are external
//! (see [`InternalDomain`]); those open in a new tab.
//!
//! # Example
//!
//! ```
//! use mdit_renderer::{HtmlBackend, MarkdownRenderer};
//!
//! let result = MarkdownRenderer::<HtmlBackend>::new()
//!     .with_heading_level_offset(1)
//!     .with_base_url("https://example.com")
//!     .render_markdown("# Hello\n\nSee [docs](/docs).");
//!
//! assert_eq!(
//!     result.html,
//!     "<h2>Hello</h2>\n<p>See <a href=\"https://example.com/docs\">docs</a>.</p>\n"
//! );
//! assert_eq!(result.toc[0].level, 2);
//! ```

mod backend;
mod config;
mod domain;
mod html;
mod renderer;
mod state;
mod util;

pub use backend::RenderBackend;
pub use config::RenderConfig;
pub use domain::InternalDomain;
pub use html::HtmlBackend;
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, escape_html};
pub use util::offset_heading_level;

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(RenderConfig: Send, Sync, Clone);
    assert_impl_all!(InternalDomain: Send, Sync, Clone);
    assert_impl_all!(RenderResult: Send, Sync);
    assert_impl_all!(MarkdownRenderer<HtmlBackend>: Send);
}
