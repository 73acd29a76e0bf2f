//! Markdown to HTML conversion.
//!
//! Runs the whole pipeline: normalization, block parsing, inline parsing
//! and rendering. Three options shape the output:
//! - `base_url`: prefix for internal link and image destinations
//! - `heading_level_offset`: added to heading levels, clamped to `1..=6`
//! - `table_class`: `class` attribute for generated tables
//!
//! Conversion itself never fails. Only loosely typed options can be
//! rejected, and they are validated before any input is parsed.
//!
//! # Example
//!
//! ```
//! use mdit::{RenderConfig, convert};
//!
//! let config = RenderConfig::new().with_heading_level_offset(2);
//! assert_eq!(
//!     convert("# title 1\nsome random markdown", &config),
//!     "<h3>title 1</h3>\n<p>some random markdown</p>\n"
//! );
//! ```

pub use mdit_config::{ConfigError, ConfigFile, RenderOptions};
pub use mdit_parser::{Document, parse};
pub use mdit_renderer::{HtmlBackend, MarkdownRenderer, RenderConfig, RenderResult, TocEntry};

/// Conversion error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Options failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convert markdown to HTML.
#[must_use]
pub fn convert(input: &str, config: &RenderConfig) -> String {
    Converter::new(config.clone()).convert(input)
}

/// Validate string options, then convert markdown to HTML.
///
/// # Errors
///
/// Returns [`Error::Config`] when an option value is invalid; no input is
/// parsed in that case.
pub fn convert_with_options(input: &str, options: &RenderOptions) -> Result<String, Error> {
    Ok(Converter::from_options(options)?.convert(input))
}

/// Reusable converter holding a validated configuration.
///
/// Every call parses and renders with its own state, so one converter can
/// be shared between threads.
#[derive(Clone, Debug, Default)]
pub struct Converter {
    config: RenderConfig,
}

impl Converter {
    /// Create a converter for a configuration.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Create a converter from string options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when an option value is invalid.
    pub fn from_options(options: &RenderOptions) -> Result<Self, Error> {
        Ok(Self::new(options.parse()?))
    }

    /// Active configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Convert markdown to HTML.
    #[must_use]
    pub fn convert(&self, input: &str) -> String {
        self.render(input).html
    }

    /// Convert markdown and return the HTML with the heading outline.
    #[must_use]
    pub fn render(&self, input: &str) -> RenderResult {
        let document = parse(input);
        let result = MarkdownRenderer::<HtmlBackend>::new()
            .with_config(self.config.clone())
            .render(&document);

        tracing::debug!(
            input_len = input.len(),
            output_len = result.html.len(),
            "Converted markdown"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Converter: Send, Sync, Clone);
    assert_impl_all!(Error: Send, Sync, std::error::Error);

    const SAMPLE: &str = "# title 1\nsome random markdown";

    #[test]
    fn test_convert_default() {
        assert_eq!(
            convert(SAMPLE, &RenderConfig::default()),
            "<h1>title 1</h1>\n<p>some random markdown</p>\n"
        );
    }

    #[test]
    fn test_convert_heading_offset() {
        let config = RenderConfig::new().with_heading_level_offset(2);
        assert_eq!(
            convert(SAMPLE, &config),
            "<h3>title 1</h3>\n<p>some random markdown</p>\n"
        );
    }

    #[test]
    fn test_heading_offset_clamps() {
        let convert_with = |offset| {
            convert("### h", &RenderConfig::new().with_heading_level_offset(offset))
        };
        assert_eq!(convert_with(5), "<h6>h</h6>\n");
        assert_eq!(convert_with(-5), "<h1>h</h1>\n");
    }

    #[test]
    fn test_base_url() {
        let config = RenderConfig::new().with_base_url("https://example.com");
        assert_eq!(
            convert("[text](/internal)", &config),
            "<p><a href=\"https://example.com/internal\">text</a></p>\n"
        );
        assert_eq!(
            convert("[text](https://other.com/x)", &config),
            "<p><a href=\"https://other.com/x\" target=\"_blank\" rel=\"noopener noreferrer\">text</a></p>\n"
        );
    }

    #[test]
    fn test_external_links_open_in_new_tab() {
        let config = RenderConfig::new().with_base_url("https://kyoto.dosue.jp");
        assert_eq!(
            convert("https://fuji.kyoto.dosue.jp and https://dosue.jp", &config),
            "<p><a href=\"https://fuji.kyoto.dosue.jp\">fuji.kyoto.dosue.jp</a> and \
             <a href=\"https://dosue.jp\" target=\"_blank\" rel=\"noopener noreferrer\">dosue.jp</a></p>\n"
        );
        assert_eq!(
            convert("<https://kyoto.dosue.jp>", &RenderConfig::default()),
            "<p><a href=\"https://kyoto.dosue.jp\" target=\"_blank\" rel=\"noopener noreferrer\">https://kyoto.dosue.jp</a></p>\n"
        );
    }

    #[test]
    fn test_empty_blockquote() {
        assert_eq!(
            convert(">", &RenderConfig::default()),
            "<blockquote>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_indented_code_item_makes_list_loose() {
        assert_eq!(
            convert("-     code\n\n- b\n", &RenderConfig::default()),
            "<ul>\n<li>\n<pre><code>code\n</code></pre>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_table_class() {
        let input = "| a |\n| - |\n| 1 |\n";
        let with_class = convert(input, &RenderConfig::new().with_table_class("table-class"));
        assert!(with_class.starts_with("<table class=\"table-class\">\n"));

        let without = convert(input, &RenderConfig::default());
        assert!(without.starts_with("<table>\n"));
    }

    #[test]
    fn test_malformed_table_falls_back() {
        assert_eq!(
            convert("a | b\n-- | -- | --\n", &RenderConfig::default()),
            "<p>a | b\n-- | -- | --</p>\n"
        );
    }

    #[test]
    fn test_unresolved_reference() {
        assert_eq!(
            convert("[text][missing]", &RenderConfig::default()),
            "<p>[text][missing]</p>\n"
        );
    }

    #[test]
    fn test_convert_with_options() {
        let options = RenderOptions::from_pairs([
            ("internal_domain_name", "https://example.com"),
            ("heading_level_offset", "1"),
            ("table_class_name", "t"),
        ]);
        assert_eq!(
            convert_with_options("# a\n\n[b](/c)", &options).unwrap(),
            "<h2>a</h2>\n<p><a href=\"https://example.com/c\">b</a></p>\n"
        );
    }

    #[test]
    fn test_convert_with_invalid_options() {
        let options = RenderOptions::from_pairs([("heading_level_offset", "two")]);
        let err = convert_with_options(SAMPLE, &options).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidConfiguration { .. })
        ));
        assert!(err.to_string().contains("heading_level_offset"));
    }

    #[test]
    fn test_converter_render_toc() {
        let converter = Converter::new(RenderConfig::new().with_heading_level_offset(1));
        let result = converter.render("# A\n\n## B\n");
        assert_eq!(result.html, "<h2>A</h2>\n<h3>B</h3>\n");
        assert_eq!(
            result.toc.iter().map(|e| e.level).collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[test]
    fn test_converter_shared_between_threads() {
        let converter = Converter::new(RenderConfig::new().with_table_class("t"));
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let converter = &converter;
                    scope.spawn(move || converter.convert(&format!("# {i}")))
                })
                .collect();
            for (i, handle) in handles.into_iter().enumerate() {
                assert_eq!(handle.join().unwrap(), format!("<h1>{i}</h1>\n"));
            }
        });
    }

    #[test]
    fn test_arbitrary_input_terminates() {
        let inputs = [
            "\0\u{feff}\r\r\n\t>",
            "*_~`[]()<>&!\\",
            "[[[[[[[[[[",
            "**********************",
            "> - > - > - 1. ```",
            "| | |\n|-|-|\n|",
            "<!--",
            "\u{fffd}\u{10ffff}",
        ];
        for input in inputs {
            let _ = convert(input, &RenderConfig::default());
        }
    }

    #[test]
    fn test_deeply_nested_blockquotes() {
        let html = convert(&("> ".repeat(5000) + "x"), &RenderConfig::default());
        assert!(html.starts_with("<blockquote>\n<blockquote>\n"));
        assert_eq!(html.matches("<blockquote>").count(), mdit_parser::MAX_NESTING);
        assert!(html.contains("&gt; &gt; x</p>"));
    }

    #[test]
    fn test_deeply_nested_lists() {
        let html = convert(&("- ".repeat(2000) + "x"), &RenderConfig::default());
        assert!(html.starts_with("<ul>\n<li>"));
        assert!(html.ends_with("</li>\n</ul>\n"));
    }

    #[test]
    fn test_deeply_nested_emphasis() {
        let input = "*a ".repeat(20000) + &" a*".repeat(20000);
        let html = convert(&input, &RenderConfig::default());
        assert!(html.starts_with("<p>*a *a "));
        assert!(html.matches("<em>").count() < mdit_parser::MAX_NESTING);
    }

    #[test]
    fn test_deeply_nested_brackets() {
        let html = convert(&"![".repeat(20000), &RenderConfig::default());
        assert!(html.starts_with("<p>![!["));

        let input = "[".repeat(20000) + "a" + &"](b)".repeat(20000);
        let html = convert(&input, &RenderConfig::default());
        assert!(html.matches("<a ").count() < mdit_parser::MAX_NESTING);
    }
}
