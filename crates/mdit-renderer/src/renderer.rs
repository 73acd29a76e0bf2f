//! Generic markdown renderer with pluggable backend.

use std::fmt::Write;
use std::marker::PhantomData;

use mdit_parser::{Block, Document, Inline, Link, List, Table, plain_text};

use crate::backend::RenderBackend;
use crate::config::RenderConfig;
use crate::domain::InternalDomain;
use crate::state::{HeadingState, TocEntry, alignment_style, push_escaped};
use crate::util::offset_heading_level;

/// Result of rendering markdown.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Headings in document order, with their emitted levels.
    pub toc: Vec<TocEntry>,
}

/// Generic markdown renderer with pluggable backend.
///
/// Walks a parsed [`Document`] and applies the [`RenderConfig`]: heading
/// levels are offset and clamped, internal destinations are passed through
/// [`RenderBackend::transform_link`], and tables receive the configured
/// class. Links whose final destination is outside the base URL's domain
/// get [`RenderBackend::external_link_attrs`]; without a base URL every link
/// is external. Every block ends with exactly one newline.
pub struct MarkdownRenderer<B: RenderBackend> {
    output: String,
    config: RenderConfig,
    /// Heading outline state.
    heading: HeadingState,
    /// Derived from `config.base_url` at the start of each render.
    internal_domain: Option<InternalDomain>,
    _backend: PhantomData<B>,
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    /// Create a new renderer with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            config: RenderConfig::default(),
            heading: HeadingState::default(),
            internal_domain: None,
            _backend: PhantomData,
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Set base URL for internal links and images.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Shift heading levels by `offset`.
    #[must_use]
    pub fn with_heading_level_offset(mut self, offset: i32) -> Self {
        self.config.heading_level_offset = offset;
        self
    }

    /// Add a `class` attribute to every `<table>`.
    #[must_use]
    pub fn with_table_class(mut self, class: impl Into<String>) -> Self {
        self.config.table_class = Some(class.into());
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Parse and render markdown source.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        let document = mdit_parser::parse(markdown);
        self.render(&document)
    }

    /// Render a parsed document and return the result.
    pub fn render(&mut self, document: &Document) -> RenderResult {
        self.internal_domain = self
            .config
            .base_url
            .as_deref()
            .and_then(InternalDomain::new);
        self.blocks(&document.blocks);

        let html = std::mem::take(&mut self.output);
        let toc = self.heading.take_toc();

        tracing::debug!(
            output_len = html.len(),
            headings = toc.len(),
            "Rendered document"
        );

        RenderResult { html, toc }
    }

    fn blocks(&mut self, blocks: &[Block]) {
        for block in blocks {
            self.block(block);
        }
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Paragraph(inlines) => {
                self.output.push_str("<p>");
                self.inlines(inlines);
                self.output.push_str("</p>\n");
            }
            Block::Heading { level, content } => self.heading(*level, content),
            Block::ThematicBreak => {
                B::horizontal_rule(&mut self.output);
                self.output.push('\n');
            }
            Block::BlockQuote(children) => {
                B::blockquote_start(&mut self.output);
                self.output.push('\n');
                self.blocks(children);
                B::blockquote_end(&mut self.output);
                self.output.push('\n');
            }
            Block::List(list) => self.list(list),
            Block::CodeBlock { info, literal } => {
                let lang = info.as_deref().and_then(|info| info.split_whitespace().next());
                B::code_block(lang, literal, &mut self.output);
                self.output.push('\n');
            }
            Block::HtmlBlock(html) => {
                self.output.push_str(html);
                self.output.push('\n');
            }
            Block::Table(table) => self.table(table),
        }
    }

    fn heading(&mut self, level: u8, content: &[Inline]) {
        let level = offset_heading_level(level, self.config.heading_level_offset);
        self.heading.push(level, &plain_text(content));

        let _ = write!(self.output, "<h{level}>");
        self.inlines(content);
        let _ = writeln!(self.output, "</h{level}>");
    }

    fn list(&mut self, list: &List) {
        let tag = if list.kind.is_ordered() { "ol" } else { "ul" };
        if list.kind.is_ordered() && list.start != 1 {
            let _ = writeln!(self.output, r#"<ol start="{}">"#, list.start);
        } else {
            let _ = writeln!(self.output, "<{tag}>");
        }

        for item in &list.items {
            self.item(item, list.tight);
        }

        let _ = writeln!(self.output, "</{tag}>");
    }

    /// Tight items render their direct paragraphs without `<p>` tags; a
    /// newline separates such bare text from a following block.
    fn item(&mut self, blocks: &[Block], tight: bool) {
        self.output.push_str("<li>");

        let mut after_bare_text = false;
        for (i, block) in blocks.iter().enumerate() {
            if let (true, Block::Paragraph(inlines)) = (tight, block) {
                self.inlines(inlines);
                after_bare_text = true;
                continue;
            }
            if i == 0 || after_bare_text {
                self.output.push('\n');
            }
            self.block(block);
            after_bare_text = false;
        }

        self.output.push_str("</li>\n");
    }

    fn table(&mut self, table: &Table) {
        B::table_start(self.config.table_class.as_deref(), &mut self.output);
        self.output.push_str("\n<thead>\n<tr>\n");
        self.table_row("th", &table.header, table);
        self.output.push_str("</tr>\n</thead>\n");

        if !table.rows.is_empty() {
            self.output.push_str("<tbody>\n");
            for row in &table.rows {
                self.output.push_str("<tr>\n");
                self.table_row("td", row, table);
                self.output.push_str("</tr>\n");
            }
            self.output.push_str("</tbody>\n");
        }

        self.output.push_str("</table>\n");
    }

    fn table_row(&mut self, tag: &str, cells: &[Vec<Inline>], table: &Table) {
        for (cell, alignment) in cells.iter().zip(&table.alignments) {
            let _ = write!(self.output, "<{tag}{}>", alignment_style(*alignment));
            self.inlines(cell);
            let _ = writeln!(self.output, "</{tag}>");
        }
    }

    fn inlines(&mut self, inlines: &[Inline]) {
        for inline in inlines {
            self.inline(inline);
        }
    }

    fn inline(&mut self, inline: &Inline) {
        match inline {
            Inline::Text(text) => push_escaped(text, &mut self.output),
            Inline::Code(code) => {
                self.output.push_str("<code>");
                push_escaped(code, &mut self.output);
                self.output.push_str("</code>");
            }
            Inline::Html(html) => self.output.push_str(html),
            Inline::SoftBreak => self.output.push('\n'),
            Inline::HardBreak => {
                B::hard_break(&mut self.output);
                self.output.push('\n');
            }
            Inline::Emphasis(children) => self.wrap("em", children),
            Inline::Strong(children) => self.wrap("strong", children),
            Inline::Strikethrough(children) => self.wrap("s", children),
            Inline::Link(link) => self.link(link),
            Inline::Image(image) => {
                let src = B::transform_link(&image.destination, self.config.base_url.as_deref());
                let alt = plain_text(&image.children);
                B::image(&src, &alt, image.title.as_deref(), &mut self.output);
            }
        }
    }

    fn wrap(&mut self, tag: &str, children: &[Inline]) {
        let _ = write!(self.output, "<{tag}>");
        self.inlines(children);
        let _ = write!(self.output, "</{tag}>");
    }

    fn link(&mut self, link: &Link) {
        let href = B::transform_link(&link.destination, self.config.base_url.as_deref());
        self.output.push_str(r#"<a href=""#);
        push_escaped(&href, &mut self.output);
        self.output.push('"');
        if !self
            .internal_domain
            .as_ref()
            .is_some_and(|domain| domain.matches(&href))
        {
            B::external_link_attrs(&mut self.output);
        }
        if let Some(title) = &link.title {
            self.output.push_str(r#" title=""#);
            push_escaped(title, &mut self.output);
            self.output.push('"');
        }
        self.output.push('>');
        self.inlines(&link.children);
        self.output.push_str("</a>");
    }
}

impl<B: RenderBackend> Default for MarkdownRenderer<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::HtmlBackend;

    fn render_html(markdown: &str) -> String {
        MarkdownRenderer::<HtmlBackend>::new()
            .render_markdown(markdown)
            .html
    }

    fn render_with(config: RenderConfig, markdown: &str) -> String {
        MarkdownRenderer::<HtmlBackend>::new()
            .with_config(config)
            .render_markdown(markdown)
            .html
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(
            render_html("# title 1\nsome random markdown"),
            "<h1>title 1</h1>\n<p>some random markdown</p>\n"
        );
    }

    #[test]
    fn test_heading_offset() {
        let config = RenderConfig::new().with_heading_level_offset(2);
        assert_eq!(
            render_with(config, "# title 1\nsome random markdown"),
            "<h3>title 1</h3>\n<p>some random markdown</p>\n"
        );
    }

    #[test]
    fn test_heading_offset_clamped() {
        let up = RenderConfig::new().with_heading_level_offset(5);
        assert_eq!(render_with(up, "### a"), "<h6>a</h6>\n");

        let down = RenderConfig::new().with_heading_level_offset(-5);
        assert_eq!(render_with(down, "### a"), "<h1>a</h1>\n");
    }

    #[test]
    fn test_setext_heading_offset() {
        let config = RenderConfig::new().with_heading_level_offset(1);
        assert_eq!(render_with(config, "Title\n---"), "<h3>Title</h3>\n");
    }

    #[test]
    fn test_toc_uses_emitted_levels() {
        let result = MarkdownRenderer::<HtmlBackend>::new()
            .with_heading_level_offset(1)
            .render_markdown("# One *two*\n\ntext\n\n## `three`\n");
        assert_eq!(
            result.toc,
            vec![
                TocEntry {
                    level: 2,
                    title: "One two".to_owned(),
                },
                TocEntry {
                    level: 3,
                    title: "three".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_base_url_internal_link() {
        let config = RenderConfig::new().with_base_url("https://example.com");
        assert_eq!(
            render_with(config, "[text](/internal)"),
            "<p><a href=\"https://example.com/internal\">text</a></p>\n"
        );
    }

    #[test]
    fn test_base_url_external_link_unchanged() {
        let config = RenderConfig::new().with_base_url("https://example.com");
        assert_eq!(
            render_with(config, "[text](https://other.com/x)"),
            "<p><a href=\"https://other.com/x\" target=\"_blank\" rel=\"noopener noreferrer\">text</a></p>\n"
        );
    }

    #[test]
    fn test_base_url_relative_and_fragment() {
        let config = RenderConfig::new().with_base_url("https://example.com/docs/");
        assert_eq!(
            render_with(config, "[a](page.html) [b](#top) <https://x.org>"),
            "<p><a href=\"https://example.com/docs/page.html\">a</a> \
             <a href=\"#top\">b</a> \
             <a href=\"https://x.org\" target=\"_blank\" rel=\"noopener noreferrer\">https://x.org</a></p>\n"
        );
    }

    #[test]
    fn test_base_url_reference_link_and_image() {
        let config = RenderConfig::new().with_base_url("https://example.com");
        assert_eq!(
            render_with(config, "[a][r] ![pic](img/a.png \"T\")\n\n[r]: /ref \"Ref\""),
            "<p><a href=\"https://example.com/ref\" title=\"Ref\">a</a> \
             <img src=\"https://example.com/img/a.png\" alt=\"pic\" title=\"T\"></p>\n"
        );
    }

    #[test]
    fn test_no_base_url_leaves_links() {
        assert_eq!(
            render_html("[text](/internal)"),
            "<p><a href=\"/internal\" target=\"_blank\" rel=\"noopener noreferrer\">text</a></p>\n"
        );
    }

    #[test]
    fn test_external_links_by_domain() {
        let config = RenderConfig::new().with_base_url("https://kyoto.dosue.jp");
        let html = render_with(
            config,
            "[a](https://kyoto.dosue.jp/x) [b](https://fuji.kyoto.dosue.jp) \
             [c](https://dosue.jp) [d](dosue.jp/foo/bar \"T\")",
        );
        assert_eq!(
            html,
            "<p><a href=\"https://kyoto.dosue.jp/x\">a</a> \
             <a href=\"https://fuji.kyoto.dosue.jp\">b</a> \
             <a href=\"https://dosue.jp\" target=\"_blank\" rel=\"noopener noreferrer\">c</a> \
             <a href=\"https://kyoto.dosue.jp/dosue.jp/foo/bar\" title=\"T\">d</a></p>\n"
        );
    }

    #[test]
    fn test_external_autolinks_and_bare_urls() {
        let config = RenderConfig::new().with_base_url("https://kyoto.dosue.jp");
        assert_eq!(
            render_with(config, "<https://nara.jp> https://kyoto.dosue.jp/a"),
            "<p><a href=\"https://nara.jp\" target=\"_blank\" rel=\"noopener noreferrer\">https://nara.jp</a> \
             <a href=\"https://kyoto.dosue.jp/a\">kyoto.dosue.jp/a</a></p>\n"
        );
        assert_eq!(
            render_html("https://kyoto.dosue.jp"),
            "<p><a href=\"https://kyoto.dosue.jp\" target=\"_blank\" rel=\"noopener noreferrer\">kyoto.dosue.jp</a></p>\n"
        );
    }

    #[test]
    fn test_base_url_without_domain_makes_all_links_external() {
        let config = RenderConfig::new().with_base_url("http://127.0.0.1:8000");
        assert_eq!(
            render_with(config, "[a](/x)"),
            "<p><a href=\"http://127.0.0.1:8000/x\" target=\"_blank\" rel=\"noopener noreferrer\">a</a></p>\n"
        );
    }

    #[test]
    fn test_table_with_class() {
        let config = RenderConfig::new().with_table_class("table-class");
        assert_eq!(
            render_with(config, "| a | b |\n|:--|--:|\n| 1 | 2 |\n"),
            "<table class=\"table-class\">\n<thead>\n<tr>\n\
             <th style=\"text-align:left\">a</th>\n\
             <th style=\"text-align:right\">b</th>\n\
             </tr>\n</thead>\n<tbody>\n<tr>\n\
             <td style=\"text-align:left\">1</td>\n\
             <td style=\"text-align:right\">2</td>\n\
             </tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_table_without_class_or_body() {
        assert_eq!(
            render_html("a | b\n--|--\n"),
            "<table>\n<thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead>\n</table>\n"
        );
    }

    #[test]
    fn test_malformed_table_is_paragraph() {
        assert_eq!(
            render_html("| a | b |\n| - |\n"),
            "<p>| a | b |\n| - |</p>\n"
        );
    }

    #[test]
    fn test_unresolved_reference_is_literal() {
        assert_eq!(
            render_html("[text][missing]"),
            "<p>[text][missing]</p>\n"
        );
    }

    #[test]
    fn test_text_escaped_once() {
        assert_eq!(
            render_html("\\<script> a & b \"q\" &amp;"),
            "<p>&lt;script&gt; a &amp; b &quot;q&quot; &amp;</p>\n"
        );
    }

    #[test]
    fn test_inline_markup() {
        assert_eq!(
            render_html("*a* **b** ~~c~~ `d<e>`  \nf"),
            "<p><em>a</em> <strong>b</strong> <s>c</s> <code>d&lt;e&gt;</code><br>\nf</p>\n"
        );
    }

    #[test]
    fn test_tight_list() {
        assert_eq!(
            render_html("- a\n- b\n  - c\n"),
            "<ul>\n<li>a</li>\n<li>b\n<ul>\n<li>c</li>\n</ul>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_loose_ordered_list() {
        assert_eq!(
            render_html("3. a\n\n4. b\n"),
            "<ol start=\"3\">\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_empty_list_item() {
        assert_eq!(render_html("-\n"), "<ul>\n<li></li>\n</ul>\n");
    }

    #[test]
    fn test_empty_blockquote() {
        assert_eq!(render_html(">\n"), "<blockquote>\n</blockquote>\n");
        assert_eq!(
            render_html("- >\n"),
            "<ul>\n<li>\n<blockquote>\n</blockquote>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_blockquote_and_rule() {
        assert_eq!(
            render_html("> quote\n\n***\n"),
            "<blockquote>\n<p>quote</p>\n</blockquote>\n<hr>\n"
        );
    }

    #[test]
    fn test_code_blocks() {
        assert_eq!(
            render_html("```rust extra\nlet a = 1 < 2;\n```\n\n    indented\n"),
            "<pre><code class=\"language-rust\">let a = 1 &lt; 2;\n</code></pre>\n\
             <pre><code>indented\n</code></pre>\n"
        );
    }

    #[test]
    fn test_html_block_verbatim() {
        assert_eq!(
            render_html("<div>\n*raw*\n</div>\n\ntext"),
            "<div>\n*raw*\n</div>\n<p>text</p>\n"
        );
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render_html(""), "");
    }

    #[test]
    fn test_renderer_reusable() {
        let mut renderer = MarkdownRenderer::<HtmlBackend>::new();
        assert_eq!(renderer.render_markdown("a").html, "<p>a</p>\n");
        assert_eq!(renderer.render_markdown("b").html, "<p>b</p>\n");
    }
}
