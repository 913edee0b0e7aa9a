//! Markdown to Notion block conversion
//!
//! Converts the combined markdown of an item (URL line, body, comment
//! sections) into Notion block JSON. The converter produces a flat list of
//! blocks: paragraphs, headings, list items, code blocks, quotes, and
//! dividers, with bold/italic/strikethrough/code/link annotations on the
//! rich text runs inside them.

use boardport_core::Content;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde_json::{json, Map, Value};

/// Notion's per-object rich text length limit
pub const RICH_TEXT_LIMIT: usize = 2000;

/// Render an item's content as one markdown document
///
/// Issues and pull requests contribute their URL, body, and comments; each
/// comment is separated by a rule and attributed when the author is known.
/// Draft issues contribute their body only.
pub fn render_markdown(content: &Content) -> String {
    match content {
        Content::DraftIssue(draft) => draft.body.clone(),
        Content::Issue(c) | Content::PullRequest(c) => {
            let mut markdown = String::new();
            if !c.url.is_empty() {
                markdown.push_str(&c.url);
                markdown.push_str("\n\n");
            }
            markdown.push_str(&c.body);
            for comment in &c.comments.nodes {
                markdown.push_str("\n\n---\n\n");
                if let Some(author) = &comment.author {
                    markdown.push_str(&format!("**@{}** commented:\n\n", author.login));
                }
                markdown.push_str(&comment.body);
            }
            markdown
        }
    }
}

/// Convert markdown to a list of Notion blocks
pub fn markdown_to_blocks(markdown: &str) -> Vec<Value> {
    Converter::default().run(markdown)
}

/// A single plain paragraph holding a truncated prefix of the raw markdown
///
/// Used when conversion yields nothing usable for non-empty input.
pub fn fallback_paragraph(markdown: &str) -> Value {
    let prefix: String = markdown.chars().take(RICH_TEXT_LIMIT).collect();
    block(
        "paragraph",
        json!({ "rich_text": [ { "type": "text", "text": { "content": prefix } } ] }),
    )
}

#[derive(Debug, Clone, Copy, Default)]
struct Style {
    bold: bool,
    italic: bool,
    strikethrough: bool,
    code: bool,
}

impl Style {
    fn is_plain(&self) -> bool {
        !(self.bold || self.italic || self.strikethrough || self.code)
    }
}

#[derive(Default)]
struct Converter {
    blocks: Vec<Value>,
    /// Block type of the leaf currently being filled
    kind: Option<&'static str>,
    rich_text: Vec<Value>,
    style: Style,
    link: Option<String>,
    /// Stack of enclosing lists; true = ordered
    list_ordered: Vec<bool>,
    quote_depth: usize,
    /// Accumulated code block text while inside a fence
    code: Option<String>,
    code_lang: String,
}

impl Converter {
    fn run(mut self, markdown: &str) -> Vec<Value> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);

        for event in Parser::new_ext(markdown, options) {
            match event {
                Event::Start(tag) => self.start(tag),
                Event::End(tag) => self.end(tag),
                Event::Text(text) => self.push_text(&text),
                Event::Code(code) => {
                    let saved = self.style;
                    self.style.code = true;
                    self.push_text(&code);
                    self.style = saved;
                }
                Event::SoftBreak => self.push_text(" "),
                Event::HardBreak => self.push_text("\n"),
                Event::Rule => {
                    self.flush();
                    self.blocks.push(block("divider", json!({})));
                }
                Event::InlineHtml(html) => self.push_text(&html),
                _ => {}
            }
        }

        self.flush();
        self.blocks
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => match self.kind {
                // paragraphs inside a loose list item continue the item
                Some("bulleted_list_item") | Some("numbered_list_item") => {}
                _ => self.begin(if self.quote_depth > 0 {
                    "quote"
                } else {
                    "paragraph"
                }),
            },
            Tag::Heading { level, .. } => self.begin(heading_kind(level)),
            Tag::List(start) => self.list_ordered.push(start.is_some()),
            Tag::Item => {
                let ordered = self.list_ordered.last().copied().unwrap_or(false);
                self.begin(if ordered {
                    "numbered_list_item"
                } else {
                    "bulleted_list_item"
                });
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                self.code = Some(String::new());
                self.code_lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::Emphasis => self.style.italic = true,
            Tag::Strong => self.style.bold = true,
            Tag::Strikethrough => self.style.strikethrough = true,
            Tag::Link { dest_url, .. } => self.link = Some(dest_url.to_string()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item => self.flush(),
            TagEnd::List(_) => {
                self.list_ordered.pop();
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => self.finish_code(),
            TagEnd::Emphasis => self.style.italic = false,
            TagEnd::Strong => self.style.bold = false,
            TagEnd::Strikethrough => self.style.strikethrough = false,
            TagEnd::Link => self.link = None,
            _ => {}
        }
    }

    fn begin(&mut self, kind: &'static str) {
        self.flush();
        self.kind = Some(kind);
    }

    fn flush(&mut self) {
        if let Some(kind) = self.kind.take() {
            if !self.rich_text.is_empty() {
                let rich_text = std::mem::take(&mut self.rich_text);
                self.blocks
                    .push(block(kind, json!({ "rich_text": rich_text })));
            }
        }
        self.rich_text.clear();
    }

    fn push_text(&mut self, text: &str) {
        if let Some(buffer) = self.code.as_mut() {
            buffer.push_str(text);
            return;
        }
        if text.is_empty() {
            return;
        }
        // loose text outside any block opens a paragraph (or quote line)
        if self.kind.is_none() {
            self.kind = Some(if self.quote_depth > 0 {
                "quote"
            } else {
                "paragraph"
            });
        }
        for chunk in chunk_chars(text, RICH_TEXT_LIMIT) {
            self.rich_text
                .push(rich_text(chunk, self.style, self.link.as_deref()));
        }
    }

    fn finish_code(&mut self) {
        if let Some(buffer) = self.code.take() {
            let code = buffer.strip_suffix('\n').unwrap_or(&buffer);
            let rich_text: Vec<Value> = chunk_chars(code, RICH_TEXT_LIMIT)
                .into_iter()
                .map(|chunk| rich_text(chunk, Style::default(), None))
                .collect();
            self.blocks.push(block(
                "code",
                json!({
                    "rich_text": rich_text,
                    "language": map_language(&self.code_lang),
                }),
            ));
            self.code_lang.clear();
        }
    }
}

/// Build one block object of the given type
fn block(kind: &str, payload: Value) -> Value {
    let mut map = Map::new();
    map.insert("object".to_string(), Value::String("block".to_string()));
    map.insert("type".to_string(), Value::String(kind.to_string()));
    map.insert(kind.to_string(), payload);
    Value::Object(map)
}

fn rich_text(content: String, style: Style, link: Option<&str>) -> Value {
    let text = match link {
        Some(url) => json!({ "content": content, "link": { "url": url } }),
        None => json!({ "content": content }),
    };
    let mut value = json!({ "type": "text", "text": text });
    if !style.is_plain() {
        value["annotations"] = json!({
            "bold": style.bold,
            "italic": style.italic,
            "strikethrough": style.strikethrough,
            "code": style.code,
        });
    }
    value
}

/// Split on char boundaries into runs of at most `limit` chars
fn chunk_chars(text: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(limit)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn heading_kind(level: HeadingLevel) -> &'static str {
    // Notion stops at three heading levels
    match level {
        HeadingLevel::H1 => "heading_1",
        HeadingLevel::H2 => "heading_2",
        _ => "heading_3",
    }
}

/// Map a fence language to one Notion accepts
fn map_language(lang: &str) -> &'static str {
    match lang.trim().to_ascii_lowercase().as_str() {
        "rust" => "rust",
        "js" | "javascript" => "javascript",
        "ts" | "typescript" => "typescript",
        "py" | "python" => "python",
        "sh" | "bash" | "shell" | "zsh" => "shell",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "html" => "html",
        "css" => "css",
        "sql" => "sql",
        "go" => "go",
        "java" => "java",
        "c" => "c",
        "cpp" | "c++" => "c++",
        "ruby" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "kotlin" => "kotlin",
        "graphql" => "graphql",
        "diff" => "diff",
        "docker" | "dockerfile" => "docker",
        "markdown" | "md" => "markdown",
        _ => "plain text",
    }
}
