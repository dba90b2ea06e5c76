//! Inline markup, HTML serialization and text statistics
//!
//! The composer's document is HTML restricted to a fixed extension set:
//! paragraphs, bold, italic, underline, strikethrough, bullet and ordered
//! lists, blockquotes, inline code, code blocks, links and images. Terminal
//! input arrives as a small line-oriented markup which [`Markup::render`]
//! turns into that HTML, serialized the way the editing library emits it.
//!
//! | Markup | HTML |
//! |---|---|
//! | `**bold**` | `<strong>` |
//! | `*italic*`, `_italic_` | `<em>` |
//! | `__underline__` | `<u>` |
//! | `~~strike~~` | `<s>` |
//! | `` `code` `` | `<code>` |
//! | `[text](url)` | `<a href>` |
//! | `![alt](src)` | `<img>` |
//! | `- item`, `* item` | `<ul><li><p>` |
//! | `1. item` | `<ol><li><p>` |
//! | `> quote` | `<blockquote><p>` |
//! | ```` ``` ```` fence | `<pre><code>` |

use regex::Regex;

use crate::error::Result;

/// Serialization of an empty document
pub const EMPTY_DOCUMENT: &str = "<p></p>";

const LINK_ATTRS: &str = r#"target="_blank" rel="noopener noreferrer nofollow""#;

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// True for blank content and the empty-paragraph serialization
pub fn is_empty_document(html: &str) -> bool {
    let trimmed = html.trim();
    trimmed.is_empty() || trimmed == EMPTY_DOCUMENT
}

/// Escape text for HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Whether a link target is safe to emit
pub fn is_allowed_href(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    ["http://", "https://", "mailto:", "tg://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

fn is_allowed_src(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Join two serialized documents, dropping an empty left side
///
/// A list or quote at the end of `document` absorbs one of the same kind
/// at the start of `blocks`, so items appended one line at a time stay in
/// one list.
pub fn append_html(document: &str, blocks: &str) -> String {
    if is_empty_document(document) {
        return blocks.to_string();
    }
    for tag in ["ul", "ol", "blockquote"] {
        let close = format!("</{}>", tag);
        let open = format!("<{}>", tag);
        if let (Some(head), Some(tail)) = (
            document.strip_suffix(close.as_str()),
            blocks.strip_prefix(open.as_str()),
        ) {
            return format!("{}{}", head, tail);
        }
    }
    format!("{}{}", document, blocks)
}

enum Block {
    Paragraph(String),
    Bullet(Vec<String>),
    Ordered(Vec<String>),
    Quote(Vec<String>),
    Code(Vec<String>),
}

/// Compiled patterns for markup rendering and document inspection
#[derive(Debug, Clone)]
pub struct Markup {
    code: Regex,
    image: Regex,
    link: Regex,
    bold: Regex,
    underline: Regex,
    strike: Regex,
    italic_star: Regex,
    italic_underscore: Regex,
    ordered_item: Regex,
    tag: Regex,
    block_end: Regex,
}

impl Markup {
    /// Compile the patterns
    ///
    /// # Errors
    ///
    /// Returns error if a pattern fails to compile
    pub fn new() -> Result<Self> {
        Ok(Self {
            code: Regex::new(r"`([^`]+)`")?,
            image: Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)\)")?,
            link: Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)")?,
            bold: Regex::new(r"\*\*(.+?)\*\*")?,
            underline: Regex::new(r"__(.+?)__")?,
            strike: Regex::new(r"~~(.+?)~~")?,
            italic_star: Regex::new(r"\*([^*\s][^*]*?)\*")?,
            italic_underscore: Regex::new(r"\b_([^_\s][^_]*?)_\b")?,
            ordered_item: Regex::new(r"^\d+\.\s+(.*)$")?,
            tag: Regex::new(r"<[^>]*>")?,
            block_end: Regex::new(r"(?i)</(p|li|blockquote|pre)>|<br\s*/?>")?,
        })
    }

    /// Render markup text into document HTML
    ///
    /// Blank input renders as [`EMPTY_DOCUMENT`].
    ///
    /// # Examples
    ///
    /// ```
    /// use groupcast::composer::markup::Markup;
    ///
    /// let markup = Markup::new().unwrap();
    /// assert_eq!(
    ///     markup.render("Hello **world**"),
    ///     "<p>Hello <strong>world</strong></p>"
    /// );
    /// ```
    pub fn render(&self, input: &str) -> String {
        let blocks = self.parse_blocks(input);
        if blocks.is_empty() {
            return EMPTY_DOCUMENT.to_string();
        }

        let mut html = String::new();
        for block in blocks {
            match block {
                Block::Paragraph(text) => {
                    html.push_str(&format!("<p>{}</p>", self.render_inline(&text)));
                }
                Block::Bullet(items) => html.push_str(&self.render_list("ul", &items)),
                Block::Ordered(items) => html.push_str(&self.render_list("ol", &items)),
                Block::Quote(lines) => {
                    html.push_str("<blockquote>");
                    for line in lines {
                        html.push_str(&format!("<p>{}</p>", self.render_inline(&line)));
                    }
                    html.push_str("</blockquote>");
                }
                Block::Code(lines) => {
                    html.push_str(&format!(
                        "<pre><code>{}</code></pre>",
                        escape_html(&lines.join("\n"))
                    ));
                }
            }
        }
        html
    }

    fn render_list(&self, tag: &str, items: &[String]) -> String {
        let mut html = format!("<{}>", tag);
        for item in items {
            html.push_str(&format!("<li><p>{}</p></li>", self.render_inline(item)));
        }
        html.push_str(&format!("</{}>", tag));
        html
    }

    fn parse_blocks(&self, input: &str) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::new();
        let mut fence: Option<Vec<String>> = None;

        for line in input.lines() {
            if let Some(code) = fence.as_mut() {
                if line.trim_start().starts_with("```") {
                    blocks.push(Block::Code(std::mem::take(code)));
                    fence = None;
                } else {
                    code.push(line.to_string());
                }
                continue;
            }

            let trimmed = line.trim();
            if trimmed.starts_with("```") {
                fence = Some(Vec::new());
                continue;
            }
            if trimmed.is_empty() {
                // A blank line ends the current list or quote.
                blocks.push(Block::Paragraph(String::new()));
                continue;
            }

            if let Some(item) = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
            {
                match blocks.last_mut() {
                    Some(Block::Bullet(items)) => items.push(item.to_string()),
                    _ => blocks.push(Block::Bullet(vec![item.to_string()])),
                }
            } else if let Some(caps) = self.ordered_item.captures(trimmed) {
                let item = caps[1].to_string();
                match blocks.last_mut() {
                    Some(Block::Ordered(items)) => items.push(item),
                    _ => blocks.push(Block::Ordered(vec![item])),
                }
            } else if let Some(quoted) = trimmed.strip_prefix('>') {
                let quoted = quoted.trim_start().to_string();
                match blocks.last_mut() {
                    Some(Block::Quote(lines)) => lines.push(quoted),
                    _ => blocks.push(Block::Quote(vec![quoted])),
                }
            } else {
                blocks.push(Block::Paragraph(trimmed.to_string()));
            }
        }

        if let Some(code) = fence {
            blocks.push(Block::Code(code));
        }

        blocks
            .into_iter()
            .filter(|b| !matches!(b, Block::Paragraph(text) if text.is_empty()))
            .collect()
    }

    /// Render one line of inline markup
    pub fn render_inline(&self, text: &str) -> String {
        let mut atoms: Vec<String> = Vec::new();
        let mut protect = |html: String| -> String {
            atoms.push(html);
            format!("{}{}{}", PLACEHOLDER_OPEN, atoms.len() - 1, PLACEHOLDER_CLOSE)
        };

        let text = self
            .code
            .replace_all(text, |caps: &regex::Captures| {
                protect(format!("<code>{}</code>", escape_html(&caps[1])))
            })
            .into_owned();

        let text = self
            .image
            .replace_all(&text, |caps: &regex::Captures| {
                if is_allowed_src(&caps[2]) {
                    protect(format!(
                        r#"<img src="{}" alt="{}">"#,
                        escape_html(&caps[2]),
                        escape_html(&caps[1])
                    ))
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();

        let text = self
            .link
            .replace_all(&text, |caps: &regex::Captures| {
                if is_allowed_href(&caps[2]) {
                    protect(format!(
                        r#"<a {} href="{}">{}</a>"#,
                        LINK_ATTRS,
                        escape_html(&caps[2]),
                        self.emphasis(&escape_html(&caps[1]))
                    ))
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();

        let mut html = self.emphasis(&escape_html(&text));
        for (index, atom) in atoms.iter().enumerate() {
            let token = format!("{}{}{}", PLACEHOLDER_OPEN, index, PLACEHOLDER_CLOSE);
            html = html.replacen(&token, atom, 1);
        }
        html
    }

    fn emphasis(&self, escaped: &str) -> String {
        let html = self.bold.replace_all(escaped, "<strong>$1</strong>");
        let html = self.underline.replace_all(&html, "<u>$1</u>");
        let html = self.strike.replace_all(&html, "<s>$1</s>");
        let html = self.italic_star.replace_all(&html, "<em>$1</em>");
        let html = self.italic_underscore.replace_all(&html, "<em>$1</em>");
        html.into_owned()
    }

    fn text_content(&self, html: &str, block_separator: &str) -> String {
        let separated = self.block_end.replace_all(html, block_separator);
        decode_entities(&self.tag.replace_all(&separated, ""))
    }

    /// Number of text characters in the document
    pub fn characters(&self, html: &str) -> usize {
        self.text_content(html, "").chars().count()
    }

    /// Number of words in the document, blocks counted as separated
    pub fn words(&self, html: &str) -> usize {
        self.text_content(html, " ").split_whitespace().count()
    }

    /// Plain text of the document, one line per block
    pub fn plain_text(&self, html: &str) -> String {
        self.text_content(html, "\n")
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Link the first unlinked occurrence of `text` to `url`
    ///
    /// Returns `None` when nothing changed: `text` not found outside tags
    /// and existing links, or a URL with a disallowed scheme.
    pub fn set_link(&self, html: &str, text: &str, url: &str) -> Option<String> {
        if url.trim().is_empty() {
            return self.unset_link(html, text);
        }
        if text.is_empty() || !is_allowed_href(url) {
            return None;
        }

        let needle = escape_html(text);
        let position = html
            .match_indices(&needle)
            .map(|(i, _)| i)
            .find(|&i| is_linkable_position(html, i, needle.len()))?;

        Some(format!(
            r#"{}<a {} href="{}">{}</a>{}"#,
            &html[..position],
            LINK_ATTRS,
            escape_html(url.trim()),
            needle,
            &html[position + needle.len()..]
        ))
    }

    /// Remove the first link whose content is exactly `text`
    ///
    /// Returns `None` when no such link exists.
    pub fn unset_link(&self, html: &str, text: &str) -> Option<String> {
        let pattern = format!(r"<a\s[^>]*>{}</a>", regex::escape(&escape_html(text)));
        let re = Regex::new(&pattern).ok()?;
        let found = re.find(html)?;
        Some(format!(
            "{}{}{}",
            &html[..found.start()],
            escape_html(text),
            &html[found.end()..]
        ))
    }
}

/// Outside any tag and any existing `<a>` element, and not splitting a tag
/// or a character reference
fn is_linkable_position(html: &str, start: usize, len: usize) -> bool {
    let before = &html[..start];
    let inside_tag = match (before.rfind('<'), before.rfind('>')) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    };
    if inside_tag || inside_entity(before) || html[start..start + len].contains('<') {
        return false;
    }
    let opened = before.matches("<a ").count();
    let closed = before.matches("</a>").count();
    opened <= closed
}

// `before` ends in an unterminated `&name` or `&#nn` reference
fn inside_entity(before: &str) -> bool {
    match before.rfind('&') {
        Some(amp) => before[amp + 1..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '#'),
        None => false,
    }
}
