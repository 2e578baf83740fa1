//! ENML/HTML to markdown-flavoured plain text.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Turns a note's rich content into plain text.
///
/// The extractor only sees this trait, so the conversion can be swapped
/// (plain closures implement it too).
pub trait ContentNormalizer {
    fn normalize(&self, title: &str, html: &str) -> String;
}

impl<F> ContentNormalizer for F
where
    F: Fn(&str, &str) -> String,
{
    fn normalize(&self, title: &str, html: &str) -> String {
        self(title, html)
    }
}

/// Default normalizer: a `# title` heading followed by the content as
/// markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownNormalizer;

impl ContentNormalizer for MarkdownNormalizer {
    fn normalize(&self, title: &str, html: &str) -> String {
        let source = format!("<h1>{}</h1>{}", html_escape::encode_text(title), html);
        html_to_markdown(&source)
    }
}

const PARAGRAPH_MARK: &str = "\u{2}";
const LINE_MARK: &str = "\u{1}";

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static pattern compiles")
}

static PREAMBLE_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?is)<\?xml.*?\?>|<!DOCTYPE[^>]*>|<!--.*?-->"));
static DROPPED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?is)<script[^>]*>.*?</script\s*>|<style[^>]*>.*?</style\s*>|<en-crypt[^>]*>.*?</en-crypt\s*>")
});
static ENML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)</?(?:en-note|en-media|en-todo)(?:\s[^>]*)?/?>"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"\s+"));
static ORDERED_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?is)<ol(?:\s[^>]*)?>(.*?)</ol\s*>"));
static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<li(?:\s[^>]*)?>"));
static LIST_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)</?(?:ul|ol)(?:\s[^>]*)?>"));
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?is)<h([1-6])(?:\s[^>]*)?>(.*?)</h[1-6]\s*>"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?is)<(?:strong|b)(?:\s[^>]*)?>(.*?)</(?:strong|b)\s*>"));
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?is)<(?:em|i)(?:\s[^>]*)?>(.*?)</(?:em|i)\s*>"));
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"(?is)<a\s[^>]*?href\s*=\s*"([^"]*)"[^>]*>(.*?)</a\s*>"#));
static BREAK_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<br\s*/?>"));
static RULE_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<hr(?:\s[^>]*)?/?>"));
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)</?(?:p|blockquote|table|pre)(?:\s[^>]*)?>"));
static LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)</?(?:div|tr|section|article|header|footer)(?:\s[^>]*)?>"));
static CELL_END_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)</t[dh]\s*>"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"<[^>]+>"));
static PARAGRAPH_MARK_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern("[ \t\u{1}]*\u{2}[ \t\u{1}\u{2}]*"));
static LINE_MARK_RE: LazyLock<Regex> = LazyLock::new(|| pattern("[ \t]*\u{1}[ \t\u{1}]*"));
static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"\n{3,}"));

/// Convert an HTML fragment to markdown text ending in a single newline
pub fn html_to_markdown(html: &str) -> String {
    let mut text = PREAMBLE_RE.replace_all(html, "").to_string();
    text = DROPPED_BLOCK_RE.replace_all(&text, "").to_string();
    text = ENML_TAG_RE.replace_all(&text, "").to_string();

    // Source line breaks carry no meaning in HTML
    text = WHITESPACE_RE.replace_all(&text, " ").to_string();

    text = ORDERED_LIST_RE
        .replace_all(&text, |caps: &Captures| {
            let mut number = 0;
            let items = LIST_ITEM_RE.replace_all(&caps[1], |_: &Captures| {
                number += 1;
                format!("\n{}. ", number)
            });
            format!("\n\n{}\n\n", items)
        })
        .to_string();
    text = LIST_ITEM_RE.replace_all(&text, "\n- ").to_string();
    text = LIST_RE.replace_all(&text, "\n\n").to_string();

    text = HEADING_RE
        .replace_all(&text, |caps: &Captures| {
            let level = caps[1].parse::<usize>().unwrap_or(1);
            format!("\n\n{} {}\n\n", "#".repeat(level), caps[2].trim())
        })
        .to_string();

    text = BOLD_RE
        .replace_all(&text, |caps: &Captures| wrap_inline(&caps[1], "**"))
        .to_string();
    text = ITALIC_RE
        .replace_all(&text, |caps: &Captures| wrap_inline(&caps[1], "_"))
        .to_string();
    text = LINK_RE
        .replace_all(&text, |caps: &Captures| {
            let href = caps[1].trim();
            let label = caps[2].trim();
            match (href.is_empty(), label.is_empty()) {
                (true, _) => label.to_string(),
                (false, true) => href.to_string(),
                (false, false) => format!("[{}]({})", label, href),
            }
        })
        .to_string();

    text = BREAK_RE.replace_all(&text, "\n").to_string();
    text = RULE_RE.replace_all(&text, "\n\n* * *\n\n").to_string();

    // Adjacent block boundaries collapse into one break
    text = PARAGRAPH_RE.replace_all(&text, PARAGRAPH_MARK).to_string();
    text = LINE_RE.replace_all(&text, LINE_MARK).to_string();
    text = CELL_END_RE.replace_all(&text, " ").to_string();
    text = TAG_RE.replace_all(&text, "").to_string();
    text = PARAGRAPH_MARK_RE.replace_all(&text, "\n\n").to_string();
    text = LINE_MARK_RE.replace_all(&text, "\n").to_string();

    text = html_escape::decode_html_entities(&text)
        .replace('\u{a0}', " ");

    let text = text.lines().map(str::trim).collect::<Vec<_>>().join("\n");
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");
    let text = text.trim();

    if text.is_empty() {
        String::new()
    } else {
        format!("{}\n", text)
    }
}

fn wrap_inline(inner: &str, marker: &str) -> String {
    let inner = inner.trim();
    if inner.is_empty() {
        String::new()
    } else {
        format!("{marker}{inner}{marker}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(title: &str, html: &str) -> String {
        MarkdownNormalizer.normalize(title, html)
    }

    #[test]
    fn test_title_heading_then_content() {
        assert_eq!(normalize("My Notes", "<div>Hello</div>"), "# My Notes\n\nHello\n");
    }

    #[test]
    fn test_enml_wrapper_is_removed() {
        let html = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE en-note SYSTEM "http://xml.evernote.com/pub/enml2.dtd">
<en-note><div>Line one</div>
<div>Line two</div></en-note>"#;
        assert_eq!(normalize("T", html), "# T\n\nLine one\nLine two\n");
    }

    #[test]
    fn test_headings_and_emphasis() {
        let html = "<h2>Section</h2><p>Some <b>bold</b> and <em>soft</em> words</p>";
        let text = normalize("Doc", html);
        assert_eq!(text, "# Doc\n\n## Section\n\nSome **bold** and _soft_ words\n");
    }

    #[test]
    fn test_lists() {
        let html = "<ul><li>apple</li><li>pear</li></ul><ol><li>first</li><li>second</li></ol>";
        let text = normalize("Lists", html);
        assert!(text.contains("- apple\n- pear"));
        assert!(text.contains("1. first\n2. second"));
    }

    #[test]
    fn test_links_and_breaks() {
        let html = r#"<div>See <a href="https://example.com/?a=1&amp;b=2">the site</a><br/>next</div>"#;
        let text = normalize("Links", html);
        assert!(text.contains("See [the site](https://example.com/?a=1&b=2)\nnext"));
    }

    #[test]
    fn test_entities_and_nbsp() {
        let text = normalize("A & B", "<div>x&nbsp;&lt;tag&gt;&nbsp;y &#8212; z</div>");
        assert_eq!(text, "# A & B\n\nx <tag> y \u{2014} z\n");
    }

    #[test]
    fn test_enml_extras_are_dropped() {
        let html = r#"<en-note><div><en-todo checked="true"/>Buy milk</div><en-media type="image/png" hash="abc"/><en-crypt hint="pw">SECRET</en-crypt></en-note>"#;
        let text = normalize("Extras", html);
        assert_eq!(text, "# Extras\n\nBuy milk\n");
    }

    #[test]
    fn test_scripts_and_comments_are_dropped() {
        let html = "<p>Before</p><!-- note --><script>alert('hi');</script><style>p{}</style><p>After</p>";
        let text = normalize("S", html);
        assert_eq!(text, "# S\n\nBefore\n\nAfter\n");
    }

    #[test]
    fn test_horizontal_rule() {
        let text = normalize("R", "<p>a</p><hr/><p>b</p>");
        assert_eq!(text, "# R\n\na\n\n* * *\n\nb\n");
    }

    #[test]
    fn test_closure_normalizer() {
        let upper = |title: &str, _html: &str| title.to_uppercase();
        assert_eq!(upper.normalize("quiet", "<p>ignored</p>"), "QUIET");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(html_to_markdown(""), "");
        assert_eq!(html_to_markdown("<div> </div>"), "");
    }
}
