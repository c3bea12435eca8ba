use std::borrow::Cow;

use chrono::DateTime;
use scraper::{Html, Node};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Truncates `s` to at most `max_width` terminal columns, ending with `…` when cut.
///
/// Width is measured with `unicode-width`, so CJK and emoji count as two columns.
///
/// ```
/// use reel::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 6), "Hello…");
/// assert_eq!(truncate_to_width("Anything", 0), "");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if UnicodeWidthStr::width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    // Reserve one column for the ellipsis
    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::with_capacity(max_width * 2);
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    Cow::Owned(out)
}

fn is_unsafe_control(c: char) -> bool {
    c.is_control() && c != '\n' && c != '\t'
}

/// Strips terminal control characters and ANSI escape sequences from feed text.
///
/// Feed fields end up written straight into the terminal, so CSI (`ESC [ … final`)
/// and OSC (`ESC ] … BEL` or `ESC ] … ESC \`) sequences are dropped along with
/// every other control character except newline and tab.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_unsafe_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            if !is_unsafe_control(c) {
                out.push(c);
            }
            continue;
        }
        match chars.peek() {
            Some('[') => {
                chars.next();
                // Parameters and intermediates run until a final byte in @..~
                for n in chars.by_ref() {
                    if ('@'..='~').contains(&n) {
                        break;
                    }
                }
            }
            Some(']') => {
                chars.next();
                while let Some(n) = chars.next() {
                    if n == '\x07' {
                        break;
                    }
                    if n == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    Cow::Owned(out)
}

/// Elements whose start begins a new line of text.
const LINE_BREAKING: [&str; 9] = ["br", "p", "div", "li", "tr", "h1", "h2", "h3", "blockquote"];

/// Reduces an HTML fragment (feed descriptions) to plain text.
///
/// The fragment goes through an HTML parser, so entities are decoded and a
/// stray `<` or `>` in prose stays text. Whitespace runs collapse to one space,
/// block elements and `<br>` start new lines, and blank lines are dropped.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Element(el) if LINE_BREAKING.contains(&el.name()) => out.push('\n'),
            Node::Text(text) => {
                let hidden = node
                    .parent()
                    .and_then(|p| p.value().as_element())
                    .is_some_and(|el| matches!(el.name(), "script" | "style"));
                if !hidden {
                    push_collapsed(&mut out, text);
                }
            }
            _ => {}
        }
    }

    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Appends `text` with every whitespace run (including `&nbsp;`) as one space.
fn push_collapsed(out: &mut String, text: &str) {
    let mut in_space = out.ends_with(|c: char| c == ' ' || c == '\n');
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
}

/// Formats a raw `pubDate` as `Jun 10, 2003`.
///
/// RFC 2822 (what RSS specifies) is tried first, then RFC 3339. Anything else is
/// returned unchanged so the user still sees whatever the feed provided.
pub fn format_pub_date(raw: &str) -> Cow<'_, str> {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc2822(trimmed)
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed))
        .map(|dt| Cow::Owned(dt.format("%b %-d, %Y").to_string()))
        .unwrap_or(Cow::Borrowed(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_fits() {
        assert_eq!(truncate_to_width("12345", 5), "12345");
        assert!(matches!(truncate_to_width("abc", 10), Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello W…");
        assert_eq!(truncate_to_width("Hello", 1), "…");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK character is two columns
        assert_eq!(truncate_to_width("日本語テスト", 7), "日本語…");
        assert_eq!(truncate_to_width("日本語テスト", 6), "日本…");
    }

    #[test]
    fn test_strip_clean_text_borrowed() {
        let input = "line one\nline\ttwo";
        assert!(matches!(strip_control_chars(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_controls_and_escapes() {
        assert_eq!(strip_control_chars("he\x00ll\x07o\x7f"), "hello");
        assert_eq!(strip_control_chars("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_control_chars("\x1b]0;title\x07safe"), "safe");
        assert_eq!(strip_control_chars("\x1b]0;title\x1b\\safe"), "safe");
        assert_eq!(strip_control_chars("bare\x1bescape"), "bareescape");
        assert_eq!(strip_control_chars("win\r\ndows"), "win\ndows");
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(
            html_to_text("<p>Jeff &amp; Vinny play <b>stuff</b>.</p><p>Second</p>"),
            "Jeff & Vinny play stuff.\nSecond"
        );
        assert_eq!(html_to_text("one<br/>two<br>three"), "one\ntwo\nthree");
        assert_eq!(html_to_text("plain text"), "plain text");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn test_html_to_text_keeps_angle_brackets_in_prose() {
        assert_eq!(html_to_text("Score 3 < 5 and 7 > 2"), "Score 3 < 5 and 7 > 2");
        assert_eq!(html_to_text("a < b"), "a < b");
    }

    #[test]
    fn test_html_to_text_decodes_entities() {
        assert_eq!(
            html_to_text("Jeff&nbsp;&#38;&nbsp;Brad&#39;s show"),
            "Jeff & Brad's show"
        );
        assert_eq!(html_to_text("&lt;b&gt; &quot;quoted&quot; &eacute;"), "<b> \"quoted\" é");
    }

    #[test]
    fn test_html_to_text_collapses_whitespace_and_skips_scripts() {
        assert_eq!(
            html_to_text("<div>First   line\n  continues</div>\n\n<ul><li>one</li><li>two</li></ul>"),
            "First line continues\none\ntwo"
        );
        assert_eq!(html_to_text("<script>alert(1)</script>Visible"), "Visible");
    }

    #[test]
    fn test_format_pub_date_rfc2822() {
        assert_eq!(format_pub_date("Tue, 10 Jun 2003 04:00:00 GMT"), "Jun 10, 2003");
        assert_eq!(format_pub_date("Sat, 01 Mar 2014 10:00:00 -0800"), "Mar 1, 2014");
    }

    #[test]
    fn test_format_pub_date_rfc3339() {
        assert_eq!(format_pub_date("2019-12-31T23:00:00Z"), "Dec 31, 2019");
    }

    #[test]
    fn test_format_pub_date_unparsable_kept() {
        assert_eq!(format_pub_date("sometime in 2009"), "sometime in 2009");
        assert_eq!(format_pub_date(""), "");
    }
}
