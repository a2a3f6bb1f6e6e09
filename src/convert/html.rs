//! HTML cleanup and markdown conversion.

use crate::error::{AssistantError, Result};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::OnceLock;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content must not be escaped.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Attributes kept on `a` and `img`; every other element loses all of them.
fn kept_attributes(element: &str) -> &'static [&'static str] {
    match element {
        "a" | "img" => &["href", "src"],
        _ => &[],
    }
}

/// Re-serialize an HTML document with non-link attributes removed.
///
/// Anchors and images keep their `href`/`src` targets; all other elements
/// come out attribute-free. Comments and the doctype are dropped.
pub fn strip_attributes(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::with_capacity(html.len());
    write_element(document.root_element(), &mut out);
    out
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();

    out.push('<');
    out.push_str(name);
    for attr in kept_attributes(name) {
        if let Some(value) = element.value().attr(attr) {
            out.push(' ');
            out.push_str(attr);
            out.push_str("=\"");
            escape_into(value, true, out);
            out.push('"');
        }
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    let raw = RAW_TEXT_ELEMENTS.contains(&name);
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            write_element(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            if raw {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Convert an HTML string to markdown.
pub fn to_markdown(html: &str) -> Result<String> {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript", "template"])
        .build();

    converter
        .convert(html)
        .map_err(|e| AssistantError::Convert(e.to_string()))
}

fn line_breaks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\r\n]+").expect("Invalid regex"))
}

fn interior_spaces() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" [ \t]+").expect("Invalid regex"))
}

/// Shrink converted markdown.
///
/// Removes leftover `<div>` markers, collapses runs of line breaks into a
/// single newline, squeezes a space followed by more horizontal whitespace
/// into two spaces and trims the ends.
pub fn minify(markdown: &str) -> String {
    let text = markdown.replace("<div>", "").replace("</div>", "");
    let text = line_breaks().replace_all(&text, "\n");
    let text = interior_spaces().replace_all(&text, "  ");
    text.trim().to_string()
}
