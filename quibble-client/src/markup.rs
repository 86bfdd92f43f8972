//! Balanced-tag checking and allow-list sanitization for comment bodies.
//!
//! The two passes serve different purposes and both always run: balance is
//! checked on the raw draft so the user can be told their markup is broken,
//! sanitization runs on whatever is about to leave the client.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // `<`, optional `/`, a tag name, then anything up to the next `>`.
    // Quotes are deliberately not honored: a `>` inside an attribute value
    // ends the tag, exactly as the widget always treated markup.
    static ref TAG: Regex = Regex::new(r"</?([A-Za-z]+)[^>]*>").expect("tag pattern is valid");
}

/// Tags that survive sanitization, in their canonical lowercase spelling
const ALLOWED_TAGS: [&str; 4] = ["a", "code", "i", "strong"];

/// Attributes that survive on an anchor (nothing survives anywhere else)
const ALLOWED_ANCHOR_ATTRS: [&str; 2] = ["href", "title"];

const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "ftp", "mailto"];

/// Structural check only: every closing tag must match the most recent
/// unclosed opening tag, and nothing may stay open at the end. Self-closing
/// tags (`<br/>`) never go on the stack. Knows nothing about the
/// allow-list, so `<script>x</script>` is balanced.
pub fn is_balanced(text: &str) -> bool {
    let mut stack = Vec::new();
    for c in TAG.captures_iter(text) {
        let whole = c.get(0).expect("capture 0 is the whole match").as_str();
        let name = c.get(1).expect("tag pattern has a name group").as_str();
        if whole.starts_with("</") {
            if stack.pop() != Some(name) {
                return false;
            }
        } else if !whole.ends_with("/>") {
            stack.push(name);
        }
    }
    stack.is_empty()
}

/// Rewrite `text` so that only the allow-listed tags survive, with only
/// `href`/`title` left on anchors. Text content of removed tags is kept.
/// The output is balanced (unclosed tags get closed, stray closers are
/// dropped) and sanitizing twice changes nothing.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut open: Vec<&'static str> = Vec::new();
    let mut last = 0;
    for c in TAG.captures_iter(text) {
        let m = c.get(0).expect("capture 0 is the whole match");
        push_text(&mut out, &text[last..m.start()]);
        last = m.end();

        let whole = m.as_str();
        let raw_name = c.get(1).expect("tag pattern has a name group").as_str();
        let lower = raw_name.to_ascii_lowercase();
        let Some(name) = ALLOWED_TAGS.iter().copied().find(|t| *t == lower) else {
            // tag stripped, inner text (outside this match) survives
            continue;
        };

        if whole.starts_with("</") {
            // close everything above the matching open tag, in stack order,
            // so mis-nested input still serializes balanced
            if let Some(pos) = open.iter().rposition(|t| *t == name) {
                for t in open.drain(pos..).rev() {
                    out.push_str("</");
                    out.push_str(t);
                    out.push('>');
                }
            }
        } else if whole.ends_with("/>") {
            out.push('<');
            out.push_str(name);
            out.push_str("/>");
        } else {
            out.push('<');
            out.push_str(name);
            if name == "a" {
                let rest = &whole[1 + raw_name.len()..whole.len() - 1];
                push_anchor_attrs(&mut out, rest);
            }
            out.push('>');
            open.push(name);
        }
    }
    push_text(&mut out, &text[last..]);
    for t in open.drain(..).rev() {
        out.push_str("</");
        out.push_str(t);
        out.push('>');
    }
    out
}

fn push_anchor_attrs(out: &mut String, rest: &str) {
    let attrs = parse_attrs(rest);
    for wanted in ALLOWED_ANCHOR_ATTRS {
        let Some((_, value)) = attrs.iter().find(|(name, _)| name == wanted) else {
            continue;
        };
        let value = decode_entities(value.as_deref().unwrap_or(""));
        if wanted == "href" && !safe_href(&value) {
            continue;
        }
        out.push(' ');
        out.push_str(wanted);
        out.push_str("=\"");
        encode_into(out, &value, true);
        out.push('"');
    }
}

/// `name`, `name=value`, `name="value"`, `name='value'` pairs out of the
/// span between a tag's name and its closing `>`; anything else in there
/// is skipped. Unterminated quotes run to the end of the span.
fn parse_attrs(rest: &str) -> Vec<(String, Option<String>)> {
    let mut attrs = Vec::new();
    let mut it = rest.char_indices().peekable();
    loop {
        while matches!(it.peek(), Some((_, ch)) if !ch.is_ascii_alphabetic()) {
            it.next();
        }
        let Some(&(start, _)) = it.peek() else {
            break;
        };
        let mut end = start;
        while let Some(&(i, ch)) = it.peek() {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':' {
                it.next();
                end = i + ch.len_utf8();
            } else {
                break;
            }
        }
        let name = rest[start..end].to_ascii_lowercase();
        while matches!(it.peek(), Some((_, ch)) if ch.is_whitespace()) {
            it.next();
        }
        let mut value = None;
        if matches!(it.peek(), Some((_, '='))) {
            it.next();
            while matches!(it.peek(), Some((_, ch)) if ch.is_whitespace()) {
                it.next();
            }
            match it.peek().copied() {
                Some((i, quote)) if quote == '"' || quote == '\'' => {
                    it.next();
                    let vstart = i + 1;
                    let mut vend = rest.len();
                    for (j, ch) in it.by_ref() {
                        if ch == quote {
                            vend = j;
                            break;
                        }
                    }
                    value = Some(rest[vstart..vend].to_string());
                }
                Some((i, _)) => {
                    let mut vend = rest.len();
                    while let Some(&(j, ch)) = it.peek() {
                        if ch.is_whitespace() {
                            vend = j;
                            break;
                        }
                        it.next();
                    }
                    value = Some(rest[i..vend].to_string());
                }
                None => {}
            }
        }
        attrs.push((name, value));
    }
    attrs
}

/// Text segments and attribute values are decoded once and re-encoded on
/// output; that keeps `sanitize` idempotent instead of stacking `&amp;`s.
fn decode_entities(value: &str) -> String {
    const ENTITIES: [(&str, char); 6] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
        ("&apos;", '\''),
    ];
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(ent, _)| rest.starts_with(ent)) {
            Some((ent, ch)) => {
                out.push(*ch);
                rest = &rest[ent.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn encode_into(out: &mut String, value: &str, in_attribute: bool) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '\'' if in_attribute => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

fn push_text(out: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    let decoded = decode_entities(text);
    encode_into(out, &decoded, false);
}

/// Relative links and a short scheme allow-list; anything else (notably
/// `javascript:`) loses its href entirely.
fn safe_href(href: &str) -> bool {
    let trimmed = href.trim();
    let Some(colon) = trimmed.find(':') else {
        return true;
    };
    if let Some(stop) = trimmed.find(['/', '?', '#']) {
        if stop < colon {
            return true;
        }
    }
    let scheme = trimmed[..colon].to_ascii_lowercase();
    ALLOWED_SCHEMES.contains(&scheme.as_str())
}
