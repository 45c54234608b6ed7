//! Quoting helpers shared by the serializer, the tokenizer and the converters.

use std::borrow::Cow;

pub(crate) const QUOTE: char = '"';
pub(crate) const CRLF: &str = "\r\n";

/// Doubles every quote in `s`, borrowing when there is nothing to escape.
pub fn escape(s: &str) -> Cow<'_, str> {
    if s.contains(QUOTE) {
        Cow::Owned(s.replace('"', "\"\""))
    } else {
        Cow::Borrowed(s)
    }
}

/// Collapses every doubled quote in `s`, borrowing when there is nothing to collapse.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if s.contains("\"\"") {
        Cow::Owned(s.replace("\"\"", "\""))
    } else {
        Cow::Borrowed(s)
    }
}

/// Appends `s` wrapped in quotes, doubling embedded quotes.
pub(crate) fn push_quoted(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push(QUOTE);
    for ch in s.chars() {
        if ch == QUOTE {
            out.push(QUOTE);
        }
        out.push(ch);
    }
    out.push(QUOTE);
}

/// Appends `s` bare, unless it would collide with the delimiter, a quote or a line break.
pub(crate) fn push_guarded(out: &mut String, s: &str, delimiter: char) {
    if needs_quoting(s, delimiter) {
        push_quoted(out, s);
    } else {
        out.push_str(s);
    }
}

/// Runs `render` straight into `out`, then quotes what it wrote if it collides.
pub(crate) fn render_guarded<E>(
    out: &mut String,
    delimiter: char,
    render: impl FnOnce(&mut String) -> Result<(), E>,
) -> Result<(), E> {
    let start = out.len();
    render(out)?;
    if needs_quoting(&out[start..], delimiter) {
        let rendered = out.split_off(start);
        push_quoted(out, &rendered);
    }
    Ok(())
}

pub(crate) fn needs_quoting(s: &str, delimiter: char) -> bool {
    s.chars()
        .any(|c| c == delimiter || c == QUOTE || c == '\r' || c == '\n')
}

/// Space and tab, except when tab is the active delimiter.
#[inline]
pub(crate) fn is_field_whitespace(b: u8, delimiter: char) -> bool {
    match b {
        b' ' => delimiter != ' ',
        b'\t' => delimiter != '\t',
        _ => false,
    }
}
