//! Splits CSV text into rows of raw column slices.
//!
//! The tokenizer knows nothing about types. It walks the input byte by byte,
//! tracks quoting state and hands out [`RawColumn`]s that borrow from the
//! input. Doubled quotes are left in place and only collapsed by the
//! converter that consumes the column.

use crate::common::is_field_whitespace;
use crate::error::CsvError;
use std::borrow::Cow;

/// One column of a row, as a view into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawColumn<'a> {
    text: &'a str,
    quoted: bool,
    escaped: bool,
}

impl<'a> RawColumn<'a> {
    pub(crate) fn unquoted(text: &'a str) -> Self {
        Self {
            text,
            quoted: false,
            escaped: false,
        }
    }

    pub(crate) fn quoted(text: &'a str, escaped: bool) -> Self {
        Self {
            text,
            quoted: true,
            escaped,
        }
    }

    /// The column content without its surrounding quotes, doubled quotes intact.
    pub fn raw(&self) -> &'a str {
        self.text
    }

    /// Whether the column was wrapped in quotes.
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// The column content with doubled quotes collapsed.
    pub fn value(&self) -> Cow<'a, str> {
        if self.escaped {
            Cow::Owned(self.text.replace("\"\"", "\""))
        } else {
            Cow::Borrowed(self.text)
        }
    }

    /// An unquoted column holding nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        !self.quoted && self.text.trim().is_empty()
    }
}

/// A tokenized row. The column slice is reused by the next call to
/// [`Tokenizer::next_row`].
#[derive(Debug)]
pub struct Row<'a, 'b> {
    columns: &'b [RawColumn<'a>],
    text: &'a str,
    line: usize,
}

impl<'a, 'b> Row<'a, 'b> {
    pub fn columns(&self) -> &'b [RawColumn<'a>] {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// First physical line of the row, without its terminator.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// 1-based line number the row starts on.
    pub fn line(&self) -> usize {
        self.line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StartOfField,
    UnquotedValue,
    QuotedValue,
    PossibleEndOfQuote,
    TrailingWhitespaceAfterQuote,
}

/// Cursor over CSV text producing one row per call.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    delimiter: char,
    delim_buf: [u8; 4],
    delim_len: usize,
    columns: Vec<RawColumn<'a>>,
    rows: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str, delimiter: char) -> Self {
        let mut delim_buf = [0u8; 4];
        let delim_len = delimiter.encode_utf8(&mut delim_buf).len();
        Self {
            input,
            pos: 0,
            line: 1,
            delimiter,
            delim_buf,
            delim_len,
            columns: Vec::new(),
            rows: 0,
        }
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of rows produced so far.
    pub fn rows_read(&self) -> usize {
        self.rows
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Reads the next logical row, or `Ok(None)` at end of input.
    ///
    /// On error the cursor is moved to end of input so that a failed row is
    /// never retried.
    pub fn next_row(&mut self) -> Result<Option<Row<'a, '_>>, CsvError> {
        if self.is_at_end() {
            return Ok(None);
        }
        let mut columns = std::mem::take(&mut self.columns);
        columns.clear();
        let result = self.scan_row(&mut columns);
        self.columns = columns;

        match result {
            Ok((row_start, row_end, line)) => {
                self.rows += 1;
                let span = &self.input[row_start..row_end];
                let text = match span.find(|c: char| c == '\r' || c == '\n') {
                    Some(cut) => &span[..cut],
                    None => span,
                };
                Ok(Some(Row {
                    columns: &self.columns,
                    text,
                    line,
                }))
            }
            Err(err) => {
                self.pos = self.input.len();
                Err(err)
            }
        }
    }

    /// Scans one row into `columns` and returns its start, content end and starting line.
    fn scan_row(
        &mut self,
        columns: &mut Vec<RawColumn<'a>>,
    ) -> Result<(usize, usize, usize), CsvError> {
        let input = self.input;
        let bytes = input.as_bytes();
        let row_start = self.pos;
        let row_line = self.line;

        let mut state = State::StartOfField;
        let mut i = self.pos;
        let mut field_start = i;
        let mut quote_end = i;
        let mut quote_line = row_line;
        let mut escaped = false;

        loop {
            if i >= bytes.len() {
                match state {
                    State::StartOfField => columns.push(RawColumn::unquoted("")),
                    State::UnquotedValue => {
                        columns.push(RawColumn::unquoted(self.trim_end(field_start, i)))
                    }
                    State::QuotedValue => {
                        return Err(CsvError::UnterminatedQuote { line: quote_line })
                    }
                    State::PossibleEndOfQuote => {
                        columns.push(RawColumn::quoted(&input[field_start..i - 1], escaped))
                    }
                    State::TrailingWhitespaceAfterQuote => {
                        columns.push(RawColumn::quoted(&input[field_start..quote_end], escaped))
                    }
                }
                self.pos = bytes.len();
                return Ok((row_start, bytes.len(), row_line));
            }

            let b = bytes[i];
            let at_delimiter = state != State::QuotedValue && self.is_delimiter_at(i);
            let at_terminator = b == b'\r' || b == b'\n';

            match state {
                State::StartOfField => {
                    if at_delimiter {
                        columns.push(RawColumn::unquoted(""));
                        i += self.delim_len;
                    } else if at_terminator {
                        columns.push(RawColumn::unquoted(""));
                        return Ok(self.finish_row(row_start, i, row_line));
                    } else if is_field_whitespace(b, self.delimiter) {
                        i += 1;
                    } else if b == b'"' {
                        state = State::QuotedValue;
                        quote_line = self.line;
                        escaped = false;
                        i += 1;
                        field_start = i;
                    } else {
                        state = State::UnquotedValue;
                        field_start = i;
                        i += 1;
                    }
                }
                State::UnquotedValue => {
                    if at_delimiter {
                        columns.push(RawColumn::unquoted(self.trim_end(field_start, i)));
                        state = State::StartOfField;
                        i += self.delim_len;
                    } else if at_terminator {
                        columns.push(RawColumn::unquoted(self.trim_end(field_start, i)));
                        return Ok(self.finish_row(row_start, i, row_line));
                    } else {
                        i += 1;
                    }
                }
                State::QuotedValue => {
                    if b == b'"' {
                        state = State::PossibleEndOfQuote;
                    } else if b == b'\n' || (b == b'\r' && bytes.get(i + 1) != Some(&b'\n')) {
                        self.line += 1;
                    }
                    i += 1;
                }
                State::PossibleEndOfQuote => {
                    if b == b'"' {
                        escaped = true;
                        state = State::QuotedValue;
                        i += 1;
                        continue;
                    }
                    quote_end = i - 1;
                    if at_delimiter {
                        columns.push(RawColumn::quoted(&input[field_start..quote_end], escaped));
                        state = State::StartOfField;
                        i += self.delim_len;
                    } else if at_terminator {
                        columns.push(RawColumn::quoted(&input[field_start..quote_end], escaped));
                        return Ok(self.finish_row(row_start, i, row_line));
                    } else if is_field_whitespace(b, self.delimiter) {
                        state = State::TrailingWhitespaceAfterQuote;
                        i += 1;
                    } else {
                        return Err(self.unexpected_at(i));
                    }
                }
                State::TrailingWhitespaceAfterQuote => {
                    if at_delimiter {
                        columns.push(RawColumn::quoted(&input[field_start..quote_end], escaped));
                        state = State::StartOfField;
                        i += self.delim_len;
                    } else if at_terminator {
                        columns.push(RawColumn::quoted(&input[field_start..quote_end], escaped));
                        return Ok(self.finish_row(row_start, i, row_line));
                    } else if is_field_whitespace(b, self.delimiter) {
                        i += 1;
                    } else {
                        return Err(self.unexpected_at(i));
                    }
                }
            }
        }
    }

    /// Consumes the terminator at `at` and returns the row bounds.
    fn finish_row(
        &mut self,
        row_start: usize,
        at: usize,
        row_line: usize,
    ) -> (usize, usize, usize) {
        let bytes = self.input.as_bytes();
        self.pos = if bytes[at] == b'\r' && bytes.get(at + 1) == Some(&b'\n') {
            at + 2
        } else {
            at + 1
        };
        self.line += 1;
        (row_start, at, row_line)
    }

    #[inline]
    fn is_delimiter_at(&self, i: usize) -> bool {
        self.input.as_bytes()[i..].starts_with(&self.delim_buf[..self.delim_len])
    }

    fn trim_end(&self, start: usize, end: usize) -> &'a str {
        let bytes = self.input.as_bytes();
        let mut end = end;
        while end > start && is_field_whitespace(bytes[end - 1], self.delimiter) {
            end -= 1;
        }
        &self.input[start..end]
    }

    fn unexpected_at(&self, i: usize) -> CsvError {
        CsvError::UnexpectedCharacter {
            line: self.line,
            character: self.input[i..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER),
        }
    }
}
