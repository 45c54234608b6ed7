//! Error types for serialization, deserialization and schema construction.

use thiserror::Error;

/// An error raised while building a schema, writing rows or reading rows.
#[derive(Error, Debug)]
pub enum CsvError {
    /// A row has a different number of columns than the schema has fields.
    #[error("row at line {line} has {found} columns, expected {expected}: {row}")]
    Structural {
        line: usize,
        expected: usize,
        found: usize,
        row: String,
    },
    /// A column could not be converted to its field's kind.
    #[error(
        "cannot convert {text:?} into field `{field}` of {record}: {reason}{}",
        pattern_hint(.pattern)
    )]
    FieldFormat {
        record: &'static str,
        field: String,
        text: String,
        reason: String,
        pattern: Option<String>,
    },
    /// A quoted field was still open at end of input.
    #[error("unterminated quoted field starting at line {line}")]
    UnterminatedQuote { line: usize },
    /// Something other than whitespace followed a closing quote.
    #[error("unexpected character {character:?} after closing quote at line {line}")]
    UnexpectedCharacter { line: usize, character: char },
    /// No converter is registered for a declared field kind.
    #[error("field `{field}` of {record} has unsupported kind {kind}")]
    UnsupportedFieldKind {
        record: &'static str,
        field: String,
        kind: String,
    },
    /// A field cannot be read and therefore cannot be serialized.
    #[error("field `{field}` of {record} is write-only")]
    WriteOnlyField { record: &'static str, field: String },
    /// Two fields map to the same column name.
    #[error("column `{column}` is declared more than once in {record}")]
    DuplicateColumn { record: &'static str, column: String },
    /// A custom date/time pattern is not a valid strftime pattern.
    #[error("field `{field}` of {record} has an invalid date format {pattern:?}")]
    InvalidDateFormat {
        record: &'static str,
        field: String,
        pattern: String,
    },
    /// A record returned no value for one of its declared fields.
    #[error("{record} has no readable value for field `{field}`")]
    MissingValue { record: &'static str, field: String },
    /// A value could not be rendered by its field's converter.
    #[error("cannot render field `{field}` of {record}: {reason}")]
    Render {
        record: &'static str,
        field: String,
        reason: String,
    },
    /// A record constructor requested a field that is absent or of another type.
    #[error("cannot read field `{field}` of {record}: {reason}")]
    FieldAccess {
        record: &'static str,
        field: String,
        reason: String,
    },
    /// The delimiter collides with quoting or line structure.
    #[error("{0:?} cannot be used as a delimiter")]
    InvalidDelimiter(char),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid format configuration: {0}")]
    Config(#[from] serde_json::Error),
}

fn pattern_hint(pattern: &Option<String>) -> String {
    match pattern {
        Some(pattern) => format!(" (expected pattern {pattern:?})"),
        None => String::new(),
    }
}

/// Failure reported by a single converter, before record and field context is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertError {
    pub reason: String,
    pub pattern: Option<String>,
}

impl ConvertError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            pattern: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for ConvertError {}
