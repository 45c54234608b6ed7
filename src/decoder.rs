//! CSV rows to records.

use crate::error::CsvError;
use crate::format::FormatContext;
use crate::schema::{Fields, Record, RecordSchema};
use crate::tokenizer::{Row, Tokenizer};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace};

/// Decoder configuration options
#[derive(Debug, Clone, Default)]
pub struct DecoderOptions {
    /// The first row holds column names and is skipped (default: false)
    pub has_header: bool,
}

/// Decode `text` lazily into records of type `T`.
pub fn decode<'a, T: Record>(
    text: &'a str,
    schema: Arc<RecordSchema>,
    options: &DecoderOptions,
    ctx: &FormatContext,
) -> CsvRecords<'a, T> {
    CsvRecords {
        text,
        schema,
        ctx: ctx.clone(),
        has_header: options.has_header,
        _record: PhantomData,
    }
}

/// A restartable sequence of records read from CSV text.
///
/// Nothing is parsed until the sequence is iterated. Every call to
/// [`CsvRecords::iter`] starts a fresh pass from the first row.
pub struct CsvRecords<'a, T> {
    text: &'a str,
    schema: Arc<RecordSchema>,
    ctx: FormatContext,
    has_header: bool,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: Record> CsvRecords<'a, T> {
    pub fn iter(&self) -> RecordIter<'a, T> {
        debug!(
            record = self.schema.record_name(),
            bytes = self.text.len(),
            has_header = self.has_header,
            "deserialization started"
        );
        RecordIter {
            tokenizer: Tokenizer::new(self.text, self.ctx.delimiter),
            schema: Arc::clone(&self.schema),
            ctx: self.ctx.clone(),
            session: if self.has_header {
                Session::BeforeHeader
            } else {
                Session::AtFirstDataRow
            },
            records: 0,
            _record: PhantomData,
        }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }
}

impl<T> fmt::Debug for CsvRecords<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvRecords")
            .field("record", &self.schema.record_name())
            .field("bytes", &self.text.len())
            .field("has_header", &self.has_header)
            .finish()
    }
}

impl<'a, T: Record> IntoIterator for &CsvRecords<'a, T> {
    type Item = Result<T, CsvError>;
    type IntoIter = RecordIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Record> IntoIterator for CsvRecords<'a, T> {
    type Item = Result<T, CsvError>;
    type IntoIter = RecordIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    BeforeHeader,
    AtFirstDataRow,
    Consuming,
    Done,
}

/// One pass over the rows of a [`CsvRecords`].
///
/// Yields each record in row order. After the first error the pass is over
/// and every later call returns `None`. Records already yielded stay valid.
pub struct RecordIter<'a, T> {
    tokenizer: Tokenizer<'a>,
    schema: Arc<RecordSchema>,
    ctx: FormatContext,
    session: Session,
    records: usize,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> RecordIter<'_, T> {
    fn skip_header(&mut self) -> Result<(), CsvError> {
        if let Some(row) = self.tokenizer.next_row()? {
            trace!(line = row.line(), columns = row.len(), "skipped header row");
        }
        self.session = Session::AtFirstDataRow;
        Ok(())
    }

    fn finish(&mut self) {
        self.session = Session::Done;
        debug!(
            record = self.schema.record_name(),
            records = self.records,
            rows = self.tokenizer.rows_read(),
            "deserialization finished"
        );
    }
}

impl<T: Record> Iterator for RecordIter<'_, T> {
    type Item = Result<T, CsvError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.session {
            Session::Done => return None,
            Session::BeforeHeader => {
                if let Err(err) = self.skip_header() {
                    self.session = Session::Done;
                    return Some(Err(err));
                }
            }
            Session::AtFirstDataRow | Session::Consuming => {}
        }

        let result = match self.tokenizer.next_row() {
            Ok(Some(row)) => build_record(&row, &self.schema, &self.ctx),
            Ok(None) => {
                self.finish();
                return None;
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(record) => {
                self.session = Session::Consuming;
                self.records += 1;
                Some(Ok(record))
            }
            Err(err) => {
                self.session = Session::Done;
                debug!(
                    record = self.schema.record_name(),
                    records = self.records,
                    "deserialization stopped on error"
                );
                Some(Err(err))
            }
        }
    }
}

fn build_record<T: Record>(
    row: &Row<'_, '_>,
    schema: &RecordSchema,
    ctx: &FormatContext,
) -> Result<T, CsvError> {
    if row.len() != schema.len() {
        return Err(CsvError::Structural {
            line: row.line(),
            expected: schema.len(),
            found: row.len(),
            row: row.text().to_string(),
        });
    }

    let record = schema.record_name();
    let mut fields = Fields::with_capacity(record, schema.len());
    for (field, column) in schema.fields().iter().zip(row.columns()) {
        let value = field
            .converter()
            .parse(column, field.format(), ctx)
            .map_err(|e| CsvError::FieldFormat {
                record,
                field: field.source_name().to_string(),
                text: column.raw().to_string(),
                reason: e.reason,
                pattern: e.pattern,
            })?;
        fields.push(field.source_name(), value);
    }
    T::from_fields(&mut fields)
}
