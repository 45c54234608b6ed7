//! Records to CSV rows.

use crate::common::{push_quoted, CRLF};
use crate::error::CsvError;
use crate::format::FormatContext;
use crate::schema::{Record, RecordSchema};
use std::io;
use tracing::debug;

/// Encoder configuration options
#[derive(Debug, Clone, Default)]
pub struct EncoderOptions {
    /// Write a header row of column names first (default: false)
    pub with_header: bool,
}

/// Flush threshold when writing to an `io::Write` sink.
const FLUSH_AT: usize = 8 * 1024;

/// Encode records into a CSV string following `schema`.
pub fn encode<'r, T, I>(
    records: I,
    schema: &RecordSchema,
    options: &EncoderOptions,
    ctx: &FormatContext,
) -> Result<String, CsvError>
where
    T: Record + 'r,
    I: IntoIterator<Item = &'r T>,
{
    let mut encoder = Encoder::new(schema, ctx);
    if options.with_header {
        encoder.write_header();
    }
    for record in records {
        encoder.write_row(record)?;
    }
    debug!(
        record = schema.record_name(),
        rows = encoder.rows,
        bytes = encoder.output.len(),
        "serialized records"
    );
    Ok(encoder.output)
}

/// Encode records into `writer`, flushing in chunks.
///
/// Rows already flushed stay written if a later record fails.
pub fn encode_to<'r, W, T, I>(
    mut writer: W,
    records: I,
    schema: &RecordSchema,
    options: &EncoderOptions,
    ctx: &FormatContext,
) -> Result<(), CsvError>
where
    W: io::Write,
    T: Record + 'r,
    I: IntoIterator<Item = &'r T>,
{
    let mut encoder = Encoder::new(schema, ctx);
    let mut written = 0;
    if options.with_header {
        encoder.write_header();
    }
    for record in records {
        encoder.write_row(record)?;
        if encoder.output.len() >= FLUSH_AT {
            writer.write_all(encoder.output.as_bytes())?;
            written += encoder.output.len();
            encoder.output.clear();
        }
    }
    writer.write_all(encoder.output.as_bytes())?;
    writer.flush()?;
    written += encoder.output.len();
    debug!(
        record = schema.record_name(),
        rows = encoder.rows,
        bytes = written,
        "serialized records to writer"
    );
    Ok(())
}

/// The header row for `schema`, including its CRLF.
pub fn serialize_header(schema: &RecordSchema, ctx: &FormatContext) -> String {
    let mut encoder = Encoder::new(schema, ctx);
    encoder.write_header();
    encoder.output
}

/// One data row for `record`, including its CRLF.
pub fn serialize_row<T: Record>(
    schema: &RecordSchema,
    record: &T,
    ctx: &FormatContext,
) -> Result<String, CsvError> {
    let mut encoder = Encoder::new(schema, ctx);
    encoder.write_row(record)?;
    Ok(encoder.output)
}

struct Encoder<'a> {
    schema: &'a RecordSchema,
    ctx: &'a FormatContext,
    output: String,
    rows: usize,
}

impl<'a> Encoder<'a> {
    fn new(schema: &'a RecordSchema, ctx: &'a FormatContext) -> Self {
        Self {
            schema,
            ctx,
            output: String::new(),
            rows: 0,
        }
    }

    /// Header cells are always quoted.
    fn write_header(&mut self) {
        for (i, name) in self.schema.column_names().enumerate() {
            if i > 0 {
                self.output.push(self.ctx.delimiter);
            }
            push_quoted(&mut self.output, name);
        }
        self.output.push_str(CRLF);
    }

    /// Appends one row. On error the partial row is discarded.
    fn write_row<T: Record>(&mut self, record: &T) -> Result<(), CsvError> {
        let start = self.output.len();
        if let Err(err) = self.write_fields(record) {
            self.output.truncate(start);
            return Err(err);
        }
        self.output.push_str(CRLF);
        self.rows += 1;
        Ok(())
    }

    fn write_fields<T: Record>(&mut self, record: &T) -> Result<(), CsvError> {
        let name = self.schema.record_name();
        for (i, field) in self.schema.fields().iter().enumerate() {
            if i > 0 {
                self.output.push(self.ctx.delimiter);
            }
            let value = record
                .value(field.source_name())
                .ok_or_else(|| CsvError::MissingValue {
                    record: name,
                    field: field.source_name().to_string(),
                })?;
            field
                .converter()
                .render(&value, field.format(), self.ctx, &mut self.output)
                .map_err(|e| CsvError::Render {
                    record: name,
                    field: field.source_name().to_string(),
                    reason: e.reason,
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ConverterRegistry;
    use crate::format::Culture;
    use crate::schema::{Fields, SchemaBuilder};
    use crate::value::{FieldType, FieldValue};

    struct Hero {
        name: String,
        weight: f64,
        alias: Option<String>,
    }

    impl Record for Hero {
        fn describe(schema: &mut SchemaBuilder) {
            schema.field::<String>("name").column("Name");
            schema.field::<f64>("weight").column("Weight");
            schema.field::<Option<String>>("alias").column("Alias \"AKA\"");
        }

        fn value(&self, field: &str) -> Option<FieldValue<'_>> {
            match field {
                "name" => Some(self.name.to_value()),
                "weight" => Some(self.weight.to_value()),
                "alias" => Some(self.alias.to_value()),
                _ => None,
            }
        }

        fn from_fields(fields: &mut Fields<'_>) -> Result<Self, CsvError> {
            Ok(Self {
                name: fields.take("name")?,
                weight: fields.take("weight")?,
                alias: fields.take("alias")?,
            })
        }
    }

    fn schema() -> RecordSchema {
        RecordSchema::for_record::<Hero>(&ConverterRegistry::new()).unwrap()
    }

    fn tony() -> Hero {
        Hero {
            name: "Tony \"Iron Man\" Stark".into(),
            weight: 80.5,
            alias: None,
        }
    }

    #[test]
    fn header_cells_are_quoted_and_escaped() {
        let header = serialize_header(&schema(), &FormatContext::default());
        assert_eq!(header, "\"Name\",\"Weight\",\"Alias \"\"AKA\"\"\"\r\n");
    }

    #[test]
    fn row_is_crlf_terminated() {
        let row = serialize_row(&schema(), &tony(), &FormatContext::default()).unwrap();
        assert_eq!(row, "\"Tony \"\"Iron Man\"\" Stark\",80.5,\r\n");
    }

    #[test]
    fn locale_separator_colliding_with_delimiter_is_quoted() {
        let ctx = FormatContext::new(Culture::de_de());
        let row = serialize_row(&schema(), &tony(), &ctx).unwrap();
        assert_eq!(row, "\"Tony \"\"Iron Man\"\" Stark\",\"80,5\",\r\n");

        let ctx = ctx.with_delimiter(';');
        let row = serialize_row(&schema(), &tony(), &ctx).unwrap();
        assert_eq!(row, "\"Tony \"\"Iron Man\"\" Stark\";80,5;\r\n");
    }

    #[test]
    fn encode_with_header() {
        let heroes = [tony()];
        let options = EncoderOptions { with_header: true };
        let csv = encode(&heroes, &schema(), &options, &FormatContext::default()).unwrap();
        assert_eq!(
            csv,
            "\"Name\",\"Weight\",\"Alias \"\"AKA\"\"\"\r\n\"Tony \"\"Iron Man\"\" Stark\",80.5,\r\n"
        );
    }

    #[test]
    fn encode_to_writer_matches_string() {
        let heroes: Vec<_> = (0..500).map(|_| tony()).collect();
        let options = EncoderOptions::default();
        let ctx = FormatContext::default();
        let mut sink = Vec::new();
        encode_to(&mut sink, &heroes, &schema(), &options, &ctx).unwrap();
        let expected = encode(&heroes, &schema(), &options, &ctx).unwrap();
        assert_eq!(String::from_utf8(sink).unwrap(), expected);
    }

    #[test]
    fn missing_value_names_the_field() {
        struct Partial;

        impl Record for Partial {
            fn describe(schema: &mut SchemaBuilder) {
                schema.field::<i32>("present");
                schema.field::<i32>("absent");
            }

            fn value(&self, field: &str) -> Option<FieldValue<'_>> {
                (field == "present").then_some(FieldValue::I32(1))
            }

            fn from_fields(_fields: &mut Fields<'_>) -> Result<Self, CsvError> {
                Ok(Partial)
            }
        }

        let schema = RecordSchema::for_record::<Partial>(&ConverterRegistry::new()).unwrap();
        let err = encode(&[Partial], &schema, &EncoderOptions::default(), &FormatContext::default())
            .unwrap_err();
        assert!(matches!(err, CsvError::MissingValue { ref field, .. } if field == "absent"));
    }

    #[test]
    fn mismatched_value_is_a_render_error() {
        struct Liar;

        impl Record for Liar {
            fn describe(schema: &mut SchemaBuilder) {
                schema.field::<i32>("n");
            }

            fn value(&self, _field: &str) -> Option<FieldValue<'_>> {
                Some(FieldValue::Text("seven".into()))
            }

            fn from_fields(_fields: &mut Fields<'_>) -> Result<Self, CsvError> {
                Ok(Liar)
            }
        }

        let schema = RecordSchema::for_record::<Liar>(&ConverterRegistry::new()).unwrap();
        let err = serialize_row(&schema, &Liar, &FormatContext::default()).unwrap_err();
        assert!(matches!(err, CsvError::Render { ref reason, .. } if reason.contains("Text")));
    }
}
