//! # typed_csv
//!
//! A schema-driven CSV serializer: typed records in, CSV text out, and back.
//!
//! Each record type declares its fields once through [`Record::describe`].
//! The declaration is turned into a [`RecordSchema`] whose fields each carry
//! a resolved [`Converter`]. Schemas are built lazily and cached per type by
//! the [`CsvSerializer`] that owns them.
//!
//! Reading is lazy and allocation-lean. The [`Tokenizer`] hands out column
//! slices that borrow from the input, and quotes are only unescaped when a
//! column actually contains doubled quotes.
//!
//! ## Example
//!
//! ```rust
//! use typed_csv::{
//!     CsvError, CsvSerializer, DecoderOptions, EncoderOptions, FieldType, FieldValue, Fields,
//!     FormatContext, Record, SchemaBuilder,
//! };
//!
//! #[derive(Debug, PartialEq)]
//! struct Hero {
//!     name: String,
//!     strength: u8,
//! }
//!
//! impl Record for Hero {
//!     fn describe(schema: &mut SchemaBuilder) {
//!         schema.field::<String>("name").column("Name");
//!         schema.field::<u8>("strength").column("Strength");
//!     }
//!
//!     fn value(&self, field: &str) -> Option<FieldValue<'_>> {
//!         match field {
//!             "name" => Some(self.name.to_value()),
//!             "strength" => Some(self.strength.to_value()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn from_fields(fields: &mut Fields<'_>) -> Result<Self, CsvError> {
//!         Ok(Hero {
//!             name: fields.take("name")?,
//!             strength: fields.take("strength")?,
//!         })
//!     }
//! }
//!
//! let csv = CsvSerializer::new();
//! let ctx = FormatContext::default();
//! let heroes = vec![Hero { name: "Tony \"Iron Man\" Stark".into(), strength: 85 }];
//!
//! let text = csv
//!     .serialize(&heroes, &EncoderOptions { with_header: true }, &ctx)
//!     .unwrap();
//! assert_eq!(text, "\"Name\",\"Strength\"\r\n\"Tony \"\"Iron Man\"\" Stark\",85\r\n");
//!
//! let read: Vec<Hero> = csv
//!     .deserialize::<Hero>(&text, &DecoderOptions { has_header: true }, &ctx)
//!     .unwrap()
//!     .into_iter()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(read, heroes);
//! ```

mod cache;
mod common;
mod converter;
mod decoder;
mod encoder;
mod error;
mod format;
mod schema;
mod tokenizer;
mod value;

use std::io;
use std::sync::Arc;

// Re-export public API
pub use cache::SchemaCache;
pub use common::{escape, unescape};
pub use converter::{Converter, ConverterRegistry};
pub use decoder::{CsvRecords, DecoderOptions, RecordIter};
pub use encoder::{serialize_header, serialize_row, EncoderOptions};
pub use error::{ConvertError, CsvError};
pub use format::{Culture, FormatContext};
pub use schema::{FieldDef, FieldDescriptor, Fields, Record, RecordSchema, SchemaBuilder};
pub use tokenizer::{RawColumn, Row, Tokenizer};
pub use value::{FieldKind, FieldType, FieldValue, Symbolic, Uri};

/// Serializes and deserializes records, caching one schema per record type.
///
/// A serializer is `Send + Sync`, so one instance can be shared across
/// threads that work on disjoint sets of records.
#[derive(Debug, Default)]
pub struct CsvSerializer {
    cache: SchemaCache,
}

impl CsvSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A serializer that resolves custom kinds through `registry`.
    pub fn with_registry(registry: ConverterRegistry) -> Self {
        Self {
            cache: SchemaCache::with_registry(registry),
        }
    }

    /// Registers a converter for fields declared as `FieldKind::Custom(name)`.
    ///
    /// Cached schemas are dropped so that they pick up the new converter.
    pub fn register_converter<C>(&mut self, name: &'static str, converter: C)
    where
        C: Converter + 'static,
    {
        self.cache.register(name, converter);
    }

    pub fn schema_for<T: Record>(&self) -> Result<Arc<RecordSchema>, CsvError> {
        self.cache.schema_for::<T>()
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Writes `records` as CSV text.
    pub fn serialize<'r, T, I>(
        &self,
        records: I,
        options: &EncoderOptions,
        ctx: &FormatContext,
    ) -> Result<String, CsvError>
    where
        T: Record + 'r,
        I: IntoIterator<Item = &'r T>,
    {
        ctx.validate()?;
        let schema = self.cache.schema_for::<T>()?;
        encoder::encode(records, &schema, options, ctx)
    }

    /// Writes `records` as CSV text into `writer`.
    pub fn serialize_to<'r, W, T, I>(
        &self,
        writer: W,
        records: I,
        options: &EncoderOptions,
        ctx: &FormatContext,
    ) -> Result<(), CsvError>
    where
        W: io::Write,
        T: Record + 'r,
        I: IntoIterator<Item = &'r T>,
    {
        ctx.validate()?;
        let schema = self.cache.schema_for::<T>()?;
        encoder::encode_to(writer, records, &schema, options, ctx)
    }

    /// Reads records of type `T` from `text`.
    ///
    /// Only the schema is resolved here. Rows are parsed while iterating, so
    /// tokenizer and conversion errors surface as items of the sequence.
    pub fn deserialize<'a, T: Record>(
        &self,
        text: &'a str,
        options: &DecoderOptions,
        ctx: &FormatContext,
    ) -> Result<CsvRecords<'a, T>, CsvError> {
        ctx.validate()?;
        let schema = self.cache.schema_for::<T>()?;
        Ok(decoder::decode(text, schema, options, ctx))
    }
}

/// Serialize records with a one-off serializer.
pub fn serialize<'r, T, I>(
    records: I,
    options: &EncoderOptions,
    ctx: &FormatContext,
) -> Result<String, CsvError>
where
    T: Record + 'r,
    I: IntoIterator<Item = &'r T>,
{
    CsvSerializer::new().serialize(records, options, ctx)
}

/// Deserialize records with a one-off serializer.
pub fn deserialize<'a, T: Record>(
    text: &'a str,
    options: &DecoderOptions,
    ctx: &FormatContext,
) -> Result<CsvRecords<'a, T>, CsvError> {
    CsvSerializer::new().deserialize(text, options, ctx)
}
