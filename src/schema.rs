//! Record schemas: the ordered field list of a record type.
//!
//! A record type declares its fields once through [`Record::describe`].
//! [`SchemaBuilder::build`] validates the declaration and resolves a
//! converter for every field, so that per-row work is plain dispatch.

use crate::converter::{Converter, ConverterRegistry};
use crate::error::CsvError;
use crate::value::{FieldKind, FieldType, FieldValue};
use chrono::format::{Item, StrftimeItems};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A type that can be written to and read from CSV rows.
///
/// ```
/// use typed_csv::{CsvError, FieldType, FieldValue, Fields, Record, SchemaBuilder};
///
/// struct Hero {
///     name: String,
///     age: Option<u8>,
/// }
///
/// impl Record for Hero {
///     fn describe(schema: &mut SchemaBuilder) {
///         schema.field::<String>("name").column("Name");
///         schema.field::<Option<u8>>("age").column("Age");
///     }
///
///     fn value(&self, field: &str) -> Option<FieldValue<'_>> {
///         match field {
///             "name" => Some(self.name.to_value()),
///             "age" => Some(self.age.to_value()),
///             _ => None,
///         }
///     }
///
///     fn from_fields(fields: &mut Fields<'_>) -> Result<Self, CsvError> {
///         Ok(Hero {
///             name: fields.take("name")?,
///             age: fields.take("age")?,
///         })
///     }
/// }
/// ```
pub trait Record: Sized + 'static {
    /// Declares the fields in column order.
    fn describe(schema: &mut SchemaBuilder);

    /// Reads the field declared under `field`.
    fn value(&self, field: &str) -> Option<FieldValue<'_>>;

    /// Builds a record from one row of converted values.
    fn from_fields(fields: &mut Fields<'_>) -> Result<Self, CsvError>;
}

/// One declared field, before validation.
#[derive(Debug, Clone)]
pub struct FieldDef {
    source_name: &'static str,
    column_name: Option<String>,
    kind: FieldKind,
    optional: bool,
    date_format: Option<String>,
    write_only: bool,
}

impl FieldDef {
    /// Overrides the column name used in the header row.
    pub fn column(&mut self, name: impl Into<String>) -> &mut Self {
        self.column_name = Some(name.into());
        self
    }

    /// Sets a strftime pattern for date and time fields.
    pub fn date_format(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.date_format = Some(pattern.into());
        self
    }

    pub fn optional(&mut self) -> &mut Self {
        self.optional = true;
        self
    }

    /// Marks a field that has no readable value. Schemas reject such fields.
    pub fn write_only(&mut self) -> &mut Self {
        self.write_only = true;
        self
    }
}

/// Collects field declarations for one record type.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldDef>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field whose kind and optionality follow from `T`.
    pub fn field<T: FieldType>(&mut self, name: &'static str) -> &mut FieldDef {
        self.field_of(name, T::kind(), T::is_optional())
    }

    /// Declares a field with an explicit kind.
    pub fn field_of(
        &mut self,
        name: &'static str,
        kind: FieldKind,
        optional: bool,
    ) -> &mut FieldDef {
        let index = self.fields.len();
        self.fields.push(FieldDef {
            source_name: name,
            column_name: None,
            kind,
            optional,
            date_format: None,
            write_only: false,
        });
        &mut self.fields[index]
    }

    /// Validates the declarations and resolves their converters.
    pub fn build(
        self,
        record: &'static str,
        registry: &ConverterRegistry,
    ) -> Result<RecordSchema, CsvError> {
        let mut columns = HashSet::with_capacity(self.fields.len());
        let mut fields = Vec::with_capacity(self.fields.len());

        for def in self.fields {
            if def.write_only {
                return Err(CsvError::WriteOnlyField {
                    record,
                    field: def.source_name.to_string(),
                });
            }

            let converter =
                registry
                    .resolve(def.kind, def.optional)
                    .ok_or_else(|| CsvError::UnsupportedFieldKind {
                        record,
                        field: def.source_name.to_string(),
                        kind: def.kind.to_string(),
                    })?;

            let format = match def.date_format {
                Some(_) if !def.kind.is_temporal() => {
                    warn!(
                        record,
                        field = def.source_name,
                        kind = %def.kind,
                        "ignoring date format on a non-temporal field"
                    );
                    None
                }
                Some(pattern) => {
                    if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
                        return Err(CsvError::InvalidDateFormat {
                            record,
                            field: def.source_name.to_string(),
                            pattern,
                        });
                    }
                    Some(pattern)
                }
                None => None,
            };

            let column_name = def
                .column_name
                .unwrap_or_else(|| def.source_name.to_string());
            if !columns.insert(column_name.clone()) {
                return Err(CsvError::DuplicateColumn {
                    record,
                    column: column_name,
                });
            }

            fields.push(FieldDescriptor {
                source_name: def.source_name,
                column_name,
                kind: def.kind,
                optional: def.optional,
                format,
                converter,
            });
        }

        debug!(record, fields = fields.len(), "built record schema");
        Ok(RecordSchema { record, fields })
    }
}

/// A validated field with its resolved converter.
#[derive(Clone)]
pub struct FieldDescriptor {
    source_name: &'static str,
    column_name: String,
    kind: FieldKind,
    optional: bool,
    format: Option<String>,
    converter: Arc<dyn Converter>,
}

impl FieldDescriptor {
    pub fn source_name(&self) -> &'static str {
        self.source_name
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("source_name", &self.source_name)
            .field("column_name", &self.column_name)
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// The ordered, immutable field list of one record type.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    record: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    /// Builds the schema of `T` without caching it.
    pub fn for_record<T: Record>(registry: &ConverterRegistry) -> Result<Self, CsvError> {
        let mut builder = SchemaBuilder::new();
        T::describe(&mut builder);
        builder.build(std::any::type_name::<T>(), registry)
    }

    /// Type name of the record, for error messages.
    pub fn record_name(&self) -> &'static str {
        self.record
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.column_name.as_str())
    }
}

/// The converted values of one row, handed to [`Record::from_fields`].
#[derive(Debug)]
pub struct Fields<'a> {
    record: &'static str,
    values: Vec<(&'static str, Option<FieldValue<'a>>)>,
}

impl<'a> Fields<'a> {
    pub(crate) fn with_capacity(record: &'static str, capacity: usize) -> Self {
        Self {
            record,
            values: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, source_name: &'static str, value: FieldValue<'a>) {
        self.values.push((source_name, Some(value)));
    }

    /// Looks at a value without taking it.
    pub fn get(&self, field: &str) -> Option<&FieldValue<'a>> {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Moves a value out, converted to `T`.
    pub fn take<T: FieldType>(&mut self, field: &str) -> Result<T, CsvError> {
        let record = self.record;
        let access = |reason: String| CsvError::FieldAccess {
            record,
            field: field.to_string(),
            reason,
        };
        let slot = self
            .values
            .iter_mut()
            .find(|(name, _)| *name == field)
            .ok_or_else(|| access("no such field in the schema".to_string()))?;
        let value = slot
            .1
            .take()
            .ok_or_else(|| access("value was already taken".to_string()))?;
        let variant = value.variant_name();
        T::from_value(value)
            .ok_or_else(|| access(format!("cannot read a {variant} value as {}", T::kind())))
    }
}
