//! Memoized record schemas keyed by record type.

use crate::converter::{Converter, ConverterRegistry};
use crate::error::CsvError;
use crate::schema::{Record, RecordSchema};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

/// Builds each record type's schema once and hands out shared copies.
///
/// Lookups take a read lock. A miss builds the schema with no lock held and
/// then inserts it unless another thread got there first, in which case the
/// stored schema wins and the fresh one is dropped.
#[derive(Debug, Default)]
pub struct SchemaCache {
    registry: ConverterRegistry,
    schemas: RwLock<HashMap<TypeId, Arc<RecordSchema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: ConverterRegistry) -> Self {
        Self {
            registry,
            schemas: RwLock::default(),
        }
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Registers a custom converter and drops every cached schema.
    pub fn register<C>(&mut self, name: &'static str, converter: C)
    where
        C: Converter + 'static,
    {
        self.registry.register(name, converter);
        self.schemas
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn schema_for<T: Record>(&self) -> Result<Arc<RecordSchema>, CsvError> {
        let key = TypeId::of::<T>();
        if let Some(schema) = self.read().get(&key) {
            trace!(record = schema.record_name(), "schema cache hit");
            return Ok(Arc::clone(schema));
        }

        let built = Arc::new(RecordSchema::for_record::<T>(&self.registry)?);
        let mut schemas = self.write();
        Ok(Arc::clone(schemas.entry(key).or_insert(built)))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<TypeId, Arc<RecordSchema>>> {
        self.schemas.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TypeId, Arc<RecordSchema>>> {
        self.schemas.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::format::FormatContext;
    use crate::schema::{Fields, SchemaBuilder};
    use crate::tokenizer::RawColumn;
    use crate::value::{FieldKind, FieldType, FieldValue};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    static DESCRIBE_CALLS: AtomicUsize = AtomicUsize::new(0);

    struct Counted(u32);

    impl Record for Counted {
        fn describe(schema: &mut SchemaBuilder) {
            schema.field::<u32>("n");
        }

        fn value(&self, field: &str) -> Option<FieldValue<'_>> {
            (field == "n").then(|| self.0.to_value())
        }

        fn from_fields(fields: &mut Fields<'_>) -> Result<Self, CsvError> {
            Ok(Self(fields.take("n")?))
        }
    }

    /// Only used by `schema_is_built_once`, so the counter is not shared.
    struct Tallied(u32);

    impl Record for Tallied {
        fn describe(schema: &mut SchemaBuilder) {
            DESCRIBE_CALLS.fetch_add(1, Ordering::SeqCst);
            schema.field::<u32>("n");
        }

        fn value(&self, field: &str) -> Option<FieldValue<'_>> {
            (field == "n").then(|| self.0.to_value())
        }

        fn from_fields(fields: &mut Fields<'_>) -> Result<Self, CsvError> {
            Ok(Self(fields.take("n")?))
        }
    }

    struct Echo;

    impl Converter for Echo {
        fn render(
            &self,
            value: &FieldValue<'_>,
            _pattern: Option<&str>,
            _ctx: &FormatContext,
            out: &mut String,
        ) -> Result<(), ConvertError> {
            if let FieldValue::Text(s) = value {
                out.push_str(s);
            }
            Ok(())
        }

        fn parse<'a>(
            &self,
            column: &RawColumn<'a>,
            _pattern: Option<&str>,
            _ctx: &FormatContext,
        ) -> Result<FieldValue<'a>, ConvertError> {
            Ok(FieldValue::Text(column.value()))
        }
    }

    struct Broken;

    impl Record for Broken {
        fn describe(schema: &mut SchemaBuilder) {
            schema.field_of("x", FieldKind::Custom("missing"), false);
        }

        fn value(&self, _field: &str) -> Option<FieldValue<'_>> {
            None
        }

        fn from_fields(_fields: &mut Fields<'_>) -> Result<Self, CsvError> {
            Ok(Broken)
        }
    }

    #[test]
    fn schema_is_built_once() {
        let cache = SchemaCache::new();
        let first = cache.schema_for::<Tallied>().unwrap();
        let second = cache.schema_for::<Tallied>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(DESCRIBE_CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_lookups_agree() {
        let cache = SchemaCache::new();
        let schemas: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.schema_for::<Counted>().unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let stored = cache.schema_for::<Counted>().unwrap();
        assert!(schemas.iter().all(|s| s.len() == 1));
        // Every caller after the race sees the stored schema.
        assert!(Arc::ptr_eq(&stored, &cache.schema_for::<Counted>().unwrap()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = SchemaCache::new();
        assert!(cache.schema_for::<Broken>().is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn registering_invalidates() {
        let mut cache = SchemaCache::new();
        cache.schema_for::<Counted>().unwrap();
        cache.register("missing", Echo);
        assert!(cache.is_empty());
        assert!(cache.schema_for::<Broken>().is_ok());
    }
}
