//! Field kinds and the dynamically typed values that flow through converters.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::fmt;
use uuid::Uuid;

/// The semantic kind of a field, used to pick its converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    U8,
    I8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
    Char,
    Text,
    DateTime,
    Date,
    Time,
    Duration,
    Uuid,
    Uri,
    /// An enumeration rendered by symbol, carrying its symbol table.
    Symbol(&'static [&'static str]),
    /// A kind handled by a converter registered under this name.
    Custom(&'static str),
}

impl FieldKind {
    /// Kinds that accept a custom date/time pattern.
    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldKind::DateTime | FieldKind::Date | FieldKind::Time)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Symbol(symbols) => write!(f, "Symbol[{}]", symbols.join("|")),
            FieldKind::Custom(name) => write!(f, "Custom({name})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// A single field value. `Null` stands for an absent optional value.
///
/// Text-like variants borrow where they can: from the record when
/// serializing, from the input buffer when deserializing.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Null,
    Bool(bool),
    U8(u8),
    I8(i8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Char(char),
    Text(Cow<'a, str>),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Duration(TimeDelta),
    Uuid(Uuid),
    Uri(Cow<'a, str>),
    Symbol(Cow<'a, str>),
}

impl FieldValue<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Name of the variant, for error messages.
    pub fn variant_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "Null",
            FieldValue::Bool(_) => "Bool",
            FieldValue::U8(_) => "U8",
            FieldValue::I8(_) => "I8",
            FieldValue::I16(_) => "I16",
            FieldValue::U16(_) => "U16",
            FieldValue::I32(_) => "I32",
            FieldValue::U32(_) => "U32",
            FieldValue::I64(_) => "I64",
            FieldValue::U64(_) => "U64",
            FieldValue::F32(_) => "F32",
            FieldValue::F64(_) => "F64",
            FieldValue::Decimal(_) => "Decimal",
            FieldValue::Char(_) => "Char",
            FieldValue::Text(_) => "Text",
            FieldValue::DateTime(_) => "DateTime",
            FieldValue::Date(_) => "Date",
            FieldValue::Time(_) => "Time",
            FieldValue::Duration(_) => "Duration",
            FieldValue::Uuid(_) => "Uuid",
            FieldValue::Uri(_) => "Uri",
            FieldValue::Symbol(_) => "Symbol",
        }
    }

    /// Detaches the value from any borrowed buffer.
    pub fn into_owned(self) -> FieldValue<'static> {
        match self {
            FieldValue::Text(s) => FieldValue::Text(Cow::Owned(s.into_owned())),
            FieldValue::Uri(s) => FieldValue::Uri(Cow::Owned(s.into_owned())),
            FieldValue::Symbol(s) => FieldValue::Symbol(Cow::Owned(s.into_owned())),
            FieldValue::Null => FieldValue::Null,
            FieldValue::Bool(v) => FieldValue::Bool(v),
            FieldValue::U8(v) => FieldValue::U8(v),
            FieldValue::I8(v) => FieldValue::I8(v),
            FieldValue::I16(v) => FieldValue::I16(v),
            FieldValue::U16(v) => FieldValue::U16(v),
            FieldValue::I32(v) => FieldValue::I32(v),
            FieldValue::U32(v) => FieldValue::U32(v),
            FieldValue::I64(v) => FieldValue::I64(v),
            FieldValue::U64(v) => FieldValue::U64(v),
            FieldValue::F32(v) => FieldValue::F32(v),
            FieldValue::F64(v) => FieldValue::F64(v),
            FieldValue::Decimal(v) => FieldValue::Decimal(v),
            FieldValue::Char(v) => FieldValue::Char(v),
            FieldValue::DateTime(v) => FieldValue::DateTime(v),
            FieldValue::Date(v) => FieldValue::Date(v),
            FieldValue::Time(v) => FieldValue::Time(v),
            FieldValue::Duration(v) => FieldValue::Duration(v),
            FieldValue::Uuid(v) => FieldValue::Uuid(v),
        }
    }
}

/// A Rust type that can be stored in a record field.
pub trait FieldType: Sized {
    fn kind() -> FieldKind;

    fn is_optional() -> bool {
        false
    }

    fn to_value(&self) -> FieldValue<'_>;

    /// Returns `None` when the value has another variant.
    fn from_value(value: FieldValue<'_>) -> Option<Self>;
}

macro_rules! copy_field_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl FieldType for $ty {
            fn kind() -> FieldKind {
                FieldKind::$variant
            }

            fn to_value(&self) -> FieldValue<'_> {
                FieldValue::$variant(*self)
            }

            fn from_value(value: FieldValue<'_>) -> Option<Self> {
                match value {
                    FieldValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    )*};
}

copy_field_type!(
    bool => Bool,
    u8 => U8,
    i8 => I8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    char => Char,
    NaiveDateTime => DateTime,
    NaiveDate => Date,
    NaiveTime => Time,
    TimeDelta => Duration,
    Uuid => Uuid,
);

impl FieldType for String {
    fn kind() -> FieldKind {
        FieldKind::Text
    }

    fn to_value(&self) -> FieldValue<'_> {
        FieldValue::Text(Cow::Borrowed(self))
    }

    fn from_value(value: FieldValue<'_>) -> Option<Self> {
        match value {
            FieldValue::Text(s) => Some(s.into_owned()),
            _ => None,
        }
    }
}

/// A URI or URI reference, kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri(pub String);

impl Uri {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FieldType for Uri {
    fn kind() -> FieldKind {
        FieldKind::Uri
    }

    fn to_value(&self) -> FieldValue<'_> {
        FieldValue::Uri(Cow::Borrowed(&self.0))
    }

    fn from_value(value: FieldValue<'_>) -> Option<Self> {
        match value {
            FieldValue::Uri(s) => Some(Uri(s.into_owned())),
            _ => None,
        }
    }
}

impl<T: FieldType> FieldType for Option<T> {
    fn kind() -> FieldKind {
        T::kind()
    }

    fn is_optional() -> bool {
        true
    }

    fn to_value(&self) -> FieldValue<'_> {
        match self {
            Some(value) => value.to_value(),
            None => FieldValue::Null,
        }
    }

    fn from_value(value: FieldValue<'_>) -> Option<Self> {
        match value {
            FieldValue::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// An enumeration serialized by its symbolic name.
///
/// Implement this and invoke [`symbolic_field_type!`](crate::symbolic_field_type)
/// to use the enum as a record field.
pub trait Symbolic: Sized + 'static {
    const SYMBOLS: &'static [&'static str];

    fn symbol(&self) -> &'static str;

    fn from_symbol(symbol: &str) -> Option<Self>;
}

/// Implements [`FieldType`] for a type that implements [`Symbolic`].
#[macro_export]
macro_rules! symbolic_field_type {
    ($ty:ty) => {
        impl $crate::FieldType for $ty {
            fn kind() -> $crate::FieldKind {
                $crate::FieldKind::Symbol(<$ty as $crate::Symbolic>::SYMBOLS)
            }

            fn to_value(&self) -> $crate::FieldValue<'_> {
                $crate::FieldValue::Symbol(::std::borrow::Cow::Borrowed(
                    <$ty as $crate::Symbolic>::symbol(self),
                ))
            }

            fn from_value(value: $crate::FieldValue<'_>) -> ::std::option::Option<Self> {
                match value {
                    $crate::FieldValue::Symbol(symbol) => {
                        <$ty as $crate::Symbolic>::from_symbol(&symbol)
                    }
                    _ => ::std::option::Option::None,
                }
            }
        }
    };
}
