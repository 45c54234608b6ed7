//! Per-kind conversion between field values and column text.
//!
//! Every converter is stateless apart from type-level constants. Numeric,
//! boolean, uuid, duration and symbol kinds render bare and are only quoted
//! when their text collides with the delimiter. Text, character, URI and
//! date/time kinds are always quoted. Parsing is tolerant: the tokenizer has
//! already stripped one layer of quotes, so a quoted `"42"` parses like `42`.

use crate::common::{push_guarded, push_quoted, render_guarded};
use crate::error::ConvertError;
use crate::format::FormatContext;
use crate::tokenizer::RawColumn;
use crate::value::{FieldKind, FieldValue};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Renders values into column text and parses column text back into values.
pub trait Converter: Send + Sync {
    /// Appends the column text for `value` to `out`, quoting as needed.
    fn render(
        &self,
        value: &FieldValue<'_>,
        pattern: Option<&str>,
        ctx: &FormatContext,
        out: &mut String,
    ) -> Result<(), ConvertError>;

    /// Converts one raw column into a value.
    fn parse<'a>(
        &self,
        column: &RawColumn<'a>,
        pattern: Option<&str>,
        ctx: &FormatContext,
    ) -> Result<FieldValue<'a>, ConvertError>;
}

fn mismatch(expected: FieldKind, value: &FieldValue<'_>) -> ConvertError {
    if value.is_null() {
        ConvertError::new(format!("absent value for required {expected} field"))
    } else {
        ConvertError::new(format!(
            "expected a {expected} value, got {}",
            value.variant_name()
        ))
    }
}

fn fmt_failed(_: fmt::Error) -> ConvertError {
    ConvertError::new("formatting failed")
}

/// Content of a non-text column: quotes stripped, doubled quotes collapsed, trimmed.
fn scalar_text<'a>(column: &RawColumn<'a>) -> Cow<'a, str> {
    match column.value() {
        Cow::Borrowed(s) => Cow::Borrowed(s.trim()),
        Cow::Owned(s) => Cow::Owned(s.trim().to_string()),
    }
}

struct IntegerConverter {
    kind: FieldKind,
}

impl Converter for IntegerConverter {
    fn render(
        &self,
        value: &FieldValue<'_>,
        _pattern: Option<&str>,
        ctx: &FormatContext,
        out: &mut String,
    ) -> Result<(), ConvertError> {
        render_guarded(out, ctx.delimiter, |out| {
            let written = match value {
                FieldValue::U8(v) => write!(out, "{v}"),
                FieldValue::I8(v) => write!(out, "{v}"),
                FieldValue::I16(v) => write!(out, "{v}"),
                FieldValue::U16(v) => write!(out, "{v}"),
                FieldValue::I32(v) => write!(out, "{v}"),
                FieldValue::U32(v) => write!(out, "{v}"),
                FieldValue::I64(v) => write!(out, "{v}"),
                FieldValue::U64(v) => write!(out, "{v}"),
                other => return Err(mismatch(self.kind, other)),
            };
            written.map_err(fmt_failed)
        })
    }

    fn parse<'a>(
        &self,
        column: &RawColumn<'a>,
        _pattern: Option<&str>,
        _ctx: &FormatContext,
    ) -> Result<FieldValue<'a>, ConvertError> {
        let text = scalar_text(column);
        let parsed = match self.kind {
            FieldKind::U8 => text.parse().map(FieldValue::U8),
            FieldKind::I8 => text.parse().map(FieldValue::I8),
            FieldKind::I16 => text.parse().map(FieldValue::I16),
            FieldKind::U16 => text.parse().map(FieldValue::U16),
            FieldKind::I32 => text.parse().map(FieldValue::I32),
            FieldKind::U32 => text.parse().map(FieldValue::U32),
            FieldKind::I64 => text.parse().map(FieldValue::I64),
            FieldKind::U64 => text.parse().map(FieldValue::U64),
            other => return Err(ConvertError::new(format!("{other} is not an integer kind"))),
        };
        parsed.map_err(|e| ConvertError::new(e.to_string()))
    }
}

struct FloatConverter {
    kind: FieldKind,
}

impl FloatConverter {
    fn write_float(out: &mut String, v: f64, text: &str, ctx: &FormatContext) {
        if v.is_nan() {
            out.push_str("NaN");
        } else if v.is_infinite() {
            out.push_str(if v > 0.0 { "Infinity" } else { "-Infinity" });
        } else {
            out.push_str(&ctx.culture.localize_number(text));
        }
    }

    fn parse_special(text: &str) -> Option<f64> {
        match text {
            "NaN" => Some(f64::NAN),
            "Infinity" | "∞" => Some(f64::INFINITY),
            "-Infinity" | "-∞" => Some(f64::NEG_INFINITY),
            _ => None,
        }
    }
}

impl Converter for FloatConverter {
    fn render(
        &self,
        value: &FieldValue<'_>,
        _pattern: Option<&str>,
        ctx: &FormatContext,
        out: &mut String,
    ) -> Result<(), ConvertError> {
        // f32 keeps its own shortest representation.
        let (v, text) = match value {
            FieldValue::F32(v) => (f64::from(*v), v.to_string()),
            FieldValue::F64(v) => (*v, v.to_string()),
            other => return Err(mismatch(self.kind, other)),
        };
        render_guarded(out, ctx.delimiter, |out| {
            Self::write_float(out, v, &text, ctx);
            Ok(())
        })
    }

    fn parse<'a>(
        &self,
        column: &RawColumn<'a>,
        _pattern: Option<&str>,
        ctx: &FormatContext,
    ) -> Result<FieldValue<'a>, ConvertError> {
        let text = scalar_text(column);
        let special = Self::parse_special(&text);
        let normalized = ctx.culture.delocalize_number(&text);
        match self.kind {
            FieldKind::F32 => match special {
                Some(v) => Ok(FieldValue::F32(v as f32)),
                None => normalized
                    .parse::<f32>()
                    .map(FieldValue::F32)
                    .map_err(|e| ConvertError::new(e.to_string())),
            },
            _ => match special {
                Some(v) => Ok(FieldValue::F64(v)),
                None => normalized
                    .parse::<f64>()
                    .map(FieldValue::F64)
                    .map_err(|e| ConvertError::new(e.to_string())),
            },
        }
    }
}

struct DecimalConverter;

impl Converter for DecimalConverter {
    fn render(
        &self,
        value: &FieldValue<'_>,
        _pattern: Option<&str>,
        ctx: &FormatContext,
        out: &mut String,
    ) -> Result<(), ConvertError> {
        let FieldValue::Decimal(v) = value else {
            return Err(mismatch(FieldKind::Decimal, value));
        };
        let text = v.to_string();
        push_guarded(out, &ctx.culture.localize_number(&text), ctx.delimiter);
        Ok(())
    }

    fn parse<'a>(
        &self,
        column: &RawColumn<'a>,
        _pattern: Option<&str>,
        ctx: &FormatContext,
    ) -> Result<FieldValue<'a>, ConvertError> {
        let text = scalar_text(column);
        let normalized = ctx.culture.delocalize_number(&text);
        Decimal::from_str(&normalized)
            .or_else(|_| Decimal::from_scientific(&normalized))
            .map(FieldValue::Decimal)
            .map_err(|e| ConvertError::new(e.to_string()))
    }
}

struct BoolConverter;

impl Converter for BoolConverter {
    fn render(
        &self,
        value: &FieldValue<'_>,
        _pattern: Option<&str>,
        ctx: &FormatContext,
        out: &mut String,
    ) -> Result<(), ConvertError> {
        match value {
            FieldValue::Bool(v) => {
                push_guarded(out, if *v { "True" } else { "False" }, ctx.delimiter);
                Ok(())
            }
            other => Err(mismatch(FieldKind::Bool, other)),
        }
    }

    fn parse<'a>(
        &self,
        column: &RawColumn<'a>,
        _pattern: Option<&str>,
        _ctx: &FormatContext,
    ) -> Result<FieldValue<'a>, ConvertError> {
        let text = scalar_text(column);
        if text.eq_ignore_ascii_case("true") {
            Ok(FieldValue::Bool(true))
        } else if text.eq_ignore_ascii_case("false") {
            Ok(FieldValue::Bool(false))
        } else {
            Err(ConvertError::new("expected True or False"))
        }
    }
}

struct CharConverter;

impl Converter for CharConverter {
    fn render(
        &self,
        value: &FieldValue<'_>,
        _pattern: Option<&str>,
        _ctx: &FormatContext,
        out: &mut String,
    ) -> Result<(), ConvertError> {
        match value {
            FieldValue::Char(c) => {
                push_quoted(out, c.encode_utf8(&mut [0; 4]));
                Ok(())
            }
            other => Err(mismatch(FieldKind::Char, other)),
        }
    }

    fn parse<'a>(
        &self,
        column: &RawColumn<'a>,
        _pattern: Option<&str>,
        _ctx: &FormatContext,
    ) -> Result<FieldValue<'a>, ConvertError> {
        let text = column.value();
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(FieldValue::Char(c)),
            (None, _) => Err(ConvertError::new("expected one character, got none")),
            _ => Err(ConvertError::new(format!(
                "expected one character, got {}",
                text.chars().count()
            ))),
        }
    }
}

struct TextConverter;

impl Converter for TextConverter {
    fn render(
        &self,
        value: &FieldValue<'_>,
        _pattern: Option<&str>,
        _ctx: &FormatContext,
        out: &mut String,
    ) -> Result<(), ConvertError> {
        match value {
            FieldValue::Text(s) => {
                push_quoted(out, s);
                Ok(())
            }
            other => Err(mismatch(FieldKind::Text, other)),
        }
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

/// URIs are written and read under the same rule: non-empty, no whitespace.
struct UriConverter;

impl UriConverter {
    fn check(text: &str) -> Result<(), ConvertError> {
        if text.is_empty() {
            return Err(ConvertError::new("empty URI"));
        }
        if text.chars().any(char::is_whitespace) {
            return Err(ConvertError::new("URI contains whitespace"));
        }
        Ok(())
    }
}

impl Converter for UriConverter {
    fn render(
        &self,
        value: &FieldValue<'_>,
        _pattern: Option<&str>,
        _ctx: &FormatContext,
        out: &mut String,
    ) -> Result<(), ConvertError> {
        match value {
            FieldValue::Uri(s) => {
                Self::check(s)?;
                push_quoted(out, s);
                Ok(())
            }
            other => Err(mismatch(FieldKind::Uri, other)),
        }
    }

    fn parse<'a>(
        &self,
        column: &RawColumn<'a>,
        _pattern: Option<&str>,
        _ctx: &FormatContext,
    ) -> Result<FieldValue<'a>, ConvertError> {
        let text = column.value();
        Self::check(&text)?;
        Ok(FieldValue::Uri(text))
    }
}

struct UuidConverter;

impl Converter for UuidConverter {
    fn render(
        &self,
        value: &FieldValue<'_>,
        _pattern: Option<&str>,
        ctx: &FormatContext,
        out: &mut String,
    ) -> Result<(), ConvertError> {
        match value {
            FieldValue::Uuid(v) => {
                let mut buf = Uuid::encode_buffer();
                push_guarded(out, v.hyphenated().encode_lower(&mut buf), ctx.delimiter);
                Ok(())
            }
            other => Err(mismatch(FieldKind::Uuid, other)),
        }
    }

    fn parse<'a>(
        &self,
        column: &RawColumn<'a>,
        _pattern: Option<&str>,
        _ctx: &FormatContext,
    ) -> Result<FieldValue<'a>, ConvertError> {
        Uuid::parse_str(&scalar_text(column))
            .map(FieldValue::Uuid)
            .map_err(|e| ConvertError::new(e.to_string()))
    }
}

/// Time spans as `[-][d.]hh:mm:ss[.fffffff]`.
struct DurationConverter;

const SECONDS_PER_DAY: i64 = 86_400;

impl DurationConverter {
    fn write(out: &mut String, delta: &TimeDelta) -> fmt::Result {
        let negative = *delta < TimeDelta::zero();
        let abs = delta.abs();
        let total = abs.num_seconds();
        let nanos = abs.subsec_nanos();
        if negative {
            out.push('-');
        }
        let days = total / SECONDS_PER_DAY;
        if days > 0 {
            write!(out, "{days}.")?;
        }
        let rem = total % SECONDS_PER_DAY;
        write!(out, "{:02}:{:02}:{:02}", rem / 3600, rem % 3600 / 60, rem % 60)?;
        if nanos != 0 {
            if nanos % 100 == 0 {
                write!(out, ".{:07}", nanos / 100)?;
            } else {
                write!(out, ".{nanos:09}")?;
            }
        }
        Ok(())
    }

    fn read(text: &str) -> Result<TimeDelta, ConvertError> {
        let invalid = || ConvertError::new("expected a time span like [-][d.]hh:mm:ss[.fffffff]");
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let mut parts = body.split(':');
        let (head, minutes, tail) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(head), Some(minutes), tail, None) => (head, minutes, tail),
            _ => return Err(invalid()),
        };

        let (days, hours) = match head.split_once('.') {
            Some((days, hours)) => (days, hours),
            None => ("0", head),
        };
        let (seconds, fraction) = match tail.map(|s| s.split_once('.').unwrap_or((s, ""))) {
            Some(split) => split,
            None => ("0", ""),
        };

        let number = |s: &str| -> Result<i64, ConvertError> {
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            s.parse::<i64>().map_err(|_| invalid())
        };
        let (days, hours, minutes, seconds) =
            (number(days)?, number(hours)?, number(minutes)?, number(seconds)?);
        if hours > 23 || minutes > 59 || seconds > 59 {
            return Err(ConvertError::new("time span component out of range"));
        }

        let nanos = if fraction.is_empty() {
            0
        } else if fraction.len() > 9 {
            return Err(invalid());
        } else {
            let digits = number(fraction)?;
            digits * 10_i64.pow(9 - fraction.len() as u32)
        };

        let total = days
            .checked_mul(SECONDS_PER_DAY)
            .and_then(|s| s.checked_add(hours * 3600 + minutes * 60 + seconds))
            .ok_or_else(|| ConvertError::new("time span out of range"))?;
        let delta = TimeDelta::new(total, nanos as u32)
            .ok_or_else(|| ConvertError::new("time span out of range"))?;
        Ok(if negative { -delta } else { delta })
    }
}

impl Converter for DurationConverter {
    fn render(
        &self,
        value: &FieldValue<'_>,
        _pattern: Option<&str>,
        ctx: &FormatContext,
        out: &mut String,
    ) -> Result<(), ConvertError> {
        match value {
            FieldValue::Duration(delta) => render_guarded(out, ctx.delimiter, |out| {
                Self::write(out, delta).map_err(fmt_failed)
            }),
            other => Err(mismatch(FieldKind::Duration, other)),
        }
    }

    fn parse<'a>(
        &self,
        column: &RawColumn<'a>,
        _pattern: Option<&str>,
        _ctx: &FormatContext,
    ) -> Result<FieldValue<'a>, ConvertError> {
        Self::read(&scalar_text(column)).map(FieldValue::Duration)
    }
}

/// Date, time and date-time fields. Always quoted on output.
struct TemporalConverter {
    kind: FieldKind,
}

const ISO_DATE_TIMES: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const ISO_DATE: &str = "%Y-%m-%d";
const ISO_TIMES: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

fn midnight(date: NaiveDate) -> Result<NaiveDateTime, ConvertError> {
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| ConvertError::new("date out of range"))
}

fn date_time_with(text: &str, pattern: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, pattern)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, pattern)
                .ok()
                .and_then(|d| midnight(d).ok())
        })
}

impl TemporalConverter {
    fn default_pattern<'c>(&self, ctx: &'c FormatContext) -> &'c str {
        match self.kind {
            FieldKind::Date => &ctx.culture.date_pattern,
            FieldKind::Time => &ctx.culture.time_pattern,
            _ => &ctx.culture.date_time_pattern,
        }
    }

    fn parse_date_time(
        text: &str,
        pattern: Option<&str>,
        ctx: &FormatContext,
    ) -> Option<NaiveDateTime> {
        if let Some(pattern) = pattern {
            return date_time_with(text, pattern);
        }
        [ctx.culture.date_time_pattern.as_str(), ctx.culture.date_pattern.as_str()]
            .into_iter()
            .chain(ISO_DATE_TIMES.iter().copied())
            .chain(std::iter::once(ISO_DATE))
            .find_map(|p| date_time_with(text, p))
    }

    fn parse_date(text: &str, pattern: Option<&str>, ctx: &FormatContext) -> Option<NaiveDate> {
        if let Some(pattern) = pattern {
            return NaiveDate::parse_from_str(text, pattern).ok();
        }
        NaiveDate::parse_from_str(text, &ctx.culture.date_pattern)
            .or_else(|_| NaiveDate::parse_from_str(text, ISO_DATE))
            .ok()
            .or_else(|| Self::parse_date_time(text, None, ctx).map(|dt| dt.date()))
    }

    fn parse_time(text: &str, pattern: Option<&str>, ctx: &FormatContext) -> Option<NaiveTime> {
        if let Some(pattern) = pattern {
            return NaiveTime::parse_from_str(text, pattern).ok();
        }
        std::iter::once(ctx.culture.time_pattern.as_str())
            .chain(ISO_TIMES.iter().copied())
            .find_map(|p| NaiveTime::parse_from_str(text, p).ok())
    }
}

impl Converter for TemporalConverter {
    fn render(
        &self,
        value: &FieldValue<'_>,
        pattern: Option<&str>,
        ctx: &FormatContext,
        out: &mut String,
    ) -> Result<(), ConvertError> {
        let pattern = pattern.unwrap_or_else(|| self.default_pattern(ctx));
        let mut text = String::new();
        let written = match (self.kind, value) {
            (FieldKind::DateTime, FieldValue::DateTime(v)) => write!(text, "{}", v.format(pattern)),
            (FieldKind::Date, FieldValue::Date(v)) => write!(text, "{}", v.format(pattern)),
            (FieldKind::Time, FieldValue::Time(v)) => write!(text, "{}", v.format(pattern)),
            (kind, other) => return Err(mismatch(kind, other)),
        };
        written.map_err(|_| ConvertError::new("invalid date format").with_pattern(pattern))?;
        push_quoted(out, &text);
        Ok(())
    }

    fn parse<'a>(
        &self,
        column: &RawColumn<'a>,
        pattern: Option<&str>,
        ctx: &FormatContext,
    ) -> Result<FieldValue<'a>, ConvertError> {
        let text = scalar_text(column);
        let parsed = match self.kind {
            FieldKind::Date => Self::parse_date(&text, pattern, ctx).map(FieldValue::Date),
            FieldKind::Time => Self::parse_time(&text, pattern, ctx).map(FieldValue::Time),
            _ => Self::parse_date_time(&text, pattern, ctx).map(FieldValue::DateTime),
        };
        parsed.ok_or_else(|| {
            let expected = pattern.unwrap_or_else(|| self.default_pattern(ctx));
            ConvertError::new(format!("not a valid {}", self.kind)).with_pattern(expected)
        })
    }
}

/// Enumerations, matched against their symbol table case-sensitively.
struct SymbolConverter {
    symbols: &'static [&'static str],
}

impl SymbolConverter {
    fn lookup(&self, symbol: &str) -> Option<&'static str> {
        self.symbols.iter().copied().find(|s| *s == symbol)
    }

    fn unknown(&self, symbol: &str) -> ConvertError {
        ConvertError::new(format!(
            "`{symbol}` is not one of {}",
            self.symbols.join(", ")
        ))
    }
}

impl Converter for SymbolConverter {
    fn render(
        &self,
        value: &FieldValue<'_>,
        _pattern: Option<&str>,
        ctx: &FormatContext,
        out: &mut String,
    ) -> Result<(), ConvertError> {
        match value {
            FieldValue::Symbol(symbol) => {
                let symbol = self.lookup(symbol).ok_or_else(|| self.unknown(symbol))?;
                push_guarded(out, symbol, ctx.delimiter);
                Ok(())
            }
            other => Err(mismatch(FieldKind::Symbol(self.symbols), other)),
        }
    }

    fn parse<'a>(
        &self,
        column: &RawColumn<'a>,
        _pattern: Option<&str>,
        _ctx: &FormatContext,
    ) -> Result<FieldValue<'a>, ConvertError> {
        let text = scalar_text(column);
        self.lookup(&text)
            .map(|symbol| FieldValue::Symbol(Cow::Borrowed(symbol)))
            .ok_or_else(|| self.unknown(&text))
    }
}

/// Wraps a converter so that absent values map to empty columns.
struct OptionalConverter {
    inner: Arc<dyn Converter>,
    kind: FieldKind,
}

impl OptionalConverter {
    fn is_absent(&self, column: &RawColumn<'_>) -> bool {
        if column.is_blank() {
            return true;
        }
        if !column.is_quoted() {
            return false;
        }
        // A quoted empty string is a present value for text.
        match self.kind {
            FieldKind::Text => false,
            FieldKind::Char => column.raw().is_empty(),
            _ => column.raw().trim().is_empty(),
        }
    }
}

impl Converter for OptionalConverter {
    fn render(
        &self,
        value: &FieldValue<'_>,
        pattern: Option<&str>,
        ctx: &FormatContext,
        out: &mut String,
    ) -> Result<(), ConvertError> {
        match value {
            FieldValue::Null => Ok(()),
            value => self.inner.render(value, pattern, ctx, out),
        }
    }

    fn parse<'a>(
        &self,
        column: &RawColumn<'a>,
        pattern: Option<&str>,
        ctx: &FormatContext,
    ) -> Result<FieldValue<'a>, ConvertError> {
        if self.is_absent(column) {
            Ok(FieldValue::Null)
        } else {
            self.inner.parse(column, pattern, ctx)
        }
    }
}

/// Maps field kinds to converters.
///
/// Built-in kinds always resolve. [`FieldKind::Custom`] kinds resolve only
/// when a converter was registered under their name.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    custom: HashMap<&'static str, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a converter for `FieldKind::Custom(name)`, returning any converter it replaces.
    pub fn register<C>(&mut self, name: &'static str, converter: C) -> Option<Arc<dyn Converter>>
    where
        C: Converter + 'static,
    {
        self.custom.insert(name, Arc::new(converter))
    }

    pub fn resolve(&self, kind: FieldKind, optional: bool) -> Option<Arc<dyn Converter>> {
        let converter: Arc<dyn Converter> = match kind {
            FieldKind::Bool => Arc::new(BoolConverter),
            FieldKind::U8
            | FieldKind::I8
            | FieldKind::I16
            | FieldKind::U16
            | FieldKind::I32
            | FieldKind::U32
            | FieldKind::I64
            | FieldKind::U64 => Arc::new(IntegerConverter { kind }),
            FieldKind::F32 | FieldKind::F64 => Arc::new(FloatConverter { kind }),
            FieldKind::Decimal => Arc::new(DecimalConverter),
            FieldKind::Char => Arc::new(CharConverter),
            FieldKind::Text => Arc::new(TextConverter),
            FieldKind::DateTime | FieldKind::Date | FieldKind::Time => {
                Arc::new(TemporalConverter { kind })
            }
            FieldKind::Duration => Arc::new(DurationConverter),
            FieldKind::Uuid => Arc::new(UuidConverter),
            FieldKind::Uri => Arc::new(UriConverter),
            FieldKind::Symbol(symbols) => Arc::new(SymbolConverter { symbols }),
            FieldKind::Custom(name) => self.custom.get(name)?.clone(),
        };
        if optional {
            Some(Arc::new(OptionalConverter {
                inner: converter,
                kind,
            }))
        } else {
            Some(converter)
        }
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.custom.keys().collect();
        names.sort();
        f.debug_struct("ConverterRegistry")
            .field("custom", &names)
            .finish()
    }
}
