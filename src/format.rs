//! Locale rules and the active delimiter, passed explicitly to every call.

use crate::error::CsvError;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::borrow::Cow;

/// Culture-specific number and date conventions.
///
/// Date patterns use chrono's strftime syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Culture {
    /// Culture name, e.g. `fr-FR`. Empty for the invariant culture.
    pub name: String,
    /// Separator between the integral and fractional part of numbers.
    pub decimal_separator: char,
    /// Default pattern for date-time fields.
    pub date_time_pattern: String,
    /// Default pattern for date-only fields, also tried when parsing date-times.
    pub date_pattern: String,
    /// Default pattern for time-of-day fields.
    pub time_pattern: String,
}

impl Default for Culture {
    fn default() -> Self {
        Self::invariant()
    }
}

impl Culture {
    fn with(name: &str, decimal_separator: char, date: &str, time: &str) -> Self {
        Self {
            name: name.to_string(),
            decimal_separator,
            date_time_pattern: format!("{date} {time}"),
            date_pattern: date.to_string(),
            time_pattern: time.to_string(),
        }
    }

    pub fn invariant() -> Self {
        Self::with("", '.', "%m/%d/%Y", "%H:%M:%S%.f")
    }

    pub fn en_us() -> Self {
        Self::with("en-US", '.', "%-m/%-d/%Y", "%-I:%M:%S%.f %p")
    }

    pub fn en_gb() -> Self {
        Self::with("en-GB", '.', "%d/%m/%Y", "%H:%M:%S%.f")
    }

    pub fn de_de() -> Self {
        Self::with("de-DE", ',', "%d.%m.%Y", "%H:%M:%S%.f")
    }

    pub fn fr_fr() -> Self {
        Self::with("fr-FR", ',', "%d/%m/%Y", "%H:%M:%S%.f")
    }

    pub fn nl_nl() -> Self {
        Self::with("nl-NL", ',', "%d-%m-%Y", "%H:%M:%S%.f")
    }

    /// Looks up a built-in culture, ignoring ASCII case.
    pub fn by_name(name: &str) -> Option<Self> {
        let culture = match name.to_ascii_lowercase().as_str() {
            "" | "invariant" => Self::invariant(),
            "en-us" => Self::en_us(),
            "en-gb" => Self::en_gb(),
            "de-de" => Self::de_de(),
            "fr-fr" => Self::fr_fr(),
            "nl-nl" => Self::nl_nl(),
            _ => return None,
        };
        Some(culture)
    }

    /// Rewrites a `.`-separated number into this culture's notation.
    pub(crate) fn localize_number<'s>(&self, s: &'s str) -> Cow<'s, str> {
        if self.decimal_separator == '.' || !s.contains('.') {
            Cow::Borrowed(s)
        } else {
            Cow::Owned(s.replace('.', self.decimal_separator.encode_utf8(&mut [0; 4])))
        }
    }

    /// Rewrites a number in this culture's notation into `.`-separated form.
    pub(crate) fn delocalize_number<'s>(&self, s: &'s str) -> Cow<'s, str> {
        if self.decimal_separator == '.' || !s.contains(self.decimal_separator) {
            Cow::Borrowed(s)
        } else {
            Cow::Owned(s.replace(self.decimal_separator, "."))
        }
    }
}

/// Formatting rules for one serialize or deserialize call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatContext {
    /// Accepts either a built-in culture name or an inline culture table.
    #[serde(deserialize_with = "culture_by_name_or_inline")]
    pub culture: Culture,
    pub delimiter: char,
}

impl Default for FormatContext {
    fn default() -> Self {
        Self {
            culture: Culture::invariant(),
            delimiter: ',',
        }
    }
}

impl FormatContext {
    pub fn new(culture: Culture) -> Self {
        Self {
            culture,
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Loads a context from JSON such as `{"culture": "fr-FR", "delimiter": ";"}`.
    pub fn from_json(json: &str) -> Result<Self, CsvError> {
        let context: Self = serde_json::from_str(json)?;
        context.validate()?;
        Ok(context)
    }

    /// Rejects delimiters that would make rows ambiguous.
    pub fn validate(&self) -> Result<(), CsvError> {
        match self.delimiter {
            '"' | '\r' | '\n' => Err(CsvError::InvalidDelimiter(self.delimiter)),
            _ => Ok(()),
        }
    }
}

fn culture_by_name_or_inline<'de, D>(deserializer: D) -> Result<Culture, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CultureSpec {
        Named(String),
        Inline(Culture),
    }

    match CultureSpec::deserialize(deserializer)? {
        CultureSpec::Named(name) => Culture::by_name(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown culture `{name}`"))),
        CultureSpec::Inline(culture) => Ok(culture),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_invariant_comma() {
        let ctx = FormatContext::default();
        assert_eq!(ctx.delimiter, ',');
        assert_eq!(ctx.culture.decimal_separator, '.');
        assert_eq!(ctx.culture.name, "");
    }

    #[test]
    fn number_localization() {
        let fr = Culture::fr_fr();
        assert_eq!(fr.localize_number("20.5"), "20,5");
        assert_eq!(fr.delocalize_number("20,5"), "20.5");
        assert!(matches!(
            Culture::invariant().localize_number("20.5"),
            Cow::Borrowed("20.5")
        ));
    }

    #[test]
    fn from_json_named_culture() {
        let ctx = FormatContext::from_json(r#"{"culture": "fr-FR", "delimiter": ";"}"#).unwrap();
        assert_eq!(ctx.culture, Culture::fr_fr());
        assert_eq!(ctx.delimiter, ';');
    }

    #[test]
    fn from_json_inline_culture_with_defaults() {
        let ctx = FormatContext::from_json(
            r#"{"culture": {
                "name": "x-custom", "decimal_separator": ",", "date_pattern": "%Y.%m.%d"
            }}"#,
        )
        .unwrap();
        assert_eq!(ctx.delimiter, ',');
        assert_eq!(ctx.culture.name, "x-custom");
        assert_eq!(ctx.culture.date_pattern, "%Y.%m.%d");
        assert_eq!(ctx.culture.time_pattern, "%H:%M:%S%.f");
    }

    #[test]
    fn from_json_rejects_unknown_culture() {
        let err = FormatContext::from_json(r#"{"culture": "xx-XX"}"#).unwrap_err();
        assert!(matches!(err, CsvError::Config(_)));
    }

    #[test]
    fn from_json_rejects_quote_delimiter() {
        let err = FormatContext::from_json(r#"{"delimiter": "\""}"#).unwrap_err();
        assert!(matches!(err, CsvError::InvalidDelimiter('"')));
    }

    #[test]
    fn culture_lookup_ignores_case() {
        assert_eq!(Culture::by_name("DE-de"), Some(Culture::de_de()));
        assert_eq!(Culture::by_name("invariant"), Some(Culture::invariant()));
        assert!(Culture::by_name("tlh").is_none());
    }
}
