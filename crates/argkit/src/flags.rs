//! Flag schema and parsed flag values.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

/// Parses the raw text of a flag into a value.
pub type ParseFn = Arc<dyn Fn(&str) -> anyhow::Result<FlagValue> + Send + Sync>;

/// Produces a default value on demand.
pub type DefaultFn = Arc<dyn Fn() -> FlagValue + Send + Sync>;

/// How a flag's raw text is interpreted.
#[derive(Clone)]
pub enum FlagType {
    /// Presence flag; takes no value unless given with `=`.
    Boolean,
    String,
    /// Parsed as `f64`; text that is not a number yields `NaN`.
    Number,
    /// User-supplied parser. Its errors propagate unchanged.
    Custom(ParseFn),
    /// Repeatable flag collecting every occurrence.
    Array(Box<FlagType>),
}

impl FlagType {
    /// A custom type backed by `parse`.
    pub fn custom<F>(parse: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<FlagValue> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(parse))
    }

    /// The multi-valued form of `inner`.
    pub fn array(inner: FlagType) -> Self {
        Self::Array(Box::new(inner))
    }

    /// The element type for arrays, the type itself otherwise.
    pub fn element(&self) -> &FlagType {
        match self {
            Self::Array(inner) => inner.element(),
            other => other,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Whether the flag reads a value from the following token.
    pub fn takes_value(&self) -> bool {
        !matches!(self.element(), Self::Boolean)
    }

    /// Interpret `raw` according to the element type.
    pub fn parse(&self, raw: &str) -> anyhow::Result<FlagValue> {
        match self {
            Self::Boolean => Ok(FlagValue::Bool(raw != "false")),
            Self::String => Ok(FlagValue::String(raw.to_string())),
            Self::Number => Ok(FlagValue::Number(parse_number(raw))),
            Self::Custom(parse) => parse(raw),
            Self::Array(inner) => inner.parse(raw),
        }
    }
}

impl fmt::Debug for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("Boolean"),
            Self::String => f.write_str("String"),
            Self::Number => f.write_str("Number"),
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Array(inner) => f.debug_tuple("Array").field(inner).finish(),
        }
    }
}

/// Number conversion for `Number` flags.
///
/// Blank input is `0`. `0x`, `0o` and `0b` integers are accepted, and so is
/// `Infinity` with an optional sign. Other words such as `inf` or `nan` are NaN.
fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(n) = radix_integer(trimmed) {
        return n;
    }
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if unsigned == "Infinity" {
        return if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

fn radix_integer(text: &str) -> Option<f64> {
    let radix = match text.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Some(f64::NAN);
    }
    Some(u128::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64))
}

/// A flag value, either parsed from argv or declared as a default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    String(String),
    Number(f64),
    List(Vec<FlagValue>),
    Json(serde_json::Value),
}

impl FlagValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FlagValue]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Truthiness as a script would see it: `false`, `""`, `0`, `NaN` and
    /// JSON `null` are falsy, everything else (including empty lists) is
    /// truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::String(s) => !s.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::List(_) => true,
            Self::Json(value) => match value {
                serde_json::Value::Null => false,
                serde_json::Value::Bool(b) => *b,
                serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
                serde_json::Value::String(s) => !s.is_empty(),
                _ => true,
            },
        }
    }

    /// JSON representation. Integral numbers serialize without a fraction
    /// and non-finite numbers become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Number(n) => number_to_json(*n),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(FlagValue::to_json).collect())
            }
            Self::Json(value) => value.clone(),
        }
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for FlagValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<serde_json::Value> for FlagValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// A declared default: a fixed value or a function evaluated when needed.
#[derive(Clone)]
pub enum FlagDefault {
    Value(FlagValue),
    Lazy(DefaultFn),
}

impl FlagDefault {
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> FlagValue + Send + Sync + 'static,
    {
        Self::Lazy(Arc::new(f))
    }

    pub fn resolve(&self) -> FlagValue {
        match self {
            Self::Value(value) => value.clone(),
            Self::Lazy(f) => f(),
        }
    }
}

impl fmt::Debug for FlagDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

macro_rules! default_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FlagDefault {
                fn from(value: $ty) -> Self {
                    Self::Value(value.into())
                }
            }
        )*
    };
}

default_from!(FlagValue, bool, &str, String, f64, i64, serde_json::Value);

/// One entry of a flag schema.
#[derive(Debug, Clone)]
pub struct FlagSpec {
    pub kind: FlagType,
    /// Single-character short form (`-a`).
    pub alias: Option<char>,
    pub default: Option<FlagDefault>,
    pub description: Option<String>,
    /// Replaces the type placeholder in help output.
    pub placeholder: Option<String>,
}

impl FlagSpec {
    pub fn new(kind: FlagType) -> Self {
        Self {
            kind,
            alias: None,
            default: None,
            description: None,
            placeholder: None,
        }
    }

    pub fn boolean() -> Self {
        Self::new(FlagType::Boolean)
    }

    pub fn string() -> Self {
        Self::new(FlagType::String)
    }

    pub fn number() -> Self {
        Self::new(FlagType::Number)
    }

    pub fn alias(mut self, alias: char) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn default_value(mut self, default: impl Into<FlagDefault>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

impl From<FlagType> for FlagSpec {
    fn from(kind: FlagType) -> Self {
        Self::new(kind)
    }
}

/// Flag key -> spec, in declaration order.
pub type FlagSchema = IndexMap<String, FlagSpec>;

/// Parsed flag values keyed by schema key.
///
/// Flags that were not given and have no default are absent. Array flags are
/// always present (possibly empty).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Flags {
    values: IndexMap<String, FlagValue>,
}

impl Flags {
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.values.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FlagValue::as_bool)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FlagValue::as_str)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FlagValue::as_f64)
    }

    pub fn get_list(&self, name: &str) -> Option<&[FlagValue]> {
        self.get(name).and_then(FlagValue::as_list)
    }

    /// Whether `name` resolved to `true`.
    pub fn is_set(&self, name: &str) -> bool {
        self.get_bool(name) == Some(true)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn set(&mut self, name: &str, value: FlagValue) {
        self.values.insert(name.to_string(), value);
    }

    pub(crate) fn push(&mut self, name: &str, value: FlagValue) {
        match self.values.get_mut(name) {
            Some(FlagValue::List(items)) => items.push(value),
            _ => {
                self.values.insert(name.to_string(), FlagValue::List(vec![value]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_types_parse() {
        assert_eq!(FlagType::String.parse("  ").unwrap(), FlagValue::from("  "));
        assert_eq!(FlagType::Number.parse("2.5").unwrap(), FlagValue::Number(2.5));
        assert_eq!(FlagType::Number.parse("-42").unwrap(), FlagValue::Number(-42.0));
        assert_eq!(FlagType::Number.parse("0").unwrap(), FlagValue::Number(0.0));
        assert!(FlagType::Number.parse("abc").unwrap().as_f64().unwrap().is_nan());
        assert_eq!(FlagType::Boolean.parse("false").unwrap(), FlagValue::Bool(false));
        assert_eq!(FlagType::Boolean.parse("").unwrap(), FlagValue::Bool(true));
    }

    #[test]
    fn number_accepts_radix_prefixes_and_infinity() {
        let number = |raw: &str| FlagType::Number.parse(raw).unwrap().as_f64().unwrap();
        assert_eq!(number("0x10"), 16.0);
        assert_eq!(number(" 0XfF "), 255.0);
        assert_eq!(number("0o17"), 15.0);
        assert_eq!(number("0b101"), 5.0);
        assert_eq!(number("Infinity"), f64::INFINITY);
        assert_eq!(number("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(number(".5"), 0.5);
        assert_eq!(number("1e3"), 1000.0);
        for word in ["inf", "-inf", "nan", "NaN", "infinity", "0x", "0x1g", "0x+1", "-0x10"] {
            assert!(number(word).is_nan(), "{word} should be NaN");
        }
    }

    #[test]
    fn array_parses_with_element_type() {
        let kind = FlagType::array(FlagType::Number);
        assert!(kind.is_array());
        assert!(kind.takes_value());
        assert_eq!(kind.parse("7").unwrap(), FlagValue::Number(7.0));
        assert!(!FlagType::array(FlagType::Boolean).takes_value());
    }

    #[test]
    fn custom_errors_propagate() {
        let kind = FlagType::custom(|raw| {
            if raw == "bad" {
                anyhow::bail!("unsupported value {raw}");
            }
            Ok(FlagValue::from(raw.to_uppercase()))
        });
        assert_eq!(kind.parse("ok").unwrap(), FlagValue::from("OK"));
        let err = kind.parse("bad").unwrap_err();
        assert_eq!(err.to_string(), "unsupported value bad");
    }

    #[test]
    fn truthiness() {
        assert!(!FlagValue::from("").is_truthy());
        assert!(!FlagValue::Number(0.0).is_truthy());
        assert!(!FlagValue::Number(f64::NAN).is_truthy());
        assert!(!FlagValue::Bool(false).is_truthy());
        assert!(!FlagValue::Json(serde_json::Value::Null).is_truthy());
        assert!(FlagValue::List(Vec::new()).is_truthy());
        assert!(FlagValue::Number(550.0).is_truthy());
        assert!(FlagValue::from("en").is_truthy());
    }

    #[test]
    fn json_numbers_drop_integral_fraction() {
        assert_eq!(FlagValue::Number(550.0).to_json().to_string(), "550");
        assert_eq!(FlagValue::Number(3.5).to_json().to_string(), "3.5");
        assert_eq!(FlagValue::Number(f64::NAN).to_json().to_string(), "null");
    }

    #[test]
    fn lazy_default_is_called() {
        let default = FlagDefault::lazy(|| FlagValue::from("computed"));
        assert_eq!(default.resolve(), FlagValue::from("computed"));
    }

    #[test]
    fn flags_accessors() {
        let mut flags = Flags::default();
        flags.set("verbose", FlagValue::Bool(true));
        flags.push("include", FlagValue::from("a"));
        flags.push("include", FlagValue::from("b"));
        assert!(flags.is_set("verbose"));
        assert_eq!(flags.get_list("include").map(<[FlagValue]>::len), Some(2));
        assert_eq!(flags.get_str("missing"), None);
    }
}
