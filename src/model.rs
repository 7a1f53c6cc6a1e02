//! Response payload returned by the analysis service.
//!
//! The service is an external collaborator and its JSON is not trusted to be
//! well-formed beyond "it parses". Decoding is therefore lenient: a field of
//! the wrong type is treated as absent, and a malformed entry in the
//! interpreted mapping degrades to an entry with missing fields instead of
//! failing the whole response. Only a body that is not JSON at all is an error.
//!
//! Scalars are stored in their display form (see [`json_text`]) because the
//! client never computes with them; status determination happens server-side.

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Shown in the raw-text region when the response carries no text.
pub const NO_TEXT_FALLBACK: &str = "No text extracted.";

/// Shown in the summary region when the response carries no summary.
pub const NO_SUMMARY_FALLBACK: &str = "No summary available.";

/// The decoded body of a successful upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadResult {
    /// Text extracted from the document, if any.
    pub raw_text: Option<String>,
    /// Interpreted values, in document order.
    pub interpreted: InterpretedMap,
    /// Summary text (may contain HTML produced by the service).
    pub summary: Option<String>,
}

impl UploadResult {
    /// Decode a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Raw text, or [`NO_TEXT_FALLBACK`] when absent.
    pub fn raw_text_or_fallback(&self) -> &str {
        self.raw_text.as_deref().unwrap_or(NO_TEXT_FALLBACK)
    }

    /// Summary, or [`NO_SUMMARY_FALLBACK`] when absent.
    pub fn summary_or_fallback(&self) -> &str {
        self.summary.as_deref().unwrap_or(NO_SUMMARY_FALLBACK)
    }
}

/// One interpreted measurement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestResult {
    /// Display form of the measured value; `None` when missing or `null`.
    pub value: Option<String>,
    /// Free-form status. Only `"high"` and `"low"` are special-cased;
    /// falsy JSON (`null`, `false`, `0`, `""`) is absent.
    pub status: Option<String>,
    /// Reference range, if the service supplied one.
    pub range: Option<Range>,
    /// Explanatory note; `None` when missing or falsy.
    pub note: Option<String>,
}

/// Reference range. Any subset of the fields may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Range {
    pub low: Option<String>,
    pub high: Option<String>,
    pub units: Option<String>,
}

impl TestResult {
    /// Build a result from an arbitrary JSON value.
    ///
    /// Anything that is not an object yields a result with every field absent.
    pub fn from_value(info: &Value) -> Self {
        let Some(obj) = info.as_object() else {
            return Self::default();
        };
        Self {
            value: obj.get("value").and_then(present_text),
            status: obj.get("status").and_then(truthy_text),
            range: obj.get("range").and_then(Range::from_value),
            note: obj.get("note").and_then(truthy_text),
        }
    }
}

impl Range {
    /// `None` for falsy JSON (`null`, `false`, `0`, `""`); a non-object truthy
    /// value is a range with no fields.
    pub fn from_value(v: &Value) -> Option<Self> {
        if !is_truthy(v) {
            return None;
        }
        let field = |k: &str| {
            v.as_object()
                .and_then(|o| o.get(k))
                .and_then(present_text)
        };
        Some(Self {
            low: field("low"),
            high: field("high"),
            units: field("units"),
        })
    }
}

/// Ordered test-name → result mapping.
///
/// Duplicate names are kept: each entry in the response becomes its own row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpretedMap {
    entries: Vec<(String, TestResult)>,
}

impl InterpretedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, result: TestResult) {
        self.entries.push((name.into(), result));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TestResult)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, TestResult)> for InterpretedMap {
    fn from_iter<I: IntoIterator<Item = (K, TestResult)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ── Textual forms ────────────────────────────────────────────────────────────

/// Display form of a JSON value.
///
/// Strings are verbatim, integral floats drop their fractional part
/// (`95.0` → `"95"`), and compound values print as compact JSON.
pub fn json_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::Array(_) | Value::Object(_) => v.to_string(),
    }
}

fn present_text(v: &Value) -> Option<String> {
    if v.is_null() {
        None
    } else {
        Some(json_text(v))
    }
}

fn truthy_text(v: &Value) -> Option<String> {
    is_truthy(v).then(|| json_text(v))
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ── Deserialisation ──────────────────────────────────────────────────────────
//
// Hand-written visitors so that duplicate keys in `interpreted` survive
// (a `serde_json::Map` would keep only the last one) and so that wrong-typed
// values are skipped rather than rejected.

impl<'de> Deserialize<'de> for UploadResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UploadResultVisitor)
    }
}

impl<'de> Deserialize<'de> for InterpretedMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(InterpretedVisitor)
    }
}

/// Implements the non-map `visit_*` methods of a lenient visitor by returning
/// `Default::default()`, draining sequences so the parser stays in sync.
macro_rules! lenient_scalars {
    ($de:lifetime, $ty:ty) => {
        fn visit_bool<E: de::Error>(self, _: bool) -> Result<$ty, E> {
            Ok(<$ty>::default())
        }
        fn visit_i64<E: de::Error>(self, _: i64) -> Result<$ty, E> {
            Ok(<$ty>::default())
        }
        fn visit_u64<E: de::Error>(self, _: u64) -> Result<$ty, E> {
            Ok(<$ty>::default())
        }
        fn visit_f64<E: de::Error>(self, _: f64) -> Result<$ty, E> {
            Ok(<$ty>::default())
        }
        fn visit_str<E: de::Error>(self, _: &str) -> Result<$ty, E> {
            Ok(<$ty>::default())
        }
        fn visit_unit<E: de::Error>(self) -> Result<$ty, E> {
            Ok(<$ty>::default())
        }
        fn visit_none<E: de::Error>(self) -> Result<$ty, E> {
            Ok(<$ty>::default())
        }
        fn visit_seq<A: SeqAccess<$de>>(self, mut seq: A) -> Result<$ty, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(<$ty>::default())
        }
    };
}

struct UploadResultVisitor;

impl<'de> Visitor<'de> for UploadResultVisitor {
    type Value = UploadResult;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an upload result object")
    }

    lenient_scalars!('de, UploadResult);

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<UploadResult, A::Error> {
        let mut out = UploadResult::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "raw_text" => out.raw_text = non_empty_string(map.next_value()?),
                "summary" => out.summary = non_empty_string(map.next_value()?),
                "interpreted" => out.interpreted = map.next_value()?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(out)
    }
}

struct InterpretedVisitor;

impl<'de> Visitor<'de> for InterpretedVisitor {
    type Value = InterpretedMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of test names to results")
    }

    lenient_scalars!('de, InterpretedMap);

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<InterpretedMap, A::Error> {
        let mut out = InterpretedMap::new();
        while let Some(name) = map.next_key::<String>()? {
            let info: Value = map.next_value()?;
            out.push(name, TestResult::from_value(&info));
        }
        Ok(out)
    }
}

/// Only non-empty strings count; `""` and non-strings fall back like absent.
fn non_empty_string(v: Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}
