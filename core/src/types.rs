//! Request forms, headers and the response envelope.
//!
//! # Design
//! Forms and headers keep insertion order (`IndexMap`) so multipart parts and
//! encoded pairs come out in the order the caller added them. Header names
//! are case-insensitive on the wire, so `RequestHeader` folds them to lower
//! case on insert and a decorator default can be overridden regardless of the
//! spelling the caller uses.

use std::fmt;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};

pub const DEFAULT_FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Metadata attached to a file part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOptions {
    pub filename: String,
    #[serde(default, rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// A single file attachment: raw bytes plus filename and content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequestData {
    pub value: Vec<u8>,
    pub options: FileOptions,
}

impl FileRequestData {
    pub fn new(value: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            options: FileOptions {
                filename: filename.into(),
                content_type: None,
            },
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.options.content_type = Some(content_type.into());
        self
    }

    pub fn filename(&self) -> &str {
        &self.options.filename
    }

    pub fn content_type_or_default(&self) -> &str {
        self.options
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_FILE_CONTENT_TYPE)
    }
}

/// A form field value: either a plain value rendered as text, or a file.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Plain(Value),
    File(FileRequestData),
}

impl FormValue {
    pub fn as_file(&self) -> Option<&FileRequestData> {
        match self {
            FormValue::File(file) => Some(file),
            FormValue::Plain(_) => None,
        }
    }

    /// Text form of a plain value. Strings are taken verbatim, `null` is
    /// empty, arrays and objects become compact JSON. `None` for files.
    pub fn to_text(&self) -> Option<String> {
        match self {
            FormValue::Plain(Value::String(s)) => Some(s.clone()),
            FormValue::Plain(Value::Null) => Some(String::new()),
            FormValue::Plain(other) => Some(other.to_string()),
            FormValue::File(_) => None,
        }
    }
}

impl From<FileRequestData> for FormValue {
    fn from(file: FileRequestData) -> Self {
        FormValue::File(file)
    }
}

impl From<Value> for FormValue {
    fn from(value: Value) -> Self {
        FormValue::Plain(value)
    }
}

macro_rules! plain_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FormValue {
                fn from(value: $t) -> Self {
                    FormValue::Plain(Value::from(value))
                }
            }
        )*
    };
}

plain_from!(&str, String, bool, i32, i64, u32, u64, f64);

/// Field name to value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestForm {
    fields: IndexMap<String, FormValue>,
}

impl RequestForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a field. A replaced field keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Name of the first file-valued field, if any.
    pub fn first_file_field(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|(_, v)| matches!(v, FormValue::File(_)))
            .map(|(k, _)| k.as_str())
    }

    pub fn contains_file(&self) -> bool {
        self.first_file_field().is_some()
    }
}

impl<K, V> FromIterator<(K, V)> for RequestForm
where
    K: Into<String>,
    V: Into<FormValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = RequestForm::new();
        for (k, v) in iter {
            form.insert(k, v);
        }
        form
    }
}

/// Header name to value. Names are lower-cased; values are kept as the
/// string representation of whatever was inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeader {
    entries: IndexMap<String, String>,
}

impl RequestHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or overwrites `name`.
    pub fn insert(&mut self, name: &str, value: impl fmt::Display) {
        self.entries
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.shift_remove(&name.to_ascii_lowercase())
    }

    /// Copies every entry of `other` into `self`, overwriting on collision.
    pub fn merge(&mut self, other: &RequestHeader) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.entries.into_iter().collect()
    }
}

/// Response envelope: the JSON object the server answered with, untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultRes(Map<String, Value>);

impl DefaultRes {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// The numeric `status` field, when the server sent one.
    pub fn status(&self) -> Option<i64> {
        self.0.get("status").and_then(Value::as_i64)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Reinterprets the envelope as a typed struct without copying it.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        T::deserialize(Value::Object(self.0))
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for DefaultRes {
    fn from(map: Map<String, Value>) -> Self {
        DefaultRes(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_values_render_as_text() {
        assert_eq!(FormValue::from("a b").to_text().as_deref(), Some("a b"));
        assert_eq!(FormValue::from(42_i64).to_text().as_deref(), Some("42"));
        assert_eq!(FormValue::from(true).to_text().as_deref(), Some("true"));
        assert_eq!(FormValue::Plain(Value::Null).to_text().as_deref(), Some(""));
        assert_eq!(
            FormValue::from(json!([1, 2])).to_text().as_deref(),
            Some("[1,2]")
        );
        assert!(FormValue::from(FileRequestData::new(vec![1], "a.bin"))
            .to_text()
            .is_none());
    }

    #[test]
    fn file_content_type_defaults_to_octet_stream() {
        let file = FileRequestData::new(vec![0u8; 4], "blob");
        assert_eq!(file.content_type_or_default(), "application/octet-stream");
        let file = file.with_content_type("image/png");
        assert_eq!(file.content_type_or_default(), "image/png");
    }

    #[test]
    fn form_keeps_insertion_order_on_replace() {
        let mut form = RequestForm::new().with("b", 1).with("a", 2);
        form.insert("b", 3);
        let keys: Vec<&str> = form.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(form.get("b"), Some(&FormValue::from(3)));
    }

    #[test]
    fn form_reports_first_file_field() {
        let form = RequestForm::new()
            .with("text", "x")
            .with("photo", FileRequestData::new(vec![1, 2], "p.jpg"));
        assert_eq!(form.first_file_field(), Some("photo"));
        assert!(!RequestForm::new().with("a", "b").contains_file());
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let mut header = RequestHeader::new().with("Authorization", "one");
        header.insert("AUTHORIZATION", "two");
        assert_eq!(header.len(), 1);
        assert_eq!(header.get("authorization"), Some("two"));
    }

    #[test]
    fn header_merge_overwrites() {
        let mut base = RequestHeader::new().with("a", 1).with("b", 2);
        base.merge(&RequestHeader::new().with("B", 3).with("c", 4));
        assert_eq!(
            base.into_pairs(),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "3".to_string()),
                ("c".to_string(), "4".to_string()),
            ]
        );
    }

    #[test]
    fn default_res_reads_status_and_fields() {
        let res = DefaultRes::from_slice(br#"{"status":-500,"message":"nope"}"#).unwrap();
        assert_eq!(res.status(), Some(-500));
        assert_eq!(res.get("message"), Some(&json!("nope")));
    }

    #[test]
    fn into_typed_reports_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Needs {
            token: String,
        }
        let res = DefaultRes::from_slice(br#"{"status":0}"#).unwrap();
        let err = res.into_typed::<Needs>().unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn default_res_rejects_non_objects() {
        let err = DefaultRes::from_slice(b"[1,2]").unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn default_res_deserializes_into_typed_struct() {
        #[derive(Deserialize)]
        struct Login {
            status: i64,
            token: String,
        }
        let res = DefaultRes::from_slice(br#"{"status":0,"token":"t"}"#).unwrap();
        let login: Login = res.into_typed().unwrap();
        assert_eq!(login.status, 0);
        assert_eq!(login.token, "t");
    }
}
