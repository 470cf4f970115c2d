//! Form data encoding
//!
//! [`to_form_data`] flattens a serializable value into `key=value` entries
//! using bracket notation (`user[name]`, `tags[]`), [`form_to_json`] rebuilds
//! the nested JSON from such entries.

use crate::error::{Result, RxHttpError};
use serde::Serialize;
use serde_json::{Map, Value};

/// Ordered list of form entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, keeping existing ones with the same key
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `key`, in insertion order
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Options for [`to_form_data`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSerializerOptions {
    /// Use `a.b` instead of `a[b]` for nested object keys
    pub dots: bool,
    /// Key style for arrays of scalars: `None` → `tags`, `Some(false)` → `tags[]`,
    /// `Some(true)` → `tags[0]`
    pub indexes: Option<bool>,
}

impl Default for FormSerializerOptions {
    fn default() -> Self {
        Self {
            dots: false,
            indexes: Some(false),
        }
    }
}

/// Flatten `source` into form entries
///
/// The root must serialize to a JSON object. `null` values are skipped.
pub fn to_form_data<S: Serialize + ?Sized>(
    source: &S,
    options: Option<FormSerializerOptions>,
) -> Result<FormData> {
    let options = options.unwrap_or_default();
    let value =
        serde_json::to_value(source).map_err(|e| RxHttpError::InvalidBody(e.to_string()))?;

    let Value::Object(map) = value else {
        return Err(RxHttpError::InvalidBody(
            "form data source must be an object".to_string(),
        ));
    };

    let mut form = FormData::new();
    for (key, value) in map {
        flatten(&mut form, key, value, &options);
    }
    Ok(form)
}

fn flatten(form: &mut FormData, key: String, value: Value, options: &FormSerializerOptions) {
    match value {
        Value::Null => {}
        Value::String(s) => form.append(key, s),
        Value::Bool(_) | Value::Number(_) => form.append(key, value.to_string()),
        Value::Object(map) => {
            for (child, value) in map {
                let child_key = if options.dots {
                    format!("{key}.{child}")
                } else {
                    format!("{key}[{child}]")
                };
                flatten(form, child_key, value, options);
            }
        }
        Value::Array(items) => {
            let flat = items
                .iter()
                .all(|item| !matches!(item, Value::Object(_) | Value::Array(_)));
            for (index, item) in items.into_iter().enumerate() {
                let item_key = match (flat, options.indexes) {
                    (true, None) => key.clone(),
                    (true, Some(false)) => format!("{key}[]"),
                    _ => format!("{key}[{index}]"),
                };
                flatten(form, item_key, item, options);
            }
        }
    }
}

/// Rebuild nested JSON from bracket-notation form entries
///
/// `a[b][c]` nests objects, `a[]` appends to an array, `a[0]` indexes one.
/// Values are kept as strings; repeated keys become arrays. Indexes that
/// would leave holes in an array key an object instead, and collapse back
/// into an array once every index from 0 is present.
pub fn form_to_json(form: &FormData) -> Value {
    let mut root = Map::new();
    for (key, value) in form.iter() {
        let path = parse_path(key);
        insert_into_object(&mut root, &path, Value::String(value.to_string()));
    }
    for child in root.values_mut() {
        collapse_indexed_objects(child);
    }
    Value::Object(root)
}

fn parse_path(key: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let (head, mut rest) = match key.find('[') {
        Some(pos) => (&key[..pos], &key[pos..]),
        None => (key, ""),
    };
    segments.push(head.to_string());

    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(end) => {
                segments.push(stripped[..end].to_string());
                rest = &stripped[end + 1..];
            }
            None => {
                // Unbalanced bracket: keep the remainder verbatim on the last segment
                if let Some(last) = segments.last_mut() {
                    last.push_str(rest);
                }
                break;
            }
        }
    }
    segments
}

fn insert(target: &mut Value, path: &[String], value: Value) {
    match target {
        Value::Array(items) => {
            let Some((segment, rest)) = path.split_first() else {
                return;
            };
            let index = if segment.is_empty() {
                Some(items.len())
            } else {
                segment.parse::<usize>().ok().filter(|&i| i <= items.len())
            };

            let Some(index) = index else {
                // Named or out-of-range key under an array: key it by index instead
                let map: Map<String, Value> = std::mem::take(items)
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v))
                    .collect();
                *target = Value::Object(map);
                return insert(target, path, value);
            };

            if rest.is_empty() {
                match items.get_mut(index) {
                    Some(existing) => merge(existing, value),
                    None => items.push(value),
                }
                return;
            }

            if index == items.len() {
                items.push(Value::Null);
            }
            let slot = &mut items[index];
            ensure_container(slot, &rest[0]);
            insert(slot, rest, value);
        }
        Value::Object(map) => insert_into_object(map, path, value),
        other => {
            *other = Value::Object(Map::new());
            insert(other, path, value);
        }
    }
}

fn insert_into_object(map: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((segment, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        match map.get_mut(segment.as_str()) {
            Some(existing) => merge(existing, value),
            None => {
                map.insert(segment.clone(), value);
            }
        }
        return;
    }

    let slot = map.entry(segment.clone()).or_insert(Value::Null);
    ensure_container(slot, &rest[0]);
    insert(slot, rest, value);
}

/// A repeated key keeps every value
fn merge(existing: &mut Value, value: Value) {
    match existing {
        Value::Array(values) => values.push(value),
        _ => {
            let previous = std::mem::take(existing);
            *existing = Value::Array(vec![previous, value]);
        }
    }
}

fn ensure_container(slot: &mut Value, next_segment: &str) {
    if matches!(slot, Value::Array(_) | Value::Object(_)) {
        return;
    }
    *slot = if next_segment.is_empty() || next_segment.parse::<usize>().is_ok() {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    };
}

/// Turn objects keyed exactly `0..n` back into arrays
fn collapse_indexed_objects(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(collapse_indexed_objects),
        Value::Object(map) => {
            map.values_mut().for_each(collapse_indexed_objects);

            let len = map.len();
            let dense = len > 0
                && map.keys().all(|key| {
                    key.parse::<usize>()
                        .is_ok_and(|i| i < len && i.to_string() == *key)
                });
            if dense {
                let mut slots: Vec<(usize, Value)> = std::mem::take(map)
                    .into_iter()
                    .filter_map(|(key, v)| key.parse::<usize>().ok().map(|i| (i, v)))
                    .collect();
                slots.sort_by_key(|(i, _)| *i);
                *value = Value::Array(slots.into_iter().map(|(_, v)| v).collect());
            }
        }
        _ => {}
    }
}
