//! Decoding of `filter`/`where` query parameters.
//!
//! A parameter arrives either JSON-encoded (`filter={"limit":2}`) or exploded
//! in bracket notation (`filter[limit]=2`, `filter[order][0]=title DESC`).
//! Both are normalised to one JSON value, checked by the [`KeyGuard`] and only
//! then parsed into the typed filter.

use infos_sdk::{InfoFilter, WhereNode};
use serde_json::{Map, Value};

use crate::api::rest::error::{invalid_filter_problem, prohibited_key_problem};
use crate::api::rest::problem::Problem;

const ALWAYS_PROHIBITED: &[&str] = &["__proto__", "constructor.prototype"];

/// Rejects object keys that could tamper with object prototypes, plus any
/// keys configured as prohibited.
#[derive(Debug, Clone)]
pub struct KeyGuard {
    prohibited: Vec<String>,
}

impl Default for KeyGuard {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl KeyGuard {
    #[must_use]
    pub fn new(extra: &[String]) -> Self {
        let mut prohibited: Vec<String> = ALWAYS_PROHIBITED.iter().map(|k| (*k).to_owned()).collect();
        for key in extra {
            if !prohibited.contains(key) {
                prohibited.push(key.clone());
            }
        }
        Self { prohibited }
    }

    /// First offending key found anywhere in `value`.
    #[must_use]
    pub fn find_violation(&self, value: &Value) -> Option<String> {
        match value {
            Value::Object(map) => map.iter().find_map(|(key, child)| {
                if self.prohibited.iter().any(|p| p == key) {
                    return Some(key.clone());
                }
                if key == "constructor"
                    && child.as_object().is_some_and(|o| o.contains_key("prototype"))
                {
                    return Some("constructor.prototype".to_owned());
                }
                self.find_violation(child)
            }),
            Value::Array(items) => items.iter().find_map(|item| self.find_violation(item)),
            _ => None,
        }
    }

    /// # Errors
    /// A 400 problem naming the offending key.
    pub fn check(&self, param: &str, value: &Value) -> Result<(), Problem> {
        match self.find_violation(value) {
            Some(key) => {
                tracing::warn!(param, key = %key, "Rejected prohibited key");
                Err(prohibited_key_problem(param, &key))
            }
            None => Ok(()),
        }
    }
}

/// Filter for `GET /infos`.
///
/// # Errors
/// 400 problems for malformed, prohibited or invalid filters.
pub fn list_filter(raw_query: Option<&str>, guard: &KeyGuard) -> Result<InfoFilter, Problem> {
    match decode_param(raw_query, "filter", guard)? {
        Some(value) => {
            InfoFilter::from_json(&value).map_err(|e| invalid_filter_problem("filter", e.to_string()))
        }
        None => Ok(InfoFilter::default()),
    }
}

/// Filter for `GET /infos/{id}`: `where` is not allowed on a single record.
///
/// # Errors
/// As [`list_filter`], plus a 400 when `where` is present.
pub fn single_filter(raw_query: Option<&str>, guard: &KeyGuard) -> Result<InfoFilter, Problem> {
    let filter = list_filter(raw_query, guard)?;
    if filter.where_clause.is_some() {
        return Err(invalid_filter_problem(
            "filter",
            "`where` is not allowed when fetching by id",
        ));
    }
    Ok(filter)
}

/// `where` parameter of count and bulk update.
///
/// # Errors
/// 400 problems for malformed, prohibited or invalid conditions.
pub fn where_param(raw_query: Option<&str>, guard: &KeyGuard) -> Result<Option<WhereNode>, Problem> {
    decode_param(raw_query, "where", guard)?
        .map(|value| {
            WhereNode::from_json(&value).map_err(|e| invalid_filter_problem("where", e.to_string()))
        })
        .transpose()
}

/// Collect parameter `name` from the query string in either encoding.
fn decode_param(raw_query: Option<&str>, name: &str, guard: &KeyGuard) -> Result<Option<Value>, Problem> {
    let Some(raw) = raw_query.filter(|q| !q.is_empty()) else {
        return Ok(None);
    };
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
        .map_err(|e| invalid_filter_problem(name, format!("malformed query string: {e}")))?;

    let prefix = format!("{name}[");
    let mut json_form: Option<&str> = None;
    let mut exploded = Map::new();
    for (key, value) in &pairs {
        if key == name {
            if json_form.is_some() {
                return Err(invalid_filter_problem(name, "parameter given more than once"));
            }
            json_form = Some(value.as_str());
        } else if let Some(rest) = key.strip_prefix(&prefix) {
            let segments = bracket_segments(rest)
                .ok_or_else(|| invalid_filter_problem(name, format!("malformed key `{key}`")))?;
            insert_path(&mut exploded, &segments, value.clone())
                .map_err(|msg| invalid_filter_problem(name, msg))?;
        }
    }

    let value = match (json_form, exploded.is_empty()) {
        (Some(_), false) => {
            return Err(invalid_filter_problem(
                name,
                "use either the JSON form or the bracket form, not both",
            ));
        }
        (Some(""), true) | (None, true) => return Ok(None),
        (Some(json), true) => serde_json::from_str(json)
            .map_err(|e| invalid_filter_problem(name, format!("invalid JSON: {e}")))?,
        (None, false) => arrays_from_indices(Value::Object(exploded)),
    };

    guard.check(name, &value)?;
    Ok(Some(value))
}

/// `where][isComplete]` (the part after `filter[`) into `["where", "isComplete"]`.
fn bracket_segments(rest: &str) -> Option<Vec<String>> {
    let (first, mut tail) = rest.split_once(']')?;
    let mut segments = vec![first.to_owned()];
    while !tail.is_empty() {
        let inner = tail.strip_prefix('[')?;
        let (segment, next) = inner.split_once(']')?;
        segments.push(segment.to_owned());
        tail = next;
    }
    Some(segments)
}

/// Repeated leaves become arrays; an empty segment (`[]`) appends.
fn insert_path(map: &mut Map<String, Value>, segments: &[String], value: String) -> Result<(), String> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(());
    };
    let key = if head.is_empty() {
        map.len().to_string()
    } else {
        head.clone()
    };

    if rest.is_empty() {
        match map.get_mut(&key) {
            None => {
                map.insert(key, Value::String(value));
            }
            Some(Value::Array(items)) => items.push(Value::String(value)),
            Some(existing @ Value::String(_)) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            Some(_) => return Err(format!("`{key}` mixes a value with nested keys")),
        }
        return Ok(());
    }

    let child = map
        .entry(key.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    match child {
        Value::Object(inner) => insert_path(inner, rest, value),
        _ => Err(format!("`{key}` mixes a value with nested keys")),
    }
}

/// Objects keyed `"0"`, `"1"`, ... become arrays ordered by index.
fn arrays_from_indices(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let indexed: Option<Vec<(usize, Value)>> = if map.is_empty() {
                None
            } else {
                map.iter()
                    .map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v.clone())))
                    .collect()
            };
            match indexed {
                Some(mut items) => {
                    items.sort_by_key(|(i, _)| *i);
                    Value::Array(items.into_iter().map(|(_, v)| arrays_from_indices(v)).collect())
                }
                None => Value::Object(
                    map.into_iter()
                        .map(|(k, v)| (k, arrays_from_indices(v)))
                        .collect(),
                ),
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(arrays_from_indices).collect()),
        other => other,
    }
}
