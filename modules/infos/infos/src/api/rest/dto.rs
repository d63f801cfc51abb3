use infos_sdk::{FieldKind, Info, InfoField, InfoPatch, NewInfo, Projection};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::api::rest::error::{malformed_body_problem, validation_problem};
use crate::api::rest::problem::{Problem, ValidationViolation};
use crate::api::rest::query::KeyGuard;

/// REST DTO for a stored reminder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InfoDto {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remind_at_address: Option<String>,
    /// `"<latitude>,<longitude>"`, derived from `remindAtAddress`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remind_at_geo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub tag: Option<Value>,
}

/// REST DTO for creating a reminder
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateInfoReq {
    pub title: String,
    pub desc: Option<String>,
    pub is_complete: Option<bool>,
    pub remind_at_address: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub tag: Option<Value>,
}

/// REST DTO for replacing a reminder; `id`, when given, must match the path.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReplaceInfoReq {
    pub id: Option<i64>,
    pub title: String,
    pub desc: Option<String>,
    pub is_complete: Option<bool>,
    pub remind_at_address: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub tag: Option<Value>,
}

/// REST DTO for updating a reminder (partial). `null` clears a property.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateInfoReq {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub desc: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<bool>)]
    pub is_complete: Option<Option<bool>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub remind_at_address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Object>)]
    pub tag: Option<Option<Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CountDto {
    pub count: u64,
}

/// A present key always yields `Some`, so `null` becomes `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<Info> for InfoDto {
    fn from(info: Info) -> Self {
        Self {
            id: info.id,
            title: info.title,
            desc: info.desc,
            is_complete: info.is_complete,
            remind_at_address: info.remind_at_address,
            remind_at_geo: info.remind_at_geo,
            tag: info.tag,
        }
    }
}

impl From<CreateInfoReq> for NewInfo {
    fn from(req: CreateInfoReq) -> Self {
        Self {
            id: None,
            title: req.title,
            desc: req.desc,
            is_complete: req.is_complete,
            remind_at_address: req.remind_at_address,
            remind_at_geo: None,
            tag: req.tag,
        }
    }
}

impl ReplaceInfoReq {
    #[must_use]
    pub fn into_info(self, id: i64) -> Info {
        Info {
            id,
            title: self.title,
            desc: self.desc,
            is_complete: self.is_complete,
            remind_at_address: self.remind_at_address,
            remind_at_geo: None,
            tag: self.tag,
        }
    }
}

impl From<UpdateInfoReq> for InfoPatch {
    fn from(req: UpdateInfoReq) -> Self {
        Self {
            title: req.title,
            desc: req.desc,
            is_complete: req.is_complete,
            remind_at_address: req.remind_at_address,
            remind_at_geo: None,
            tag: req.tag,
        }
    }
}

/// Which write a body is validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Create,
    Replace,
    Patch,
}

/// Decode a JSON request body, reject prohibited keys, then validate it
/// property by property for `kind`.
///
/// # Errors
/// 400 for malformed JSON or a prohibited key, 422 listing every violation.
pub fn decode_body<T>(body: &[u8], guard: &KeyGuard, kind: BodyKind) -> Result<T, Problem>
where
    T: for<'de> Deserialize<'de>,
{
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| malformed_body_problem(format!("Malformed JSON body: {e}")))?;
    guard.check("body", &value)?;

    let Value::Object(map) = &value else {
        return Err(validation_problem(vec![
            ValidationViolation::new("body", "must be a JSON object").with_code("INVALID_TYPE"),
        ]));
    };
    let violations = body_violations(map, kind);
    if !violations.is_empty() {
        return Err(validation_problem(violations));
    }

    serde_json::from_value(value).map_err(|e| {
        validation_problem(vec![ValidationViolation::new("body", e.to_string())])
    })
}

fn body_violations(map: &Map<String, Value>, kind: BodyKind) -> Vec<ValidationViolation> {
    let mut violations = Vec::new();

    for (key, value) in map {
        let Some(field) = InfoField::from_name(key) else {
            violations.push(
                ValidationViolation::new(key.as_str(), "is not a known property")
                    .with_code("UNKNOWN_PROPERTY"),
            );
            continue;
        };
        match field {
            InfoField::Id if kind == BodyKind::Create => violations.push(
                ValidationViolation::new("id", "must not be provided on create")
                    .with_code("READ_ONLY"),
            ),
            InfoField::Id if kind == BodyKind::Patch => violations.push(
                ValidationViolation::new("id", "cannot be changed").with_code("READ_ONLY"),
            ),
            InfoField::RemindAtGeo => violations.push(
                ValidationViolation::new("remindAtGeo", "is derived from remindAtAddress")
                    .with_code("READ_ONLY"),
            ),
            InfoField::Title => match value.as_str() {
                Some("") => violations.push(
                    ValidationViolation::new("title", "must not be empty").with_code("EMPTY"),
                ),
                Some(_) => {}
                None => violations.push(type_violation("title", "a string")),
            },
            _ => {
                if let Some(expected) = type_mismatch(field.kind(), value) {
                    violations.push(type_violation(key, expected));
                }
            }
        }
    }

    if kind != BodyKind::Patch && !map.contains_key(InfoField::Title.name()) {
        violations.push(ValidationViolation::new("title", "is required").with_code("REQUIRED"));
    }
    violations
}

/// Expected type for an optional property, or `None` when `value` fits.
fn type_mismatch(kind: FieldKind, value: &Value) -> Option<&'static str> {
    let fits = match kind {
        FieldKind::Json => true,
        _ if value.is_null() => true,
        FieldKind::I64 => value.as_i64().is_some(),
        FieldKind::String => value.is_string(),
        FieldKind::Bool => value.is_boolean(),
    };
    if fits {
        return None;
    }
    Some(match kind {
        FieldKind::I64 => "an integer",
        FieldKind::Bool => "a boolean or null",
        _ => "a string or null",
    })
}

fn type_violation(field: &str, expected: &str) -> ValidationViolation {
    ValidationViolation::new(field, format!("must be {expected}")).with_code("INVALID_TYPE")
}

/// Serialize `dto` keeping only the properties `fields` allows.
#[must_use]
pub fn project(dto: &InfoDto, fields: &Projection) -> Value {
    let value = serde_json::to_value(dto).unwrap_or(Value::Null);
    match (value, fields) {
        (value, Projection::All) => value,
        (Value::Object(map), fields) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| InfoField::from_name(k).is_some_and(|f| fields.allows(f)))
                .collect(),
        ),
        (other, _) => other,
    }
}
