use serde_json::{Map, Value};

use super::{
    FieldKind, FilterError, FilterValue, InfoField, InfoFilter, OrderKey, Predicate, Projection,
    SortDirection, WhereNode, WhereOp,
};

const FILTER_KEYS: &[&str] = &["where", "order", "fields", "limit", "offset", "skip"];

pub(super) fn parse_filter(value: &Value) -> Result<InfoFilter, FilterError> {
    let Value::Object(map) = value else {
        return Err(FilterError::invalid("filter", "expected an object"));
    };

    if let Some(key) = map.keys().find(|k| !FILTER_KEYS.contains(&k.as_str())) {
        return Err(FilterError::UnknownKey(key.clone()));
    }

    let mut filter = InfoFilter::default();
    if let Some(w) = map.get("where") {
        filter.where_clause = Some(parse_where(w)?);
    }
    if let Some(o) = map.get("order") {
        filter.order = parse_order(o)?;
    }
    if let Some(f) = map.get("fields") {
        filter.fields = parse_fields(f)?;
    }
    if let Some(l) = map.get("limit") {
        filter.limit = Some(parse_count("limit", l)?);
    }
    filter.offset = match (map.get("offset"), map.get("skip")) {
        (Some(o), _) => Some(parse_count("offset", o)?),
        (None, Some(s)) => Some(parse_count("skip", s)?),
        (None, None) => None,
    };
    Ok(filter)
}

pub(super) fn parse_where(value: &Value) -> Result<WhereNode, FilterError> {
    let Value::Object(map) = value else {
        return Err(FilterError::invalid("where", "expected an object"));
    };

    let mut clauses = Vec::with_capacity(map.len());
    for (key, v) in map {
        match key.as_str() {
            "and" => clauses.push(WhereNode::And(parse_branches(key, v)?)),
            "or" => clauses.push(WhereNode::Or(parse_branches(key, v)?)),
            name => clauses.extend(parse_field_clause(name, v)?),
        }
    }

    if clauses.len() == 1 {
        if let Some(only) = clauses.pop() {
            return Ok(only);
        }
    }
    Ok(WhereNode::And(clauses))
}

fn parse_branches(key: &str, value: &Value) -> Result<Vec<WhereNode>, FilterError> {
    let Value::Array(items) = value else {
        return Err(FilterError::invalid(key, "expected an array of conditions"));
    };
    items.iter().map(parse_where).collect()
}

fn parse_field_clause(name: &str, value: &Value) -> Result<Vec<WhereNode>, FilterError> {
    let field = InfoField::from_name(name).ok_or_else(|| FilterError::UnknownField(name.to_owned()))?;
    if !field.is_filterable() {
        return Err(FilterError::NotFilterable(name.to_owned()));
    }

    match value {
        Value::Object(ops) if !ops.is_empty() => ops
            .iter()
            .map(|(op, operand)| {
                let op = WhereOp::from_name(op).ok_or_else(|| FilterError::UnknownOperator {
                    field: name.to_owned(),
                    op: op.clone(),
                })?;
                let predicate = build_predicate(field, op, operand)?;
                Ok(WhereNode::field(field, predicate))
            })
            .collect(),
        Value::Object(_) | Value::Array(_) => Err(FilterError::invalid(
            name,
            "expected a literal or an operator object",
        )),
        literal => Ok(vec![WhereNode::field(
            field,
            build_predicate(field, WhereOp::Eq, literal)?,
        )]),
    }
}

fn build_predicate(field: InfoField, op: WhereOp, operand: &Value) -> Result<Predicate, FilterError> {
    if field.kind() == FieldKind::Bool && !matches!(op, WhereOp::Eq | WhereOp::Neq) {
        return Err(FilterError::UnsupportedOperation {
            field: field.name().to_owned(),
            op,
        });
    }

    let predicate = match op {
        WhereOp::Eq => Predicate::Eq(coerce(field, operand, true)?),
        WhereOp::Neq => Predicate::Neq(coerce(field, operand, true)?),
        WhereOp::Gt => Predicate::Gt(coerce(field, operand, false)?),
        WhereOp::Gte => Predicate::Gte(coerce(field, operand, false)?),
        WhereOp::Lt => Predicate::Lt(coerce(field, operand, false)?),
        WhereOp::Lte => Predicate::Lte(coerce(field, operand, false)?),
        WhereOp::Inq => Predicate::Inq(coerce_list(field, op, operand)?),
        WhereOp::Nin => Predicate::Nin(coerce_list(field, op, operand)?),
        WhereOp::Between => {
            let bounds = coerce_list(field, op, operand)?;
            let [low, high]: [FilterValue; 2] = bounds.try_into().map_err(|_| {
                FilterError::invalid(field.name(), "between expects exactly two values")
            })?;
            Predicate::Between(low, high)
        }
    };
    Ok(predicate)
}

fn coerce_list(field: InfoField, op: WhereOp, operand: &Value) -> Result<Vec<FilterValue>, FilterError> {
    let Value::Array(items) = operand else {
        return Err(FilterError::invalid(
            field.name(),
            format!("{op} expects an array"),
        ));
    };
    items.iter().map(|v| coerce(field, v, false)).collect()
}

/// Coerce a JSON literal to the field kind. Strings are parsed for
/// non-string fields so exploded query parameters behave like JSON.
fn coerce(field: InfoField, value: &Value, allow_null: bool) -> Result<FilterValue, FilterError> {
    let mismatch = || FilterError::TypeMismatch {
        field: field.name().to_owned(),
        expected: field.kind(),
        got: value.to_string(),
    };

    match (field.kind(), value) {
        (FieldKind::Bool, Value::Null) => Err(mismatch()),
        (_, Value::Null) if allow_null => Ok(FilterValue::Null),
        (FieldKind::I64, Value::Number(n)) => n.as_i64().map(FilterValue::I64).ok_or_else(mismatch),
        (FieldKind::I64, Value::String(s)) => {
            s.trim().parse().map(FilterValue::I64).map_err(|_| mismatch())
        }
        (FieldKind::String, Value::String(s)) => Ok(FilterValue::String(s.clone())),
        (FieldKind::Bool, Value::Bool(b)) => Ok(FilterValue::Bool(*b)),
        (FieldKind::Bool, Value::String(s)) => match s.as_str() {
            "true" => Ok(FilterValue::Bool(true)),
            "false" => Ok(FilterValue::Bool(false)),
            _ => Err(mismatch()),
        },
        _ => Err(mismatch()),
    }
}

fn parse_order(value: &Value) -> Result<Vec<OrderKey>, FilterError> {
    match value {
        Value::String(s) => Ok(vec![parse_order_key(s)?]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => parse_order_key(s),
                _ => Err(FilterError::invalid("order", "expected \"<property> [ASC|DESC]\"")),
            })
            .collect(),
        _ => Err(FilterError::invalid(
            "order",
            "expected a string or an array of strings",
        )),
    }
}

fn parse_order_key(raw: &str) -> Result<OrderKey, FilterError> {
    let mut parts = raw.split_whitespace();
    let Some(name) = parts.next() else {
        return Err(FilterError::invalid("order", "empty order entry"));
    };
    let direction = match parts.next() {
        None => SortDirection::Asc,
        Some(d) if d.eq_ignore_ascii_case("asc") => SortDirection::Asc,
        Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
        Some(d) => {
            return Err(FilterError::invalid(
                "order",
                format!("unknown direction `{d}`"),
            ));
        }
    };
    if parts.next().is_some() {
        return Err(FilterError::invalid(
            "order",
            format!("unexpected tokens in `{raw}`"),
        ));
    }

    let field = InfoField::from_name(name).ok_or_else(|| FilterError::UnknownField(name.to_owned()))?;
    if !field.is_filterable() {
        return Err(FilterError::NotFilterable(name.to_owned()));
    }
    Ok(OrderKey { field, direction })
}

fn parse_fields(value: &Value) -> Result<Projection, FilterError> {
    match value {
        Value::String(name) => Ok(Projection::Include(vec![field_by_name(name)?])),
        Value::Array(items) => {
            let mut fields = Vec::with_capacity(items.len());
            for item in items {
                let Value::String(name) = item else {
                    return Err(FilterError::invalid("fields", "expected property names"));
                };
                fields.push(field_by_name(name)?);
            }
            Ok(Projection::Include(fields))
        }
        Value::Object(map) => parse_fields_map(map),
        _ => Err(FilterError::invalid(
            "fields",
            "expected an array or an object",
        )),
    }
}

fn parse_fields_map(map: &Map<String, Value>) -> Result<Projection, FilterError> {
    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for (name, flag) in map {
        let field = field_by_name(name)?;
        let keep = match flag {
            Value::Bool(b) => *b,
            Value::String(s) if s == "true" => true,
            Value::String(s) if s == "false" => false,
            _ => {
                return Err(FilterError::invalid(
                    "fields",
                    format!("`{name}` must be true or false"),
                ));
            }
        };
        if keep {
            include.push(field);
        } else {
            exclude.push(field);
        }
    }

    if !include.is_empty() {
        Ok(Projection::Include(include))
    } else if !exclude.is_empty() {
        Ok(Projection::Exclude(exclude))
    } else {
        Ok(Projection::All)
    }
}

fn field_by_name(name: &str) -> Result<InfoField, FilterError> {
    InfoField::from_name(name).ok_or_else(|| FilterError::UnknownField(name.to_owned()))
}

/// Pagination values must fit a signed 64-bit SQL parameter.
fn parse_count(key: &str, value: &Value) -> Result<u64, FilterError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    let Some(count) = parsed else {
        return Err(FilterError::invalid(key, "expected a non-negative integer"));
    };
    if i64::try_from(count).is_err() {
        return Err(FilterError::invalid(
            key,
            format!("must not exceed {}", i64::MAX),
        ));
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filter_is_default() {
        let f = parse_filter(&json!({})).unwrap();
        assert_eq!(f, InfoFilter::default());
    }

    #[test]
    fn literal_where_is_equality() {
        let f = parse_filter(&json!({"where": {"isComplete": false}})).unwrap();
        assert_eq!(
            f.where_clause,
            Some(WhereNode::eq(InfoField::IsComplete, FilterValue::Bool(false)))
        );
    }

    #[test]
    fn string_literals_are_coerced_to_field_kind() {
        let w = parse_where(&json!({"isComplete": "false", "id": "7"})).unwrap();
        let WhereNode::And(clauses) = w else {
            panic!("expected a conjunction, got {w:?}");
        };
        assert_eq!(clauses.len(), 2);
        assert!(clauses.contains(&WhereNode::eq(InfoField::IsComplete, FilterValue::Bool(false))));
        assert!(clauses.contains(&WhereNode::eq(InfoField::Id, FilterValue::I64(7))));
    }

    #[test]
    fn operator_objects_and_nesting() {
        let w = parse_where(&json!({
            "or": [
                {"id": {"gte": 2, "lt": 5}},
                {"title": {"inq": ["a", "b"]}}
            ]
        }))
        .unwrap();

        assert_eq!(
            w,
            WhereNode::Or(vec![
                WhereNode::And(vec![
                    WhereNode::field(InfoField::Id, Predicate::Gte(FilterValue::I64(2))),
                    WhereNode::field(InfoField::Id, Predicate::Lt(FilterValue::I64(5))),
                ]),
                WhereNode::field(
                    InfoField::Title,
                    Predicate::Inq(vec![
                        FilterValue::String("a".to_owned()),
                        FilterValue::String("b".to_owned()),
                    ])
                ),
            ])
        );
    }

    #[test]
    fn between_requires_two_bounds() {
        let ok = parse_where(&json!({"id": {"between": [1, 3]}})).unwrap();
        assert_eq!(
            ok,
            WhereNode::field(
                InfoField::Id,
                Predicate::Between(FilterValue::I64(1), FilterValue::I64(3))
            )
        );
        assert!(matches!(
            parse_where(&json!({"id": {"between": [1]}})),
            Err(FilterError::InvalidExpression { .. })
        ));
    }

    #[test]
    fn rejects_unknown_keys_fields_and_operators() {
        assert_eq!(
            parse_filter(&json!({"include": ["x"]})),
            Err(FilterError::UnknownKey("include".to_owned()))
        );
        assert_eq!(
            parse_where(&json!({"color": "red"})),
            Err(FilterError::UnknownField("color".to_owned()))
        );
        assert_eq!(
            parse_where(&json!({"tag": "x"})),
            Err(FilterError::NotFilterable("tag".to_owned()))
        );
        assert!(matches!(
            parse_where(&json!({"title": {"like": "a%"}})),
            Err(FilterError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn booleans_only_support_equality() {
        assert!(matches!(
            parse_where(&json!({"isComplete": {"gt": false}})),
            Err(FilterError::UnsupportedOperation {
                op: WhereOp::Gt,
                ..
            })
        ));
        assert!(matches!(
            parse_where(&json!({"isComplete": null})),
            Err(FilterError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn type_mismatch_is_reported() {
        let err = parse_where(&json!({"id": "seven"})).unwrap_err();
        assert!(matches!(
            err,
            FilterError::TypeMismatch {
                expected: FieldKind::I64,
                ..
            }
        ));
    }

    #[test]
    fn null_equality_is_allowed_on_nullable_fields() {
        let w = parse_where(&json!({"desc": null})).unwrap();
        assert_eq!(w, WhereNode::eq(InfoField::Desc, FilterValue::Null));
        assert!(parse_where(&json!({"desc": {"gt": null}})).is_err());
    }

    #[test]
    fn order_string_and_array_forms_agree() {
        let single = parse_filter(&json!({"order": "title DESC"})).unwrap();
        let array = parse_filter(&json!({"order": ["title desc"]})).unwrap();
        assert_eq!(single.order, vec![OrderKey::desc(InfoField::Title)]);
        assert_eq!(single, array);

        let multi = parse_filter(&json!({"order": ["isComplete", "id DESC"]})).unwrap();
        assert_eq!(
            multi.order,
            vec![OrderKey::asc(InfoField::IsComplete), OrderKey::desc(InfoField::Id)]
        );
    }

    #[test]
    fn order_rejects_bad_direction_and_tag() {
        assert!(parse_filter(&json!({"order": "title SIDEWAYS"})).is_err());
        assert!(parse_filter(&json!({"order": "title DESC extra"})).is_err());
        assert!(parse_filter(&json!({"order": "tag"})).is_err());
    }

    #[test]
    fn fields_projection_forms() {
        let arr = parse_filter(&json!({"fields": ["title"]})).unwrap();
        assert_eq!(arr.fields, Projection::Include(vec![InfoField::Title]));

        let obj = parse_filter(&json!({"fields": {"title": true, "desc": false}})).unwrap();
        assert_eq!(obj.fields, Projection::Include(vec![InfoField::Title]));

        let excl = parse_filter(&json!({"fields": {"tag": "false"}})).unwrap();
        assert_eq!(excl.fields, Projection::Exclude(vec![InfoField::Tag]));
        assert!(!excl.fields.allows(InfoField::Tag));
        assert!(excl.fields.allows(InfoField::Title));
    }

    #[test]
    fn pagination_accepts_numbers_and_numeric_strings() {
        let f = parse_filter(&json!({"limit": "2", "skip": 3})).unwrap();
        assert_eq!(f.limit, Some(2));
        assert_eq!(f.offset, Some(3));

        let both = parse_filter(&json!({"offset": 1, "skip": 9})).unwrap();
        assert_eq!(both.offset, Some(1));

        assert!(parse_filter(&json!({"limit": -1})).is_err());
    }

    #[test]
    fn pagination_rejects_values_beyond_i64() {
        let max = parse_filter(&json!({"offset": i64::MAX})).unwrap();
        assert_eq!(max.offset, Some(i64::MAX.unsigned_abs()));

        for filter in [
            json!({"offset": u64::MAX}),
            json!({"skip": "9223372036854775808"}),
            json!({"limit": 9_223_372_036_854_775_808_u64}),
        ] {
            assert!(
                matches!(parse_filter(&filter), Err(FilterError::InvalidExpression { .. })),
                "{filter}"
            );
        }
    }

    #[test]
    fn from_json_str_reports_invalid_json() {
        assert!(matches!(
            InfoFilter::from_json_str("{not json"),
            Err(FilterError::InvalidJson(_))
        ));
    }
}
