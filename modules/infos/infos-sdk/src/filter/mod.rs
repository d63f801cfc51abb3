//! Filter language for `Info` queries.
//!
//! A filter is the JSON object accepted by list endpoints:
//! `{"where": {...}, "order": "title DESC", "fields": [...], "limit": 10, "offset": 0}`.
//! [`InfoFilter::from_json`] turns it into the typed tree defined here; storage
//! backends translate that tree into their own query form.

mod parse;

use std::fmt;

use thiserror::Error;

/// Value type of an `Info` property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    I64,
    String,
    Bool,
    Json,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::I64 => write!(f, "integer"),
            FieldKind::String => write!(f, "string"),
            FieldKind::Bool => write!(f, "boolean"),
            FieldKind::Json => write!(f, "any"),
        }
    }
}

/// Properties of `Info`, named as they appear on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InfoField {
    Id,
    Title,
    Desc,
    IsComplete,
    RemindAtAddress,
    RemindAtGeo,
    Tag,
}

impl InfoField {
    pub const FIELDS: &'static [InfoField] = &[
        InfoField::Id,
        InfoField::Title,
        InfoField::Desc,
        InfoField::IsComplete,
        InfoField::RemindAtAddress,
        InfoField::RemindAtGeo,
        InfoField::Tag,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            InfoField::Id => "id",
            InfoField::Title => "title",
            InfoField::Desc => "desc",
            InfoField::IsComplete => "isComplete",
            InfoField::RemindAtAddress => "remindAtAddress",
            InfoField::RemindAtGeo => "remindAtGeo",
            InfoField::Tag => "tag",
        }
    }

    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            InfoField::Id => FieldKind::I64,
            InfoField::IsComplete => FieldKind::Bool,
            InfoField::Tag => FieldKind::Json,
            InfoField::Title
            | InfoField::Desc
            | InfoField::RemindAtAddress
            | InfoField::RemindAtGeo => FieldKind::String,
        }
    }

    /// Property names are case-sensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::FIELDS.iter().copied().find(|f| f.name() == name)
    }

    /// Whether the field may appear in `where` and `order`.
    #[must_use]
    pub fn is_filterable(self) -> bool {
        self.kind() != FieldKind::Json
    }
}

impl fmt::Display for InfoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison operators of the `where` language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WhereOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Inq,
    Nin,
    Between,
}

impl WhereOp {
    pub const ALL: &'static [WhereOp] = &[
        WhereOp::Eq,
        WhereOp::Neq,
        WhereOp::Gt,
        WhereOp::Gte,
        WhereOp::Lt,
        WhereOp::Lte,
        WhereOp::Inq,
        WhereOp::Nin,
        WhereOp::Between,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            WhereOp::Eq => "eq",
            WhereOp::Neq => "neq",
            WhereOp::Gt => "gt",
            WhereOp::Gte => "gte",
            WhereOp::Lt => "lt",
            WhereOp::Lte => "lte",
            WhereOp::Inq => "inq",
            WhereOp::Nin => "nin",
            WhereOp::Between => "between",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.name() == name)
    }
}

impl fmt::Display for WhereOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A literal already coerced to the kind of the field it is compared with.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FilterValue {
    Null,
    Bool(bool),
    I64(i64),
    String(String),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Null => write!(f, "null"),
            FilterValue::Bool(b) => write!(f, "{b}"),
            FilterValue::I64(v) => write!(f, "{v}"),
            FilterValue::String(s) => write!(f, "'{s}'"),
        }
    }
}

/// Condition applied to a single field.
///
/// Semantics shared by every backend:
/// - `Eq(Null)` matches unset values, `Neq(Null)` matches set ones;
/// - `Neq` and `Nin` also match unset values;
/// - range operators and `Inq` match set values only.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Eq(FilterValue),
    Neq(FilterValue),
    Gt(FilterValue),
    Gte(FilterValue),
    Lt(FilterValue),
    Lte(FilterValue),
    Inq(Vec<FilterValue>),
    Nin(Vec<FilterValue>),
    Between(FilterValue, FilterValue),
}

impl Predicate {
    #[must_use]
    pub fn op(&self) -> WhereOp {
        match self {
            Predicate::Eq(_) => WhereOp::Eq,
            Predicate::Neq(_) => WhereOp::Neq,
            Predicate::Gt(_) => WhereOp::Gt,
            Predicate::Gte(_) => WhereOp::Gte,
            Predicate::Lt(_) => WhereOp::Lt,
            Predicate::Lte(_) => WhereOp::Lte,
            Predicate::Inq(_) => WhereOp::Inq,
            Predicate::Nin(_) => WhereOp::Nin,
            Predicate::Between(..) => WhereOp::Between,
        }
    }
}

/// Parsed `where` clause.
#[derive(Clone, Debug, PartialEq)]
pub enum WhereNode {
    Field { field: InfoField, predicate: Predicate },
    /// Empty `And` matches every record.
    And(Vec<WhereNode>),
    /// Empty `Or` matches nothing.
    Or(Vec<WhereNode>),
}

impl WhereNode {
    #[must_use]
    pub fn field(field: InfoField, predicate: Predicate) -> Self {
        WhereNode::Field { field, predicate }
    }

    #[must_use]
    pub fn eq(field: InfoField, value: FilterValue) -> Self {
        WhereNode::Field {
            field,
            predicate: Predicate::Eq(value),
        }
    }

    #[must_use]
    pub fn and(children: Vec<WhereNode>) -> Self {
        WhereNode::And(children)
    }

    #[must_use]
    pub fn or(children: Vec<WhereNode>) -> Self {
        WhereNode::Or(children)
    }

    /// Parse a `where` object such as `{"isComplete": false}`.
    ///
    /// # Errors
    /// Returns `FilterError` when the object references unknown fields or
    /// operators, or holds values of the wrong type.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, FilterError> {
        parse::parse_where(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderKey {
    pub field: InfoField,
    pub direction: SortDirection,
}

impl OrderKey {
    #[must_use]
    pub fn asc(field: InfoField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    #[must_use]
    pub fn desc(field: InfoField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// Which properties a response carries.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    All,
    Include(Vec<InfoField>),
    Exclude(Vec<InfoField>),
}

impl Projection {
    #[must_use]
    pub fn allows(&self, field: InfoField) -> bool {
        match self {
            Projection::All => true,
            Projection::Include(fields) => fields.contains(&field),
            Projection::Exclude(fields) => !fields.contains(&field),
        }
    }
}

/// Typed form of the list filter.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct InfoFilter {
    pub where_clause: Option<WhereNode>,
    pub order: Vec<OrderKey>,
    pub fields: Projection,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl InfoFilter {
    /// Parse a filter object. Allowed top-level keys are `where`, `order`,
    /// `fields`, `limit`, `offset` and `skip`; `offset` wins over `skip`.
    ///
    /// # Errors
    /// Returns `FilterError` for unknown keys, fields or operators and for
    /// values that do not fit the field they are compared with.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, FilterError> {
        parse::parse_filter(value)
    }

    /// Parse a JSON-encoded filter.
    ///
    /// # Errors
    /// Returns `FilterError::InvalidJson` when `raw` is not JSON, otherwise
    /// as [`InfoFilter::from_json`].
    pub fn from_json_str(raw: &str) -> Result<Self, FilterError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| FilterError::InvalidJson(e.to_string()))?;
        Self::from_json(&value)
    }

    #[must_use]
    pub fn with_where(mut self, node: WhereNode) -> Self {
        self.where_clause = Some(node);
        self
    }

    #[must_use]
    pub fn with_order(mut self, key: OrderKey) -> Self {
        self.order.push(key);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("unknown filter key `{0}`")]
    UnknownKey(String),

    #[error("unknown property `{0}`")]
    UnknownField(String),

    #[error("property `{0}` cannot be used in where or order")]
    NotFilterable(String),

    #[error("unknown operator `{op}` on property `{field}`")]
    UnknownOperator { field: String, op: String },

    #[error("type mismatch on `{field}`: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: FieldKind,
        got: String,
    },

    #[error("operator `{op}` is not supported on `{field}`")]
    UnsupportedOperation { field: String, op: WhereOp },

    #[error("invalid {key}: {message}")]
    InvalidExpression { key: String, message: String },
}

impl FilterError {
    pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            key: key.into(),
            message: message.into(),
        }
    }
}
