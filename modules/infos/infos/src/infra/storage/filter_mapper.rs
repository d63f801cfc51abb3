//! Mapping from the typed `WhereNode`/`OrderKey` filter to `SeaORM` conditions.
//!
//! This is the only place where SDK filter fields meet `SeaORM` columns. The
//! generated SQL mirrors the comparison rules of the in-memory backend:
//! `neq`/`nin` keep NULL rows, an unset `isComplete` counts as `false`.

use infos_sdk::{FilterValue, InfoField, OrderKey, Predicate, SortDirection, WhereNode};
use sea_orm::sea_query::{Expr, NullOrdering, SimpleExpr};
use sea_orm::{Condition, Order, QueryOrder, Select};

use crate::infra::storage::entity::{Column, Entity};

/// Column backing a filterable field; `None` for `tag`.
#[must_use]
pub fn field_to_column(field: InfoField) -> Option<Column> {
    match field {
        InfoField::Id => Some(Column::Id),
        InfoField::Title => Some(Column::Title),
        InfoField::Desc => Some(Column::Desc),
        InfoField::IsComplete => Some(Column::IsComplete),
        InfoField::RemindAtAddress => Some(Column::RemindAtAddress),
        InfoField::RemindAtGeo => Some(Column::RemindAtGeo),
        InfoField::Tag => None,
    }
}

fn to_sea_value(v: &FilterValue) -> sea_orm::Value {
    match v {
        FilterValue::Null => sea_orm::Value::String(None),
        FilterValue::Bool(b) => sea_orm::Value::from(*b),
        FilterValue::I64(i) => sea_orm::Value::from(*i),
        FilterValue::String(s) => sea_orm::Value::from(s.clone()),
    }
}

fn never() -> SimpleExpr {
    Expr::cust("1=0")
}

fn always() -> SimpleExpr {
    Expr::cust("1=1")
}

/// Build a `Condition` from a `WhereNode` tree.
#[must_use]
pub fn where_to_condition(node: &WhereNode) -> Condition {
    match node {
        WhereNode::And(children) => children
            .iter()
            .fold(Condition::all(), |c, child| c.add(where_to_condition(child))),
        WhereNode::Or(children) if children.is_empty() => Condition::all().add(never()),
        WhereNode::Or(children) => children
            .iter()
            .fold(Condition::any(), |c, child| c.add(where_to_condition(child))),
        WhereNode::Field { field, predicate } => match field_to_column(*field) {
            Some(col) if *field == InfoField::IsComplete => bool_condition(col, predicate),
            Some(col) => predicate_condition(col, predicate),
            None => Condition::all().add(never()),
        },
    }
}

fn bool_condition(col: Column, predicate: &Predicate) -> Condition {
    let wanted = match predicate {
        Predicate::Eq(FilterValue::Bool(b)) => *b,
        Predicate::Neq(FilterValue::Bool(b)) => !*b,
        _ => return Condition::all().add(never()),
    };

    if wanted {
        Condition::all().add(Expr::col(col).eq(true))
    } else {
        Condition::any()
            .add(Expr::col(col).eq(false))
            .add(Expr::col(col).is_null())
    }
}

fn predicate_condition(col: Column, predicate: &Predicate) -> Condition {
    let c = Expr::col(col);
    let expr = match predicate {
        Predicate::Eq(FilterValue::Null) => c.is_null(),
        Predicate::Neq(FilterValue::Null) => c.is_not_null(),
        Predicate::Eq(v) => c.eq(to_sea_value(v)),
        Predicate::Neq(v) => {
            return Condition::any()
                .add(Expr::col(col).is_null())
                .add(Expr::col(col).ne(to_sea_value(v)));
        }
        Predicate::Gt(FilterValue::Null)
        | Predicate::Gte(FilterValue::Null)
        | Predicate::Lt(FilterValue::Null)
        | Predicate::Lte(FilterValue::Null) => never(),
        Predicate::Gt(v) => c.gt(to_sea_value(v)),
        Predicate::Gte(v) => c.gte(to_sea_value(v)),
        Predicate::Lt(v) => c.lt(to_sea_value(v)),
        Predicate::Lte(v) => c.lte(to_sea_value(v)),
        Predicate::Inq(values) if values.is_empty() => never(),
        Predicate::Inq(values) => c.is_in(values.iter().map(to_sea_value)),
        Predicate::Nin(values) if values.is_empty() => always(),
        Predicate::Nin(values) => {
            return Condition::any()
                .add(Expr::col(col).is_null())
                .add(Expr::col(col).is_not_in(values.iter().map(to_sea_value)));
        }
        Predicate::Between(low, high) => c.between(to_sea_value(low), to_sea_value(high)),
    };
    Condition::all().add(expr)
}

/// Apply `order` followed by `id ASC` as the final tie-break.
/// NULLs sort first ascending and last descending on every backend.
#[must_use]
pub fn apply_order(mut select: Select<Entity>, order: &[OrderKey]) -> Select<Entity> {
    for key in order {
        let Some(col) = field_to_column(key.field) else {
            continue;
        };
        let (ord, nulls) = match key.direction {
            SortDirection::Asc => (Order::Asc, NullOrdering::First),
            SortDirection::Desc => (Order::Desc, NullOrdering::Last),
        };
        select = select.order_by_with_nulls(col, ord, nulls);
    }

    if !order.iter().any(|k| k.field == InfoField::Id) {
        select = select.order_by(Column::Id, Order::Asc);
    }
    select
}
