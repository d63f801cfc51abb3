//! Process-local backend: a `BTreeMap` keyed by id behind a `parking_lot` lock.
//!
//! Filter evaluation follows the same rules as the SQL produced by
//! `filter_mapper`, so both backends answer a given filter identically.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use infos_sdk::{
    FilterValue, Info, InfoField, InfoPatch, NewInfo, OrderKey, Predicate, SortDirection,
    WhereNode,
};
use parking_lot::RwLock;

use crate::domain::error::DomainError;
use crate::domain::repo::{InfoQuery, InfosRepository};

#[derive(Default)]
struct MemoryState {
    rows: BTreeMap<i64, Info>,
    last_id: i64,
}

/// In-memory implementation of the `InfosRepository` trait.
#[derive(Default)]
pub struct InMemoryInfosRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryInfosRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InfosRepository for InMemoryInfosRepository {
    async fn create(&self, info: NewInfo) -> Result<Info, DomainError> {
        let mut state = self.state.write();
        let id = match info.id {
            Some(id) if state.rows.contains_key(&id) => return Err(DomainError::duplicate_id(id)),
            Some(id) => id,
            None => state
                .last_id
                .checked_add(1)
                .ok_or_else(|| DomainError::database("id space exhausted"))?,
        };
        state.last_id = state.last_id.max(id);

        let stored = Info {
            id,
            title: info.title,
            desc: info.desc,
            is_complete: info.is_complete,
            remind_at_address: info.remind_at_address,
            remind_at_geo: info.remind_at_geo,
            tag: info.tag,
        };
        state.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Info>, DomainError> {
        Ok(self.state.read().rows.get(&id).cloned())
    }

    async fn find(&self, query: &InfoQuery) -> Result<Vec<Info>, DomainError> {
        let mut rows: Vec<Info> = {
            let state = self.state.read();
            state
                .rows
                .values()
                .filter(|info| query.where_clause.as_ref().is_none_or(|w| matches(w, info)))
                .cloned()
                .collect()
        };

        if !query.order.is_empty() {
            rows.sort_by(|a, b| compare_by(&query.order, a, b));
        }

        let offset = usize::try_from(query.offset.unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn replace(&self, info: Info) -> Result<bool, DomainError> {
        let mut state = self.state.write();
        match state.rows.get_mut(&info.id) {
            Some(slot) => {
                *slot = info;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update(&self, id: i64, patch: &InfoPatch) -> Result<bool, DomainError> {
        let mut state = self.state.write();
        match state.rows.get_mut(&id) {
            Some(info) => {
                patch.apply_to(info);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.state.write().rows.remove(&id).is_some())
    }

    async fn update_all(
        &self,
        patch: &InfoPatch,
        filter: Option<&WhereNode>,
    ) -> Result<u64, DomainError> {
        let mut state = self.state.write();
        let mut count = 0u64;
        for info in state.rows.values_mut() {
            if filter.is_none_or(|w| matches(w, info)) {
                patch.apply_to(info);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn count(&self, filter: Option<&WhereNode>) -> Result<u64, DomainError> {
        let state = self.state.read();
        let n = state
            .rows
            .values()
            .filter(|info| filter.is_none_or(|w| matches(w, info)))
            .count();
        Ok(u64::try_from(n).unwrap_or(u64::MAX))
    }
}

/// Raw stored value; `None` becomes `Null`.
fn stored_value(info: &Info, field: InfoField) -> FilterValue {
    let text = |v: &Option<String>| v.clone().map_or(FilterValue::Null, FilterValue::String);
    match field {
        InfoField::Id => FilterValue::I64(info.id),
        InfoField::Title => FilterValue::String(info.title.clone()),
        InfoField::Desc => text(&info.desc),
        InfoField::IsComplete => info.is_complete.map_or(FilterValue::Null, FilterValue::Bool),
        InfoField::RemindAtAddress => text(&info.remind_at_address),
        InfoField::RemindAtGeo => text(&info.remind_at_geo),
        InfoField::Tag => FilterValue::Null,
    }
}

fn matches(node: &WhereNode, info: &Info) -> bool {
    match node {
        WhereNode::And(children) => children.iter().all(|c| matches(c, info)),
        WhereNode::Or(children) => children.iter().any(|c| matches(c, info)),
        WhereNode::Field { field, predicate } if *field == InfoField::IsComplete => {
            let actual = info.is_complete.unwrap_or(false);
            match predicate {
                Predicate::Eq(FilterValue::Bool(b)) => actual == *b,
                Predicate::Neq(FilterValue::Bool(b)) => actual != *b,
                _ => false,
            }
        }
        WhereNode::Field { field, predicate } => {
            predicate_matches(predicate, &stored_value(info, *field))
        }
    }
}

fn predicate_matches(predicate: &Predicate, actual: &FilterValue) -> bool {
    let is_set = *actual != FilterValue::Null;
    match predicate {
        Predicate::Eq(v) => actual == v,
        Predicate::Neq(FilterValue::Null) => is_set,
        Predicate::Neq(v) => actual != v,
        Predicate::Gt(v) => is_set && *v != FilterValue::Null && actual > v,
        Predicate::Gte(v) => is_set && *v != FilterValue::Null && actual >= v,
        Predicate::Lt(v) => is_set && *v != FilterValue::Null && actual < v,
        Predicate::Lte(v) => is_set && *v != FilterValue::Null && actual <= v,
        Predicate::Inq(values) => is_set && values.contains(actual),
        Predicate::Nin(values) => !is_set || !values.contains(actual),
        Predicate::Between(low, high) => is_set && actual >= low && actual <= high,
    }
}

/// Unset values sort first ascending, matching `NULLS FIRST` in SQL.
fn compare_by(order: &[OrderKey], a: &Info, b: &Info) -> Ordering {
    for key in order {
        let ord = stored_value(a, key.field).cmp(&stored_value(b, key.field));
        let ord = match key.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.id.cmp(&b.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: i64, title: &str, desc: Option<&str>, is_complete: Option<bool>) -> Info {
        Info {
            id,
            title: title.to_owned(),
            desc: desc.map(str::to_owned),
            is_complete,
            remind_at_address: None,
            remind_at_geo: None,
            tag: None,
        }
    }

    fn text(s: &str) -> FilterValue {
        FilterValue::String(s.to_owned())
    }

    #[test]
    fn neq_and_nin_keep_unset_values() {
        let unset = info(1, "a", None, None);
        let set = info(2, "b", Some("x"), None);

        let neq = WhereNode::field(InfoField::Desc, Predicate::Neq(text("x")));
        assert!(matches(&neq, &unset));
        assert!(!matches(&neq, &set));

        let nin = WhereNode::field(InfoField::Desc, Predicate::Nin(vec![text("x")]));
        assert!(matches(&nin, &unset));
        assert!(!matches(&nin, &set));
    }

    #[test]
    fn ranges_skip_unset_values() {
        let unset = info(1, "a", None, None);
        let gt = WhereNode::field(InfoField::Desc, Predicate::Gt(text("")));
        assert!(!matches(&gt, &unset));

        let between = WhereNode::field(
            InfoField::Id,
            Predicate::Between(FilterValue::I64(1), FilterValue::I64(1)),
        );
        assert!(matches(&between, &unset));
    }

    #[test]
    fn unset_is_complete_counts_as_false() {
        let unset = info(1, "a", None, None);
        let done = info(2, "b", None, Some(true));
        let open = WhereNode::eq(InfoField::IsComplete, FilterValue::Bool(false));

        assert!(matches(&open, &unset));
        assert!(!matches(&open, &done));
        assert!(matches(
            &WhereNode::field(InfoField::IsComplete, Predicate::Neq(FilterValue::Bool(true))),
            &unset
        ));
    }

    #[test]
    fn empty_or_matches_nothing_and_empty_and_everything() {
        let row = info(1, "a", None, None);
        assert!(!matches(&WhereNode::Or(vec![]), &row));
        assert!(matches(&WhereNode::And(vec![]), &row));
    }

    #[test]
    fn ordering_puts_unset_first_and_breaks_ties_by_id() {
        let mut rows = vec![
            info(3, "b", Some("y"), None),
            info(1, "b", None, None),
            info(2, "a", Some("x"), None),
        ];

        rows.sort_by(|a, b| compare_by(&[OrderKey::asc(InfoField::Desc)], a, b));
        assert_eq!(rows.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        rows.sort_by(|a, b| compare_by(&[OrderKey::desc(InfoField::Title)], a, b));
        assert_eq!(rows.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 3, 2]);
    }
}
