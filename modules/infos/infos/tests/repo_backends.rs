#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Contract tests run against every storage backend: the in-memory map and
//! `SeaORM` over an in-memory SQLite database.

use std::sync::Arc;

use infos::config::{StorageBackend, StorageConfig};
use infos::domain::error::DomainError;
use infos::domain::repo::{InfoQuery, InfosRepository};
use infos::infra::storage::connect_repository;
use infos_sdk::{FilterValue, InfoField, InfoPatch, NewInfo, OrderKey, Predicate, WhereNode};
use serde_json::json;

async fn backends() -> Vec<(&'static str, Arc<dyn InfosRepository>)> {
    let memory = connect_repository(&StorageConfig {
        backend: StorageBackend::Memory,
        ..StorageConfig::default()
    })
    .await
    .unwrap();
    let sqlite = connect_repository(&StorageConfig {
        backend: StorageBackend::Database,
        dsn: "sqlite::memory:".to_owned(),
        migrate: true,
    })
    .await
    .expect("sqlite in-memory database");
    vec![("memory", memory), ("sqlite", sqlite)]
}

async fn seed(repo: &dyn InfosRepository) {
    let rows = [
        NewInfo {
            is_complete: Some(false),
            ..NewInfo::titled("Buy milk")
        },
        NewInfo {
            desc: Some("Sunday".to_owned()),
            is_complete: Some(true),
            ..NewInfo::titled("Call mom")
        },
        NewInfo::titled("Walk dog"),
        NewInfo {
            desc: Some("monthly".to_owned()),
            tag: Some(json!({"prio": 1})),
            ..NewInfo::titled("Pay rent")
        },
    ];
    for row in rows {
        repo.create(row).await.unwrap();
    }
}

fn ids(rows: &[infos_sdk::Info]) -> Vec<i64> {
    rows.iter().map(|i| i.id).collect()
}

fn text(s: &str) -> FilterValue {
    FilterValue::String(s.to_owned())
}

#[tokio::test]
async fn test_create_assigns_sequential_ids_and_round_trips() {
    for (name, repo) in backends().await {
        seed(repo.as_ref()).await;

        let rent = repo.find_by_id(4).await.unwrap().expect(name);
        assert_eq!(rent.title, "Pay rent", "{name}");
        assert_eq!(rent.tag, Some(json!({"prio": 1})), "{name}");
        assert_eq!(rent.is_complete, None, "{name}");
        assert!(repo.find_by_id(5).await.unwrap().is_none(), "{name}");
    }
}

#[tokio::test]
async fn test_create_with_existing_id_is_duplicate() {
    for (name, repo) in backends().await {
        seed(repo.as_ref()).await;

        let err = repo
            .create(NewInfo {
                id: Some(2),
                ..NewInfo::titled("dup")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateId { id: 2 }), "{name}: {err:?}");

        let explicit = repo
            .create(NewInfo {
                id: Some(10),
                ..NewInfo::titled("ten")
            })
            .await
            .unwrap();
        assert_eq!(explicit.id, 10, "{name}");
        let next = repo.create(NewInfo::titled("next")).await.unwrap();
        assert_eq!(next.id, 11, "{name}");
    }
}

#[tokio::test]
async fn test_where_semantics_match_across_backends() {
    let cases = vec![
        (WhereNode::eq(InfoField::IsComplete, FilterValue::Bool(false)), vec![1, 3, 4]),
        (
            WhereNode::field(InfoField::IsComplete, Predicate::Neq(FilterValue::Bool(false))),
            vec![2],
        ),
        (WhereNode::field(InfoField::Desc, Predicate::Neq(text("Sunday"))), vec![1, 3, 4]),
        (WhereNode::eq(InfoField::Desc, FilterValue::Null), vec![1, 3]),
        (WhereNode::field(InfoField::Desc, Predicate::Neq(FilterValue::Null)), vec![2, 4]),
        (WhereNode::field(InfoField::Desc, Predicate::Gt(text("A"))), vec![2, 4]),
        (WhereNode::field(InfoField::Id, Predicate::Inq(vec![])), vec![]),
        (WhereNode::field(InfoField::Id, Predicate::Nin(vec![])), vec![1, 2, 3, 4]),
        (
            WhereNode::field(InfoField::Desc, Predicate::Nin(vec![text("monthly")])),
            vec![1, 2, 3],
        ),
        (
            WhereNode::field(
                InfoField::Id,
                Predicate::Between(FilterValue::I64(2), FilterValue::I64(3)),
            ),
            vec![2, 3],
        ),
        (
            WhereNode::or(vec![
                WhereNode::eq(InfoField::Id, FilterValue::I64(1)),
                WhereNode::eq(InfoField::Title, text("Walk dog")),
            ]),
            vec![1, 3],
        ),
        (WhereNode::Or(vec![]), vec![]),
        (WhereNode::And(vec![]), vec![1, 2, 3, 4]),
    ];

    for (name, repo) in backends().await {
        seed(repo.as_ref()).await;
        for (node, expected) in &cases {
            let query = InfoQuery {
                where_clause: Some(node.clone()),
                ..InfoQuery::default()
            };
            let found = repo.find(&query).await.unwrap();
            assert_eq!(ids(&found), *expected, "{name}: {node:?}");

            let count = repo.count(Some(node)).await.unwrap();
            assert_eq!(count, u64::try_from(expected.len()).unwrap(), "{name}: count {node:?}");
        }
    }
}

#[tokio::test]
async fn test_order_limit_offset() {
    for (name, repo) in backends().await {
        seed(repo.as_ref()).await;

        let by_desc = repo
            .find(&InfoQuery {
                order: vec![OrderKey::asc(InfoField::Desc)],
                ..InfoQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&by_desc), vec![1, 3, 2, 4], "{name}: nulls first asc");

        let by_desc_rev = repo
            .find(&InfoQuery {
                order: vec![OrderKey::desc(InfoField::Desc)],
                ..InfoQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&by_desc_rev), vec![4, 2, 1, 3], "{name}: nulls last desc");

        let page = repo
            .find(&InfoQuery {
                order: vec![OrderKey::desc(InfoField::Id)],
                limit: Some(2),
                offset: Some(1),
                ..InfoQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![3, 2], "{name}");

        let tail = repo
            .find(&InfoQuery {
                offset: Some(3),
                ..InfoQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&tail), vec![4], "{name}");
    }
}

#[tokio::test]
async fn test_strings_order_and_compare_bytewise() {
    for (name, repo) in backends().await {
        for title in ["b", "B", "a", "\u{c4}pfel"] {
            repo.create(NewInfo::titled(title)).await.unwrap();
        }

        let sorted = repo
            .find(&InfoQuery {
                order: vec![OrderKey::asc(InfoField::Title)],
                ..InfoQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&sorted), vec![2, 3, 1, 4], "{name}: asc");

        let above_upper = repo
            .find(&InfoQuery {
                where_clause: Some(WhereNode::field(InfoField::Title, Predicate::Gt(text("Z")))),
                ..InfoQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&above_upper), vec![1, 3, 4], "{name}: gt");
    }
}

#[tokio::test]
async fn test_paging_beyond_i64_is_empty() {
    for (name, repo) in backends().await {
        seed(repo.as_ref()).await;

        for (limit, offset) in [(Some(2), Some(u64::MAX)), (None, Some(u64::MAX)), (Some(u64::MAX), None)] {
            let found = repo
                .find(&InfoQuery {
                    limit,
                    offset,
                    ..InfoQuery::default()
                })
                .await
                .unwrap();
            let expected = if offset.is_some() { vec![] } else { vec![1, 2, 3, 4] };
            assert_eq!(ids(&found), expected, "{name}: limit {limit:?} offset {offset:?}");
        }
    }
}

#[tokio::test]
async fn test_update_replace_delete() {
    for (name, repo) in backends().await {
        seed(repo.as_ref()).await;

        let patch = InfoPatch {
            desc: Some(None),
            is_complete: Some(Some(true)),
            ..InfoPatch::default()
        };
        assert!(repo.update(2, &patch).await.unwrap(), "{name}");
        assert!(!repo.update(42, &patch).await.unwrap(), "{name}");
        let call = repo.find_by_id(2).await.unwrap().unwrap();
        assert_eq!(call.desc, None, "{name}");
        assert_eq!(call.title, "Call mom", "{name}");

        let mut replaced = call.clone();
        replaced.title = "Call dad".to_owned();
        replaced.tag = Some(json!(["a"]));
        assert!(repo.replace(replaced.clone()).await.unwrap(), "{name}");
        assert_eq!(repo.find_by_id(2).await.unwrap(), Some(replaced), "{name}");

        assert!(repo.delete(2).await.unwrap(), "{name}");
        assert!(!repo.delete(2).await.unwrap(), "{name}");
        assert_eq!(repo.count(None).await.unwrap(), 3, "{name}");
    }
}

#[tokio::test]
async fn test_update_all_reports_matched_rows() {
    for (name, repo) in backends().await {
        seed(repo.as_ref()).await;

        let open = WhereNode::eq(InfoField::IsComplete, FilterValue::Bool(false));
        let patch = InfoPatch {
            is_complete: Some(Some(true)),
            ..InfoPatch::default()
        };
        assert_eq!(repo.update_all(&patch, Some(&open)).await.unwrap(), 3, "{name}");
        assert_eq!(repo.count(Some(&open)).await.unwrap(), 0, "{name}");

        let retitle = InfoPatch {
            title: Some("same".to_owned()),
            ..InfoPatch::default()
        };
        assert_eq!(repo.update_all(&retitle, None).await.unwrap(), 4, "{name}");
    }
}
