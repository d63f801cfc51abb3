#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The in-process `InfosClient` exposes the same behaviour as the REST API
//! with SDK error types.

mod common;

use std::sync::Arc;

use infos::domain::ports::GeocodeError;
use infos_sdk::{InfoField, InfoFilter, InfoPatch, InfosClient, InfosError, NewInfo, OrderKey};

use common::{ARMONK, ARMONK_GEO, StubGeocoder, memory_module};

fn client() -> Arc<dyn InfosClient> {
    memory_module(Arc::new(StubGeocoder::new())).client()
}

#[tokio::test]
async fn test_client_crud_round_trip() {
    let client = client();

    let created = client
        .create_info(NewInfo {
            remind_at_address: Some(ARMONK.to_owned()),
            ..NewInfo::titled("Office")
        })
        .await
        .unwrap();
    assert_eq!(created.remind_at_geo.as_deref(), Some(ARMONK_GEO));

    client
        .update_info(
            created.id,
            InfoPatch {
                is_complete: Some(Some(true)),
                ..InfoPatch::default()
            },
        )
        .await
        .unwrap();
    let fetched = client.get_info(created.id).await.unwrap();
    assert_eq!(fetched.is_complete, Some(true));

    let second = client.create_info(NewInfo::titled("Another")).await.unwrap();
    let listed = client
        .list_infos(InfoFilter::default().with_order(OrderKey::asc(InfoField::Title)))
        .await
        .unwrap();
    assert_eq!(listed.iter().map(|i| i.id).collect::<Vec<_>>(), vec![second.id, created.id]);

    assert_eq!(client.count_infos(None).await.unwrap(), 2);
    client.delete_info(created.id).await.unwrap();
    assert_eq!(
        client.get_info(created.id).await.unwrap_err(),
        InfosError::not_found(created.id)
    );
}

#[tokio::test]
async fn test_client_maps_errors_to_sdk_types() {
    let client = client();

    let missing = client
        .create_info(NewInfo {
            remind_at_address: Some("nowhere".to_owned()),
            ..NewInfo::titled("x")
        })
        .await
        .unwrap_err();
    assert_eq!(missing, InfosError::address_not_found("nowhere"));

    let invalid = client.create_info(NewInfo::titled("")).await.unwrap_err();
    assert!(matches!(invalid, InfosError::Validation { .. }));

    let too_many = client
        .list_infos(InfoFilter::default().with_limit(5000))
        .await
        .unwrap_err();
    assert!(matches!(too_many, InfosError::InvalidFilter { .. }));

    let bulk = client
        .update_all_infos(
            InfoPatch {
                desc: Some(Some("x".to_owned())),
                ..InfoPatch::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(bulk, 0);
}

#[tokio::test]
async fn test_client_keeps_geocoder_failures_apart() {
    let geocoder = StubGeocoder::new()
        .failing("down", GeocodeError::Unavailable("connect timeout".to_owned()))
        .failing("broken", GeocodeError::Upstream("HTTP 500".to_owned()));
    let client = memory_module(Arc::new(geocoder)).client();

    let create = |address: &str| NewInfo {
        remind_at_address: Some(address.to_owned()),
        ..NewInfo::titled("Office")
    };
    assert_eq!(
        client.create_info(create("down")).await.unwrap_err(),
        InfosError::geocoder_unavailable("connect timeout")
    );
    assert_eq!(
        client.create_info(create("broken")).await.unwrap_err(),
        InfosError::geocoder("HTTP 500")
    );
    assert!(client.list_infos(InfoFilter::default()).await.unwrap().is_empty());
}
