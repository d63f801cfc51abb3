use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, RawQuery};
use axum::http::{StatusCode, Uri};
use axum::{Extension, Json};
use infos_sdk::InfoPatch;
use serde_json::Value;
use tracing::{field::Empty, info};

use crate::api::rest::dto::{
    BodyKind, CountDto, CreateInfoReq, InfoDto, ReplaceInfoReq, UpdateInfoReq, decode_body, project,
};
use crate::api::rest::error::{INVALID_PARAMETER_VALUE, domain_error_to_problem, validation_problem};
use crate::api::rest::problem::{Problem, ValidationViolation};
use crate::api::rest::query::{self, KeyGuard};
use crate::domain::service::Service;

type ApiResult<T> = Result<T, Problem>;

fn path_id(id: Result<Path<i64>, PathRejection>, uri: &Uri) -> ApiResult<i64> {
    id.map(|Path(id)| id).map_err(|rejection| {
        Problem::new(
            StatusCode::BAD_REQUEST,
            "Bad Request",
            format!("Invalid path parameter: {}", rejection.body_text()),
        )
        .with_code(INVALID_PARAMETER_VALUE)
        .with_errors(vec![ValidationViolation::new("id", "must be an integer")])
        .with_instance(uri.path())
    })
}

/// Create a reminder, geocoding `remindAtAddress` when present
#[utoipa::path(
    post,
    path = "/infos",
    tag = "infos",
    request_body = CreateInfoReq,
    responses(
        (status = 200, description = "Created reminder", body = InfoDto),
        (status = 400, description = "Address not found, prohibited key or malformed JSON", body = Problem),
        (status = 422, description = "Invalid body", body = Problem),
        (status = 502, description = "Geocoder failure", body = Problem),
    )
)]
#[tracing::instrument(name = "infos.create_info", skip_all, fields(info.id = Empty))]
pub async fn create_info(
    Extension(svc): Extension<Arc<Service>>,
    Extension(guard): Extension<Arc<KeyGuard>>,
    uri: Uri,
    body: Bytes,
) -> ApiResult<Json<InfoDto>> {
    let req: CreateInfoReq =
        decode_body(&body, &guard, BodyKind::Create).map_err(|p| p.with_instance(uri.path()))?;
    info!("Creating info");

    let created = svc
        .create_info(req.into())
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    tracing::Span::current().record("info.id", created.id);
    Ok(Json(InfoDto::from(created)))
}

/// Get a reminder by id; `filter` may carry `fields` only
#[utoipa::path(
    get,
    path = "/infos/{id}",
    tag = "infos",
    params(
        ("id" = i64, Path, description = "Reminder id"),
        ("filter" = Option<String>, Query, description = "JSON filter; only `fields` is honoured"),
    ),
    responses(
        (status = 200, description = "The reminder", body = InfoDto),
        (status = 400, description = "Invalid filter", body = Problem),
        (status = 404, description = "Not found", body = Problem),
    )
)]
#[tracing::instrument(name = "infos.get_info", skip_all)]
pub async fn get_info(
    Extension(svc): Extension<Arc<Service>>,
    Extension(guard): Extension<Arc<KeyGuard>>,
    uri: Uri,
    id: Result<Path<i64>, PathRejection>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Value>> {
    let id = path_id(id, &uri)?;
    let filter =
        query::single_filter(raw.as_deref(), &guard).map_err(|p| p.with_instance(uri.path()))?;

    let found = svc
        .get_info(id)
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(Json(project(&InfoDto::from(found), &filter.fields)))
}

/// List reminders matching `filter`
#[utoipa::path(
    get,
    path = "/infos",
    tag = "infos",
    params(
        ("filter" = Option<String>, Query,
            description = "JSON filter (`where`, `order`, `fields`, `limit`, `offset`/`skip`), or its `filter[...]` bracket form"),
    ),
    responses(
        (status = 200, description = "Matching reminders", body = [InfoDto]),
        (status = 400, description = "Invalid filter", body = Problem),
    )
)]
#[tracing::instrument(name = "infos.list_infos", skip_all, fields(count = Empty))]
pub async fn list_infos(
    Extension(svc): Extension<Arc<Service>>,
    Extension(guard): Extension<Arc<KeyGuard>>,
    uri: Uri,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Vec<Value>>> {
    let filter =
        query::list_filter(raw.as_deref(), &guard).map_err(|p| p.with_instance(uri.path()))?;

    let infos = svc
        .list_infos(&filter)
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    tracing::Span::current().record("count", infos.len());
    Ok(Json(
        infos
            .into_iter()
            .map(|i| project(&InfoDto::from(i), &filter.fields))
            .collect(),
    ))
}

/// Replace a reminder
#[utoipa::path(
    put,
    path = "/infos/{id}",
    tag = "infos",
    params(("id" = i64, Path, description = "Reminder id")),
    request_body = ReplaceInfoReq,
    responses(
        (status = 204, description = "Replaced"),
        (status = 404, description = "Not found", body = Problem),
        (status = 422, description = "Invalid body", body = Problem),
        (status = 502, description = "Geocoder failure", body = Problem),
    )
)]
#[tracing::instrument(name = "infos.replace_info", skip_all)]
pub async fn replace_info(
    Extension(svc): Extension<Arc<Service>>,
    Extension(guard): Extension<Arc<KeyGuard>>,
    uri: Uri,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let id = path_id(id, &uri)?;
    let req: ReplaceInfoReq =
        decode_body(&body, &guard, BodyKind::Replace).map_err(|p| p.with_instance(uri.path()))?;
    if req.id.is_some_and(|body_id| body_id != id) {
        return Err(validation_problem(vec![
            ValidationViolation::new("id", "must match the id in the path").with_code("ID_MISMATCH"),
        ])
        .with_instance(uri.path()));
    }
    info!(id, "Replacing info");

    svc.replace_info(req.into_info(id))
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Update some properties of a reminder
#[utoipa::path(
    patch,
    path = "/infos/{id}",
    tag = "infos",
    params(("id" = i64, Path, description = "Reminder id")),
    request_body = UpdateInfoReq,
    responses(
        (status = 204, description = "Updated"),
        (status = 404, description = "Not found", body = Problem),
        (status = 422, description = "Invalid body", body = Problem),
        (status = 502, description = "Geocoder failure", body = Problem),
    )
)]
#[tracing::instrument(name = "infos.update_info", skip_all)]
pub async fn update_info(
    Extension(svc): Extension<Arc<Service>>,
    Extension(guard): Extension<Arc<KeyGuard>>,
    uri: Uri,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let id = path_id(id, &uri)?;
    let req: UpdateInfoReq =
        decode_body(&body, &guard, BodyKind::Patch).map_err(|p| p.with_instance(uri.path()))?;
    info!(id, "Updating info");

    svc.update_info(id, InfoPatch::from(req))
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a reminder
#[utoipa::path(
    delete,
    path = "/infos/{id}",
    tag = "infos",
    params(("id" = i64, Path, description = "Reminder id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Problem),
    )
)]
#[tracing::instrument(name = "infos.delete_info", skip_all)]
pub async fn delete_info(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = path_id(id, &uri)?;
    info!(id, "Deleting info");

    svc.delete_info(id)
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Count reminders matching `where`
#[utoipa::path(
    get,
    path = "/infos/count",
    tag = "infos",
    params(("where" = Option<String>, Query, description = "JSON condition, or its `where[...]` bracket form")),
    responses(
        (status = 200, description = "Number of matching reminders", body = CountDto),
        (status = 400, description = "Invalid condition", body = Problem),
    )
)]
#[tracing::instrument(name = "infos.count_infos", skip_all)]
pub async fn count_infos(
    Extension(svc): Extension<Arc<Service>>,
    Extension(guard): Extension<Arc<KeyGuard>>,
    uri: Uri,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<CountDto>> {
    let condition =
        query::where_param(raw.as_deref(), &guard).map_err(|p| p.with_instance(uri.path()))?;

    let count = svc
        .count_infos(condition.as_ref())
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(Json(CountDto { count }))
}

/// Update every reminder matching `where`
#[utoipa::path(
    patch,
    path = "/infos",
    tag = "infos",
    params(("where" = Option<String>, Query, description = "JSON condition, or its `where[...]` bracket form")),
    request_body = UpdateInfoReq,
    responses(
        (status = 200, description = "Number of updated reminders", body = CountDto),
        (status = 400, description = "Invalid condition", body = Problem),
        (status = 422, description = "Invalid body", body = Problem),
        (status = 502, description = "Geocoder failure", body = Problem),
    )
)]
#[tracing::instrument(name = "infos.update_all_infos", skip_all)]
pub async fn update_all_infos(
    Extension(svc): Extension<Arc<Service>>,
    Extension(guard): Extension<Arc<KeyGuard>>,
    uri: Uri,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> ApiResult<Json<CountDto>> {
    let condition =
        query::where_param(raw.as_deref(), &guard).map_err(|p| p.with_instance(uri.path()))?;
    let req: UpdateInfoReq =
        decode_body(&body, &guard, BodyKind::Patch).map_err(|p| p.with_instance(uri.path()))?;

    let count = svc
        .update_all_infos(InfoPatch::from(req), condition.as_ref())
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(Json(CountDto { count }))
}
