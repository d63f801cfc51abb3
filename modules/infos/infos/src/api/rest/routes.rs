//! REST route table and `OpenAPI` document.
//!
//! Routes orchestrate but hold no business logic: they attach the shared
//! service and key guard as extensions and delegate to `handlers::*`.

use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Json, Router};
use utoipa::OpenApi;

use crate::api::rest::problem::{Problem, ValidationViolation};
use crate::api::rest::query::KeyGuard;
use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    info(title = "Reminders API", description = "Reminder CRUD with address geocoding"),
    paths(
        handlers::create_info,
        handlers::list_infos,
        handlers::get_info,
        handlers::replace_info,
        handlers::update_info,
        handlers::delete_info,
        handlers::count_infos,
        handlers::update_all_infos,
    ),
    components(schemas(
        dto::InfoDto,
        dto::CreateInfoReq,
        dto::ReplaceInfoReq,
        dto::UpdateInfoReq,
        dto::CountDto,
        Problem,
        ValidationViolation,
    )),
    tags((name = "infos", description = "Reminder management"))
)]
pub struct InfosApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(InfosApiDoc::openapi())
}

/// Register the `/infos` routes on `router`.
pub fn register_routes(router: Router, service: Arc<Service>, guard: Arc<KeyGuard>) -> Router {
    let infos = Router::new()
        .route(
            "/infos",
            get(handlers::list_infos)
                .post(handlers::create_info)
                .patch(handlers::update_all_infos),
        )
        .route("/infos/count", get(handlers::count_infos))
        .route("/infos/openapi.json", get(openapi_json))
        .route(
            "/infos/{id}",
            get(handlers::get_info)
                .put(handlers::replace_info)
                .patch(handlers::update_info)
                .delete(handlers::delete_info),
        )
        .layer(Extension(service))
        .layer(Extension(guard));

    tracing::debug!("Registered /infos routes");
    router.merge(infos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = InfosApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in ["/infos", "/infos/count", "/infos/{id}"] {
            assert!(paths.iter().any(|p| *p == expected), "missing {expected}");
        }
        let item = &doc.paths.paths["/infos/{id}"];
        assert!(item.get.is_some() && item.put.is_some() && item.patch.is_some() && item.delete.is_some());
    }
}
