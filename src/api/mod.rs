pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{routing::get, Router};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::db::ReadingStore;
use handlers::ApiDoc;

pub fn router(store: ReadingStore) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/devices/readings", get(handlers::readings_summary))
        .route(
            "/devices/{device_uuid}/readings",
            get(handlers::list_readings).post(handlers::create_reading),
        )
        .route("/devices/{device_uuid}/readings/max", get(handlers::max_readings))
        .route("/devices/{device_uuid}/readings/min", get(handlers::min_readings))
        .route("/devices/{device_uuid}/readings/median", get(handlers::median_readings))
        .route("/devices/{device_uuid}/readings/mode", get(handlers::mode_readings))
        .route("/devices/{device_uuid}/readings/mean", get(handlers::mean_reading))
        .route(
            "/devices/{device_uuid}/readings/quartiles",
            get(handlers::quartile_readings),
        )
        .with_state(store)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
