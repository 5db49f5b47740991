use std::{fmt, str::FromStr};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{de, Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use utoipa::OpenApi;

use super::{
    dto::{CreateReadingRequest, MeanDto, QuartilesDto, ReadingDto},
    errors::AppError,
};
use crate::{
    db::{
        filter::ReadingFilter,
        models::{NewReading, Reading},
        ReadingStore,
    },
    stats,
    validation::validate_sensor_value,
};

const TYPE_REQUIRED: &str = "A type query parameter is required";
const RANGE_REQUIRED: &str = "type, start and end query parameters are required";

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// `?type=&start=&end=`. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ReadingsParams {
    #[serde(rename = "type", default, deserialize_with = "empty_string_as_none")]
    pub sensor_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub start: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub end: Option<i64>,
}

impl ReadingsParams {
    /// Device predicate followed by whichever of type/start/end are present.
    fn filter(&self, device_uuid: &str) -> ReadingFilter {
        let mut filter = ReadingFilter::device(device_uuid);
        if let Some(sensor_type) = &self.sensor_type {
            filter = filter.type_contains(sensor_type.as_str());
        }
        if let Some(start) = self.start {
            filter = filter.created_from(start);
        }
        if let Some(end) = self.end {
            filter = filter.created_until(end);
        }
        filter
    }

    fn require_type(&self) -> Result<(), AppError> {
        match self.sensor_type {
            Some(_) => Ok(()),
            None => Err(AppError::MissingParams(TYPE_REQUIRED)),
        }
    }
}

fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(de::Error::custom),
    }
}

fn to_dtos(rows: impl IntoIterator<Item = Reading>) -> Vec<ReadingDto> {
    rows.into_iter().map(Into::into).collect()
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Store a reading for a device. `date_created` defaults to now.
#[utoipa::path(
    post,
    path = "/devices/{device_uuid}/readings",
    params(
        ("device_uuid" = String, Path, description = "Device identifier"),
    ),
    request_body = CreateReadingRequest,
    responses(
        (status = 201, description = "Reading stored", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing field or value out of range", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn create_reading(
    State(store): State<ReadingStore>,
    Path(device_uuid): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, &'static str), AppError> {
    let request: CreateReadingRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(device_uuid = %device_uuid, error = %e, "Unparseable reading body");
        AppError::Validation
    })?;

    let sensor_type = request
        .sensor_type
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Validation)?;
    let value = request
        .value
        .as_ref()
        .and_then(Value::as_i64)
        .ok_or(AppError::Validation)?;

    let date_created = match &request.date_created {
        None => chrono::Utc::now().timestamp(),
        Some(v) => v.as_i64().ok_or(AppError::Validation)?,
    };

    if !validate_sensor_value(&sensor_type, value) {
        warn!(device_uuid = %device_uuid, sensor_type = %sensor_type, value, "Rejected out-of-range reading");
        return Err(AppError::Validation);
    }

    let reading = NewReading {
        device_uuid,
        sensor_type,
        value,
        date_created,
    };
    let id = store.insert(&reading).await?;
    info!(
        id,
        device_uuid = %reading.device_uuid,
        sensor_type = %reading.sensor_type,
        value = reading.value,
        "Reading stored"
    );

    Ok((StatusCode::CREATED, "success"))
}

/// List a device's readings, optionally filtered by type substring and
/// `date_created` range. Ordered by insertion.
#[utoipa::path(
    get,
    path = "/devices/{device_uuid}/readings",
    params(
        ("device_uuid" = String, Path, description = "Device identifier"),
        ("type"  = Option<String>, Query, description = "Sensor type substring (case-sensitive)"),
        ("start" = Option<i64>,    Query, description = "Inclusive lower bound on date_created (epoch seconds)"),
        ("end"   = Option<i64>,    Query, description = "Inclusive upper bound on date_created (epoch seconds)"),
    ),
    responses(
        (status = 200, description = "Matching readings", body = Vec<ReadingDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn list_readings(
    State(store): State<ReadingStore>,
    Path(device_uuid): Path<String>,
    Query(params): Query<ReadingsParams>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    let rows = store.query(&params.filter(&device_uuid)).await?;
    Ok(Json(to_dtos(rows)))
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Readings equal to the maximum value for the given type.
///
/// The maximum is taken over the device's readings of `type` within the
/// range. The readings returned are those of the device within the range
/// whose value equals it, whatever their type.
#[utoipa::path(
    get,
    path = "/devices/{device_uuid}/readings/max",
    params(
        ("device_uuid" = String, Path, description = "Device identifier"),
        ("type"  = String,      Query, description = "Sensor type substring (case-sensitive)"),
        ("start" = Option<i64>, Query, description = "Inclusive lower bound on date_created"),
        ("end"   = Option<i64>, Query, description = "Inclusive upper bound on date_created"),
    ),
    responses(
        (status = 200, description = "Readings at the maximum", body = Vec<ReadingDto>),
        (status = 400, description = "Missing type", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "aggregates"
)]
pub async fn max_readings(
    State(store): State<ReadingStore>,
    Path(device_uuid): Path<String>,
    Query(params): Query<ReadingsParams>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    params.require_type()?;
    let filter = params.filter(&device_uuid);

    let Some(max) = store.max_value(&filter).await? else {
        return Ok(Json(Vec::new()));
    };
    let rows = store.query(&filter.without_type().value_equals(max)).await?;
    Ok(Json(to_dtos(rows)))
}

/// Readings equal to the minimum value for the given type and range.
#[utoipa::path(
    get,
    path = "/devices/{device_uuid}/readings/min",
    params(
        ("device_uuid" = String, Path, description = "Device identifier"),
        ("type"  = String,      Query, description = "Sensor type substring (case-sensitive)"),
        ("start" = Option<i64>, Query, description = "Inclusive lower bound on date_created"),
        ("end"   = Option<i64>, Query, description = "Inclusive upper bound on date_created"),
    ),
    responses(
        (status = 200, description = "Readings at the minimum", body = Vec<ReadingDto>),
        (status = 400, description = "Missing type", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "aggregates"
)]
pub async fn min_readings(
    State(store): State<ReadingStore>,
    Path(device_uuid): Path<String>,
    Query(params): Query<ReadingsParams>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    params.require_type()?;
    let filter = params.filter(&device_uuid);

    let Some(min) = store.min_value(&filter).await? else {
        return Ok(Json(Vec::new()));
    };
    let rows = store.query(&filter.value_equals(min)).await?;
    Ok(Json(to_dtos(rows)))
}

/// Readings whose value equals the median. Empty when the median falls
/// between two distinct values.
#[utoipa::path(
    get,
    path = "/devices/{device_uuid}/readings/median",
    params(
        ("device_uuid" = String, Path, description = "Device identifier"),
        ("type"  = String,      Query, description = "Sensor type substring (case-sensitive)"),
        ("start" = Option<i64>, Query, description = "Inclusive lower bound on date_created"),
        ("end"   = Option<i64>, Query, description = "Inclusive upper bound on date_created"),
    ),
    responses(
        (status = 200, description = "Readings at the median", body = Vec<ReadingDto>),
        (status = 400, description = "Missing type", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "aggregates"
)]
pub async fn median_readings(
    State(store): State<ReadingStore>,
    Path(device_uuid): Path<String>,
    Query(params): Query<ReadingsParams>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    params.require_type()?;
    let rows = store.query(&params.filter(&device_uuid)).await?;

    let values: Vec<i64> = rows.iter().map(|r| r.value).collect();
    let Some(median) = stats::median(&values) else {
        return Ok(Json(Vec::new()));
    };
    debug!(device_uuid = %device_uuid, median, "Computed median");

    Ok(Json(to_dtos(
        rows.into_iter().filter(|r| r.value as f64 == median),
    )))
}

/// Readings whose value is a mode (most frequent value) of the selection.
#[utoipa::path(
    get,
    path = "/devices/{device_uuid}/readings/mode",
    params(
        ("device_uuid" = String, Path, description = "Device identifier"),
        ("type"  = String,      Query, description = "Sensor type substring (case-sensitive)"),
        ("start" = Option<i64>, Query, description = "Inclusive lower bound on date_created"),
        ("end"   = Option<i64>, Query, description = "Inclusive upper bound on date_created"),
    ),
    responses(
        (status = 200, description = "Readings at the mode", body = Vec<ReadingDto>),
        (status = 400, description = "Missing type", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "aggregates"
)]
pub async fn mode_readings(
    State(store): State<ReadingStore>,
    Path(device_uuid): Path<String>,
    Query(params): Query<ReadingsParams>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    params.require_type()?;
    let rows = store.query(&params.filter(&device_uuid)).await?;

    let values: Vec<i64> = rows.iter().map(|r| r.value).collect();
    let modes = stats::modes(&values);

    Ok(Json(to_dtos(
        rows.into_iter().filter(|r| modes.contains(&r.value)),
    )))
}

/// Mean value for the given type and range; `null` when nothing matches.
#[utoipa::path(
    get,
    path = "/devices/{device_uuid}/readings/mean",
    params(
        ("device_uuid" = String, Path, description = "Device identifier"),
        ("type"  = String,      Query, description = "Sensor type substring (case-sensitive)"),
        ("start" = Option<i64>, Query, description = "Inclusive lower bound on date_created"),
        ("end"   = Option<i64>, Query, description = "Inclusive upper bound on date_created"),
    ),
    responses(
        (status = 200, description = "Mean value", body = MeanDto),
        (status = 400, description = "Missing type", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "aggregates"
)]
pub async fn mean_reading(
    State(store): State<ReadingStore>,
    Path(device_uuid): Path<String>,
    Query(params): Query<ReadingsParams>,
) -> Result<Json<MeanDto>, AppError> {
    params.require_type()?;
    let value = store.avg_value(&params.filter(&device_uuid)).await?;
    Ok(Json(MeanDto { value }))
}

/// First and third quartile of the values for the given type and range.
#[utoipa::path(
    get,
    path = "/devices/{device_uuid}/readings/quartiles",
    params(
        ("device_uuid" = String, Path, description = "Device identifier"),
        ("type"  = String, Query, description = "Sensor type substring (case-sensitive)"),
        ("start" = i64,    Query, description = "Inclusive lower bound on date_created"),
        ("end"   = i64,    Query, description = "Inclusive upper bound on date_created"),
    ),
    responses(
        (status = 200, description = "Quartiles", body = QuartilesDto),
        (status = 400, description = "Missing type, start or end", body = String, content_type = "text/plain"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "aggregates"
)]
pub async fn quartile_readings(
    State(store): State<ReadingStore>,
    Path(device_uuid): Path<String>,
    Query(params): Query<ReadingsParams>,
) -> Result<Json<QuartilesDto>, AppError> {
    if params.sensor_type.is_none() || params.start.is_none() || params.end.is_none() {
        return Err(AppError::MissingParams(RANGE_REQUIRED));
    }

    let rows = store.query(&params.filter(&device_uuid)).await?;
    let values: Vec<i64> = rows.iter().map(|r| r.value).collect();

    Ok(Json(stats::quartiles(&values).into()))
}

/// Cross-device summary. Not implemented.
#[utoipa::path(
    get,
    path = "/devices/readings",
    responses(
        (status = 501, description = "Endpoint is not implemented", body = String, content_type = "text/plain"),
    ),
    tag = "readings"
)]
pub async fn readings_summary() -> AppError {
    AppError::NotImplemented
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        create_reading,
        list_readings,
        max_readings,
        min_readings,
        median_readings,
        mode_readings,
        mean_reading,
        quartile_readings,
        readings_summary,
        health,
    ),
    components(schemas(ReadingDto, CreateReadingRequest, MeanDto, QuartilesDto)),
    tags(
        (name = "readings",   description = "Reading ingestion and listing"),
        (name = "aggregates", description = "Aggregate queries over a device's readings"),
        (name = "system",     description = "System endpoints"),
    ),
    info(
        title = "Device Readings API",
        version = "0.1.0",
        description = "Records IoT sensor readings per device and answers aggregate queries"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
