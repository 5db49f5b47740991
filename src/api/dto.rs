use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{db::models::Reading, stats::Quartiles};

/// A reading as returned by the API. The row id is not exposed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingDto {
    pub device_uuid: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub value: i64,
    /// Epoch seconds.
    pub date_created: i64,
}

impl From<Reading> for ReadingDto {
    fn from(r: Reading) -> Self {
        Self {
            device_uuid: r.device_uuid,
            sensor_type: r.sensor_type,
            value: r.value,
            date_created: r.date_created,
        }
    }
}

/// Request body for `POST /devices/{device_uuid}/readings`.
///
/// Every field is optional at the JSON level so that a missing field is
/// reported as a validation error rather than a deserialisation failure.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateReadingRequest {
    /// Sensor type, e.g. `temperature` or `humidity`.
    #[serde(rename = "type")]
    pub sensor_type: Option<String>,
    /// Integer measurement. Non-integer numbers are rejected.
    #[schema(value_type = Option<i64>)]
    pub value: Option<serde_json::Value>,
    /// Epoch seconds. Defaults to the time of the request when the key is
    /// absent; an explicit `null` is rejected.
    #[schema(value_type = Option<i64>)]
    pub date_created: Option<serde_json::Value>,
}

/// Response for `GET /devices/{device_uuid}/readings/mean`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeanDto {
    /// `null` when no reading matches.
    pub value: Option<f64>,
}

/// Response for `GET /devices/{device_uuid}/readings/quartiles`.
///
/// Both fields are `null` when fewer than two readings match.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct QuartilesDto {
    pub quartile_1: Option<i64>,
    pub quartile_3: Option<i64>,
}

impl From<Option<Quartiles>> for QuartilesDto {
    fn from(q: Option<Quartiles>) -> Self {
        match q {
            Some(q) => Self {
                quartile_1: Some(q.quartile_1),
                quartile_3: Some(q.quartile_3),
            },
            None => Self::default(),
        }
    }
}
