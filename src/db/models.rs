use sqlx::FromRow;

/// Mirrors a row of the `readings` table.
///
/// `sensor_type` is free text. Only `temperature` and `humidity` carry a
/// value range, see [`crate::validation`].
#[derive(Debug, Clone, FromRow)]
pub struct Reading {
    pub id: i64,
    pub device_uuid: String,
    #[sqlx(rename = "type")]
    pub sensor_type: String,
    pub value: i64,
    /// Epoch seconds.
    pub date_created: i64,
}

/// A reading that has passed validation but has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReading {
    pub device_uuid: String,
    pub sensor_type: String,
    pub value: i64,
    pub date_created: i64,
}
