use std::ops::RangeInclusive;

/// Sensor types whose values must fall inside [`PERCENT_RANGE`].
const RANGE_CHECKED_TYPES: [&str; 2] = ["temperature", "humidity"];

const PERCENT_RANGE: RangeInclusive<i64> = 0..=100;

/// Whether `value` is acceptable for `sensor_type`.
///
/// Type names are matched exactly. Any type other than `temperature` or
/// `humidity` accepts every value.
pub fn validate_sensor_value(sensor_type: &str, value: i64) -> bool {
    if RANGE_CHECKED_TYPES.contains(&sensor_type) {
        PERCENT_RANGE.contains(&value)
    } else {
        true
    }
}
