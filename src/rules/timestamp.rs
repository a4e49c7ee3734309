use bson::spec::ElementType;
use bson::Bson;
use thiserror::Error;

/// `create_date` values below `now_millis / THRESHOLD_DIVISOR` are taken to
/// be second-granularity timestamps.
pub const THRESHOLD_DIVISOR: f64 = 100.0;

const MILLIS_PER_SECOND: i64 = 1000;

/// Outcome of checking a single timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum Upgrade {
    /// The value is already millisecond-scale and stays as is.
    Unchanged,
    /// The value was second-scale; this is its millisecond equivalent.
    Millis(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("value overflows when converted to milliseconds")]
    Overflow,
}

/// The threshold a timestamp is compared against at `now_millis`.
pub fn seconds_threshold(now_millis: i64) -> f64 {
    now_millis as f64 / THRESHOLD_DIVISOR
}

/// True for the BSON types the store compares numerically.
pub fn is_numeric(value: &Bson) -> bool {
    matches!(
        value.element_type(),
        ElementType::Int32 | ElementType::Int64 | ElementType::Double | ElementType::Decimal128
    )
}

/// Decide whether `value` is second-scale at `now_millis` and compute its
/// millisecond value. Fractional inputs are truncated after scaling.
///
/// Non-numeric values sort above every number in BSON order, so they never
/// fall below the threshold and stay unchanged.
pub fn upgrade_to_millis(value: &Bson, now_millis: i64) -> Result<Upgrade, TimestampError> {
    let threshold = seconds_threshold(now_millis);
    match value {
        Bson::Int32(v) => scale_int(i64::from(*v), threshold),
        Bson::Int64(v) => scale_int(*v, threshold),
        Bson::Double(v) => scale_float(*v, threshold),
        Bson::Decimal128(v) => match v.to_string().parse::<f64>() {
            Ok(parsed) => scale_float(parsed, threshold),
            Err(_) => Ok(Upgrade::Unchanged),
        },
        _ => Ok(Upgrade::Unchanged),
    }
}

fn scale_float(value: f64, threshold: f64) -> Result<Upgrade, TimestampError> {
    if value >= threshold || value.is_nan() {
        return Ok(Upgrade::Unchanged);
    }
    let scaled = (value * MILLIS_PER_SECOND as f64).trunc();
    if scaled < i64::MIN as f64 || scaled >= i64::MAX as f64 {
        return Err(TimestampError::Overflow);
    }
    Ok(Upgrade::Millis(scaled as i64))
}

fn scale_int(value: i64, threshold: f64) -> Result<Upgrade, TimestampError> {
    if (value as f64) >= threshold {
        return Ok(Upgrade::Unchanged);
    }
    value
        .checked_mul(MILLIS_PER_SECOND)
        .map(Upgrade::Millis)
        .ok_or(TimestampError::Overflow)
}
