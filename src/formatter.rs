//! Field-type-aware text rendering shared by every encoding.

use chrono::DateTime;

use crate::error::{Error, Result};
use crate::models::{Encoding, Record, Value};
use crate::schema::{FieldType, RecordSchema, RecordType, ScalarType};

/// Suffix marking a date-time field in the MIR and MRR records.
const TIME_SUFFIX: &str = "_T";

/// Render one field of a record as text for the given encoding.
///
/// Rules, first match wins:
/// 1. an absent value is the empty string
/// 2. a GDR payload is joined with the encoding's generic separator
/// 3. an array field is comma-joined, each element rendered by its scalar type
/// 4. a MIR/MRR field ending in `_T` is a POSIX time, rendered in UTC
/// 5. anything else is rendered by its scalar type
///
/// # Errors
///
/// [`Error::SchemaMismatch`] if `index` is outside the schema or the value
/// cannot be shown as its declared type.
pub fn format_field(
    schema: &RecordSchema,
    index: usize,
    value: Option<&Value>,
    encoding: Encoding,
) -> Result<String> {
    let field = schema.field(index).ok_or_else(|| {
        Error::SchemaMismatch(format!(
            "{} has {} fields, got a value at index {}",
            schema.name(),
            schema.fields.len(),
            index
        ))
    })?;

    let Some(value) = value else {
        return Ok(String::new());
    };

    if schema.rec_type == RecordType::Gdr {
        return Ok(match value {
            Value::List(items) => items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(encoding.generic_separator()),
            other => other.to_string(),
        });
    }

    match field.ty {
        FieldType::Array(elem) => {
            let items = value.as_list().ok_or_else(|| {
                Error::SchemaMismatch(format!(
                    "{}.{} is declared {} but the value is not a list",
                    schema.name(),
                    field.name,
                    field.ty
                ))
            })?;
            join(items.iter().map(|v| format_scalar(elem, v)), ",")
        }
        FieldType::Scalar(ty) => {
            if is_timestamp_field(schema.rec_type, field.name) {
                if let Some(text) = value
                    .as_int()
                    .and_then(|secs| format_timestamp(secs, encoding))
                {
                    return Ok(text);
                }
            }
            format_scalar(ty, value).map_err(|e| match e {
                Error::SchemaMismatch(msg) => {
                    Error::SchemaMismatch(format!("{}.{}: {}", schema.name(), field.name, msg))
                }
                other => other,
            })
        }
    }
}

/// Render every field of a record, in schema order.
pub fn format_record(record: &Record, encoding: Encoding) -> Result<Vec<String>> {
    let schema = record.schema();
    record
        .fields
        .iter()
        .enumerate()
        .map(|(i, value)| format_field(schema, i, value.as_ref(), encoding))
        .collect()
}

/// Render a single value according to its STDF primitive type.
///
/// `B1` and `N1` become two uppercase hex digits; every other type uses the
/// plain rendering of the value.
pub fn format_scalar(ty: ScalarType, value: &Value) -> Result<String> {
    if ty.is_hex() {
        return match value.as_int() {
            Some(n) if (0..=255).contains(&n) => Ok(format!("{:02X}", n)),
            _ => Err(Error::SchemaMismatch(format!(
                "{} value must be an integer in 0..=255, got {:?}",
                ty.code(),
                value
            ))),
        };
    }
    Ok(value.to_string())
}

/// Render POSIX seconds as `HH:MM:SS DD-Mon-YYYY` in UTC, using the
/// encoding's separator between time and date.
pub fn format_timestamp(secs: i64, encoding: Encoding) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|t| t.format(encoding.timestamp_format()).to_string())
}

fn is_timestamp_field(rec_type: RecordType, field_name: &str) -> bool {
    matches!(rec_type, RecordType::Mir | RecordType::Mrr) && field_name.ends_with(TIME_SUFFIX)
}

fn join<I>(parts: I, separator: &str) -> Result<String>
where
    I: Iterator<Item = Result<String>>,
{
    let parts = parts.collect::<Result<Vec<_>>>()?;
    Ok(parts.join(separator))
}
