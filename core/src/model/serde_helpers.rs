// stocktone/src/model/serde_helpers.rs

//! Lenient numeric decoding for record fields.
//!
//! Spreadsheet-backed stores hand numbers back as JSON numbers, numeric
//! strings or empty cells, depending on how the row was last edited.

use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use tracing::{event, Level};

pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(deserializer)?;
  u32_from_value(&value).map_err(de::Error::custom)
}

pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(deserializer)?;
  decimal_from_value(&value).map_err(de::Error::custom)
}

pub fn u32_from_value(value: &Value) -> Result<u32, String> {
  let whole = match value {
    Value::Null => return Ok(0),
    Value::Number(n) => match n.as_i64() {
      Some(i) => i,
      None => integral_f64(n.as_f64().unwrap_or(f64::NAN))?,
    },
    Value::String(s) if s.trim().is_empty() => return Ok(0),
    Value::String(s) => match s.trim().parse::<i64>() {
      Ok(i) => i,
      Err(_) => integral_f64(s.trim().parse::<f64>().map_err(|e| format!("invalid quantity '{}': {}", s, e))?)?,
    },
    other => return Err(format!("invalid quantity: {}", value_kind(other))),
  };
  if whole < 0 {
    event!(Level::WARN, quantity = whole, "Negative quantity in remote row, clamping to zero.");
    return Ok(0);
  }
  u32::try_from(whole).map_err(|_| format!("quantity out of range: {}", whole))
}

fn integral_f64(f: f64) -> Result<i64, String> {
  if !f.is_finite() || f.fract() != 0.0 {
    return Err(format!("quantity is not a whole number: {}", f));
  }
  Ok(f as i64)
}

pub fn decimal_from_value(value: &Value) -> Result<Decimal, String> {
  match value {
    Value::Null => Ok(Decimal::ZERO),
    Value::Number(n) => Decimal::from_str(&n.to_string())
      .or_else(|_| Decimal::from_scientific(&n.to_string()))
      .map_err(|e| format!("invalid cost '{}': {}", n, e)),
    Value::String(s) if s.trim().is_empty() => Ok(Decimal::ZERO),
    Value::String(s) => Decimal::from_str(s.trim()).map_err(|e| format!("invalid cost '{}': {}", s, e)),
    other => Err(format!("invalid cost: {}", value_kind(other))),
  }
}

pub fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
