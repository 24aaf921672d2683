use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::AnalysisError;

/// Placeholder stored when the model gives no description.
pub const UNKNOWN_FOOD: &str = "未知食物";

#[derive(Debug, Clone, PartialEq)]
pub struct MealEstimate {
    pub calories: f64,
    pub protein: f64,
    pub description: String,
}

/// Parse the model's free text into an estimate.
///
/// The reply is expected to hold a JSON object, possibly wrapped in a fenced
/// code block. The fenced body is tried first, then the whole text.
pub fn parse_estimate(raw: &str) -> Result<MealEstimate, AnalysisError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(extract_json(text))?;
    let Value::Object(obj) = value else {
        return Err(AnalysisError::Malformed("expected a json object".into()));
    };

    Ok(MealEstimate {
        calories: number_field(&obj, "calories")?,
        protein: number_field(&obj, "protein")?,
        description: description_field(&obj)?,
    })
}

fn extract_json(text: &str) -> &str {
    lazy_static! {
        static ref FENCE_RE: Regex = Regex::new(r"```(?:[A-Za-z]+)?\s*([\s\S]*?)```").unwrap();
    }
    if text.contains("```") {
        if let Some(body) = FENCE_RE.captures(text).and_then(|c| c.get(1)) {
            return body.as_str().trim();
        }
    }
    text
}

fn number_field(obj: &Map<String, Value>, key: &str) -> Result<f64, AnalysisError> {
    let n = match obj.get(key) {
        None | Some(Value::Null) => return Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| AnalysisError::Malformed(format!("{key} out of range")))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| AnalysisError::Malformed(format!("{key} is not numeric: {s:?}")))?,
        Some(other) => {
            return Err(AnalysisError::Malformed(format!("{key} is not numeric: {other}")));
        }
    };
    if !n.is_finite() || n < 0.0 {
        return Err(AnalysisError::Malformed(format!("{key} must be a non-negative number, got {n}")));
    }
    Ok(n)
}

fn description_field(obj: &Map<String, Value>) -> Result<String, AnalysisError> {
    match obj.get("description") {
        None | Some(Value::Null) => Ok(UNKNOWN_FOOD.to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(UNKNOWN_FOOD.to_string()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(other) => Err(AnalysisError::Malformed(format!("description is not text: {other}"))),
    }
}
