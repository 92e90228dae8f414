//! Shallow structural validation run before migration.
//!
//! Only the top-level collections each format depends on are checked.
//! Nested fields are left to the converters.

use crate::WorkoutFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>, code: &str) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check that `record` carries the minimum structure for `format`
pub fn validate_workout_data(record: &Value, format: WorkoutFormat) -> ValidationResult {
    let mut errors = Vec::new();

    match format {
        WorkoutFormat::Strength => require_array(record, "exercises", &mut errors),
        WorkoutFormat::Conditioning => {
            require_array(record, "intervals", &mut errors);
            require_present(record, "equipment", &mut errors);
        }
        WorkoutFormat::Hybrid => require_array(record, "blocks", &mut errors),
        WorkoutFormat::Agility => require_array(record, "phases", &mut errors),
        WorkoutFormat::Unified => {
            for field in ["content", "metadata"] {
                require_present(record, field, &mut errors);
            }
        }
        WorkoutFormat::Unknown => {
            errors.push(ValidationError::new(
                "format",
                "Unknown workout format",
                "UNKNOWN_FORMAT",
            ));
        }
    }

    if !errors.is_empty() {
        tracing::debug!("Validation failed for {} record: {} errors", format, errors.len());
    }

    ValidationResult::from_errors(errors)
}

fn require_present(record: &Value, field: &str, errors: &mut Vec<ValidationError>) {
    if record.get(field).map_or(true, Value::is_null) {
        errors.push(ValidationError::new(
            field,
            format!("Missing required field '{}'", field),
            "REQUIRED_FIELD",
        ));
    }
}

fn require_array(record: &Value, field: &str, errors: &mut Vec<ValidationError>) {
    match record.get(field) {
        None | Some(Value::Null) => require_present(record, field, errors),
        Some(Value::Array(_)) => {}
        Some(_) => errors.push(ValidationError::new(
            field,
            format!("Field '{}' must be an array", field),
            "INVALID_TYPE",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_format_always_invalid() {
        let result = validate_workout_data(&json!({ "foo": 1 }), WorkoutFormat::Unknown);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "UNKNOWN_FORMAT");
    }

    #[test]
    fn test_strength_requires_exercises_array() {
        let result = validate_workout_data(
            &json!({ "exercises": "not-an-array" }),
            WorkoutFormat::Strength,
        );
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "exercises");
        assert_eq!(result.errors[0].code, "INVALID_TYPE");

        let ok = validate_workout_data(&json!({ "exercises": [] }), WorkoutFormat::Strength);
        assert!(ok.is_valid);
    }

    #[test]
    fn test_conditioning_requires_intervals_and_equipment() {
        let result = validate_workout_data(&json!({ "intervals": [] }), WorkoutFormat::Conditioning);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "equipment");
        assert_eq!(result.errors[0].code, "REQUIRED_FIELD");

        let missing_both = validate_workout_data(&json!({}), WorkoutFormat::Conditioning);
        assert_eq!(missing_both.errors.len(), 2);
    }

    #[test]
    fn test_hybrid_and_agility_collections() {
        assert!(validate_workout_data(&json!({ "blocks": [] }), WorkoutFormat::Hybrid).is_valid);
        assert!(!validate_workout_data(&json!({ "blocks": {} }), WorkoutFormat::Hybrid).is_valid);
        assert!(validate_workout_data(&json!({ "phases": [] }), WorkoutFormat::Agility).is_valid);
        assert!(!validate_workout_data(&json!({}), WorkoutFormat::Agility).is_valid);
    }

    #[test]
    fn test_nested_fields_not_checked() {
        let record = json!({ "exercises": [{ "garbage": true }] });
        assert!(validate_workout_data(&record, WorkoutFormat::Strength).is_valid);
    }
}
