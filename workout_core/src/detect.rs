//! Format detection for arbitrary workout records.
//!
//! Rules are evaluated in a fixed priority order; the first match wins:
//! 1. **unified**: `version` string, `type` string, `content` and `metadata` objects
//! 2. **strength**: `exercises` array whose elements all carry `exerciseId` and `sets`
//! 3. **conditioning**: `intervals` array, an `equipment` value and a numeric `totalDuration`
//! 4. **hybrid**: `blocks` array with at least one typed element
//! 5. **agility**: `phases` array with at least one phase carrying `drills`

use crate::WorkoutFormat;
use serde_json::Value;

/// Classify a record by its structural signature. Never fails.
pub fn detect_workout_format(record: &Value) -> WorkoutFormat {
    let Some(obj) = record.as_object() else {
        return WorkoutFormat::Unknown;
    };

    let is_unified = obj.get("version").is_some_and(Value::is_string)
        && obj.get("type").is_some_and(Value::is_string)
        && obj.get("content").is_some_and(Value::is_object)
        && obj.get("metadata").is_some_and(Value::is_object);
    if is_unified {
        return WorkoutFormat::Unified;
    }

    if let Some(exercises) = obj.get("exercises").and_then(Value::as_array) {
        if exercises
            .iter()
            .all(|e| has_field(e, "exerciseId") && has_field(e, "sets"))
        {
            return WorkoutFormat::Strength;
        }
    }

    let is_conditioning = obj.get("intervals").is_some_and(Value::is_array)
        && obj.get("equipment").is_some_and(|e| !e.is_null())
        && obj.get("totalDuration").is_some_and(Value::is_number);
    if is_conditioning {
        return WorkoutFormat::Conditioning;
    }

    if let Some(blocks) = obj.get("blocks").and_then(Value::as_array) {
        if blocks.iter().any(|b| has_field(b, "type")) {
            return WorkoutFormat::Hybrid;
        }
    }

    if let Some(phases) = obj.get("phases").and_then(Value::as_array) {
        if phases.iter().any(|p| has_field(p, "drills")) {
            return WorkoutFormat::Agility;
        }
    }

    WorkoutFormat::Unknown
}

fn has_field(value: &Value, field: &str) -> bool {
    value
        .as_object()
        .and_then(|o| o.get(field))
        .is_some_and(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_conditioning() {
        let record = json!({
            "intervals": [{ "duration": 180, "intensity": 75 }],
            "equipment": "bike",
            "totalDuration": 1800
        });
        assert_eq!(detect_workout_format(&record), WorkoutFormat::Conditioning);
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(detect_workout_format(&json!({ "foo": 1 })), WorkoutFormat::Unknown);
        assert_eq!(detect_workout_format(&json!(null)), WorkoutFormat::Unknown);
        assert_eq!(detect_workout_format(&json!([1, 2, 3])), WorkoutFormat::Unknown);
        assert_eq!(detect_workout_format(&json!("strength")), WorkoutFormat::Unknown);
    }

    #[test]
    fn test_detect_strength() {
        let record = json!({
            "name": "Lower A",
            "exercises": [
                { "exerciseId": "squat", "sets": 3 },
                { "exerciseId": "rdl", "sets": [] }
            ]
        });
        assert_eq!(detect_workout_format(&record), WorkoutFormat::Strength);
    }

    #[test]
    fn test_strength_requires_every_exercise_to_match() {
        let record = json!({
            "exercises": [
                { "exerciseId": "squat", "sets": 3 },
                { "name": "no id" }
            ]
        });
        assert_eq!(detect_workout_format(&record), WorkoutFormat::Unknown);
    }

    #[test]
    fn test_exercises_not_an_array_is_unknown() {
        let record = json!({ "exercises": "not-an-array" });
        assert_eq!(detect_workout_format(&record), WorkoutFormat::Unknown);
    }

    #[test]
    fn test_detect_hybrid_and_agility() {
        let hybrid = json!({ "blocks": [{ "id": "b1" }, { "id": "b2", "type": "rest" }] });
        let agility = json!({ "phases": [{ "name": "Main", "drills": [] }] });

        assert_eq!(detect_workout_format(&hybrid), WorkoutFormat::Hybrid);
        assert_eq!(detect_workout_format(&agility), WorkoutFormat::Agility);
    }

    #[test]
    fn test_untyped_blocks_are_not_hybrid() {
        let record = json!({ "blocks": [{ "id": "b1" }] });
        assert_eq!(detect_workout_format(&record), WorkoutFormat::Unknown);
    }

    #[test]
    fn test_unified_takes_priority_over_legacy_fields() {
        let record = json!({
            "version": "1.0.0",
            "type": "hybrid",
            "content": { "blocks": [{ "type": "rest", "id": "r", "duration": 30 }] },
            "metadata": {},
            "blocks": [{ "type": "rest" }],
            "exercises": [{ "exerciseId": "x", "sets": 1 }]
        });
        assert_eq!(detect_workout_format(&record), WorkoutFormat::Unified);
    }

    #[test]
    fn test_conditioning_needs_numeric_total_duration() {
        let record = json!({
            "intervals": [],
            "equipment": "rower",
            "totalDuration": "1800"
        });
        assert_eq!(detect_workout_format(&record), WorkoutFormat::Unknown);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let record = json!({ "phases": [{ "drills": [{ "id": "d", "name": "T-drill" }] }] });
        let first = detect_workout_format(&record);
        for _ in 0..10 {
            assert_eq!(detect_workout_format(&record), first);
        }
    }
}
