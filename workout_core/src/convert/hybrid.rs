//! Hybrid program → unified session.
//!
//! Blocks convert 1:1 by type. A block with an unrecognized type is dropped
//! with a warning instead of failing the whole record.

use super::{
    assignments, block_exercise, difficulty, run_conversion, session_id, standard_metadata,
    ConversionLog, ConvertOptions,
};
use crate::legacy::{HybridBlock, HybridProgram};
use crate::{
    Error, ExerciseBlock, MigrationResult, MigrationWarning, Result, UnifiedWorkoutSession,
    WorkoutBlock, WorkoutContent, WorkoutFormat, WorkoutType, UNIFIED_SCHEMA_VERSION,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

const FIELDS_MODIFIED: &[&str] = &["structure", "metadata", "content.blocks"];

pub fn migrate_hybrid_workout(
    record: &Value,
    options: &ConvertOptions,
) -> MigrationResult<UnifiedWorkoutSession> {
    run_conversion(WorkoutFormat::Hybrid, FIELDS_MODIFIED, |log| {
        convert(record, options, log)
    })
}

fn convert(
    record: &Value,
    options: &ConvertOptions,
    log: &mut ConversionLog,
) -> Result<UnifiedWorkoutSession> {
    let program = HybridProgram::<Value>::deserialize(record)?;
    let id = session_id(&program.common, options);

    let mut blocks = Vec::with_capacity(program.blocks.len());
    let mut equipment: BTreeSet<String> = program.equipment.iter().cloned().collect();

    for (i, raw) in program.blocks.iter().enumerate() {
        let type_name = raw.get("type").and_then(Value::as_str);

        if !type_name.is_some_and(|t| HybridBlock::TYPE_NAMES.contains(&t)) {
            log.warn(
                MigrationWarning::new(format!(
                    "Unknown block type: {}",
                    type_name.unwrap_or("<missing>")
                ))
                .with_field(format!("blocks[{}]", i))
                .with_suggestion("Block was skipped"),
            );
            log.report
                .dropped(format!("blocks[{}]", i), "unrecognized block type");
            log.data_loss = true;
            continue;
        }

        let block = HybridBlock::deserialize(raw)
            .map_err(|e| Error::Conversion(format!("blocks[{}]: {}", i, e)))?;
        blocks.push(convert_block(block, &mut equipment));
    }

    let difficulty = difficulty(&program.common, log).unwrap_or_default();
    let metadata = standard_metadata(
        &program.common,
        options,
        "hybrid",
        equipment.clone(),
        log,
    );

    let mut content = WorkoutContent {
        blocks,
        warmup: program.common.warmup.clone(),
        cooldown: program.common.cooldown.clone(),
        total_duration: 0,
        estimated_calories: program.common.estimated_calories,
        difficulty,
        target_muscle_groups: None,
        target_systems: None,
        interval_settings: None,
        focus_areas: None,
        equipment: (!equipment.is_empty()).then(|| equipment.into_iter().collect()),
    };
    content.total_duration = program
        .total_duration
        .unwrap_or_else(|| content.block_duration_sum(options.seconds_per_set));

    Ok(UnifiedWorkoutSession {
        id,
        version: UNIFIED_SCHEMA_VERSION.into(),
        workout_type: WorkoutType::Hybrid,
        name: program.common.name.clone(),
        description: program.common.description.clone().unwrap_or_default(),
        content,
        metadata,
        assignments: assignments(&program.common),
    })
}

fn convert_block(block: HybridBlock, equipment: &mut BTreeSet<String>) -> WorkoutBlock {
    match block {
        HybridBlock::Exercise(b) => {
            for exercise in &b.exercises {
                equipment.extend(exercise.equipment.iter().cloned());
            }
            WorkoutBlock::Exercise(ExerciseBlock {
                id: b.id,
                name: b.name,
                exercises: b.exercises.iter().map(block_exercise).collect(),
                duration: b.duration,
            })
        }
        HybridBlock::Interval(b) => {
            if let Some(e) = &b.equipment {
                equipment.insert(e.clone());
            }
            WorkoutBlock::Interval(b)
        }
        HybridBlock::Transition(b) => WorkoutBlock::Transition(b),
        HybridBlock::Rest(b) => WorkoutBlock::Rest(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MigrationErrorCode;
    use serde_json::json;

    fn program() -> Value {
        json!({
            "id": "hyb-1",
            "name": "Circuit",
            "blocks": [
                {
                    "id": "b1",
                    "type": "exercise",
                    "name": "Strength Round",
                    "exercises": [
                        { "exerciseId": "kb-swing", "name": "KB Swing", "sets": 3, "reps": 15, "equipment": ["kettlebell"] }
                    ]
                },
                { "id": "b2", "type": "transition", "duration": 30, "fromActivity": "kettlebell", "toActivity": "rower" },
                { "id": "b3", "type": "interval", "duration": 240, "intensity": 85, "equipment": "rower" },
                { "id": "b4", "type": "rest", "duration": 90 }
            ]
        })
    }

    #[test]
    fn test_blocks_convert_one_to_one() {
        let result = migrate_hybrid_workout(&program(), &ConvertOptions::default());
        assert!(result.success);
        assert!(result.warnings.is_empty());
        assert!(!result.metadata.data_loss);

        let session = result.data.unwrap();
        let ids: Vec<_> = session.content.blocks.iter().map(|b| b.id()).collect();
        let types: Vec<_> = session.content.blocks.iter().map(|b| b.type_name()).collect();
        assert_eq!(ids, vec!["b1", "b2", "b3", "b4"]);
        assert_eq!(types, vec!["exercise", "transition", "interval", "rest"]);
    }

    #[test]
    fn test_total_duration_summed_when_not_declared() {
        let session = migrate_hybrid_workout(&program(), &ConvertOptions::default())
            .data
            .unwrap();
        // exercise: 3 * 60, transition 30, interval 240, rest 90
        assert_eq!(session.content.total_duration, 180 + 30 + 240 + 90);
    }

    #[test]
    fn test_declared_total_duration_wins() {
        let mut record = program();
        record["totalDuration"] = json!(2400);
        let session = migrate_hybrid_workout(&record, &ConvertOptions::default())
            .data
            .unwrap();
        assert_eq!(session.content.total_duration, 2400);
    }

    #[test]
    fn test_unknown_block_type_is_skipped_with_warning() {
        let mut record = program();
        record["blocks"]
            .as_array_mut()
            .unwrap()
            .insert(2, json!({ "id": "bx", "type": "meditation", "duration": 300 }));

        let result = migrate_hybrid_workout(&record, &ConvertOptions::default());
        assert!(result.success);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.starts_with("Unknown block type"));
        assert_eq!(result.warnings[0].field.as_deref(), Some("blocks[2]"));
        assert!(result.metadata.data_loss);

        let session = result.data.unwrap();
        assert_eq!(session.content.blocks.len(), 4);
        assert!(session.content.blocks.iter().all(|b| b.id() != "bx"));
    }

    #[test]
    fn test_equipment_collected_from_blocks() {
        let session = migrate_hybrid_workout(&program(), &ConvertOptions::default())
            .data
            .unwrap();
        assert_eq!(
            session.content.equipment,
            Some(vec!["kettlebell".to_string(), "rower".to_string()])
        );
    }

    #[test]
    fn test_malformed_known_block_fails_record() {
        let record = json!({
            "blocks": [{ "id": "b1", "type": "interval", "duration": "long" }]
        });
        let result = migrate_hybrid_workout(&record, &ConvertOptions::default());
        assert!(!result.success);
        assert_eq!(result.first_error_code(), Some(MigrationErrorCode::MigrationError));
        assert!(result.errors[0].message.contains("blocks[0]"));
    }
}
