//! Strength template → unified session.
//!
//! Each exercise becomes its own exercise block; a rest block of
//! `restBetweenExercises` seconds separates consecutive exercises.

use super::{
    assignments, block_exercise, difficulty, non_empty, run_conversion, session_id,
    standard_metadata, ConversionLog, ConvertOptions,
};
use crate::ids::block_id;
use crate::legacy::StrengthTemplate;
use crate::{
    ExerciseBlock, MigrationResult, RestBlock, Result, UnifiedWorkoutSession, WorkoutBlock,
    WorkoutContent, WorkoutFormat, WorkoutType, UNIFIED_SCHEMA_VERSION,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

const FIELDS_MODIFIED: &[&str] = &[
    "structure",
    "metadata",
    "content.blocks",
    "content.totalDuration",
];

pub fn migrate_strength_workout(
    record: &Value,
    options: &ConvertOptions,
) -> MigrationResult<UnifiedWorkoutSession> {
    run_conversion(WorkoutFormat::Strength, FIELDS_MODIFIED, |log| {
        convert(record, options, log)
    })
}

fn convert(
    record: &Value,
    options: &ConvertOptions,
    log: &mut ConversionLog,
) -> Result<UnifiedWorkoutSession> {
    let template = StrengthTemplate::deserialize(record)?;
    let id = session_id(&template.common, options);

    let mut blocks = Vec::with_capacity(template.exercises.len() * 2);
    let mut equipment = BTreeSet::new();

    for (i, exercise) in template.exercises.iter().enumerate() {
        if i > 0 && template.rest_between_exercises > 0 {
            blocks.push(WorkoutBlock::Rest(RestBlock {
                id: block_id(&id, "rest", i - 1),
                duration: template.rest_between_exercises,
                message: Some("Rest before next exercise".into()),
            }));
        }

        equipment.extend(exercise.equipment.iter().cloned());

        let entry = block_exercise(exercise);
        blocks.push(WorkoutBlock::Exercise(ExerciseBlock {
            id: block_id(&id, "exercise", i),
            name: Some(entry.name.clone()),
            exercises: vec![entry],
            duration: None,
        }));
    }

    let difficulty = difficulty(&template.common, log).unwrap_or_default();
    let metadata = standard_metadata(&template.common, options, "strength", equipment, log);

    let mut content = WorkoutContent {
        blocks,
        warmup: template.common.warmup.clone(),
        cooldown: template.common.cooldown.clone(),
        total_duration: 0,
        estimated_calories: template.common.estimated_calories,
        difficulty,
        target_muscle_groups: non_empty(&template.target_muscle_groups),
        target_systems: None,
        interval_settings: None,
        focus_areas: None,
        equipment: None,
    };
    content.total_duration = content.block_duration_sum(options.seconds_per_set);

    Ok(UnifiedWorkoutSession {
        id,
        version: UNIFIED_SCHEMA_VERSION.into(),
        workout_type: WorkoutType::Strength,
        name: template.common.name.clone(),
        description: template.common.description.clone().unwrap_or_default(),
        content,
        metadata,
        assignments: assignments(&template.common),
    })
}
