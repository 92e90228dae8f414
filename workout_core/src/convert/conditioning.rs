//! Conditioning program → unified session.
//!
//! Work intervals become interval blocks. A `restAfter` on an interval, or
//! an interval typed `rest`, becomes a rest block at the same position.

use super::{
    assignments, difficulty, non_empty, run_conversion, session_id, standard_metadata,
    ConversionLog, ConvertOptions,
};
use crate::ids::block_id;
use crate::legacy::ConditioningProgram;
use crate::{
    Difficulty, IntervalBlock, IntervalSettings, MigrationResult, MigrationWarning, RestBlock,
    Result, UnifiedWorkoutSession, WorkoutBlock, WorkoutContent, WorkoutFormat, WorkoutType,
    UNIFIED_SCHEMA_VERSION,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

const FIELDS_MODIFIED: &[&str] = &[
    "structure",
    "metadata",
    "content.blocks",
    "content.difficulty",
    "content.intervalSettings",
];

pub fn migrate_conditioning_workout(
    record: &Value,
    options: &ConvertOptions,
) -> MigrationResult<UnifiedWorkoutSession> {
    run_conversion(WorkoutFormat::Conditioning, FIELDS_MODIFIED, |log| {
        convert(record, options, log)
    })
}

fn convert(
    record: &Value,
    options: &ConvertOptions,
    log: &mut ConversionLog,
) -> Result<UnifiedWorkoutSession> {
    let program = ConditioningProgram::deserialize(record)?;
    let id = session_id(&program.common, options);
    let default_equipment = program.equipment.primary().map(str::to_string);

    let mut blocks = Vec::with_capacity(program.intervals.len() * 2);
    let mut equipment: BTreeSet<String> = program.equipment.to_vec().into_iter().collect();
    let mut work_intensities = Vec::new();
    let mut work_seconds: u32 = 0;
    let mut rest_seconds: u32 = 0;

    for (i, interval) in program.intervals.iter().enumerate() {
        if interval.is_rest() {
            rest_seconds = rest_seconds.saturating_add(interval.duration);
            blocks.push(WorkoutBlock::Rest(RestBlock {
                id: interval.id.clone().unwrap_or_else(|| block_id(&id, "rest", i)),
                duration: interval.duration,
                message: interval.notes.clone().or_else(|| interval.name.clone()),
            }));
        } else {
            let intensity = clamp_intensity(interval.intensity, i, log);
            work_intensities.push(intensity);
            work_seconds = work_seconds.saturating_add(interval.duration);

            if let Some(e) = &interval.equipment {
                equipment.insert(e.clone());
            }

            blocks.push(WorkoutBlock::Interval(IntervalBlock {
                id: interval
                    .id
                    .clone()
                    .unwrap_or_else(|| block_id(&id, "interval", i)),
                name: interval.name.clone(),
                duration: interval.duration,
                intensity,
                target_metrics: interval.target_metrics.clone().unwrap_or_default(),
                equipment: interval
                    .equipment
                    .clone()
                    .or_else(|| default_equipment.clone()),
                notes: interval.notes.clone(),
            }));
        }

        if let Some(rest) = interval.rest_after.filter(|r| *r > 0) {
            rest_seconds = rest_seconds.saturating_add(rest);
            blocks.push(WorkoutBlock::Rest(RestBlock {
                id: block_id(&id, "rest-after", i),
                duration: rest,
                message: None,
            }));
        }
    }

    let difficulty = match program.average_intensity {
        Some(avg) => Difficulty::from_intensity(avg),
        None => difficulty(&program.common, log)
            .or_else(|| mean(&work_intensities).map(Difficulty::from_intensity))
            .unwrap_or_default(),
    };

    let mut metadata = standard_metadata(
        &program.common,
        options,
        "conditioning",
        equipment.clone(),
        log,
    );
    metadata.test_requirements = program
        .test_based_targets
        .as_ref()
        .map(|targets| targets.keys().cloned().collect());

    let content = WorkoutContent {
        blocks,
        warmup: program.common.warmup.clone(),
        cooldown: program.common.cooldown.clone(),
        total_duration: program.total_duration,
        estimated_calories: program.common.estimated_calories,
        difficulty,
        target_muscle_groups: None,
        target_systems: non_empty(&program.target_systems),
        interval_settings: Some(IntervalSettings {
            total_intervals: work_intensities.len() as u32,
            work_seconds,
            rest_seconds,
            average_intensity: program.average_intensity,
        }),
        focus_areas: None,
        equipment: Some(equipment.into_iter().collect()),
    };

    Ok(UnifiedWorkoutSession {
        id,
        version: UNIFIED_SCHEMA_VERSION.into(),
        workout_type: WorkoutType::Conditioning,
        name: program.common.name.clone(),
        description: program.common.description.clone().unwrap_or_default(),
        content,
        metadata,
        assignments: assignments(&program.common),
    })
}

fn clamp_intensity(intensity: f64, index: usize, log: &mut ConversionLog) -> f64 {
    if (0.0..=100.0).contains(&intensity) {
        return intensity;
    }

    log.warn(
        MigrationWarning::new(format!("Interval intensity {} outside 0-100", intensity))
            .with_field(format!("intervals[{}].intensity", index))
            .with_suggestion("Clamped to the 0-100 scale"),
    );
    intensity.clamp(0.0, 100.0)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
