//! Agility program → unified session.
//!
//! The phase → drill hierarchy is flattened into one ordered block list.
//! Phase boundaries are not represented in the unified model. The result
//! still reports `dataLoss: false` since no field value is lost, only the
//! grouping; the flattening is recorded in the data-loss report instead.

use super::{
    assignments, difficulty, non_empty, run_conversion, session_id, standard_metadata,
    ConversionLog, ConvertOptions,
};
use crate::ids::block_id;
use crate::legacy::{AgilityDrill, AgilityProgram};
use crate::{
    AgilityBlock, AgilityMetrics, MigrationResult, MigrationWarning, RestBlock, Result,
    UnifiedWorkoutSession, WorkoutBlock, WorkoutContent, WorkoutFormat, WorkoutType,
    UNIFIED_SCHEMA_VERSION,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

const FIELDS_MODIFIED: &[&str] = &["structure", "metadata", "content.blocks", "phases"];

pub fn migrate_agility_workout(
    record: &Value,
    options: &ConvertOptions,
) -> MigrationResult<UnifiedWorkoutSession> {
    run_conversion(WorkoutFormat::Agility, FIELDS_MODIFIED, |log| {
        convert(record, options, log)
    })
}

fn convert(
    record: &Value,
    options: &ConvertOptions,
    log: &mut ConversionLog,
) -> Result<UnifiedWorkoutSession> {
    let program = AgilityProgram::deserialize(record)?;
    let id = session_id(&program.common, options);

    let mut blocks = Vec::new();
    let mut equipment: BTreeSet<String> = program.equipment.iter().cloned().collect();
    let last_phase = program.phases.len().saturating_sub(1);

    for (p, phase) in program.phases.iter().enumerate() {
        for (d, drill) in phase.drills.iter().enumerate() {
            equipment.extend(drill.equipment.iter().cloned());

            let duration = drill.duration.unwrap_or_else(|| {
                log.warn(
                    MigrationWarning::new(format!("Drill '{}' has no duration", drill.name))
                        .with_field(format!("phases[{}].drills[{}].duration", p, d))
                        .with_suggestion("Defaulted to 0 seconds"),
                );
                0
            });

            let index = blocks.len();
            blocks.push(WorkoutBlock::Agility(agility_block(
                block_id(&id, "agility", index),
                drill,
                duration,
            )));

            if let Some(rest) = drill.rest_after.filter(|r| *r > 0) {
                let index = blocks.len();
                blocks.push(WorkoutBlock::Rest(RestBlock {
                    id: block_id(&id, "rest", index),
                    duration: rest,
                    message: None,
                }));
            }
        }

        let phase_rest = phase.rest_after.filter(|r| *r > 0);
        if let Some(rest) = phase_rest {
            if p != last_phase && !phase.drills.is_empty() {
                let index = blocks.len();
                blocks.push(WorkoutBlock::Rest(RestBlock {
                    id: block_id(&id, "rest", index),
                    duration: rest,
                    message: Some(format!("Rest after {}", phase_label(&phase.name, p))),
                }));
            }
        }
    }

    if program.phases.len() > 1 {
        log.report.dropped(
            "phases",
            "phase grouping flattened into a single block sequence",
        );
    }

    let difficulty = difficulty(&program.common, log).unwrap_or_default();
    let metadata = standard_metadata(
        &program.common,
        options,
        "agility",
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
        focus_areas: non_empty(&program.focus_areas),
        equipment: (!equipment.is_empty()).then(|| equipment.into_iter().collect()),
    };
    content.total_duration = program
        .total_duration
        .unwrap_or_else(|| content.block_duration_sum(options.seconds_per_set));

    Ok(UnifiedWorkoutSession {
        id,
        version: UNIFIED_SCHEMA_VERSION.into(),
        workout_type: WorkoutType::Agility,
        name: program.common.name.clone(),
        description: program.common.description.clone().unwrap_or_default(),
        content,
        metadata,
        assignments: assignments(&program.common),
    })
}

fn agility_block(id: String, drill: &AgilityDrill, duration: u32) -> AgilityBlock {
    AgilityBlock {
        id,
        drill_id: drill.id.clone(),
        drill_name: drill.name.clone(),
        pattern: drill.pattern.clone(),
        duration,
        sets: drill.sets,
        equipment: drill.equipment.clone(),
        instructions: drill.instructions.clone(),
        metrics: AgilityMetrics {
            track_time: drill.track_time.unwrap_or(true),
            track_errors: drill.track_errors.unwrap_or(false),
            target_time: drill.target_time,
        },
    }
}

fn phase_label(name: &str, index: usize) -> String {
    if name.is_empty() {
        format!("phase {}", index + 1)
    } else {
        name.to_string()
    }
}
