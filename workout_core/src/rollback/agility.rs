//! Unified session → agility program.
//!
//! Original phase grouping is unrecoverable, so every drill lands in a
//! single phase named "Main Phase".

use super::{drop_block, legacy_common, session_equipment};
use crate::convert::ConversionLog;
use crate::legacy::{AgilityDrill, AgilityPhase, AgilityProgram, LegacyWorkout};
use crate::{MigrationWarning, UnifiedWorkoutSession, WorkoutBlock, WorkoutFormat};

pub(crate) const FIELDS_MODIFIED: &[&str] = &["structure", "phases"];

const MAIN_PHASE: &str = "Main Phase";

pub(crate) fn rollback_agility(
    session: &UnifiedWorkoutSession,
    log: &mut ConversionLog,
) -> LegacyWorkout {
    let common = legacy_common(session, log);
    let content = &session.content;

    let mut drills: Vec<AgilityDrill> = Vec::new();
    for (i, block) in content.blocks.iter().enumerate() {
        match block {
            WorkoutBlock::Agility(b) => drills.push(AgilityDrill {
                id: b.drill_id.clone(),
                name: b.drill_name.clone(),
                pattern: b.pattern.clone(),
                duration: Some(b.duration),
                sets: b.sets,
                rest_after: None,
                equipment: b.equipment.clone(),
                instructions: b.instructions.clone(),
                target_time: b.metrics.target_time,
                track_time: Some(b.metrics.track_time),
                track_errors: Some(b.metrics.track_errors),
            }),
            WorkoutBlock::Rest(b) => match drills.last_mut() {
                Some(prev) => {
                    let total = prev.rest_after.unwrap_or(0).saturating_add(b.duration);
                    prev.rest_after = Some(total);
                }
                None => drop_block(block, i, WorkoutFormat::Agility, log),
            },
            WorkoutBlock::Exercise(_) | WorkoutBlock::Interval(_) | WorkoutBlock::Transition(_) => {
                drop_block(block, i, WorkoutFormat::Agility, log)
            }
        }
    }

    log.warn(
        MigrationWarning::new("Original phase grouping cannot be recovered")
            .with_field("phases")
            .with_suggestion(format!("All drills placed in a single '{}'", MAIN_PHASE)),
    );
    log.report.defaulted("phases", "single phase named 'Main Phase'");
    log.report.reconstructed("phases[0].drills");
    log.data_loss = true;

    LegacyWorkout::Agility(AgilityProgram {
        common,
        phases: vec![AgilityPhase {
            name: MAIN_PHASE.into(),
            phase_type: Some("main".into()),
            drills,
            rest_after: None,
        }],
        total_duration: Some(content.total_duration),
        focus_areas: content.focus_areas.clone().unwrap_or_default(),
        equipment: session_equipment(session),
    })
}
