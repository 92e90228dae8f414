//! Unified session → strength template.

use super::{drop_block, legacy_common, legacy_exercise};
use crate::convert::ConversionLog;
use crate::legacy::{LegacyWorkout, StrengthTemplate};
use crate::{MigrationWarning, UnifiedWorkoutSession, WorkoutBlock, WorkoutFormat};

pub(crate) const FIELDS_MODIFIED: &[&str] = &["structure", "exercises", "restBetweenExercises"];

pub(crate) fn rollback_strength(
    session: &UnifiedWorkoutSession,
    log: &mut ConversionLog,
) -> LegacyWorkout {
    let common = legacy_common(session, log);
    let content = &session.content;

    let mut exercises = Vec::new();
    let mut rests: Vec<u32> = Vec::new();

    for (i, block) in content.blocks.iter().enumerate() {
        match block {
            WorkoutBlock::Exercise(b) => {
                if b.duration.is_some() {
                    log.report.dropped(
                        format!("content.blocks[{}].duration", i),
                        "strength exercises carry no block duration",
                    );
                }
                exercises.extend(b.exercises.iter().map(legacy_exercise));
            }
            WorkoutBlock::Rest(b) => rests.push(b.duration),
            WorkoutBlock::Interval(_) | WorkoutBlock::Transition(_) | WorkoutBlock::Agility(_) => {
                drop_block(block, i, WorkoutFormat::Strength, log)
            }
        }
    }

    log.report.reconstructed("exercises");

    let rest_between_exercises = match rests.first() {
        Some(first) => {
            if rests.iter().any(|r| r != first) {
                log.warn(
                    MigrationWarning::new("Rest blocks have differing durations")
                        .with_field("restBetweenExercises")
                        .with_suggestion("Collapsed to the first rest duration"),
                );
                log.report.defaulted(
                    "restBetweenExercises",
                    "differing rest durations collapsed to the first",
                );
            } else {
                log.report.reconstructed("restBetweenExercises");
            }
            *first
        }
        None => {
            log.report
                .defaulted("restBetweenExercises", "no rest blocks; defaulted to 0");
            0
        }
    };

    log.report.dropped(
        "content.totalDuration",
        "strength templates derive duration from sets",
    );
    if content.interval_settings.is_some() {
        log.report
            .dropped("content.intervalSettings", "not carried by strength templates");
    }
    if content.focus_areas.is_some() {
        log.report
            .dropped("content.focusAreas", "not carried by strength templates");
    }
    log.data_loss = true;

    LegacyWorkout::Strength(StrengthTemplate {
        common,
        exercises,
        rest_between_exercises,
        target_muscle_groups: content.target_muscle_groups.clone().unwrap_or_default(),
    })
}
