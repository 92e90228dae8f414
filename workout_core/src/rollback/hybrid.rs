//! Unified session → hybrid program.
//!
//! Hybrid is the closest legacy shape to the unified model: every block
//! except agility drills maps back 1:1 with its id and type.

use super::{drop_block, legacy_common, legacy_exercise, session_equipment};
use crate::convert::ConversionLog;
use crate::legacy::{HybridBlock, HybridExerciseBlock, HybridProgram, LegacyWorkout};
use crate::{UnifiedWorkoutSession, WorkoutBlock, WorkoutFormat};

pub(crate) const FIELDS_MODIFIED: &[&str] = &["structure", "blocks"];

pub(crate) fn rollback_hybrid(
    session: &UnifiedWorkoutSession,
    log: &mut ConversionLog,
) -> LegacyWorkout {
    let common = legacy_common(session, log);
    let content = &session.content;

    let mut blocks = Vec::with_capacity(content.blocks.len());
    for (i, block) in content.blocks.iter().enumerate() {
        match block {
            WorkoutBlock::Exercise(b) => blocks.push(HybridBlock::Exercise(HybridExerciseBlock {
                id: b.id.clone(),
                name: b.name.clone(),
                exercises: b.exercises.iter().map(legacy_exercise).collect(),
                duration: b.duration,
            })),
            WorkoutBlock::Interval(b) => blocks.push(HybridBlock::Interval(b.clone())),
            WorkoutBlock::Transition(b) => blocks.push(HybridBlock::Transition(b.clone())),
            WorkoutBlock::Rest(b) => blocks.push(HybridBlock::Rest(b.clone())),
            WorkoutBlock::Agility(_) => drop_block(block, i, WorkoutFormat::Hybrid, log),
        }
    }
    log.report.reconstructed("blocks");
    log.report.reconstructed("totalDuration");

    LegacyWorkout::Hybrid(HybridProgram {
        common,
        blocks,
        total_duration: Some(content.total_duration),
        equipment: session_equipment(session),
    })
}

#[cfg(test)]
mod tests {
    use crate::convert::{migrate_agility_workout, ConvertOptions};
    use crate::legacy::LegacyWorkout;
    use crate::rollback::rollback;
    use crate::WorkoutFormat;
    use serde_json::json;

    #[test]
    fn test_agility_blocks_dropped_from_hybrid() {
        let record = json!({
            "phases": [{
                "name": "Main",
                "drills": [{ "id": "d1", "name": "Shuttle", "duration": 60, "restAfter": 30 }]
            }]
        });
        let session = migrate_agility_workout(&record, &ConvertOptions::default())
            .data
            .unwrap();

        let result = rollback(&session, WorkoutFormat::Hybrid);
        assert!(result.success);
        assert!(result.metadata.data_loss);
        assert_eq!(result.warnings.len(), 1);

        let LegacyWorkout::Hybrid(program) = result.data.unwrap() else {
            panic!("Expected hybrid program");
        };
        assert_eq!(program.blocks.len(), 1);
        assert_eq!(program.total_duration, Some(90));
    }
}
