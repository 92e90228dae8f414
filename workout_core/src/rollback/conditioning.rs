//! Unified session → conditioning program.

use super::{drop_block, legacy_common, session_equipment};
use crate::convert::ConversionLog;
use crate::legacy::{ConditioningInterval, ConditioningProgram, EquipmentSpec, LegacyWorkout};
use crate::{TargetMetrics, UnifiedWorkoutSession, WorkoutBlock, WorkoutFormat};
use serde_json::Value;
use std::collections::BTreeMap;

pub(crate) const FIELDS_MODIFIED: &[&str] = &["structure", "intervals", "equipment"];

pub(crate) fn rollback_conditioning(
    session: &UnifiedWorkoutSession,
    log: &mut ConversionLog,
) -> LegacyWorkout {
    let common = legacy_common(session, log);
    let content = &session.content;

    let mut intervals: Vec<ConditioningInterval> = Vec::new();
    let mut folded_rests = 0;

    for (i, block) in content.blocks.iter().enumerate() {
        match block {
            WorkoutBlock::Interval(b) => intervals.push(ConditioningInterval {
                id: Some(b.id.clone()),
                name: b.name.clone(),
                interval_type: Some("work".into()),
                duration: b.duration,
                intensity: b.intensity,
                target_metrics: (b.target_metrics != TargetMetrics::default())
                    .then(|| b.target_metrics.clone()),
                equipment: b.equipment.clone(),
                notes: b.notes.clone(),
                rest_after: None,
            }),
            WorkoutBlock::Rest(b) => {
                // A rest directly after a work interval folds back into its restAfter
                match intervals.last_mut() {
                    Some(prev) if !prev.is_rest() && prev.rest_after.is_none() => {
                        prev.rest_after = Some(b.duration);
                        folded_rests += 1;
                    }
                    _ => intervals.push(ConditioningInterval {
                        id: Some(b.id.clone()),
                        name: None,
                        interval_type: Some("rest".into()),
                        duration: b.duration,
                        intensity: 0.0,
                        target_metrics: None,
                        equipment: None,
                        notes: b.message.clone(),
                        rest_after: None,
                    }),
                }
            }
            WorkoutBlock::Exercise(_) | WorkoutBlock::Transition(_) | WorkoutBlock::Agility(_) => {
                drop_block(block, i, WorkoutFormat::Conditioning, log)
            }
        }
    }
    log.report.reconstructed("intervals");
    if folded_rests > 0 {
        log.report.dropped(
            "content.blocks[rest].id",
            "ids of rests folded into restAfter are not kept",
        );
    }

    let equipment = session_equipment(session);
    let equipment = match equipment.len() {
        0 => {
            log.report
                .defaulted("equipment", "no equipment recorded; defaulted to 'none'");
            EquipmentSpec::One("none".into())
        }
        1 => {
            log.report.reconstructed("equipment");
            EquipmentSpec::One(equipment[0].clone())
        }
        _ => {
            log.report.reconstructed("equipment");
            EquipmentSpec::Many(equipment)
        }
    };

    let average_intensity = content
        .interval_settings
        .as_ref()
        .and_then(|s| s.average_intensity);

    let test_based_targets: Option<BTreeMap<String, Value>> =
        session.metadata.test_requirements.as_ref().map(|keys| {
            log.report.defaulted(
                "testBasedTargets",
                "target names restored; target values were not carried",
            );
            keys.iter().map(|k| (k.clone(), Value::Null)).collect()
        });

    log.report.reconstructed("totalDuration");
    log.data_loss = true;

    LegacyWorkout::Conditioning(ConditioningProgram {
        common,
        intervals,
        equipment,
        total_duration: content.total_duration,
        average_intensity,
        target_systems: content.target_systems.clone().unwrap_or_default(),
        test_based_targets,
    })
}

#[cfg(test)]
mod tests {
    use crate::convert::{migrate_conditioning_workout, migrate_hybrid_workout, ConvertOptions};
    use crate::legacy::{EquipmentSpec, LegacyWorkout};
    use crate::rollback::rollback;
    use crate::WorkoutFormat;
    use serde_json::json;

    #[test]
    fn test_rest_after_is_restored() {
        let record = json!({
            "name": "Rower Intervals",
            "equipment": "rower",
            "totalDuration": 1800,
            "averageIntensity": 80,
            "intervals": [
                { "id": "i1", "duration": 600, "intensity": 80, "restAfter": 300 },
                { "id": "i2", "duration": 600, "intensity": 85 }
            ],
            "testBasedTargets": { "ftp": 240 }
        });
        let session = migrate_conditioning_workout(&record, &ConvertOptions::default())
            .data
            .unwrap();

        let result = rollback(&session, WorkoutFormat::Conditioning);
        assert!(result.success);
        assert!(result.metadata.data_loss);

        let LegacyWorkout::Conditioning(program) = result.data.unwrap() else {
            panic!("Expected conditioning program");
        };
        assert_eq!(program.intervals.len(), 2);
        assert_eq!(program.intervals[0].rest_after, Some(300));
        assert_eq!(program.intervals[1].id.as_deref(), Some("i2"));
        assert_eq!(program.total_duration, 1800);
        assert_eq!(program.average_intensity, Some(80.0));
        assert_eq!(program.equipment, EquipmentSpec::One("rower".into()));
        assert!(program.test_based_targets.unwrap().contains_key("ftp"));
    }

    #[test]
    fn test_leading_rest_stays_a_rest_interval() {
        let record = json!({
            "blocks": [
                { "id": "r", "type": "rest", "duration": 60 },
                { "id": "w", "type": "interval", "duration": 120, "intensity": 60 }
            ]
        });
        let session = migrate_hybrid_workout(&record, &ConvertOptions::default())
            .data
            .unwrap();

        let LegacyWorkout::Conditioning(program) =
            rollback(&session, WorkoutFormat::Conditioning).data.unwrap()
        else {
            panic!("Expected conditioning program");
        };
        assert!(program.intervals[0].is_rest());
        assert_eq!(program.equipment, EquipmentSpec::One("none".into()));
    }
}
