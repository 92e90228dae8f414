//! Best-effort rollback of unified sessions into legacy shapes.
//!
//! Rollback never guesses at information the unified model does not carry.
//! Every result includes a per-field [`DataLossReport`](crate::DataLossReport)
//! stating whether each field was reconstructed, defaulted or dropped. The
//! `dataLoss` flag covers workout content; metadata-only losses appear in
//! the report alone.

pub mod agility;
pub mod conditioning;
pub mod hybrid;
pub mod strength;

use crate::convert::ConversionLog;
use crate::legacy::{LegacyCommon, LegacyWorkout, SetsSpec, StrengthExercise};
use crate::{
    BlockExercise, MigrationError, MigrationErrorCode, MigrationMetadata, MigrationResult,
    MigrationWarning, UnifiedWorkoutSession, WorkoutBlock, WorkoutFormat, WorkoutType,
    UNIFIED_SCHEMA_VERSION,
};
use serde::Deserialize;
use serde_json::Value;

/// Roll a unified session back into `target`
pub fn rollback(
    session: &UnifiedWorkoutSession,
    target: WorkoutFormat,
) -> MigrationResult<LegacyWorkout> {
    let metadata = MigrationMetadata::new(WorkoutFormat::Unified, target);

    let Some(legacy_type) = target.legacy_type() else {
        return MigrationResult::failed(
            MigrationError::new(
                MigrationErrorCode::RollbackError,
                format!("Cannot roll back to '{}': not a legacy format", target),
            ),
            Vec::new(),
            metadata,
        );
    };

    if session.version != UNIFIED_SCHEMA_VERSION {
        return MigrationResult::failed(
            MigrationError::new(
                MigrationErrorCode::RollbackError,
                format!(
                    "Unsupported schema version '{}' (expected {})",
                    session.version, UNIFIED_SCHEMA_VERSION
                ),
            )
            .with_field("version"),
            Vec::new(),
            metadata,
        );
    }

    let mut log = ConversionLog::default();
    let (workout, fields_modified) = match legacy_type {
        WorkoutType::Strength => (
            strength::rollback_strength(session, &mut log),
            strength::FIELDS_MODIFIED,
        ),
        WorkoutType::Conditioning => (
            conditioning::rollback_conditioning(session, &mut log),
            conditioning::FIELDS_MODIFIED,
        ),
        WorkoutType::Hybrid => (
            hybrid::rollback_hybrid(session, &mut log),
            hybrid::FIELDS_MODIFIED,
        ),
        WorkoutType::Agility => (
            agility::rollback_agility(session, &mut log),
            agility::FIELDS_MODIFIED,
        ),
    };

    tracing::info!(
        "Rolled back session {} to {} ({} warnings)",
        session.id,
        workout.format(),
        log.warnings.len()
    );

    let mut metadata = metadata.with_fields_modified(fields_modified);
    metadata.data_loss = log.data_loss;
    metadata.data_loss_report = log.report;
    MigrationResult::succeeded(workout, log.warnings, metadata)
}

/// Parse a JSON value as a unified session and roll it back
pub fn rollback_value(value: &Value, target: WorkoutFormat) -> MigrationResult<LegacyWorkout> {
    match UnifiedWorkoutSession::deserialize(value) {
        Ok(session) => rollback(&session, target),
        Err(e) => {
            tracing::warn!("Rollback input is not a unified session: {}", e);
            MigrationResult::failed(
                MigrationError::new(
                    MigrationErrorCode::RollbackOperationError,
                    format!("Failed to read unified session: {}", e),
                ),
                Vec::new(),
                MigrationMetadata::new(WorkoutFormat::Unified, target),
            )
        }
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Rebuild the common legacy header, recording what the legacy shape cannot hold
pub(crate) fn legacy_common(
    session: &UnifiedWorkoutSession,
    log: &mut ConversionLog,
) -> LegacyCommon {
    let metadata = &session.metadata;
    let content = &session.content;
    let assignments = session.assignments.clone().unwrap_or_default();

    for field in ["id", "name", "metadata.tags", "metadata.createdBy", "metadata.createdAt"] {
        log.report.reconstructed(field);
    }
    log.report
        .dropped("metadata.permissions", "legacy shapes carry no permissions");
    log.report
        .dropped("metadata.visibility", "legacy shapes carry no visibility");
    log.report
        .dropped("metadata.language", "legacy shapes carry no language");
    log.report
        .dropped("metadata.version", "revision counter has no legacy equivalent");
    if metadata.target_audience.is_some() {
        log.report
            .dropped("metadata.targetAudience", "legacy shapes carry no audience");
    }
    if assignments.start_date.is_some()
        || assignments.end_date.is_some()
        || assignments.recurrence.is_some()
    {
        log.report
            .dropped("assignments.schedule", "legacy shapes carry no schedule");
    }

    LegacyCommon {
        id: Some(session.id.clone()),
        name: session.name.clone(),
        description: (!session.description.is_empty()).then(|| session.description.clone()),
        tags: metadata.tags.iter().cloned().collect(),
        category: Some(metadata.category.clone()),
        difficulty: Some(content.difficulty.as_str().to_string()),
        estimated_calories: content.estimated_calories,
        created_by: Some(metadata.created_by.clone()),
        created_at: Some(metadata.created_at.to_rfc3339()),
        updated_at: Some(metadata.last_modified_at.to_rfc3339()),
        is_template: Some(metadata.is_template),
        assigned_player_ids: assignments.player_ids,
        assigned_team_ids: assignments.team_ids,
        warmup: content.warmup.clone(),
        cooldown: content.cooldown.clone(),
    }
}

pub(crate) fn legacy_exercise(exercise: &BlockExercise) -> StrengthExercise {
    StrengthExercise {
        exercise_id: exercise.exercise_id.clone(),
        name: exercise.name.clone(),
        sets: SetsSpec::List(exercise.sets.clone()),
        reps: None,
        weight: None,
        rest_between_sets: exercise.rest_between_sets,
        instructions: exercise.instructions.clone(),
        equipment: exercise.equipment.clone(),
    }
}

/// Record a block the target shape cannot represent
pub(crate) fn drop_block(
    block: &WorkoutBlock,
    index: usize,
    target: WorkoutFormat,
    log: &mut ConversionLog,
) {
    log.warn(
        MigrationWarning::new(format!(
            "{} block '{}' cannot be represented in {} format",
            block.type_name(),
            block.id(),
            target
        ))
        .with_field(format!("content.blocks[{}]", index))
        .with_suggestion("Block was dropped"),
    );
    log.report.dropped(
        format!("content.blocks[{}]", index),
        "block type not supported by target format",
    );
    log.data_loss = true;
}

/// Equipment list for the rolled-back record, content first then metadata
pub(crate) fn session_equipment(session: &UnifiedWorkoutSession) -> Vec<String> {
    match &session.content.equipment {
        Some(list) if !list.is_empty() => list.clone(),
        _ => session.metadata.equipment.iter().cloned().collect(),
    }
}
