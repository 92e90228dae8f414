//! Forward conversion of legacy workout records into the unified schema.
//!
//! Each converter wraps its work in a failure boundary: parse or conversion
//! errors become a failed [`MigrationResult`] with a `MIGRATION_ERROR`, so
//! converters never return `Err` to the caller.

pub mod agility;
pub mod conditioning;
pub mod hybrid;
pub mod strength;

pub use agility::migrate_agility_workout;
pub use conditioning::migrate_conditioning_workout;
pub use hybrid::migrate_hybrid_workout;
pub use strength::migrate_strength_workout;

use crate::config::Config;
use crate::legacy::{LegacyCommon, StrengthExercise};
use crate::{
    BlockExercise, DataLossReport, Difficulty, MigrationError, MigrationErrorCode,
    MigrationMetadata, MigrationResult, MigrationWarning, Permissions, Result, StandardMetadata,
    UnifiedWorkoutSession, Visibility, WorkoutAssignments, WorkoutFormat,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Tunables for a single conversion
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// Assumed working time per set when estimating exercise block duration
    pub seconds_per_set: u32,
    /// Author recorded when the source does not name one
    pub created_by: String,
    pub language: String,
    /// Keep the source `id` when present; mint a fresh one otherwise
    pub preserve_ids: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            seconds_per_set: 60,
            created_by: "migration".into(),
            language: "en".into(),
            preserve_ids: true,
        }
    }
}

impl ConvertOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            seconds_per_set: config.conversion.seconds_per_set,
            created_by: config.conversion.created_by.clone(),
            language: config.conversion.language.clone(),
            preserve_ids: config.conversion.preserve_ids,
        }
    }
}

/// Warnings and loss bookkeeping accumulated while converting one record
#[derive(Debug, Default)]
pub(crate) struct ConversionLog {
    pub warnings: Vec<MigrationWarning>,
    pub report: DataLossReport,
    pub data_loss: bool,
}

impl ConversionLog {
    pub fn warn(&mut self, warning: MigrationWarning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }
}

/// Run a forward conversion inside the failure boundary
pub(crate) fn run_conversion<F>(
    format: WorkoutFormat,
    fields_modified: &[&str],
    convert: F,
) -> MigrationResult<UnifiedWorkoutSession>
where
    F: FnOnce(&mut ConversionLog) -> Result<UnifiedWorkoutSession>,
{
    let mut metadata =
        MigrationMetadata::new(format, WorkoutFormat::Unified).with_fields_modified(fields_modified);
    let mut log = ConversionLog::default();

    match convert(&mut log) {
        Ok(session) => {
            tracing::debug!(
                "Migrated {} workout {} ({} blocks)",
                format,
                session.id,
                session.content.blocks.len()
            );
            metadata.data_loss = log.data_loss;
            metadata.data_loss_report = log.report;
            MigrationResult::succeeded(session, log.warnings, metadata)
        }
        Err(e) => {
            tracing::warn!("Failed to migrate {} workout: {}", format, e);
            let error = MigrationError::new(
                MigrationErrorCode::MigrationError,
                format!("Failed to migrate {} workout: {}", format, e),
            );
            MigrationResult::failed(error, log.warnings, metadata)
        }
    }
}

/// Migrate a record whose format is already known
pub fn migrate_record(
    record: &Value,
    format: WorkoutFormat,
    options: &ConvertOptions,
) -> MigrationResult<UnifiedWorkoutSession> {
    match format {
        WorkoutFormat::Strength => migrate_strength_workout(record, options),
        WorkoutFormat::Conditioning => migrate_conditioning_workout(record, options),
        WorkoutFormat::Hybrid => migrate_hybrid_workout(record, options),
        WorkoutFormat::Agility => migrate_agility_workout(record, options),
        WorkoutFormat::Unified => already_unified(record),
        WorkoutFormat::Unknown => unknown_format(),
    }
}

/// Result for a record that did not match any known shape
pub fn unknown_format() -> MigrationResult<UnifiedWorkoutSession> {
    MigrationResult::failed(
        MigrationError::new(
            MigrationErrorCode::UnknownFormat,
            "Record does not match any known workout format",
        ),
        Vec::new(),
        MigrationMetadata::new(WorkoutFormat::Unknown, WorkoutFormat::Unified),
    )
}

/// No-op success for a record already in the unified schema
pub fn already_unified(record: &Value) -> MigrationResult<UnifiedWorkoutSession> {
    let metadata = MigrationMetadata::new(WorkoutFormat::Unified, WorkoutFormat::Unified);

    match UnifiedWorkoutSession::deserialize(record) {
        Ok(session) => MigrationResult::succeeded(session, Vec::new(), metadata),
        Err(e) => MigrationResult {
            success: true,
            data: None,
            errors: Vec::new(),
            warnings: vec![MigrationWarning::new(format!(
                "Record is already unified but could not be parsed: {}",
                e
            ))
            .with_suggestion("Payload passed through without re-parsing")],
            metadata,
        },
    }
}

// ============================================================================
// Shared mapping helpers
// ============================================================================

pub(crate) fn session_id(common: &LegacyCommon, options: &ConvertOptions) -> String {
    match &common.id {
        Some(id) if options.preserve_ids && !id.is_empty() => id.clone(),
        _ => crate::ids::generate_id("workout"),
    }
}

pub(crate) fn block_exercise(exercise: &StrengthExercise) -> BlockExercise {
    BlockExercise {
        exercise_id: exercise.exercise_id.clone(),
        name: if exercise.name.is_empty() {
            exercise.exercise_id.clone()
        } else {
            exercise.name.clone()
        },
        sets: exercise.sets.to_sets(exercise.reps, exercise.weight),
        rest_between_sets: exercise.rest_between_sets,
        instructions: exercise.instructions.clone(),
        equipment: exercise.equipment.clone(),
    }
}

pub(crate) fn difficulty(common: &LegacyCommon, log: &mut ConversionLog) -> Option<Difficulty> {
    let label = common.difficulty.as_deref()?;
    let parsed = Difficulty::parse(label);
    if parsed.is_none() {
        log.warn(
            MigrationWarning::new(format!("Unrecognized difficulty '{}'", label))
                .with_field("difficulty")
                .with_suggestion("Defaulted to intermediate"),
        );
    }
    parsed
}

fn parse_timestamp(
    raw: Option<&str>,
    field: &str,
    fallback: DateTime<Utc>,
    log: &mut ConversionLog,
) -> DateTime<Utc> {
    let Some(raw) = raw else {
        return fallback;
    };

    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            log.warn(
                MigrationWarning::new(format!("Invalid timestamp '{}': {}", raw, e))
                    .with_field(field)
                    .with_suggestion("Replaced with migration time"),
            );
            fallback
        }
    }
}

pub(crate) fn standard_metadata(
    common: &LegacyCommon,
    options: &ConvertOptions,
    category: &str,
    equipment: BTreeSet<String>,
    log: &mut ConversionLog,
) -> StandardMetadata {
    let now = Utc::now();
    let created_at = parse_timestamp(common.created_at.as_deref(), "createdAt", now, log);
    let last_modified_at =
        parse_timestamp(common.updated_at.as_deref(), "updatedAt", created_at, log);
    let created_by = common
        .created_by
        .clone()
        .unwrap_or_else(|| options.created_by.clone());

    StandardMetadata {
        created_by: created_by.clone(),
        created_at,
        last_modified_by: created_by,
        last_modified_at,
        tags: common.tags.iter().cloned().collect(),
        category: common.category.clone().unwrap_or_else(|| category.to_string()),
        is_template: common.is_template.unwrap_or(false),
        version: 1,
        equipment,
        target_audience: None,
        language: options.language.clone(),
        visibility: Visibility::Private,
        permissions: Permissions {
            can_edit: vec!["physical_trainer".into()],
            can_view: vec!["physical_trainer".into(), "coach".into(), "player".into()],
            can_share: vec!["physical_trainer".into()],
        },
        test_requirements: None,
    }
}

pub(crate) fn assignments(common: &LegacyCommon) -> Option<WorkoutAssignments> {
    if common.assigned_player_ids.is_empty() && common.assigned_team_ids.is_empty() {
        return None;
    }

    Some(WorkoutAssignments {
        player_ids: common.assigned_player_ids.clone(),
        team_ids: common.assigned_team_ids.clone(),
        ..Default::default()
    })
}

pub(crate) fn non_empty(list: &[String]) -> Option<Vec<String>> {
    if list.is_empty() {
        None
    } else {
        Some(list.to_vec())
    }
}
