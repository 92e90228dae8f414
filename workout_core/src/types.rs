//! Core domain types for the workout migration engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Workout formats (legacy families and the unified schema)
//! - The unified workout session and its block sum type
//! - Migration results, errors, warnings and data-loss reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Schema version stamped on every session this engine produces
pub const UNIFIED_SCHEMA_VERSION: &str = "1.0.0";

// ============================================================================
// Formats
// ============================================================================

/// Classification of an arbitrary workout record
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutFormat {
    Strength,
    Conditioning,
    Hybrid,
    Agility,
    Unified,
    Unknown,
}

impl WorkoutFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutFormat::Strength => "strength",
            WorkoutFormat::Conditioning => "conditioning",
            WorkoutFormat::Hybrid => "hybrid",
            WorkoutFormat::Agility => "agility",
            WorkoutFormat::Unified => "unified",
            WorkoutFormat::Unknown => "unknown",
        }
    }

    /// The legacy family for this format, if it is one
    pub fn legacy_type(&self) -> Option<WorkoutType> {
        match self {
            WorkoutFormat::Strength => Some(WorkoutType::Strength),
            WorkoutFormat::Conditioning => Some(WorkoutType::Conditioning),
            WorkoutFormat::Hybrid => Some(WorkoutType::Hybrid),
            WorkoutFormat::Agility => Some(WorkoutType::Agility),
            WorkoutFormat::Unified | WorkoutFormat::Unknown => None,
        }
    }
}

impl fmt::Display for WorkoutFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strength" => Ok(WorkoutFormat::Strength),
            "conditioning" => Ok(WorkoutFormat::Conditioning),
            "hybrid" => Ok(WorkoutFormat::Hybrid),
            "agility" => Ok(WorkoutFormat::Agility),
            "unified" => Ok(WorkoutFormat::Unified),
            "unknown" => Ok(WorkoutFormat::Unknown),
            other => Err(crate::Error::Other(format!("Unknown workout format: {}", other))),
        }
    }
}

/// Source family of a workout, retained after unification
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    Strength,
    Conditioning,
    Hybrid,
    Agility,
}

impl WorkoutType {
    pub const ALL: [WorkoutType; 4] = [
        WorkoutType::Strength,
        WorkoutType::Conditioning,
        WorkoutType::Hybrid,
        WorkoutType::Agility,
    ];

    pub fn as_str(&self) -> &'static str {
        WorkoutFormat::from(*self).as_str()
    }
}

impl From<WorkoutType> for WorkoutFormat {
    fn from(t: WorkoutType) -> Self {
        match t {
            WorkoutType::Strength => WorkoutFormat::Strength,
            WorkoutType::Conditioning => WorkoutFormat::Conditioning,
            WorkoutType::Hybrid => WorkoutFormat::Hybrid,
            WorkoutType::Agility => WorkoutFormat::Agility,
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workout difficulty level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Elite,
}

impl Difficulty {
    /// Map an average intensity (0-100) onto a difficulty level
    pub fn from_intensity(intensity: f64) -> Self {
        if intensity < 40.0 {
            Difficulty::Beginner
        } else if intensity < 70.0 {
            Difficulty::Intermediate
        } else if intensity < 90.0 {
            Difficulty::Advanced
        } else {
            Difficulty::Elite
        }
    }

    /// Lenient parse of a legacy difficulty label
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "easy" => Some(Difficulty::Beginner),
            "intermediate" | "moderate" | "medium" => Some(Difficulty::Intermediate),
            "advanced" | "hard" => Some(Difficulty::Advanced),
            "elite" | "expert" => Some(Difficulty::Elite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Elite => "elite",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

// ============================================================================
// Unified Session
// ============================================================================

/// Canonical, format-agnostic workout representation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedWorkoutSession {
    pub id: String,
    pub version: String,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub content: WorkoutContent,
    pub metadata: StandardMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignments: Option<WorkoutAssignments>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutContent {
    pub blocks: Vec<WorkoutBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup: Option<SessionPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<SessionPhase>,
    #[serde(deserialize_with = "crate::seconds::deserialize")]
    pub total_duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_calories: Option<u32>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_muscle_groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_systems: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_settings: Option<IntervalSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_areas: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<Vec<String>>,
}

impl WorkoutContent {
    /// Sum of block durations in seconds
    pub fn block_duration_sum(&self, seconds_per_set: u32) -> u32 {
        self.blocks
            .iter()
            .map(|b| b.duration_seconds(seconds_per_set))
            .fold(0, u32::saturating_add)
    }
}

/// Warmup or cooldown segment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionPhase {
    #[serde(default, deserialize_with = "crate::seconds::deserialize")]
    pub duration: u32,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub exercises: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntervalSettings {
    pub total_intervals: u32,
    pub work_seconds: u32,
    pub rest_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_intensity: Option<f64>,
}

// ============================================================================
// Blocks
// ============================================================================

/// An ordered unit of workout content
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkoutBlock {
    Exercise(ExerciseBlock),
    Interval(IntervalBlock),
    Rest(RestBlock),
    Transition(TransitionBlock),
    Agility(AgilityBlock),
}

impl WorkoutBlock {
    pub fn id(&self) -> &str {
        match self {
            WorkoutBlock::Exercise(b) => &b.id,
            WorkoutBlock::Interval(b) => &b.id,
            WorkoutBlock::Rest(b) => &b.id,
            WorkoutBlock::Transition(b) => &b.id,
            WorkoutBlock::Agility(b) => &b.id,
        }
    }

    /// The serialized `type` tag of this block
    pub fn type_name(&self) -> &'static str {
        match self {
            WorkoutBlock::Exercise(_) => "exercise",
            WorkoutBlock::Interval(_) => "interval",
            WorkoutBlock::Rest(_) => "rest",
            WorkoutBlock::Transition(_) => "transition",
            WorkoutBlock::Agility(_) => "agility",
        }
    }

    /// Duration of this block in seconds.
    ///
    /// Exercise blocks without an explicit duration are estimated as
    /// `sets * (seconds_per_set + rest_between_sets)` per exercise,
    /// saturating at `u32::MAX`.
    pub fn duration_seconds(&self, seconds_per_set: u32) -> u32 {
        match self {
            WorkoutBlock::Exercise(b) => b.duration.unwrap_or_else(|| {
                b.exercises
                    .iter()
                    .map(|e| {
                        let sets = u32::try_from(e.sets.len()).unwrap_or(u32::MAX);
                        sets.saturating_mul(seconds_per_set.saturating_add(e.rest_between_sets))
                    })
                    .fold(0, u32::saturating_add)
            }),
            WorkoutBlock::Interval(b) => b.duration,
            WorkoutBlock::Rest(b) => b.duration,
            WorkoutBlock::Transition(b) => b.duration,
            WorkoutBlock::Agility(b) => b.duration,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseBlock {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exercises: Vec<BlockExercise>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::seconds::option::deserialize"
    )]
    pub duration: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockExercise {
    pub exercise_id: String,
    pub name: String,
    pub sets: Vec<ExerciseSet>,
    #[serde(default, deserialize_with = "crate::seconds::deserialize")]
    pub rest_between_sets: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    #[serde(rename = "type", default = "default_set_type")]
    pub set_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::seconds::option::deserialize"
    )]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default)]
    pub completed: bool,
}

pub(crate) fn default_set_type() -> String {
    "working".into()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntervalBlock {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(deserialize_with = "crate::seconds::deserialize")]
    pub duration: u32,
    /// 0-100 scale
    pub intensity: f64,
    #[serde(default)]
    pub target_metrics: TargetMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Interval targets, carried verbatim from the source
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TargetMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestBlock {
    pub id: String,
    #[serde(deserialize_with = "crate::seconds::deserialize")]
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransitionBlock {
    pub id: String,
    #[serde(deserialize_with = "crate::seconds::deserialize")]
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgilityBlock {
    pub id: String,
    pub drill_id: String,
    pub drill_name: String,
    pub pattern: String,
    #[serde(deserialize_with = "crate::seconds::deserialize")]
    pub duration: u32,
    pub sets: u32,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub metrics: AgilityMetrics,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgilityMetrics {
    #[serde(default)]
    pub track_time: bool,
    #[serde(default)]
    pub track_errors: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_time: Option<f64>,
}

// ============================================================================
// Metadata and Assignments
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StandardMetadata {
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub last_modified_by: String,
    pub last_modified_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub category: String,
    #[serde(default)]
    pub is_template: bool,
    /// Revision counter, 1 for a fresh migration
    pub version: u32,
    #[serde(default)]
    pub equipment: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    pub language: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_requirements: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    #[serde(default)]
    pub can_edit: Vec<String>,
    #[serde(default)]
    pub can_view: Vec<String>,
    #[serde(default)]
    pub can_share: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutAssignments {
    #[serde(default)]
    pub player_ids: Vec<String>,
    #[serde(default)]
    pub team_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
}

// ============================================================================
// Migration Results
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationErrorCode {
    UnknownFormat,
    ValidationError,
    MigrationError,
    RollbackError,
    RollbackOperationError,
}

impl MigrationErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationErrorCode::UnknownFormat => "UNKNOWN_FORMAT",
            MigrationErrorCode::ValidationError => "VALIDATION_ERROR",
            MigrationErrorCode::MigrationError => "MIGRATION_ERROR",
            MigrationErrorCode::RollbackError => "ROLLBACK_ERROR",
            MigrationErrorCode::RollbackOperationError => "ROLLBACK_OPERATION_ERROR",
        }
    }
}

impl fmt::Display for MigrationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationError {
    pub code: MigrationErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl MigrationError {
    pub fn new(code: MigrationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Non-fatal observation attached to an otherwise successful result
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationWarning {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl MigrationWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
            suggestion: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// What happened to a single field during a lossy conversion
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldDisposition {
    Reconstructed,
    Defaulted,
    Dropped,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldLoss {
    pub field: String,
    pub disposition: FieldDisposition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Per-field audit of a conversion
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct DataLossReport {
    pub fields: Vec<FieldLoss>,
}

impl DataLossReport {
    pub fn record(
        &mut self,
        field: impl Into<String>,
        disposition: FieldDisposition,
        note: Option<&str>,
    ) {
        self.fields.push(FieldLoss {
            field: field.into(),
            disposition,
            note: note.map(str::to_string),
        });
    }

    pub fn reconstructed(&mut self, field: impl Into<String>) {
        self.record(field, FieldDisposition::Reconstructed, None);
    }

    pub fn defaulted(&mut self, field: impl Into<String>, note: &str) {
        self.record(field, FieldDisposition::Defaulted, Some(note));
    }

    pub fn dropped(&mut self, field: impl Into<String>, note: &str) {
        self.record(field, FieldDisposition::Dropped, Some(note));
    }

    pub fn disposition_of(&self, field: &str) -> Option<FieldDisposition> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.disposition)
    }

    pub fn dropped_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.disposition == FieldDisposition::Dropped)
            .map(|f| f.field.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationMetadata {
    pub source_format: WorkoutFormat,
    pub target_format: WorkoutFormat,
    pub migrated_at: DateTime<Utc>,
    pub fields_modified: Vec<String>,
    pub data_loss: bool,
    #[serde(default, skip_serializing_if = "DataLossReport::is_empty")]
    pub data_loss_report: DataLossReport,
}

impl MigrationMetadata {
    pub fn new(source_format: WorkoutFormat, target_format: WorkoutFormat) -> Self {
        Self {
            source_format,
            target_format,
            migrated_at: Utc::now(),
            fields_modified: Vec::new(),
            data_loss: false,
            data_loss_report: DataLossReport::default(),
        }
    }

    pub fn with_fields_modified(mut self, fields: &[&str]) -> Self {
        self.fields_modified = fields.iter().map(|f| f.to_string()).collect();
        self
    }
}

/// Outcome of migrating (or rolling back) one record
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub errors: Vec<MigrationError>,
    pub warnings: Vec<MigrationWarning>,
    pub metadata: MigrationMetadata,
}

impl<T> MigrationResult<T> {
    pub fn succeeded(
        data: T,
        warnings: Vec<MigrationWarning>,
        metadata: MigrationMetadata,
    ) -> Self {
        Self {
            success: true,
            data: Some(data),
            errors: Vec::new(),
            warnings,
            metadata,
        }
    }

    pub fn failed(
        error: MigrationError,
        warnings: Vec<MigrationWarning>,
        metadata: MigrationMetadata,
    ) -> Self {
        Self {
            success: false,
            data: None,
            errors: vec![error],
            warnings,
            metadata,
        }
    }

    /// Code of the first error, if the result failed
    pub fn first_error_code(&self) -> Option<MigrationErrorCode> {
        self.errors.first().map(|e| e.code)
    }
}
