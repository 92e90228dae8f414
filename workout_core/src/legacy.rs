//! Typed models of the four legacy workout record shapes.
//!
//! Forward converters parse incoming JSON into these types; rollback
//! converters produce them. Field names follow the legacy camelCase JSON.

use crate::{ExerciseSet, IntervalBlock, RestBlock, SessionPhase, TargetMetrics, TransitionBlock, WorkoutFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

fn default_name() -> String {
    "Untitled Workout".into()
}

fn default_one() -> u32 {
    1
}

/// Fields shared by every legacy shape
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCommon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_calories: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assigned_player_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assigned_team_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup: Option<SessionPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<SessionPhase>,
}

impl Default for LegacyCommon {
    fn default() -> Self {
        Self {
            id: None,
            name: default_name(),
            description: None,
            tags: Vec::new(),
            category: None,
            difficulty: None,
            estimated_calories: None,
            created_by: None,
            created_at: None,
            updated_at: None,
            is_template: None,
            assigned_player_ids: Vec::new(),
            assigned_team_ids: Vec::new(),
            warmup: None,
            cooldown: None,
        }
    }
}

// ============================================================================
// Strength
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrengthTemplate {
    #[serde(flatten)]
    pub common: LegacyCommon,
    pub exercises: Vec<StrengthExercise>,
    #[serde(default, deserialize_with = "crate::seconds::deserialize")]
    pub rest_between_exercises: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_muscle_groups: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrengthExercise {
    pub exercise_id: String,
    #[serde(default)]
    pub name: String,
    pub sets: SetsSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "crate::seconds::deserialize")]
    pub rest_between_sets: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<String>,
}

/// Sets given either as a plain count or as explicit set objects
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SetsSpec {
    Count(u32),
    List(Vec<ExerciseSet>),
}

impl SetsSpec {
    /// Expand into explicit sets, all marked not completed
    pub fn to_sets(&self, reps: Option<u32>, weight: Option<f64>) -> Vec<ExerciseSet> {
        match self {
            SetsSpec::Count(n) => (0..*n)
                .map(|_| ExerciseSet {
                    set_type: crate::types::default_set_type(),
                    reps,
                    weight,
                    duration: None,
                    distance: None,
                    completed: false,
                })
                .collect(),
            SetsSpec::List(sets) => sets
                .iter()
                .map(|s| ExerciseSet {
                    completed: false,
                    ..s.clone()
                })
                .collect(),
        }
    }
}

// ============================================================================
// Conditioning
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConditioningProgram {
    #[serde(flatten)]
    pub common: LegacyCommon,
    pub intervals: Vec<ConditioningInterval>,
    pub equipment: EquipmentSpec,
    #[serde(deserialize_with = "crate::seconds::deserialize")]
    pub total_duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_intensity: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_systems: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_based_targets: Option<BTreeMap<String, Value>>,
}

/// A single piece of equipment or a list of them
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EquipmentSpec {
    One(String),
    Many(Vec<String>),
}

impl EquipmentSpec {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            EquipmentSpec::One(e) => vec![e.clone()],
            EquipmentSpec::Many(list) => list.clone(),
        }
    }

    pub fn primary(&self) -> Option<&str> {
        match self {
            EquipmentSpec::One(e) => Some(e.as_str()),
            EquipmentSpec::Many(list) => list.first().map(String::as_str),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConditioningInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub interval_type: Option<String>,
    #[serde(deserialize_with = "crate::seconds::deserialize")]
    pub duration: u32,
    #[serde(default)]
    pub intensity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_metrics: Option<TargetMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::seconds::option::deserialize"
    )]
    pub rest_after: Option<u32>,
}

impl ConditioningInterval {
    pub fn is_rest(&self) -> bool {
        self.interval_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("rest"))
    }
}

// ============================================================================
// Hybrid
// ============================================================================

/// Hybrid program, generic over its block representation so the forward
/// path can inspect raw blocks before typing them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HybridProgram<B = HybridBlock> {
    #[serde(flatten)]
    pub common: LegacyCommon,
    pub blocks: Vec<B>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::seconds::option::deserialize"
    )]
    pub total_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HybridBlock {
    Exercise(HybridExerciseBlock),
    Interval(IntervalBlock),
    Transition(TransitionBlock),
    Rest(RestBlock),
}

impl HybridBlock {
    pub const TYPE_NAMES: [&'static str; 4] = ["exercise", "interval", "transition", "rest"];

    pub fn id(&self) -> &str {
        match self {
            HybridBlock::Exercise(b) => &b.id,
            HybridBlock::Interval(b) => &b.id,
            HybridBlock::Transition(b) => &b.id,
            HybridBlock::Rest(b) => &b.id,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HybridExerciseBlock {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub exercises: Vec<StrengthExercise>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::seconds::option::deserialize"
    )]
    pub duration: Option<u32>,
}

// ============================================================================
// Agility
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgilityProgram {
    #[serde(flatten)]
    pub common: LegacyCommon,
    pub phases: Vec<AgilityPhase>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::seconds::option::deserialize"
    )]
    pub total_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgilityPhase {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub phase_type: Option<String>,
    #[serde(default)]
    pub drills: Vec<AgilityDrill>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::seconds::option::deserialize"
    )]
    pub rest_after: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgilityDrill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub pattern: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::seconds::option::deserialize"
    )]
    pub duration: Option<u32>,
    #[serde(default = "default_one", alias = "reps")]
    pub sets: u32,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::seconds::option::deserialize"
    )]
    pub rest_after: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_time: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_errors: Option<bool>,
}

// ============================================================================
// Rollback output
// ============================================================================

/// A legacy-shaped workout produced by rollback
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum LegacyWorkout {
    Strength(StrengthTemplate),
    Conditioning(ConditioningProgram),
    Hybrid(HybridProgram),
    Agility(AgilityProgram),
}

impl LegacyWorkout {
    pub fn format(&self) -> WorkoutFormat {
        match self {
            LegacyWorkout::Strength(_) => WorkoutFormat::Strength,
            LegacyWorkout::Conditioning(_) => WorkoutFormat::Conditioning,
            LegacyWorkout::Hybrid(_) => WorkoutFormat::Hybrid,
            LegacyWorkout::Agility(_) => WorkoutFormat::Agility,
        }
    }

}
