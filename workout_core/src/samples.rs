//! Deterministic sample records in each legacy shape.
//!
//! Used by tests and by `wkmigrate sample` to produce input files for dry
//! runs. The same seed always yields the same record.

use crate::WorkoutType;
use serde_json::{json, Value};

const LIFTS: &[(&str, &str, &str)] = &[
    ("back-squat", "Back Squat", "barbell"),
    ("bench-press", "Bench Press", "barbell"),
    ("deadlift", "Deadlift", "barbell"),
    ("pull-up", "Pull-up", "pullup_bar"),
    ("kb-swing", "Kettlebell Swing", "kettlebell"),
];

const MACHINES: &[&str] = &["bike", "rower", "ski_erg", "treadmill"];

const DRILLS: &[(&str, &str)] = &[
    ("5_10_5", "Pro Agility"),
    ("l_drill", "L-Drill"),
    ("t_drill", "T-Drill"),
    ("ladder", "Ladder Quick Feet"),
];

const DIFFICULTIES: [&str; 3] = ["beginner", "intermediate", "advanced"];

pub fn strength_record(seed: usize) -> Value {
    let exercises: Vec<Value> = (0..3)
        .map(|i| {
            let (id, name, equipment) = LIFTS[(seed + i) % LIFTS.len()];
            json!({
                "exerciseId": id,
                "name": name,
                "sets": 3 + (seed + i) % 3,
                "reps": 5 + 2 * i,
                "weight": 40 + 10 * ((seed + i) % 5),
                "restBetweenSets": 90,
                "equipment": [equipment]
            })
        })
        .collect();

    json!({
        "id": format!("strength-{}", seed),
        "name": format!("Strength Day {}", seed),
        "description": "Compound lifts",
        "tags": ["strength"],
        "category": "strength",
        "difficulty": DIFFICULTIES[seed % DIFFICULTIES.len()],
        "createdBy": "coach-1",
        "createdAt": "2024-03-01T09:00:00Z",
        "exercises": exercises,
        "restBetweenExercises": 120,
        "targetMuscleGroups": ["legs", "back"]
    })
}

pub fn conditioning_record(seed: usize) -> Value {
    let machine = MACHINES[seed % MACHINES.len()];
    let intervals: Vec<Value> = (0..4)
        .map(|i| {
            json!({
                "id": format!("cond-{}-int-{}", seed, i),
                "name": format!("Effort {}", i + 1),
                "type": "work",
                "duration": 180,
                "intensity": 70 + 5 * ((seed + i) % 4),
                "targetMetrics": { "heartRate": { "min": 150, "max": 170 } },
                "restAfter": if i < 3 { 60 } else { 0 }
            })
        })
        .collect();

    json!({
        "id": format!("conditioning-{}", seed),
        "name": format!("{} Intervals {}", machine, seed),
        "tags": ["conditioning"],
        "createdBy": "coach-2",
        "createdAt": "2024-03-02T07:30:00Z",
        "intervals": intervals,
        "equipment": machine,
        "totalDuration": 900,
        "averageIntensity": 75,
        "targetSystems": ["aerobic"],
        "testBasedTargets": { "ftp": 250 }
    })
}

pub fn hybrid_record(seed: usize) -> Value {
    let (id, name, equipment) = LIFTS[seed % LIFTS.len()];
    json!({
        "id": format!("hybrid-{}", seed),
        "name": format!("Hybrid Circuit {}", seed),
        "createdBy": "coach-3",
        "assignedPlayerIds": [format!("player-{}", seed)],
        "blocks": [
            {
                "id": format!("hybrid-{}-ex", seed),
                "type": "exercise",
                "name": "Strength Block",
                "exercises": [
                    { "exerciseId": id, "name": name, "sets": 3, "reps": 8, "equipment": [equipment] }
                ]
            },
            {
                "id": format!("hybrid-{}-tr", seed),
                "type": "transition",
                "duration": 30,
                "fromActivity": name,
                "toActivity": "Bike"
            },
            {
                "id": format!("hybrid-{}-int", seed),
                "type": "interval",
                "name": "Bike Sprint",
                "duration": 120,
                "intensity": 85,
                "equipment": "bike"
            },
            {
                "id": format!("hybrid-{}-rest", seed),
                "type": "rest",
                "duration": 60,
                "message": "Recover"
            }
        ],
        "equipment": [equipment, "bike"]
    })
}

pub fn agility_record(seed: usize) -> Value {
    let drill = |i: usize| {
        let (pattern, name) = DRILLS[(seed + i) % DRILLS.len()];
        json!({
            "id": format!("agility-{}-drill-{}", seed, i),
            "name": name,
            "pattern": pattern,
            "duration": 60 + 15 * i,
            "sets": 2,
            "restAfter": 30,
            "equipment": ["cones"],
            "instructions": ["Stay low", "Drive out of each cut"],
            "targetTime": 4.8,
            "trackTime": true
        })
    };

    json!({
        "id": format!("agility-{}", seed),
        "name": format!("Footwork {}", seed),
        "difficulty": "advanced",
        "phases": [
            { "name": "Activation", "type": "warmup", "drills": [drill(0)], "restAfter": 60 },
            { "name": "Main", "type": "main", "drills": [drill(1), drill(2)] }
        ],
        "focusAreas": ["change_of_direction"],
        "equipment": ["cones"]
    })
}

pub fn sample_record(workout_type: WorkoutType, seed: usize) -> Value {
    match workout_type {
        WorkoutType::Strength => strength_record(seed),
        WorkoutType::Conditioning => conditioning_record(seed),
        WorkoutType::Hybrid => hybrid_record(seed),
        WorkoutType::Agility => agility_record(seed),
    }
}

/// `count` records cycling strength → conditioning → hybrid → agility
pub fn mixed_records(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| sample_record(WorkoutType::ALL[i % WorkoutType::ALL.len()], i))
        .collect()
}
