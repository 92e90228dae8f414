#![forbid(unsafe_code)]

//! Core domain model and migration engine for workout records.
//!
//! This crate provides:
//! - Legacy workout shapes (strength, conditioning, hybrid, agility) and the
//!   unified session schema
//! - Format detection and structural validation
//! - Forward converters and rollback converters with data-loss reporting
//! - Batch orchestration with progress, pause and cancel
//! - Persistence (JSONL sessions, atomic source rewrite, JSON/CSV reports)

pub mod types;
pub mod error;
pub mod legacy;
mod seconds;
pub mod ids;
pub mod detect;
pub mod validate;
pub mod convert;
pub mod rollback;
pub mod batch;
pub mod samples;
pub mod sink;
pub mod report;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use detect::detect_workout_format;
pub use validate::{validate_workout_data, ValidationError, ValidationResult};
pub use convert::{
    migrate_agility_workout, migrate_conditioning_workout, migrate_hybrid_workout,
    migrate_record, migrate_strength_workout, ConvertOptions,
};
pub use rollback::{rollback, rollback_value};
pub use batch::{
    batch_migrate, BatchMigrationProgress, BatchOptions, BatchResult, BatchRunState,
    MigrationControl, MigrationController,
};
pub use legacy::LegacyWorkout;
pub use sink::{JsonlSink, SessionSink};
