//! Batch orchestration of record migrations.
//!
//! Drives detect → (validate) → convert over a record list in fixed-size
//! batches. Conversions are synchronous; the loop sleeps briefly between
//! batches and polls a [`MigrationControl`] before every record so a host
//! can pause or cancel a run from another thread.
//!
//! Run states: `idle → running → {paused ⇄ running} → {completed | cancelled | failed}`.

use crate::config::Config;
use crate::convert::{self, ConvertOptions};
use crate::{
    detect_workout_format, validate_workout_data, MigrationError, MigrationErrorCode,
    MigrationMetadata, MigrationResult, UnifiedWorkoutSession, ValidationResult, WorkoutFormat,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::{Duration, Instant};

// ============================================================================
// Options
// ============================================================================

#[derive(Clone, Debug)]
pub struct BatchOptions {
    pub batch_size: usize,
    pub validate_before_migration: bool,
    pub stop_on_error: bool,
    /// Caller contract: the engine never mutates its input either way
    pub preserve_original: bool,
    /// Caller contract: conversion runs in full either way
    pub dry_run: bool,
    /// Yield between batches
    pub batch_pause: Duration,
    /// How often a paused run re-checks its control
    pub pause_poll_interval: Duration,
    pub convert: ConvertOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 10,
            validate_before_migration: true,
            stop_on_error: false,
            preserve_original: true,
            dry_run: false,
            batch_pause: Duration::from_millis(10),
            pause_poll_interval: Duration::from_millis(25),
            convert: ConvertOptions::default(),
        }
    }
}

impl BatchOptions {
    pub fn from_config(config: &Config) -> Self {
        let migration = &config.migration;
        Self {
            batch_size: migration.batch_size,
            validate_before_migration: migration.validate_before_migration,
            stop_on_error: migration.stop_on_error,
            preserve_original: migration.preserve_original,
            dry_run: false,
            batch_pause: Duration::from_millis(migration.batch_pause_ms),
            pause_poll_interval: Duration::from_millis(migration.pause_poll_ms),
            convert: ConvertOptions::from_config(config),
        }
    }
}

// ============================================================================
// Run control
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchRunState {
    Idle,
    Running,
    Paused,
    Completed,
    Cancelled,
    Failed,
}

impl BatchRunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchRunState::Completed | BatchRunState::Cancelled | BatchRunState::Failed
        )
    }

    fn to_u8(self) -> u8 {
        match self {
            BatchRunState::Idle => 0,
            BatchRunState::Running => 1,
            BatchRunState::Paused => 2,
            BatchRunState::Completed => 3,
            BatchRunState::Cancelled => 4,
            BatchRunState::Failed => 5,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => BatchRunState::Running,
            2 => BatchRunState::Paused,
            3 => BatchRunState::Completed,
            4 => BatchRunState::Cancelled,
            5 => BatchRunState::Failed,
            _ => BatchRunState::Idle,
        }
    }
}

/// Cooperative pause/cancel signals polled by the batch loop
pub trait MigrationControl {
    fn is_paused(&self) -> bool;
    fn is_cancelled(&self) -> bool;

    /// Notified on every run-state transition
    fn on_state_change(&self, _state: BatchRunState) {}
}

/// A control that never pauses or cancels
#[derive(Clone, Copy, Debug, Default)]
pub struct Uninterrupted;

impl MigrationControl for Uninterrupted {
    fn is_paused(&self) -> bool {
        false
    }

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Thread-safe pause/cancel flags plus the last observed run state.
///
/// Share it behind an `Arc` between the thread running [`batch_migrate`]
/// and whoever drives pause/resume/cancel.
#[derive(Debug, Default)]
pub struct MigrationController {
    paused: AtomicBool,
    cancelled: AtomicBool,
    state: AtomicU8,
}

impl MigrationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn state(&self) -> BatchRunState {
        BatchRunState::from_u8(self.state.load(Ordering::SeqCst))
    }
}

impl MigrationControl for MigrationController {
    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn on_state_change(&self, state: BatchRunState) {
        self.state.store(state.to_u8(), Ordering::SeqCst);
    }
}

// ============================================================================
// Progress and results
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchMigrationProgress {
    pub total: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub warnings: usize,
    /// 1-based index of the batch being processed
    pub current_batch: usize,
    pub total_batches: usize,
    pub estimated_time_remaining_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub warnings: usize,
    pub duration_ms: u64,
}

/// Flags that govern the caller's persistence decision, not the conversion.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallerContract {
    pub dry_run: bool,
    pub preserve_original: bool,
}

impl CallerContract {
    /// Whether the caller should store the migrated sessions
    pub fn should_persist(&self) -> bool {
        !self.dry_run
    }

    /// Whether the caller may remove source records that migrated successfully
    pub fn may_discard_originals(&self) -> bool {
        !self.dry_run && !self.preserve_original
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// One entry per processed record, in input order
    pub results: Vec<MigrationResult<UnifiedWorkoutSession>>,
    pub summary: BatchSummary,
    pub state: BatchRunState,
    pub contract: CallerContract,
}

impl BatchResult {
    /// Successfully migrated sessions, in input order
    pub fn sessions(&self) -> impl Iterator<Item = &UnifiedWorkoutSession> {
        self.results.iter().filter_map(|r| r.data.as_ref())
    }
}

#[derive(Debug, Default)]
struct Tally {
    successful: usize,
    failed: usize,
    warnings: usize,
}

impl Tally {
    fn record<T>(&mut self, result: &MigrationResult<T>) {
        if result.success {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
        self.warnings += result.warnings.len();
    }
}

// ============================================================================
// Orchestration
// ============================================================================

/// Migrate `records` in batches, reporting progress after every record.
///
/// `results[i]` always corresponds to `records[i]`. With `stop_on_error` the
/// run halts after the first failed record; with a cancelled `control` it
/// stops before the next record starts.
pub fn batch_migrate<C, F>(
    records: &[Value],
    options: &BatchOptions,
    control: &C,
    mut on_progress: F,
) -> BatchResult
where
    C: MigrationControl + ?Sized,
    F: FnMut(&BatchMigrationProgress),
{
    let started = Instant::now();
    let total = records.len();
    let batch_size = options.batch_size.max(1);
    let total_batches = total.div_ceil(batch_size);

    let mut results = Vec::with_capacity(total);
    let mut tally = Tally::default();
    let mut state = BatchRunState::Running;
    control.on_state_change(state);

    tracing::info!(
        "Starting batch migration of {} records ({} batches of {})",
        total,
        total_batches,
        batch_size
    );

    'batches: for (batch_index, chunk) in records.chunks(batch_size).enumerate() {
        if batch_index > 0 && !options.batch_pause.is_zero() {
            std::thread::sleep(options.batch_pause);
        }
        tracing::debug!("Processing batch {}/{}", batch_index + 1, total_batches);

        for record in chunk {
            if !wait_while_paused(control, options.pause_poll_interval) {
                tracing::info!("Batch migration cancelled after {} records", results.len());
                state = BatchRunState::Cancelled;
                break 'batches;
            }

            let result = migrate_guarded(record, options);
            tally.record(&result);
            let failed = !result.success;
            results.push(result);

            let processed = results.len();
            on_progress(&BatchMigrationProgress {
                total,
                processed,
                successful: tally.successful,
                failed: tally.failed,
                warnings: tally.warnings,
                current_batch: batch_index + 1,
                total_batches,
                estimated_time_remaining_ms: estimate_remaining_ms(
                    started.elapsed(),
                    processed,
                    total,
                ),
            });

            if failed && options.stop_on_error {
                tracing::warn!("Stopping batch migration at record {} on error", processed - 1);
                state = BatchRunState::Failed;
                break 'batches;
            }
        }
    }

    if !state.is_terminal() {
        state = BatchRunState::Completed;
    }
    control.on_state_change(state);

    let summary = BatchSummary {
        total,
        successful: tally.successful,
        failed: tally.failed,
        warnings: tally.warnings,
        duration_ms: started.elapsed().as_millis() as u64,
    };

    tracing::info!(
        "Batch migration {:?}: {} successful, {} failed, {} warnings in {}ms",
        state,
        summary.successful,
        summary.failed,
        summary.warnings,
        summary.duration_ms
    );

    BatchResult {
        results,
        summary,
        state,
        contract: CallerContract {
            dry_run: options.dry_run,
            preserve_original: options.preserve_original,
        },
    }
}

/// Remaining time from the mean per-record duration so far, rounded to the
/// nearest millisecond
fn estimate_remaining_ms(elapsed: Duration, processed: usize, total: usize) -> u64 {
    if processed == 0 {
        return 0;
    }
    let per_record_ms = elapsed.as_secs_f64() * 1000.0 / processed as f64;
    (per_record_ms * total.saturating_sub(processed) as f64).round() as u64
}

/// Block while paused. Returns false once cancelled.
fn wait_while_paused<C>(control: &C, poll: Duration) -> bool
where
    C: MigrationControl + ?Sized,
{
    let mut paused = false;
    loop {
        if control.is_cancelled() {
            return false;
        }
        if !control.is_paused() {
            if paused {
                tracing::info!("Batch migration resumed");
                control.on_state_change(BatchRunState::Running);
            }
            return true;
        }
        if !paused {
            tracing::info!("Batch migration paused");
            control.on_state_change(BatchRunState::Paused);
            paused = true;
        }
        std::thread::sleep(poll);
    }
}

/// Per-record failure boundary: a panic inside one conversion becomes a
/// failed result instead of tearing down the run.
fn migrate_guarded(record: &Value, options: &BatchOptions) -> MigrationResult<UnifiedWorkoutSession> {
    panic::catch_unwind(AssertUnwindSafe(|| migrate_single(record, options))).unwrap_or_else(
        |payload| {
            let message = panic_message(payload.as_ref());
            tracing::error!("Record migration panicked: {}", message);
            MigrationResult::failed(
                MigrationError::new(
                    MigrationErrorCode::MigrationError,
                    format!("Unexpected failure: {}", message),
                ),
                Vec::new(),
                MigrationMetadata::new(detect_workout_format(record), WorkoutFormat::Unified),
            )
        },
    )
}

/// Detect, optionally validate, then convert one record
pub fn migrate_single(record: &Value, options: &BatchOptions) -> MigrationResult<UnifiedWorkoutSession> {
    let format = detect_workout_format(record);
    tracing::debug!("Detected {} record", format);

    match format {
        WorkoutFormat::Unified => return convert::already_unified(record),
        WorkoutFormat::Unknown => return convert::unknown_format(),
        _ => {}
    }

    if options.validate_before_migration {
        let validation = validate_workout_data(record, format);
        if !validation.is_valid {
            return validation_failure(format, &validation);
        }
    }

    convert::migrate_record(record, format, &options.convert)
}

fn validation_failure(
    format: WorkoutFormat,
    validation: &ValidationResult,
) -> MigrationResult<UnifiedWorkoutSession> {
    MigrationResult {
        success: false,
        data: None,
        errors: validation
            .errors
            .iter()
            .map(|e| {
                MigrationError::new(MigrationErrorCode::ValidationError, e.message.clone())
                    .with_field(e.field.clone())
            })
            .collect(),
        warnings: Vec::new(),
        metadata: MigrationMetadata::new(format, WorkoutFormat::Unified),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;
    use serde_json::json;
    use std::sync::Arc;

    fn fast_options() -> BatchOptions {
        BatchOptions {
            batch_pause: Duration::ZERO,
            pause_poll_interval: Duration::from_millis(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_results_match_input_order_for_any_batch_size() {
        let mut records = samples::mixed_records(11);
        records.insert(4, json!({ "foo": 1 }));

        for batch_size in [1, 2, 3, 5, 12, 100] {
            let options = BatchOptions {
                batch_size,
                ..fast_options()
            };
            let result = batch_migrate(&records, &options, &Uninterrupted, |_| {});

            assert_eq!(result.results.len(), records.len());
            for (record, outcome) in records.iter().zip(&result.results) {
                assert_eq!(
                    outcome.metadata.source_format,
                    detect_workout_format(record)
                );
                if let Some(session) = &outcome.data {
                    assert_eq!(Some(session.id.as_str()), record["id"].as_str());
                }
            }
        }
    }

    #[test]
    fn test_failure_isolation() {
        crate::logging::init_test();
        let records = vec![
            samples::strength_record(1),
            json!({ "name": "Broken", "exercises": "not-an-array" }),
            samples::strength_record(2),
        ];
        let options = BatchOptions {
            stop_on_error: false,
            ..fast_options()
        };

        let result = batch_migrate(&records, &options, &Uninterrupted, |_| {});
        assert_eq!(result.summary.successful, 2);
        assert_eq!(result.summary.failed, 1);
        assert_eq!(result.results.len(), 3);
        assert!(!result.results[1].success);
        assert_eq!(result.state, BatchRunState::Completed);
    }

    #[test]
    fn test_stop_on_error_halts_after_failing_record() {
        let records = vec![
            samples::conditioning_record(1),
            json!({ "foo": 1 }),
            samples::agility_record(1),
        ];
        let options = BatchOptions {
            stop_on_error: true,
            ..fast_options()
        };

        let result = batch_migrate(&records, &options, &Uninterrupted, |_| {});
        assert_eq!(result.results.len(), 2);
        assert_eq!(
            result.results[1].first_error_code(),
            Some(MigrationErrorCode::UnknownFormat)
        );
        assert_eq!(result.state, BatchRunState::Failed);
        assert_eq!(result.summary.total, 3);
    }

    #[test]
    fn test_unknown_record_reports_unknown_format() {
        let result = batch_migrate(&[json!({ "foo": 1 })], &fast_options(), &Uninterrupted, |_| {});
        assert_eq!(
            result.results[0].errors[0].code,
            MigrationErrorCode::UnknownFormat
        );
    }

    #[test]
    fn test_unified_input_is_immediate_success() {
        let migrated = batch_migrate(&[samples::hybrid_record(3)], &fast_options(), &Uninterrupted, |_| {});
        let unified = serde_json::to_value(migrated.results[0].data.as_ref().unwrap()).unwrap();
        assert_eq!(detect_workout_format(&unified), WorkoutFormat::Unified);

        let again = batch_migrate(&[unified.clone()], &fast_options(), &Uninterrupted, |_| {});
        let outcome = &again.results[0];
        assert!(outcome.success);
        assert_eq!(outcome.metadata.source_format, WorkoutFormat::Unified);
        assert!(outcome.metadata.fields_modified.is_empty());
        assert_eq!(
            serde_json::to_value(outcome.data.as_ref().unwrap()).unwrap(),
            unified
        );
    }

    #[test]
    fn test_progress_is_monotonic_and_reaches_total_once() {
        let records = samples::mixed_records(9);
        let options = BatchOptions {
            batch_size: 4,
            ..fast_options()
        };
        let mut seen = Vec::new();

        batch_migrate(&records, &options, &Uninterrupted, |p| {
            seen.push((p.processed, p.current_batch, p.total_batches))
        });

        assert_eq!(seen.len(), 9);
        assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(seen.iter().filter(|(processed, _, _)| *processed == 9).count(), 1);
        assert_eq!(seen.last().unwrap(), &(9, 3, 3));
    }

    #[test]
    fn test_cancel_stops_before_next_record() {
        let records = samples::mixed_records(8);
        let controller = MigrationController::new();

        let result = batch_migrate(&records, &fast_options(), &controller, |p| {
            if p.processed == 3 {
                controller.cancel();
            }
        });

        assert_eq!(result.results.len(), 3);
        assert_eq!(result.state, BatchRunState::Cancelled);
        assert_eq!(controller.state(), BatchRunState::Cancelled);
    }

    #[test]
    fn test_pause_then_resume_completes() {
        let records = samples::mixed_records(4);
        let controller = Arc::new(MigrationController::new());
        controller.pause();

        let resumer = {
            let controller = Arc::clone(&controller);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(30));
                assert_eq!(controller.state(), BatchRunState::Paused);
                controller.resume();
            })
        };

        let result = batch_migrate(&records, &fast_options(), controller.as_ref(), |_| {});
        resumer.join().unwrap();

        assert_eq!(result.results.len(), 4);
        assert_eq!(result.state, BatchRunState::Completed);
        assert_eq!(controller.state(), BatchRunState::Completed);
    }

    #[test]
    fn test_cancel_while_paused() {
        let controller = MigrationController::new();
        controller.pause();
        controller.cancel();

        let result = batch_migrate(&samples::mixed_records(2), &fast_options(), &controller, |_| {});
        assert!(result.results.is_empty());
        assert_eq!(result.state, BatchRunState::Cancelled);
        assert!(controller.state().is_terminal());
        assert!(!BatchRunState::Paused.is_terminal());
    }

    #[test]
    fn test_dry_run_does_not_change_conversion() {
        let records = samples::mixed_records(6);
        let live = batch_migrate(&records, &fast_options(), &Uninterrupted, |_| {});
        let dry = batch_migrate(
            &records,
            &BatchOptions {
                dry_run: true,
                preserve_original: false,
                ..fast_options()
            },
            &Uninterrupted,
            |_| {},
        );

        assert_eq!(live.summary.successful, dry.summary.successful);
        assert_eq!(live.sessions().count(), dry.sessions().count());
        assert!(live.contract.should_persist());
        assert!(!dry.contract.should_persist());
        assert!(!dry.contract.may_discard_originals());
    }

    #[test]
    fn test_validation_failure_maps_each_error() {
        let validation = validate_workout_data(&json!({}), WorkoutFormat::Conditioning);
        let result = validation_failure(WorkoutFormat::Conditioning, &validation);

        assert!(!result.success);
        assert_eq!(result.errors.len(), 2);
        assert!(result
            .errors
            .iter()
            .all(|e| e.code == MigrationErrorCode::ValidationError));
        assert_eq!(result.errors[0].field.as_deref(), Some("intervals"));
    }

    #[test]
    fn test_eta_keeps_sub_millisecond_averages() {
        let elapsed = Duration::from_micros(500);
        assert_eq!(estimate_remaining_ms(elapsed, 1, 5), 2);
        assert_eq!(estimate_remaining_ms(Duration::from_micros(400), 2, 10), 2);
        assert_eq!(estimate_remaining_ms(Duration::from_millis(30), 3, 3), 0);
        assert_eq!(estimate_remaining_ms(Duration::from_millis(30), 0, 3), 0);
    }

    #[test]
    fn test_empty_input_completes() {
        let mut calls = 0;
        let result = batch_migrate(&[], &fast_options(), &Uninterrupted, |_| calls += 1);
        assert_eq!(calls, 0);
        assert_eq!(result.state, BatchRunState::Completed);
        assert_eq!(result.summary.total, 0);
    }
}
