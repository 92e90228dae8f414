use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use workout_core::batch::Uninterrupted;
use workout_core::sink::{read_records, write_records_atomic};
use workout_core::*;

#[derive(Parser)]
#[command(name = "wkmigrate")]
#[command(about = "Migrate legacy workout records to the unified session schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the detected format of every record in a file
    Detect {
        /// JSON array or JSONL file of records
        input: PathBuf,
    },

    /// Check records against the structural rules of their format
    Validate {
        input: PathBuf,

        /// Validate as this format instead of the detected one
        #[arg(long)]
        format: Option<WorkoutFormat>,
    },

    /// Migrate every record to the unified schema
    Migrate {
        input: PathBuf,

        #[arg(long)]
        batch_size: Option<usize>,

        /// Skip structural validation before conversion
        #[arg(long)]
        no_validate: bool,

        /// Halt at the first failed record
        #[arg(long)]
        stop_on_error: bool,

        /// Convert and report without storing sessions
        #[arg(long)]
        dry_run: bool,

        /// Remove migrated records from the input file afterwards
        #[arg(long)]
        no_preserve_original: bool,

        /// Write the full batch result as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        /// Write a one-row-per-record CSV summary
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Convert unified sessions back to a legacy format
    Rollback {
        input: PathBuf,

        /// Target legacy format (strength, conditioning, hybrid, agility)
        #[arg(long)]
        to: WorkoutFormat,

        /// Write legacy records here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write every rollback result, with its data-loss report, as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print deterministic sample records in legacy formats
    Sample {
        #[arg(long, default_value_t = 4)]
        count: usize,

        /// Only emit this legacy format
        #[arg(long = "type")]
        workout_type: Option<WorkoutFormat>,
    },
}

fn main() -> Result<()> {
    workout_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.output.data_dir.clone());

    match cli.command {
        Commands::Detect { input } => cmd_detect(&input),
        Commands::Validate { input, format } => cmd_validate(&input, format),
        Commands::Migrate {
            input,
            batch_size,
            no_validate,
            stop_on_error,
            dry_run,
            no_preserve_original,
            report,
            csv,
        } => {
            let mut options = BatchOptions::from_config(&config);
            if let Some(size) = batch_size {
                options.batch_size = size.max(1);
            }
            options.validate_before_migration &= !no_validate;
            options.stop_on_error |= stop_on_error;
            options.dry_run = dry_run;
            options.preserve_original &= !no_preserve_original;

            cmd_migrate(&input, &data_dir, &options, report.as_deref(), csv.as_deref())
        }
        Commands::Rollback {
            input,
            to,
            output,
            report,
        } => cmd_rollback(&input, to, output.as_deref(), report.as_deref()),
        Commands::Sample {
            count,
            workout_type,
        } => cmd_sample(count, workout_type),
    }
}

fn cmd_detect(input: &Path) -> Result<()> {
    let records = read_records(input)?;
    for (index, record) in records.iter().enumerate() {
        println!("{}\t{}", index, detect_workout_format(record));
    }
    Ok(())
}

fn cmd_validate(input: &Path, format: Option<WorkoutFormat>) -> Result<()> {
    let records = read_records(input)?;
    let mut invalid = 0;

    for (index, record) in records.iter().enumerate() {
        let format = format.unwrap_or_else(|| detect_workout_format(record));
        let result = validate_workout_data(record, format);
        if result.is_valid {
            println!("{}\t{}\tok", index, format);
        } else {
            invalid += 1;
            for error in &result.errors {
                println!(
                    "{}\t{}\t{}\t{}: {}",
                    index, format, error.code, error.field, error.message
                );
            }
        }
    }

    if invalid > 0 {
        return Err(Error::Other(format!(
            "{} of {} records failed validation",
            invalid,
            records.len()
        )));
    }
    Ok(())
}

fn cmd_migrate(
    input: &Path,
    data_dir: &Path,
    options: &BatchOptions,
    report_path: Option<&Path>,
    csv_path: Option<&Path>,
) -> Result<()> {
    let records = read_records(input)?;
    tracing::info!("Migrating {} records from {:?}", records.len(), input);

    let result = batch_migrate(&records, options, &Uninterrupted, |progress| {
        eprintln!(
            "  [{}/{}] batch {}/{}: {} ok, {} failed, ~{}ms left",
            progress.processed,
            progress.total,
            progress.current_batch,
            progress.total_batches,
            progress.successful,
            progress.failed,
            progress.estimated_time_remaining_ms
        );
    });

    for (index, outcome) in result.results.iter().enumerate() {
        for error in &outcome.errors {
            println!("✗ record {}: {} {}", index, error.code, error.message);
        }
    }

    if result.contract.should_persist() {
        let mut sink = JsonlSink::new(data_dir.join("sessions.jsonl"));
        let written = sink.append_all(result.sessions())?;
        println!("✓ Stored {} sessions", written);
        println!("  Sessions: {}", sink.path().display());
    } else {
        println!("[Dry run - sessions not stored]");
    }

    if result.contract.may_discard_originals() {
        // Keep every record that did not produce a stored session
        let remaining: Vec<Value> = records
            .iter()
            .enumerate()
            .filter(|(i, _)| result.results.get(*i).map_or(true, |r| r.data.is_none()))
            .map(|(_, record)| record.clone())
            .collect();
        write_records_atomic(input, &remaining)?;
        println!("✓ Removed migrated records from {}", input.display());
    }

    if let Some(path) = report_path {
        report::write_json_report(&result, path)?;
        println!("  Report: {}", path.display());
    }
    if let Some(path) = csv_path {
        report::write_csv_summary(&result, path)?;
        println!("  CSV: {}", path.display());
    }

    let summary = &result.summary;
    println!(
        "Migrated {}/{} records ({} failed, {} warnings) in {}ms",
        summary.successful, summary.total, summary.failed, summary.warnings, summary.duration_ms
    );

    if result.state == BatchRunState::Failed {
        return Err(Error::Other("Migration stopped on error".into()));
    }
    Ok(())
}

fn cmd_rollback(
    input: &Path,
    target: WorkoutFormat,
    output: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<()> {
    let sessions = read_records(input)?;
    let results: Vec<_> = sessions
        .iter()
        .map(|session| rollback_value(session, target))
        .collect();

    let mut legacy = Vec::with_capacity(results.len());
    let mut failed = 0;
    for (index, result) in results.iter().enumerate() {
        for warning in &result.warnings {
            eprintln!("⚠ record {}: {}", index, warning.message);
        }
        for error in &result.errors {
            eprintln!("✗ record {}: {} {}", index, error.code, error.message);
        }
        let dropped: Vec<_> = result.metadata.data_loss_report.dropped_fields().collect();
        if !dropped.is_empty() {
            eprintln!("  record {} dropped: {}", index, dropped.join(", "));
        }
        match &result.data {
            Some(workout) => legacy.push(serde_json::to_value(workout)?),
            None => failed += 1,
        }
    }

    if let Some(path) = report_path {
        report::write_json(&results, path)?;
        eprintln!("  Report: {}", path.display());
    }

    match output {
        Some(path) => {
            write_records_atomic(path, &legacy)?;
            println!("✓ Wrote {} {} records to {}", legacy.len(), target, path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&legacy)?),
    }

    if failed > 0 {
        return Err(Error::Other(format!("{} records could not be rolled back", failed)));
    }
    Ok(())
}

fn cmd_sample(count: usize, format: Option<WorkoutFormat>) -> Result<()> {
    let records = match format {
        Some(format) => {
            let workout_type = format.legacy_type().ok_or_else(|| {
                Error::Other(format!("{} is not a legacy format", format))
            })?;
            (0..count)
                .map(|seed| samples::sample_record(workout_type, seed))
                .collect()
        }
        None => samples::mixed_records(count),
    };
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
