mod bootstrap;

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use insight_core::models::Column;
use insight_core::settings::Settings;
use insight_data::export;
use insight_data::filter::{self, FilterSet};
use insight_data::sources::SourceRegistry;
use insight_runtime::SnapshotStore;

// ── CLI ────────────────────────────────────────────────────────────────────────

/// Training-session insights over periodic TMS batch exports
#[derive(Parser)]
#[command(name = "tms-insights", version)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print headline KPIs and the curriculum × lesson distribution
    Summary,
    /// Export the (optionally filtered) record table
    Export {
        /// Export encoding
        #[arg(long, default_value = "csv", value_parser = ["csv", "tsv"])]
        format: String,

        /// Output file path
        #[arg(long)]
        output: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Report configured batch sources against the data directory
    Sources,
}

/// Filter flags shared by record-level commands.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Keep only these curriculum codes (repeatable)
    #[arg(long = "curriculum")]
    curriculums: Vec<String>,

    /// Keep only these lesson names (repeatable)
    #[arg(long = "lesson")]
    lessons: Vec<String>,

    /// Keep only these instructors, as "Name (staffId)" (repeatable)
    #[arg(long = "instructor")]
    instructors: Vec<String>,

    /// Keep only these trainees, as "Name (staffId)" (repeatable)
    #[arg(long = "trainee")]
    trainees: Vec<String>,

    /// Keep only these instructor duty codes (repeatable)
    #[arg(long = "instructor-duty-code")]
    instructor_duty_codes: Vec<String>,

    /// Keep only these trainee duty codes (repeatable)
    #[arg(long = "trainee-duty-code")]
    trainee_duty_codes: Vec<String>,

    /// Inclusive start date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Inclusive end date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Case-insensitive substring matched against every column
    #[arg(long)]
    search: Option<String>,
}

impl FilterArgs {
    /// Translate CLI flags into a [`FilterSet`]. Omitted flags add no
    /// clause at all — an absent clause matches everything.
    fn into_filter_set(self) -> FilterSet {
        let mut filters = FilterSet::default();

        for (column, values) in [
            (Column::CurriculumCode, self.curriculums),
            (Column::LessonName, self.lessons),
            (Column::Instructor, self.instructors),
            (Column::Trainee, self.trainees),
            (Column::InstructorDutyCode, self.instructor_duty_codes),
            (Column::TraineeDutyCode, self.trainee_duty_codes),
        ] {
            if !values.is_empty() {
                filters = filters.with_membership(column, values);
            }
        }

        if self.from.is_some() || self.to.is_some() {
            filters = filters.with_date_range(
                self.from.unwrap_or(NaiveDate::MIN),
                self.to.unwrap_or(NaiveDate::MAX),
            );
        }

        if let Some(needle) = self.search {
            filters = filters.with_search(needle);
        }

        filters
    }
}

// ── Entry point ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&cli.settings.log_level, cli.settings.log_file.as_deref())?;

    tracing::info!("TMS Insights v{} starting", env!("CARGO_PKG_VERSION"));

    let data_dir = cli.settings.resolve_data_dir();
    let registry = SourceRegistry::default();

    match cli.command {
        Command::Summary => run_summary(data_dir, registry),
        Command::Export {
            format,
            output,
            filters,
        } => run_export(data_dir, registry, &format, &output, filters.into_filter_set()),
        Command::Sources => run_sources(&data_dir, &registry),
    }
}

// ── Commands ───────────────────────────────────────────────────────────────────

fn run_summary(data_dir: PathBuf, registry: SourceRegistry) -> Result<()> {
    let store = SnapshotStore::new(data_dir, registry);
    let dataset = store.get();

    match dataset.kpis() {
        Ok(kpis) => {
            println!("Total curriculums:  {}", kpis.total_curriculums);
            println!("Total lessons:      {}", kpis.total_lessons);
            println!("Total instructors:  {}", kpis.total_instructors);
            println!("Total trainees:     {}", kpis.total_trainees);
            println!(
                "Top instructor:     {} ({} sessions)",
                kpis.top_instructor.value, kpis.top_instructor.count
            );
            println!(
                "Top trainee:        {} ({} sessions)",
                kpis.top_trainee.value, kpis.top_trainee.count
            );

            println!("\nLesson distribution (curriculum / lesson / sessions):");
            for group in dataset.lesson_distribution() {
                println!("  {} / {} / {}", group.key[0], group.key[1], group.count);
            }
        }
        Err(e) => {
            // Fail-closed: an incomplete dataset must read as unavailable,
            // never as a dashboard full of zeros.
            println!("KPIs unavailable: {}", e);
        }
    }

    Ok(())
}

fn run_export(
    data_dir: PathBuf,
    registry: SourceRegistry,
    format: &str,
    output: &std::path::Path,
    filters: FilterSet,
) -> Result<()> {
    let store = SnapshotStore::new(data_dir, registry);
    let dataset = store.get();

    if let Some(reason) = dataset.unavailable_reason() {
        bail!("refusing to export an incomplete dataset: {}", reason);
    }

    let records = filter::apply(&dataset.joined, &filters);
    tracing::info!(
        "Exporting {} of {} records to {}",
        records.len(),
        dataset.joined.len(),
        output.display()
    );

    let file = std::fs::File::create(output)?;
    match format {
        "tsv" => export::write_delimited(&records, file)?,
        _ => export::write_spreadsheet_csv(&records, file)?,
    }

    println!("Wrote {} records to {}", records.len(), output.display());
    Ok(())
}

fn run_sources(data_dir: &std::path::Path, registry: &SourceRegistry) -> Result<()> {
    let audit = registry.audit(data_dir);

    println!("Data directory: {}", data_dir.display());
    println!("Configured sources:");
    for (source, present) in &audit.registered {
        let status = if *present { "present" } else { "MISSING" };
        println!("  [{}] {:9} {}", status, source.flavor.label(), source.file_name);
    }

    if !audit.unregistered.is_empty() {
        println!("Unregistered batch files on disk:");
        for file in &audit.unregistered {
            println!("  {}", file);
        }
    }

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
