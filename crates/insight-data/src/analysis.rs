//! Top-level ingestion pipeline and dataset snapshot.
//!
//! Runs registry → extractor → join → sort and returns a [`Dataset`]: the
//! three flat tables, the joined date-sorted view, any per-flavor source
//! failures, and build metadata. The dataset is immutable once built;
//! refresh means building a new one.

use std::path::Path;

use insight_core::error::{InsightError, Result};
use insight_core::models::{Column, Flavor, JoinedRecord, PersonLink, SessionRow};
use tracing::{debug, warn};

use crate::aggregate::{distinct_count, group_count, top_values, GroupCount, GroupOrder, ValueCount};
use crate::extract::{extract_flavor, ExtractedTables};
use crate::join::{join, sort_by_date_desc};
use crate::sources::SourceRegistry;

// ── Public types ──────────────────────────────────────────────────────────────

/// A flavor whose extraction pass failed, voiding its whole table set.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub flavor: Flavor,
    pub message: String,
}

/// Metadata produced alongside the dataset.
#[derive(Debug, Clone)]
pub struct DatasetMetadata {
    /// ISO-8601 timestamp when this dataset was built.
    pub generated_at: String,
    /// Number of configured sources across all flavors.
    pub sources_configured: usize,
    /// Wall-clock seconds spent reading and extracting batch files.
    pub extract_time_seconds: f64,
    /// Wall-clock seconds spent joining and sorting.
    pub join_time_seconds: f64,
}

/// Headline metrics of the dashboard.
#[derive(Debug, Clone)]
pub struct Kpis {
    pub total_curriculums: usize,
    pub total_lessons: usize,
    pub total_instructors: usize,
    pub total_trainees: usize,
    /// Busiest instructor by link count, with their session count.
    pub top_instructor: ValueCount,
    /// Busiest trainee by link count, with their session count.
    pub top_trainee: ValueCount,
}

/// The process-wide immutable snapshot built by one ingestion run.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub sessions: Vec<SessionRow>,
    pub instructors: Vec<PersonLink>,
    pub trainees: Vec<PersonLink>,
    /// Denormalized view, sorted by date descending.
    pub joined: Vec<JoinedRecord>,
    /// Flavors whose extraction failed (fail-closed: their tables are empty).
    pub source_failures: Vec<SourceFailure>,
    pub metadata: DatasetMetadata,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Build a dataset from every configured source.
///
/// Each flavor extracts independently and fail-closed: one unreadable
/// source empties that flavor's entire table set and records a
/// [`SourceFailure`], rather than letting partial numbers masquerade as
/// complete ones. The function itself never fails — an unusable dataset is
/// reported through [`Dataset::kpis`] and the failure list.
pub fn build_dataset(data_dir: &Path, registry: &SourceRegistry) -> Dataset {
    let extract_start = std::time::Instant::now();
    let mut tables = ExtractedTables::default();
    let mut source_failures = Vec::new();

    for flavor in Flavor::ALL {
        if registry.for_flavor(flavor).next().is_none() {
            continue;
        }
        match extract_flavor(data_dir, registry, flavor) {
            Ok(extracted) => tables.extend(extracted),
            Err(e) => {
                warn!("Extraction failed for {} flavor: {}", flavor, e);
                source_failures.push(SourceFailure {
                    flavor,
                    message: e.to_string(),
                });
            }
        }
    }
    let extract_time = extract_start.elapsed().as_secs_f64();

    let join_start = std::time::Instant::now();
    let mut joined = join(&tables.sessions, &tables.instructors, &tables.trainees);
    sort_by_date_desc(&mut joined);
    let join_time = join_start.elapsed().as_secs_f64();

    debug!(
        "Dataset built: {} sessions, {} joined rows, {} failed flavors",
        tables.sessions.len(),
        joined.len(),
        source_failures.len(),
    );

    Dataset {
        sessions: tables.sessions,
        instructors: tables.instructors,
        trainees: tables.trainees,
        joined,
        source_failures,
        metadata: DatasetMetadata {
            generated_at: chrono::Utc::now().to_rfc3339(),
            sources_configured: registry.len(),
            extract_time_seconds: extract_time,
            join_time_seconds: join_time,
        },
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

impl Dataset {
    /// `true` when the dataset cannot back valid KPIs: a flavor failed
    /// (fail-closed) or nothing was loaded at all.
    pub fn is_unavailable(&self) -> bool {
        !self.source_failures.is_empty() || self.sessions.is_empty()
    }

    /// Human-readable reason the dataset is unavailable, or `None`.
    pub fn unavailable_reason(&self) -> Option<String> {
        if let Some(failure) = self.source_failures.first() {
            return Some(format!("{} flavor failed: {}", failure.flavor, failure.message));
        }
        if self.sessions.is_empty() {
            return Some("no sessions loaded".to_string());
        }
        None
    }

    /// Headline KPIs, computed over the flat tables so that the join's
    /// cross-product expansion does not inflate anyone's counts.
    ///
    /// Fails with [`InsightError::EmptyInput`] when the dataset is
    /// unavailable — the caller must surface "unavailable", never a zero
    /// pretending to be a valid count.
    pub fn kpis(&self) -> Result<Kpis> {
        if let Some(reason) = self.unavailable_reason() {
            return Err(InsightError::EmptyInput(reason));
        }

        let top_instructor = top_values(
            self.instructors.iter().map(|l| l.display_name.clone()),
            1,
            "instructor",
        )?
        .remove(0);
        let top_trainee = top_values(
            self.trainees.iter().map(|l| l.display_name.clone()),
            1,
            "trainee",
        )?
        .remove(0);

        Ok(Kpis {
            total_curriculums: distinct_count(
                self.sessions.iter().map(|s| s.curriculum_code.as_str()),
            ),
            total_lessons: distinct_count(self.sessions.iter().map(|s| s.lesson_name.as_str())),
            total_instructors: distinct_count(
                self.instructors.iter().map(|l| l.display_name.as_str()),
            ),
            total_trainees: distinct_count(self.trainees.iter().map(|l| l.display_name.as_str())),
            top_instructor,
            top_trainee,
        })
    }

    /// Session counts per curriculum × lesson pair, for the distribution
    /// chart.
    pub fn lesson_distribution(&self) -> Vec<GroupCount> {
        group_count(
            &self.joined,
            &[Column::CurriculumCode, Column::LessonName],
            GroupOrder::FirstSeen,
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::BatchSource;
    use tempfile::TempDir;

    fn write_batch(dir: &Path, name: &str, doc: &serde_json::Value) {
        std::fs::write(dir.join(name), serde_json::to_string(doc).unwrap()).unwrap();
    }

    /// Simulator batch: session S1 on 15/01 with 1 instructor, 2 trainees.
    fn simulator_doc() -> serde_json::Value {
        serde_json::json!({
            "responseData": [{
                "sessions": [{
                    "sessionId": "S1",
                    "date": "15/01/2025",
                    "trainingCourseCode": "A320-TR",
                    "componentName": "LOFT 1",
                    "startTime": "08:00",
                    "endTime": "12:00",
                    "instructors": [
                        {"name": "Alice", "staffNumber": "1001", "dutyCode": "TRI"}
                    ],
                    "trainee": [
                        {"name": "Bob", "staffNumber": "2002", "dutyCode": "FO"},
                        {"name": "Carol", "staffNumber": "2003", "dutyCode": "CPT"}
                    ]
                }]
            }]
        })
    }

    /// Ground batch: session S2 on 20/01 with 0 instructors, 1 trainee.
    fn ground_doc() -> serde_json::Value {
        serde_json::json!({
            "responseData": [{
                "sessions": [{
                    "sessionId": "S2",
                    "date": "20/01/2025",
                    "trainingCourseCode": "B737-GS",
                    "componentName": "Performance",
                    "start Time": "09:00",
                    "endTime": "11:00",
                    "instructors": [],
                    "trainees": [
                        {"name": "Dave", "staffNumber": "3003", "dutyCode": "FO"}
                    ]
                }]
            }]
        })
    }

    fn two_flavor_registry() -> SourceRegistry {
        SourceRegistry::new(vec![
            BatchSource::new("sim.JSON", Flavor::Simulator),
            BatchSource::new("ground.JSON", Flavor::Ground),
        ])
    }

    // ── end-to-end scenario ────────────────────────────────────────────────

    #[test]
    fn test_build_dataset_two_flavors_end_to_end() {
        let dir = TempDir::new().unwrap();
        write_batch(dir.path(), "sim.JSON", &simulator_doc());
        write_batch(dir.path(), "ground.JSON", &ground_doc());

        let dataset = build_dataset(dir.path(), &two_flavor_registry());

        assert!(dataset.source_failures.is_empty());
        assert_eq!(dataset.sessions.len(), 2);

        // S1: 1 instructor × 2 trainees = 2 rows; S2: 0 × 1 = 1 row.
        assert_eq!(dataset.joined.len(), 3);
        let s1_rows: Vec<_> = dataset.joined.iter().filter(|r| r.session_id == "S1").collect();
        let s2_rows: Vec<_> = dataset.joined.iter().filter(|r| r.session_id == "S2").collect();
        assert_eq!(s1_rows.len(), 2);
        assert_eq!(s2_rows.len(), 1);
        assert!(s2_rows[0].instructor.is_none());
        assert_eq!(s2_rows[0].trainee.as_ref().unwrap().display_name, "Dave (3003)");

        // Sorted date descending: S2 (20/01) before S1 (15/01).
        assert_eq!(dataset.joined[0].session_id, "S2");
    }

    #[test]
    fn test_dataset_kpis() {
        let dir = TempDir::new().unwrap();
        write_batch(dir.path(), "sim.JSON", &simulator_doc());
        write_batch(dir.path(), "ground.JSON", &ground_doc());

        let dataset = build_dataset(dir.path(), &two_flavor_registry());
        let kpis = dataset.kpis().unwrap();

        assert_eq!(kpis.total_curriculums, 2);
        assert_eq!(kpis.total_lessons, 2);
        assert_eq!(kpis.total_instructors, 1);
        assert_eq!(kpis.total_trainees, 3);
        assert_eq!(kpis.top_instructor.value, "Alice (1001)");
        assert_eq!(kpis.top_instructor.count, 1);
        // Bob, Carol and Dave each appear once; first-seen wins the tie.
        assert_eq!(kpis.top_trainee.value, "Bob (2002)");
    }

    #[test]
    fn test_missing_source_fails_closed_for_its_flavor() {
        let dir = TempDir::new().unwrap();
        write_batch(dir.path(), "sim.JSON", &simulator_doc());
        // ground.JSON deliberately absent.

        let dataset = build_dataset(dir.path(), &two_flavor_registry());

        // Simulator tables load; ground flavor is voided entirely.
        assert_eq!(dataset.sessions.len(), 1);
        assert_eq!(dataset.source_failures.len(), 1);
        assert_eq!(dataset.source_failures[0].flavor, Flavor::Ground);

        // KPIs must surface as unavailable, not as valid-looking zeros.
        assert!(dataset.is_unavailable());
        let err = dataset.kpis().unwrap_err();
        assert!(matches!(err, InsightError::EmptyInput(_)));
        assert!(dataset.unavailable_reason().unwrap().contains("ground"));
    }

    #[test]
    fn test_empty_registry_dataset_unavailable() {
        let dir = TempDir::new().unwrap();
        let dataset = build_dataset(dir.path(), &SourceRegistry::new(vec![]));

        assert!(dataset.source_failures.is_empty());
        assert!(dataset.is_unavailable());
        assert_eq!(dataset.unavailable_reason().unwrap(), "no sessions loaded");
    }

    #[test]
    fn test_lesson_distribution() {
        let dir = TempDir::new().unwrap();
        write_batch(dir.path(), "sim.JSON", &simulator_doc());
        write_batch(dir.path(), "ground.JSON", &ground_doc());

        let dataset = build_dataset(dir.path(), &two_flavor_registry());
        let distribution = dataset.lesson_distribution();

        assert_eq!(distribution.len(), 2);
        // Joined view is date-descending, so B737 appears first.
        assert_eq!(distribution[0].key, vec!["B737-GS", "Performance"]);
        assert_eq!(distribution[0].count, 1);
        assert_eq!(distribution[1].key, vec!["A320-TR", "LOFT 1"]);
        assert_eq!(distribution[1].count, 2);
    }

    #[test]
    fn test_metadata_populated() {
        let dir = TempDir::new().unwrap();
        write_batch(dir.path(), "sim.JSON", &simulator_doc());
        write_batch(dir.path(), "ground.JSON", &ground_doc());

        let dataset = build_dataset(dir.path(), &two_flavor_registry());

        assert!(!dataset.metadata.generated_at.is_empty());
        assert_eq!(dataset.metadata.sources_configured, 2);
        assert!(dataset.metadata.extract_time_seconds >= 0.0);
        assert!(dataset.metadata.join_time_seconds >= 0.0);
    }
}
