//! Record extractor: batch documents → flat tables.
//!
//! Walks the nested `responseData[].sessions[]` structure of one batch
//! source and emits three flat row-sets (sessions, instructor links,
//! trainee links) in document order. A missing or unreadable source fails
//! the whole pass for its flavor — partial results are never returned.

use std::path::Path;

use insight_core::dates::parse_batch_date;
use insight_core::error::{InsightError, Result};
use insight_core::models::{compose_display_name, Flavor, PersonLink, SessionRow, EMAIL_SENTINEL};
use tracing::{debug, warn};

use crate::schema::{
    schema_for, FlavorSchema, SessionField, PERSON_DUTY_KEY, PERSON_EMAIL_KEY, PERSON_NAME_KEY,
    PERSON_STAFF_KEY,
};
use crate::sources::{BatchSource, SourceRegistry};

// ── ExtractedTables ───────────────────────────────────────────────────────────

/// The three ordered row-sets produced by one extraction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedTables {
    pub sessions: Vec<SessionRow>,
    pub instructors: Vec<PersonLink>,
    pub trainees: Vec<PersonLink>,
}

impl ExtractedTables {
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.instructors.is_empty() && self.trainees.is_empty()
    }

    /// Append another pass's rows, preserving extraction order.
    pub fn extend(&mut self, other: ExtractedTables) {
        self.sessions.extend(other.sessions);
        self.instructors.extend(other.instructors);
        self.trainees.extend(other.trainees);
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Extract one batch source into flat tables.
///
/// Fails with [`InsightError::SourceNotFound`] when the file is missing or
/// unreadable, and with [`InsightError::JsonParse`] when it is not valid
/// JSON. Per-record problems (bad dates, absent fields) never fail the
/// pass: dates coerce to `None`, missing emails become `"N/A"`, other
/// missing strings default to empty.
pub fn extract_source(data_dir: &Path, source: &BatchSource) -> Result<ExtractedTables> {
    let path = data_dir.join(&source.file_name);
    let raw = std::fs::read_to_string(&path).map_err(|e| InsightError::SourceNotFound {
        path: path.clone(),
        source: e,
    })?;
    let doc: serde_json::Value = serde_json::from_str(&raw)?;

    let schema = schema_for(source.flavor);
    let mut tables = ExtractedTables::default();

    let envelopes = doc
        .get("responseData")
        .and_then(|v| v.as_array())
        .map(|a| a.as_slice())
        .unwrap_or(&[]);

    for envelope in envelopes {
        let sessions = envelope
            .get("sessions")
            .and_then(|v| v.as_array())
            .map(|a| a.as_slice())
            .unwrap_or(&[]);

        for session in sessions {
            extract_session(session, schema, &source.file_name, &mut tables);
        }
    }

    debug!(
        "Source {}: {} sessions, {} instructor links, {} trainee links",
        source.file_name,
        tables.sessions.len(),
        tables.instructors.len(),
        tables.trainees.len(),
    );

    Ok(tables)
}

/// Extract every configured source of one flavor, fail-closed.
///
/// The first failing source voids the entire run for the flavor: the
/// caller receives the error and must treat all three tables as empty.
/// One missing file zeroes the whole dataset rather than silently showing
/// incomplete numbers as complete.
pub fn extract_flavor(
    data_dir: &Path,
    registry: &SourceRegistry,
    flavor: Flavor,
) -> Result<ExtractedTables> {
    let mut all = ExtractedTables::default();

    for source in registry.for_flavor(flavor) {
        let tables = extract_source(data_dir, source)?;
        all.extend(tables);
    }

    Ok(all)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Flatten one nested session object into a session row plus link rows.
fn extract_session(
    session: &serde_json::Value,
    schema: &FlavorSchema,
    file_name: &str,
    tables: &mut ExtractedTables,
) {
    let session_id = string_field(session, schema.source_key(SessionField::SessionId));

    let raw_date = session
        .get(schema.source_key(SessionField::Date))
        .and_then(|v| v.as_str());
    let date = raw_date.and_then(parse_batch_date);
    if let Some(raw) = raw_date {
        if date.is_none() {
            warn!(
                "Unparseable date {:?} on session {} in {}; coerced to null",
                raw, session_id, file_name
            );
        }
    }

    tables.sessions.push(SessionRow {
        session_id: session_id.clone(),
        date,
        curriculum_code: string_field(session, schema.source_key(SessionField::CurriculumCode)),
        lesson_name: string_field(session, schema.source_key(SessionField::LessonName)),
        start_time: string_field(session, schema.source_key(SessionField::StartTime)),
        end_time: string_field(session, schema.source_key(SessionField::EndTime)),
    });

    // Empty or absent collections yield zero link rows, never placeholders.
    for person in array_field(session, schema.instructors_key) {
        tables.instructors.push(person_link(&session_id, person));
    }
    for person in array_field(session, schema.trainees_key) {
        tables.trainees.push(person_link(&session_id, person));
    }
}

/// Build a link row from one nested person object.
fn person_link(session_id: &str, person: &serde_json::Value) -> PersonLink {
    let name = string_field(person, PERSON_NAME_KEY);
    let staff = string_field(person, PERSON_STAFF_KEY);
    let email = person
        .get(PERSON_EMAIL_KEY)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(EMAIL_SENTINEL)
        .to_string();

    PersonLink {
        session_id: session_id.to_string(),
        display_name: compose_display_name(&name, &staff),
        email,
        duty_code: string_field(person, PERSON_DUTY_KEY),
    }
}

/// String value of `key`, accepting bare numbers (staff ids are sometimes
/// exported unquoted). Missing or null → empty string.
fn string_field(value: &serde_json::Value, key: &str) -> String {
    match value.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Array under `key`, or empty when absent / not an array.
fn array_field<'a>(value: &'a serde_json::Value, key: &str) -> &'a [serde_json::Value] {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|a| a.as_slice())
        .unwrap_or(&[])
}

// ── Tests ─────────────────────────────────────────────────────────────────────
