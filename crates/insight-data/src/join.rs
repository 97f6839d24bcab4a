//! Join engine: flat tables → denormalized record view.
//!
//! Two composable pure left joins keyed on `session_id`: sessions against
//! instructor links, then the result against trainee links. A session with
//! zero links on one side keeps a single `None` placeholder for that side;
//! otherwise each session expands to the i × t cross product. Dangling
//! links (no matching session) are silently dropped — the join is
//! session-anchored. No I/O anywhere in this module.

use std::collections::HashMap;

use insight_core::models::{JoinedRecord, PersonFields, PersonLink, SessionRow};

// ── Joins ─────────────────────────────────────────────────────────────────────

/// Left-join instructor links onto sessions.
///
/// Output order: session extraction order, each session's links in their
/// own extraction order. `trainee` is `None` on every row at this stage.
pub fn join_instructors(sessions: &[SessionRow], links: &[PersonLink]) -> Vec<JoinedRecord> {
    let index = index_by_session(links);
    let mut records = Vec::with_capacity(sessions.len());

    for session in sessions {
        match index.get(session.session_id.as_str()) {
            Some(matched) => {
                for link in matched {
                    records.push(base_record(session, Some(PersonFields::from(*link))));
                }
            }
            None => records.push(base_record(session, None)),
        }
    }

    records
}

/// Left-join trainee links onto an instructor-joined view.
pub fn join_trainees(rows: &[JoinedRecord], links: &[PersonLink]) -> Vec<JoinedRecord> {
    let index = index_by_session(links);
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        match index.get(row.session_id.as_str()) {
            Some(matched) => {
                for link in matched {
                    let mut record = row.clone();
                    record.trainee = Some(PersonFields::from(*link));
                    records.push(record);
                }
            }
            None => records.push(row.clone()),
        }
    }

    records
}

/// The full two-stage join: sessions ⟕ instructors, then ⟕ trainees.
pub fn join(
    sessions: &[SessionRow],
    instructors: &[PersonLink],
    trainees: &[PersonLink],
) -> Vec<JoinedRecord> {
    join_trainees(&join_instructors(sessions, instructors), trainees)
}

/// Caller-visible ordering: date descending, stable (ties and null dates
/// keep extraction order; null dates sort last).
pub fn sort_by_date_desc(records: &mut [JoinedRecord]) {
    // Option<NaiveDate> orders None first ascending, so the reversed
    // comparison puts newest dates first and null dates last.
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Index links by session id, preserving per-key extraction order.
fn index_by_session<'a>(links: &'a [PersonLink]) -> HashMap<&'a str, Vec<&'a PersonLink>> {
    let mut index: HashMap<&str, Vec<&PersonLink>> = HashMap::new();
    for link in links {
        index.entry(link.session_id.as_str()).or_default().push(link);
    }
    index
}

fn base_record(session: &SessionRow, instructor: Option<PersonFields>) -> JoinedRecord {
    JoinedRecord {
        session_id: session.session_id.clone(),
        date: session.date,
        curriculum_code: session.curriculum_code.clone(),
        lesson_name: session.lesson_name.clone(),
        start_time: session.start_time.clone(),
        end_time: session.end_time.clone(),
        instructor,
        trainee: None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
