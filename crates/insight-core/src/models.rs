use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::format_canonical;

// ── Flavor ────────────────────────────────────────────────────────────────────

/// Input schema variant of a batch source.
///
/// The two observed export flavors carry the same nested shape but diverge
/// in field naming, so every source is tagged with its flavor up front and
/// extraction dispatches on the tag — content is never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Simulator exports: `trainee` collection key, `startTime` field.
    Simulator,
    /// Ground-school exports: `trainees` collection key, `start Time` field.
    Ground,
}

impl Flavor {
    /// Both flavors, in registry order.
    pub const ALL: [Flavor; 2] = [Flavor::Simulator, Flavor::Ground];

    /// Short label used in logs and the `sources` report.
    pub fn label(self) -> &'static str {
        match self {
            Flavor::Simulator => "simulator",
            Flavor::Ground => "ground",
        }
    }
}

impl std::fmt::Display for Flavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Flat tables ───────────────────────────────────────────────────────────────

/// One training session, flattened out of a batch document.
///
/// `session_id` is unique within a single extraction pass only; overlapping
/// batches that describe the same session produce distinct rows (no
/// cross-batch dedupe). Immutable once extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRow {
    pub session_id: String,
    /// Calendar date parsed from `DD/MM/YYYY`; `None` when absent or
    /// unparseable.
    pub date: Option<NaiveDate>,
    pub curriculum_code: String,
    pub lesson_name: String,
    /// Opaque string, no semantic parsing.
    pub start_time: String,
    /// Opaque string, no semantic parsing.
    pub end_time: String,
}

/// One instructor or trainee attached to a session.
///
/// `session_id` is a soft foreign key: dangling links are tolerated and
/// simply never match during the join. `email` is resolved to the `"N/A"`
/// sentinel at extraction time, never left absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonLink {
    pub session_id: String,
    /// Composed as `"{name} ({staffId})"`.
    pub display_name: String,
    pub email: String,
    pub duty_code: String,
}

/// Sentinel stored when a person record carries no email address.
pub const EMAIL_SENTINEL: &str = "N/A";

/// Compose the canonical `"{name} ({staffId})"` display name.
pub fn compose_display_name(name: &str, staff_id: &str) -> String {
    format!("{} ({})", name, staff_id)
}

// ── Joined view ───────────────────────────────────────────────────────────────

/// Person fields as they appear on a joined row (no foreign key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonFields {
    pub display_name: String,
    pub email: String,
    pub duty_code: String,
}

impl From<&PersonLink> for PersonFields {
    fn from(link: &PersonLink) -> Self {
        Self {
            display_name: link.display_name.clone(),
            email: link.email.clone(),
            duty_code: link.duty_code.clone(),
        }
    }
}

/// One row of the fully denormalized session × instructor × trainee view.
///
/// Sessions with no links on one side still appear, with `None` for that
/// side — standard left-join semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
    pub session_id: String,
    pub date: Option<NaiveDate>,
    pub curriculum_code: String,
    pub lesson_name: String,
    pub start_time: String,
    pub end_time: String,
    pub instructor: Option<PersonFields>,
    pub trainee: Option<PersonFields>,
}

// ── Canonical columns ─────────────────────────────────────────────────────────

/// The canonical column set of the joined view, in export order.
///
/// Every consumer that needs a string form of a record — the free-text
/// search clause, both export encoders, the summary display — goes through
/// [`Column::value`], so what is searched always matches what is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    SessionId,
    Date,
    CurriculumCode,
    LessonName,
    StartTime,
    EndTime,
    Instructor,
    InstructorEmail,
    InstructorDutyCode,
    Trainee,
    TraineeEmail,
    TraineeDutyCode,
}

impl Column {
    /// All canonical columns, in export order.
    pub const ALL: [Column; 12] = [
        Column::SessionId,
        Column::Date,
        Column::CurriculumCode,
        Column::LessonName,
        Column::StartTime,
        Column::EndTime,
        Column::Instructor,
        Column::InstructorEmail,
        Column::InstructorDutyCode,
        Column::Trainee,
        Column::TraineeEmail,
        Column::TraineeDutyCode,
    ];

    /// Canonical header name, as written by the export encoders.
    pub fn header(self) -> &'static str {
        match self {
            Column::SessionId => "sessionId",
            Column::Date => "date",
            Column::CurriculumCode => "curriculumCode",
            Column::LessonName => "lessonName",
            Column::StartTime => "startTime",
            Column::EndTime => "endTime",
            Column::Instructor => "instructor",
            Column::InstructorEmail => "instructorEmail",
            Column::InstructorDutyCode => "instructorDutyCode",
            Column::Trainee => "trainee",
            Column::TraineeEmail => "traineeEmail",
            Column::TraineeDutyCode => "traineeDutyCode",
        }
    }

    /// The column value when it is genuinely present on the record.
    ///
    /// `None` for a null date and for person columns on a row whose join
    /// side is unmatched. Membership and leaderboard aggregation use this
    /// so that null values never match a set or count toward a top-N.
    pub fn value_opt(self, record: &JoinedRecord) -> Option<String> {
        match self {
            Column::SessionId => Some(record.session_id.clone()),
            Column::Date => record.date.map(|d| format_canonical(Some(d))),
            Column::CurriculumCode => Some(record.curriculum_code.clone()),
            Column::LessonName => Some(record.lesson_name.clone()),
            Column::StartTime => Some(record.start_time.clone()),
            Column::EndTime => Some(record.end_time.clone()),
            Column::Instructor => record.instructor.as_ref().map(|p| p.display_name.clone()),
            Column::InstructorEmail => record.instructor.as_ref().map(|p| p.email.clone()),
            Column::InstructorDutyCode => record.instructor.as_ref().map(|p| p.duty_code.clone()),
            Column::Trainee => record.trainee.as_ref().map(|p| p.display_name.clone()),
            Column::TraineeEmail => record.trainee.as_ref().map(|p| p.email.clone()),
            Column::TraineeDutyCode => record.trainee.as_ref().map(|p| p.duty_code.clone()),
        }
    }

    /// Canonical string projection: like [`Column::value_opt`] but with
    /// nulls projected as the empty string. This is the form searched by
    /// the free-text clause and written by the export encoders.
    pub fn value(self, record: &JoinedRecord) -> String {
        self.value_opt(record).unwrap_or_default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
