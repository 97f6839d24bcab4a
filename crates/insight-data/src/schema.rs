//! Schema normalizer: per-flavor field-name tables.
//!
//! The two export flavors name the same logical fields differently
//! (`startTime` vs `start Time`, `trainee` vs `trainees`). All of that
//! drift is isolated here in one lookup table per flavor; extraction only
//! ever asks the table, so future drift touches this file and nothing
//! else. Unknown source fields are dropped, never propagated.

use insight_core::models::Flavor;

// ── Canonical session fields ──────────────────────────────────────────────────

/// Canonical attributes of a session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionField {
    SessionId,
    Date,
    CurriculumCode,
    LessonName,
    StartTime,
    EndTime,
}

impl SessionField {
    pub const ALL: [SessionField; 6] = [
        SessionField::SessionId,
        SessionField::Date,
        SessionField::CurriculumCode,
        SessionField::LessonName,
        SessionField::StartTime,
        SessionField::EndTime,
    ];
}

// ── Person fields (identical across flavors) ──────────────────────────────────

pub const PERSON_NAME_KEY: &str = "name";
pub const PERSON_STAFF_KEY: &str = "staffNumber";
pub const PERSON_EMAIL_KEY: &str = "email";
pub const PERSON_DUTY_KEY: &str = "dutyCode";

// ── FlavorSchema ──────────────────────────────────────────────────────────────

/// Field-name mapping for one flavor.
///
/// A pure, stateless, total table: every canonical session field has
/// exactly one source name, and every known source name maps to exactly
/// one canonical field.
#[derive(Debug)]
pub struct FlavorSchema {
    fields: &'static [(&'static str, SessionField)],
    /// Key of the nested instructor collection.
    pub instructors_key: &'static str,
    /// Key of the nested trainee collection.
    pub trainees_key: &'static str,
}

const SIMULATOR_SCHEMA: FlavorSchema = FlavorSchema {
    fields: &[
        ("sessionId", SessionField::SessionId),
        ("date", SessionField::Date),
        ("trainingCourseCode", SessionField::CurriculumCode),
        ("componentName", SessionField::LessonName),
        ("startTime", SessionField::StartTime),
        ("endTime", SessionField::EndTime),
    ],
    instructors_key: "instructors",
    trainees_key: "trainee",
};

const GROUND_SCHEMA: FlavorSchema = FlavorSchema {
    fields: &[
        ("sessionId", SessionField::SessionId),
        ("date", SessionField::Date),
        ("trainingCourseCode", SessionField::CurriculumCode),
        ("componentName", SessionField::LessonName),
        ("start Time", SessionField::StartTime),
        ("endTime", SessionField::EndTime),
    ],
    instructors_key: "instructors",
    trainees_key: "trainees",
};

/// The field table for `flavor`.
pub fn schema_for(flavor: Flavor) -> &'static FlavorSchema {
    match flavor {
        Flavor::Simulator => &SIMULATOR_SCHEMA,
        Flavor::Ground => &GROUND_SCHEMA,
    }
}

impl FlavorSchema {
    /// Source name carrying `field` in this flavor. Total: every canonical
    /// field has a source name.
    pub fn source_key(&self, field: SessionField) -> &'static str {
        // The tables above are exhaustive over SessionField by construction.
        self.fields
            .iter()
            .find(|(_, f)| *f == field)
            .map(|(key, _)| *key)
            .expect("flavor schema covers every canonical session field")
    }

    /// Canonical field for a source name, or `None` for unknown fields
    /// (which are dropped during extraction).
    pub fn canonical(&self, source_field: &str) -> Option<SessionField> {
        self.fields
            .iter()
            .find(|(key, _)| *key == source_field)
            .map(|(_, field)| *field)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_field_names() {
        let schema = schema_for(Flavor::Simulator);
        assert_eq!(schema.source_key(SessionField::StartTime), "startTime");
        assert_eq!(schema.trainees_key, "trainee");
        assert_eq!(schema.instructors_key, "instructors");
    }

    #[test]
    fn test_ground_field_names() {
        let schema = schema_for(Flavor::Ground);
        assert_eq!(schema.source_key(SessionField::StartTime), "start Time");
        assert_eq!(schema.trainees_key, "trainees");
    }

    #[test]
    fn test_shared_field_names_agree_across_flavors() {
        for field in [
            SessionField::SessionId,
            SessionField::Date,
            SessionField::CurriculumCode,
            SessionField::LessonName,
            SessionField::EndTime,
        ] {
            assert_eq!(
                schema_for(Flavor::Simulator).source_key(field),
                schema_for(Flavor::Ground).source_key(field),
            );
        }
    }

    #[test]
    fn test_canonical_lookup_known_fields() {
        let schema = schema_for(Flavor::Simulator);
        assert_eq!(
            schema.canonical("trainingCourseCode"),
            Some(SessionField::CurriculumCode)
        );
        assert_eq!(schema.canonical("componentName"), Some(SessionField::LessonName));
    }

    #[test]
    fn test_canonical_lookup_unknown_field_dropped() {
        let schema = schema_for(Flavor::Ground);
        assert_eq!(schema.canonical("somethingNew"), None);
        // Flavor-crossed name is unknown too: dispatch is by tag, not sniffing.
        assert_eq!(schema.canonical("startTime"), None);
    }

    #[test]
    fn test_tables_are_total_over_session_fields() {
        for flavor in Flavor::ALL {
            let schema = schema_for(flavor);
            for field in SessionField::ALL {
                let key = schema.source_key(field);
                assert_eq!(schema.canonical(key), Some(field));
            }
        }
    }
}
