//! Query/filter service over the joined record view.
//!
//! A [`FilterSet`] is a conjunction of independently optional clauses:
//! per-column membership sets, an inclusive date range, and a
//! case-insensitive free-text search across every canonical column. The
//! predicate set changes interactively, so search is computed fresh on
//! every call — no pre-built index. Filtering never mutates its input and
//! never raises.

use std::collections::HashSet;

use chrono::NaiveDate;
use insight_core::models::{Column, JoinedRecord};

// ── FilterSet ─────────────────────────────────────────────────────────────────

/// Membership restriction on one canonical column.
///
/// A present clause with an empty value set matches nothing — deliberately
/// distinct from an absent clause, which matches everything.
#[derive(Debug, Clone)]
pub struct MembershipClause {
    pub column: Column,
    pub values: HashSet<String>,
}

/// The conjunction of filter clauses applied to the joined view.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub membership: Vec<MembershipClause>,
    /// Inclusive `[start, end]` bounds on the session date. Records with a
    /// null date are excluded while this clause is active.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Case-insensitive substring matched against every column's canonical
    /// projection.
    pub search: Option<String>,
}

impl FilterSet {
    /// `true` when no clause restricts anything.
    pub fn is_empty(&self) -> bool {
        self.membership.is_empty() && self.date_range.is_none() && self.search.is_none()
    }

    /// Add a membership clause on `column`.
    pub fn with_membership<I, S>(mut self, column: Column, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.membership.push(MembershipClause {
            column,
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Restrict to dates within `[start, end]` inclusive.
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some((start, end));
        self
    }

    /// Add a free-text search clause.
    pub fn with_search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }
}

// ── Application ───────────────────────────────────────────────────────────────

/// Apply `filters` to `records`, returning the kept rows in input order.
///
/// An empty filter set is the identity. All clauses are evaluated per
/// record with AND semantics; malformed predicate values can only shrink
/// the result, never error.
pub fn apply(records: &[JoinedRecord], filters: &FilterSet) -> Vec<JoinedRecord> {
    if filters.is_empty() {
        return records.to_vec();
    }

    let needle = filters.search.as_ref().map(|s| s.to_lowercase());

    records
        .iter()
        .filter(|record| matches(record, filters, needle.as_deref()))
        .cloned()
        .collect()
}

fn matches(record: &JoinedRecord, filters: &FilterSet, needle: Option<&str>) -> bool {
    for clause in &filters.membership {
        // A null column value can never belong to a membership set.
        match clause.column.value_opt(record) {
            Some(value) if clause.values.contains(&value) => {}
            _ => return false,
        }
    }

    if let Some((start, end)) = filters.date_range {
        match record.date {
            Some(date) if start <= date && date <= end => {}
            _ => return false,
        }
    }

    if let Some(needle) = needle {
        let hit = Column::ALL
            .iter()
            .any(|col| col.value(record).to_lowercase().contains(needle));
        if !hit {
            return false;
        }
    }

    true
}

// ── Tests ─────────────────────────────────────────────────────────────────────
