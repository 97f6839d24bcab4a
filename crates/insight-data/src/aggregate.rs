//! Aggregation service: grouped counts and leaderboard metrics.
//!
//! Grouped counts back the curriculum × lesson distribution; top-N backs
//! the busiest-instructor/busiest-trainee leaderboards. Only combinations
//! actually present in the data appear (no zero-filling), and an empty
//! input is an error for top-N — there is no valid "top" of nothing, and
//! the caller must not confuse that with a zero count.

use std::collections::HashMap;

use insight_core::error::{InsightError, Result};
use insight_core::models::{Column, JoinedRecord};

// ── Grouped counts ────────────────────────────────────────────────────────────

/// Ordering of grouped-count output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrder {
    /// Stable order by first appearance of the key in the input.
    FirstSeen,
    /// Count descending; ties keep first-seen order.
    CountDescending,
}

/// Count of records sharing one unique key tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    /// One value per grouping column, in the caller's column order.
    pub key: Vec<String>,
    pub count: usize,
}

/// Count records per unique combination of `columns`.
///
/// Records with a null value in any grouping column are skipped, matching
/// the dashboard's drop-null grouping semantics. No zero-filling for
/// absent combinations.
pub fn group_count(
    records: &[JoinedRecord],
    columns: &[Column],
    order: GroupOrder,
) -> Vec<GroupCount> {
    let mut groups: Vec<GroupCount> = Vec::new();
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();

    for record in records {
        let key: Option<Vec<String>> = columns.iter().map(|c| c.value_opt(record)).collect();
        let Some(key) = key else { continue };

        match index.get(&key) {
            Some(&i) => groups[i].count += 1,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(GroupCount { key, count: 1 });
            }
        }
    }

    if order == GroupOrder::CountDescending {
        // Stable sort: ties keep first-seen order.
        groups.sort_by_key(|g| std::cmp::Reverse(g.count));
    }

    groups
}

// ── Leaderboards ──────────────────────────────────────────────────────────────

/// One leaderboard entry: a field value and its frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Top `n` most frequent values of `column` across `records`, count
/// descending, ties broken by first appearance.
///
/// Null projections are skipped; fails with [`InsightError::EmptyInput`]
/// when the record set is empty or no record carries a value.
pub fn top_n(records: &[JoinedRecord], column: Column, n: usize) -> Result<Vec<ValueCount>> {
    top_values(
        records.iter().filter_map(|r| column.value_opt(r)),
        n,
        column.header(),
    )
}

/// Frequency leaderboard over an arbitrary value stream.
///
/// Shared by [`top_n`] and the KPI layer, which counts over the flat link
/// tables rather than the joined view so that cross-product expansion does
/// not inflate anyone's session count.
pub fn top_values(
    values: impl IntoIterator<Item = String>,
    n: usize,
    what: &str,
) -> Result<Vec<ValueCount>> {
    let mut tallies: Vec<ValueCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for value in values {
        match index.get(&value) {
            Some(&i) => tallies[i].count += 1,
            None => {
                index.insert(value.clone(), tallies.len());
                tallies.push(ValueCount { value, count: 1 });
            }
        }
    }

    if tallies.is_empty() {
        return Err(InsightError::EmptyInput(format!("top {} of {}", n, what)));
    }

    // Stable sort keeps first-seen order among equal counts.
    tallies.sort_by_key(|t| std::cmp::Reverse(t.count));
    tallies.truncate(n);
    Ok(tallies)
}

/// Number of distinct values in a stream (null-skipping is the caller's
/// concern).
pub fn distinct_count<'a>(values: impl IntoIterator<Item = &'a str>) -> usize {
    let mut seen: std::collections::HashSet<&str> = std::collections::HashSet::new();
    for value in values {
        seen.insert(value);
    }
    seen.len()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
