//! Batch source registry.
//!
//! Each dataset flavor ships as a fixed, pre-configured list of export
//! files covering successive date ranges. The registry is the only place
//! that knows which files exist and which flavor each one carries;
//! extraction dispatches on the registry's flavor tag, never on file
//! content.

use std::path::Path;

use insight_core::models::Flavor;
use tracing::warn;

// ── Configured source lists ───────────────────────────────────────────────────

/// Simulator export files, Dec 2024 – Jul 2025.
const SIMULATOR_FILES: &[&str] = &[
    "S_01-15_DEC24_response.JSON",
    "S_15-31_DEC24_response.JSON",
    "S_01-15_JAN25_response.JSON",
    "S_15-31_JAN25_response.JSON",
    "S_01-15_FEB25_response.JSON",
    "S_15-28_FEB25_response.JSON",
    "S_01-15_MAR25_response.JSON",
    "S_15-31_MAR25_response.JSON",
    "S_01-15_APR25_response.JSON",
    "S_15-30_APR25_response.JSON",
    "S_01-31_MAY25_response.JSON",
    "S_01-30_JUN25_response.JSON",
    "S_28MAY25_31JUL25_response.JSON",
];

/// Ground-school export files (monthly cadence), Dec 2024 – Jul 2025.
const GROUND_FILES: &[&str] = &[
    "G_DEC24_response.JSON",
    "G_JAN25_response.JSON",
    "G_FEB25_response.JSON",
    "G_MAR25_response.JSON",
    "G_APR25_response.JSON",
    "G_MAY25_response.JSON",
    "G_JUN25_response.JSON",
    "G_JUL25_response.JSON",
];

// ── BatchSource ───────────────────────────────────────────────────────────────

/// One pre-configured input document, tagged with its schema flavor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSource {
    /// File name relative to the batch data directory.
    pub file_name: String,
    pub flavor: Flavor,
}

impl BatchSource {
    pub fn new(file_name: impl Into<String>, flavor: Flavor) -> Self {
        Self {
            file_name: file_name.into(),
            flavor,
        }
    }
}

// ── SourceRegistry ────────────────────────────────────────────────────────────

/// Static enumeration of the batch sources for both flavors.
///
/// Not user-configurable at runtime; construction-time override exists for
/// tests and alternative deployments.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<BatchSource>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        let mut sources = Vec::with_capacity(SIMULATOR_FILES.len() + GROUND_FILES.len());
        for file in SIMULATOR_FILES {
            sources.push(BatchSource::new(*file, Flavor::Simulator));
        }
        for file in GROUND_FILES {
            sources.push(BatchSource::new(*file, Flavor::Ground));
        }
        Self { sources }
    }
}

impl SourceRegistry {
    /// Build a registry from an explicit source list.
    pub fn new(sources: Vec<BatchSource>) -> Self {
        Self { sources }
    }

    /// All configured sources, in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &BatchSource> {
        self.sources.iter()
    }

    /// The configured sources of one flavor, in registry order.
    pub fn for_flavor(&self, flavor: Flavor) -> impl Iterator<Item = &BatchSource> {
        self.sources.iter().filter(move |s| s.flavor == flavor)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Compare the registry against the batch directory on disk.
    ///
    /// Used by the `sources` report: a missing registered file is a
    /// configuration-level problem reported once, never retried.
    pub fn audit(&self, data_dir: &Path) -> SourceAudit {
        let on_disk = discover_batch_files(data_dir);

        let registered = self
            .sources
            .iter()
            .map(|source| {
                let present = on_disk.iter().any(|f| f == &source.file_name);
                (source.clone(), present)
            })
            .collect();

        let unregistered = on_disk
            .into_iter()
            .filter(|f| !self.sources.iter().any(|s| &s.file_name == f))
            .collect();

        SourceAudit {
            registered,
            unregistered,
        }
    }
}

/// Result of comparing the registry against the files present on disk.
#[derive(Debug, Clone)]
pub struct SourceAudit {
    /// Every configured source paired with its on-disk presence.
    pub registered: Vec<(BatchSource, bool)>,
    /// Batch-looking files on disk that no registry entry claims.
    pub unregistered: Vec<String>,
}

impl SourceAudit {
    /// File names of configured sources missing from disk.
    pub fn missing(&self) -> Vec<&str> {
        self.registered
            .iter()
            .filter(|(_, present)| !present)
            .map(|(s, _)| s.file_name.as_str())
            .collect()
    }
}

/// Find all `.json` batch files directly under `data_dir`, sorted by name.
pub fn discover_batch_files(data_dir: &Path) -> Vec<String> {
    if !data_dir.exists() {
        warn!("Batch data directory does not exist: {}", data_dir.display());
        return Vec::new();
    }

    let mut files: Vec<String> = walkdir::WalkDir::new(data_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
        })
        .filter_map(|entry| entry.file_name().to_str().map(|s| s.to_string()))
        .collect();

    files.sort();
    files
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_registry_covers_both_flavors() {
        let registry = SourceRegistry::default();
        assert_eq!(registry.for_flavor(Flavor::Simulator).count(), 13);
        assert_eq!(registry.for_flavor(Flavor::Ground).count(), 8);
        assert_eq!(registry.len(), 21);
    }

    #[test]
    fn test_default_registry_keeps_file_order() {
        let registry = SourceRegistry::default();
        let first = registry.for_flavor(Flavor::Simulator).next().unwrap();
        assert_eq!(first.file_name, "S_01-15_DEC24_response.JSON");
    }

    #[test]
    fn test_custom_registry() {
        let registry = SourceRegistry::new(vec![BatchSource::new("x.JSON", Flavor::Ground)]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.for_flavor(Flavor::Simulator).count(), 0);
    }

    #[test]
    fn test_discover_batch_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.JSON"), "{}").unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = discover_batch_files(dir.path());
        assert_eq!(files, vec!["a.json", "b.JSON"]);
    }

    #[test]
    fn test_discover_batch_files_missing_dir() {
        let files = discover_batch_files(Path::new("/tmp/does-not-exist-insights-test"));
        assert!(files.is_empty());
    }

    #[test]
    fn test_discover_ignores_nested_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("archive");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("old.JSON"), "{}").unwrap();
        std::fs::write(dir.path().join("current.JSON"), "{}").unwrap();

        let files = discover_batch_files(dir.path());
        assert_eq!(files, vec!["current.JSON"]);
    }

    #[test]
    fn test_audit_reports_missing_and_unregistered() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("present.JSON"), "{}").unwrap();
        std::fs::write(dir.path().join("stray.JSON"), "{}").unwrap();

        let registry = SourceRegistry::new(vec![
            BatchSource::new("present.JSON", Flavor::Simulator),
            BatchSource::new("absent.JSON", Flavor::Ground),
        ]);
        let audit = registry.audit(dir.path());

        assert_eq!(audit.missing(), vec!["absent.JSON"]);
        assert_eq!(audit.unregistered, vec!["stray.JSON"]);
        assert_eq!(audit.registered.len(), 2);
    }
}
