use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Training-session insights over periodic TMS batch exports
#[derive(Parser, Debug, Clone)]
pub struct Settings {
    /// Directory containing the batch export files
    #[arg(long, env = "TMS_INSIGHTS_DATA")]
    pub data_dir: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path (stderr when absent)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Resolve the batch data directory.
    ///
    /// Order: `--data-dir` / `TMS_INSIGHTS_DATA`, then the default
    /// `~/.tms-insights/batches`. The directory is not required to exist —
    /// a missing source surfaces later as the fail-closed empty dataset.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        default_data_dir()
    }
}

/// Default batch directory: `~/.tms-insights/batches`.
pub fn default_data_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".tms-insights").join("batches")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        Settings::try_parse_from(args).expect("settings parse")
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let settings = parse(&["tms-insights", "--data-dir", "/srv/batches"]);
        assert_eq!(settings.resolve_data_dir(), PathBuf::from("/srv/batches"));
    }

    #[test]
    fn test_default_data_dir_under_home() {
        let settings = parse(&["tms-insights"]);
        let resolved = settings.resolve_data_dir();
        assert!(resolved.ends_with(".tms-insights/batches"));
    }

    #[test]
    fn test_default_log_level_is_info() {
        let settings = parse(&["tms-insights"]);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let result = Settings::try_parse_from(["tms-insights", "--log-level", "TRACE"]);
        assert!(result.is_err());
    }
}
