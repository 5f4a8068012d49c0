use crate::playback::DEFAULT_INTERVAL;
use crate::years::{DEFAULT_DATA_URL, DEFAULT_INDEX};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// World borders through history, in the terminal
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Base URL of the per-year borders GeoJSON files
    #[arg(long, default_value = DEFAULT_DATA_URL)]
    pub data_url: String,

    /// Milliseconds between years while playing
    #[arg(long, default_value_t = DEFAULT_INTERVAL.as_millis() as u64)]
    pub interval_ms: u64,

    /// Catalog position to open on (0 = 2000 BC)
    #[arg(long, default_value_t = DEFAULT_INDEX)]
    pub start_index: usize,

    /// Natural Earth coastline GeoJSON for the base layer
    #[arg(long)]
    pub coastlines: Option<PathBuf>,

    /// Where log output goes (stdout belongs to the map)
    #[arg(long, default_value = "borders.log")]
    pub log_file: PathBuf,

    /// Skip the welcome screen
    #[arg(long)]
    pub no_landing: bool,
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            start_index: DEFAULT_INDEX,
            coastlines: None,
            log_file: PathBuf::from("borders.log"),
            no_landing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let parsed = Config::parse_from(["borders-map"]);
        let default = Config::default();
        assert_eq!(parsed.data_url, default.data_url);
        assert_eq!(parsed.interval(), Duration::from_millis(1500));
        assert_eq!(parsed.start_index, 20);
        assert!(!parsed.no_landing);
    }

    #[test]
    fn test_overrides() {
        let parsed = Config::parse_from([
            "borders-map",
            "--data-url",
            "http://localhost:8000",
            "--interval-ms",
            "250",
            "--no-landing",
        ]);
        assert_eq!(parsed.data_url, "http://localhost:8000");
        assert_eq!(parsed.interval(), Duration::from_millis(250));
        assert!(parsed.no_landing);
    }
}
