use std::path::Path;

use serde::{Deserialize, Serialize};

/// How a range reference is attributed to part rows during aggregation.
///
/// Per-part attribution deliberately over-counts: a single document citing
/// "410-415" contributes to six part rows. That trade of exactness for
/// usability is documented upstream behavior, so it is configurable here
/// rather than silently changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMode {
    /// Count every integer part number covered by the range.
    #[default]
    PerPart,
    /// Count only the range's two endpoints.
    Endpoints,
}

/// Tunables for normalization workflows.
///
/// All fields have defaults, so an empty file (or no file at all) yields a
/// working configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Range attribution mode used by aggregation reports.
    range_mode: RangeMode,

    /// Ranges whose `high - low` exceeds this are attributed to their
    /// endpoints only, guarding against huge expansions from malformed
    /// text ("parts 1-9999").
    max_range_span: u32,

    /// How many raw strings to sample per non-parsed status in triage
    /// summaries.
    sample_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            range_mode: RangeMode::default(),
            max_range_span: Self::DEFAULT_MAX_RANGE_SPAN,
            sample_limit: Self::DEFAULT_SAMPLE_LIMIT,
        }
    }
}

impl Config {
    /// Default guard on range expansion during aggregation.
    pub const DEFAULT_MAX_RANGE_SPAN: u32 = 300;

    /// Default triage sample size per status.
    pub const DEFAULT_SAMPLE_LIMIT: usize = 5;

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or
    /// if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The configured range attribution mode.
    #[must_use]
    pub const fn range_mode(&self) -> RangeMode {
        self.range_mode
    }

    /// The configured range expansion guard.
    #[must_use]
    pub const fn max_range_span(&self) -> u32 {
        self.max_range_span
    }

    /// The configured triage sample size.
    #[must_use]
    pub const fn sample_limit(&self) -> usize {
        self.sample_limit
    }

    /// Overrides the range attribution mode.
    pub const fn set_range_mode(&mut self, mode: RangeMode) {
        self.range_mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"range_mode = \"endpoints\"\nmax_range_span = 50\nsample_limit = 10\n")
            .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.range_mode(), RangeMode::Endpoints);
        assert_eq!(config.max_range_span(), 50);
        assert_eq!(config.sample_limit(), 10);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"max_range_span = \"many\"\n").unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str("").unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cfrnorm.toml");

        let mut config = Config::default();
        config.set_range_mode(RangeMode::Endpoints);
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
