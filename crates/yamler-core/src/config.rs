use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::YamlerError;

/// Top-level configuration loaded from `.yamler.toml`.
///
/// Supports layered resolution: CLI flags > `--config` file > local config > defaults.
///
/// # Examples
///
/// ```
/// use yamler_core::YamlerConfig;
///
/// let config = YamlerConfig::default();
/// assert_eq!(config.search.threshold, 0.4);
/// assert_eq!(config.display.context_lines, 4);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YamlerConfig {
    /// Remote fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Fuzzy search tuning.
    #[serde(default)]
    pub search: SearchConfig,
    /// Result display settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

impl YamlerConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`YamlerError::FileNotFound`] if `path` does not exist,
    /// [`YamlerError::Io`] if it cannot be read, or [`YamlerError::Toml`]
    /// if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use yamler_core::YamlerConfig;
    /// use std::path::Path;
    ///
    /// let config = YamlerConfig::from_file(Path::new(".yamler.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, YamlerError> {
        if !path.exists() {
            return Err(YamlerError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`YamlerError::Toml`] if parsing fails, or
    /// [`YamlerError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use yamler_core::YamlerConfig;
    ///
    /// let toml = r#"
    /// [search]
    /// threshold = 0.2
    /// "#;
    /// let config = YamlerConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.search.threshold, 0.2);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, YamlerError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), YamlerError> {
        if !(0.0..=1.0).contains(&self.search.threshold) {
            return Err(YamlerError::Config(format!(
                "search.threshold must be between 0.0 and 1.0, got {}",
                self.search.threshold
            )));
        }
        if self.fetch.raw_host.trim().is_empty() || self.fetch.repo_host.trim().is_empty() {
            return Err(YamlerError::Config(
                "fetch.raw_host and fetch.repo_host must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for fetching remote documents.
///
/// # Examples
///
/// ```
/// use yamler_core::FetchConfig;
///
/// let config = FetchConfig::default();
/// assert_eq!(config.raw_host, "raw.githubusercontent.com");
/// assert_eq!(config.repo_host, "github.com");
/// assert!(config.timeout_secs.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Host that serves literal file bytes (default: `raw.githubusercontent.com`).
    #[serde(default = "default_raw_host")]
    pub raw_host: String,
    /// Host whose `/blob/` pages are rewritten to the raw host (default: `github.com`).
    #[serde(default = "default_repo_host")]
    pub repo_host: String,
    /// Request timeout in seconds. No timeout when unset.
    pub timeout_secs: Option<u64>,
    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_raw_host() -> String {
    "raw.githubusercontent.com".into()
}

fn default_repo_host() -> String {
    "github.com".into()
}

fn default_user_agent() -> String {
    concat!("yamler/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            raw_host: default_raw_host(),
            repo_host: default_repo_host(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

/// Fuzzy matcher tuning.
///
/// `threshold` is the match looseness: 0.0 only accepts exact matches,
/// 1.0 accepts anything.
///
/// # Examples
///
/// ```
/// use yamler_core::SearchConfig;
///
/// let config = SearchConfig::default();
/// assert_eq!(config.threshold, 0.4);
/// assert_eq!(config.distance, 100);
/// assert_eq!(config.location, 0);
/// assert!(!config.ignore_location);
/// assert!(config.limit.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum accepted per-field score (default: 0.4).
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Character position where matches are expected (default: 0).
    #[serde(default)]
    pub location: usize,
    /// How far from `location` a match may drift before it scores 1.0 (default: 100).
    #[serde(default = "default_distance")]
    pub distance: usize,
    /// Score on edit errors alone, ignoring where in the field the match sits.
    #[serde(default)]
    pub ignore_location: bool,
    /// Maximum number of results to return. Unlimited when unset.
    pub limit: Option<usize>,
}

fn default_threshold() -> f64 {
    0.4
}

fn default_distance() -> usize {
    100
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            location: 0,
            distance: default_distance(),
            ignore_location: false,
            limit: None,
        }
    }
}

/// How search results are rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Lines shown above and below each match (default: 4).
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

/// Lines shown above and below a match when `[display] context_lines` is unset.
pub const DEFAULT_CONTEXT_LINES: usize = 4;

fn default_context_lines() -> usize {
    DEFAULT_CONTEXT_LINES
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = YamlerConfig::default();
        assert_eq!(config.fetch.raw_host, "raw.githubusercontent.com");
        assert_eq!(config.fetch.repo_host, "github.com");
        assert!(config.fetch.timeout_secs.is_none());
        assert!(config.fetch.user_agent.starts_with("yamler/"));
        assert_eq!(config.search.threshold, 0.4);
        assert_eq!(config.search.distance, 100);
        assert_eq!(config.search.location, 0);
        assert!(!config.search.ignore_location);
        assert!(config.search.limit.is_none());
        assert_eq!(config.display.context_lines, 4);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[fetch]
raw_host = "raw.example.com"
repo_host = "example.com"
timeout_secs = 15

[search]
threshold = 0.25
distance = 50
limit = 20

[display]
context_lines = 2
"#;
        let config = YamlerConfig::from_toml(toml).unwrap();
        assert_eq!(config.fetch.raw_host, "raw.example.com");
        assert_eq!(config.fetch.repo_host, "example.com");
        assert_eq!(config.fetch.timeout_secs, Some(15));
        assert_eq!(config.search.threshold, 0.25);
        assert_eq!(config.search.distance, 50);
        assert_eq!(config.search.limit, Some(20));
        assert_eq!(config.display.context_lines, 2);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = YamlerConfig::from_toml("").unwrap();
        assert_eq!(config.search.threshold, 0.4);
        assert_eq!(config.display.context_lines, 4);
    }

    #[test]
    fn context_default_is_shared_constant() {
        assert_eq!(DisplayConfig::default().context_lines, DEFAULT_CONTEXT_LINES);
        let config = YamlerConfig::from_toml("[display]\n").unwrap();
        assert_eq!(config.display.context_lines, DEFAULT_CONTEXT_LINES);
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = YamlerConfig::from_toml("{{invalid}}");
        assert!(matches!(result, Err(YamlerError::Toml(_))));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let result = YamlerConfig::from_toml("[search]\nthreshold = 1.5\n");
        assert!(matches!(result, Err(YamlerError::Config(_))));
    }

    #[test]
    fn blank_host_is_rejected() {
        let result = YamlerConfig::from_toml("[fetch]\nraw_host = \"  \"\n");
        assert!(matches!(result, Err(YamlerError::Config(_))));
    }

    #[test]
    fn missing_file_is_reported() {
        let result = YamlerConfig::from_file(Path::new("/nonexistent/.yamler.toml"));
        assert!(matches!(result, Err(YamlerError::FileNotFound(_))));
    }
}
