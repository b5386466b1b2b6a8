use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsConfig;
use crate::challenges::ChallengeSettings;
use crate::clock::DayBoundary;
use crate::format::MoneyFormat;

fn default_currency() -> String {
    "USD".to_string()
}

fn default_timezone() -> String {
    "local".to_string()
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to data directory. If relative, resolved from config file location.
    /// If not specified, defaults to the config file's directory.
    pub data_dir: Option<PathBuf>,

    /// Currency code amounts are recorded in (e.g., "USD").
    #[serde(default = "default_currency")]
    pub currency: String,

    /// IANA timezone name, or "local". Decides which calendar day "today" is.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Display/output formatting settings.
    #[serde(default)]
    pub display: MoneyFormat,

    /// Savings hack amounts and the baseline window for new challenges.
    #[serde(default)]
    pub challenges: ChallengeSettings,

    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            currency: default_currency(),
            timezone: default_timezone(),
            display: MoneyFormat::default(),
            challenges: ChallengeSettings::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the data directory path.
    ///
    /// If `data_dir` is set and relative, it's resolved relative to `config_dir`.
    /// If `data_dir` is not set, returns `config_dir`.
    pub fn resolve_data_dir(&self, config_dir: &Path) -> PathBuf {
        match &self.data_dir {
            Some(data_dir) if data_dir.is_absolute() => data_dir.clone(),
            Some(data_dir) => config_dir.join(data_dir),
            None => config_dir.to_path_buf(),
        }
    }

    fn resolve(self, config_dir: &Path) -> Result<ResolvedConfig> {
        let day_boundary = DayBoundary::parse(&self.timezone)
            .with_context(|| format!("Invalid timezone in config: {}", self.timezone))?;
        Ok(ResolvedConfig {
            data_dir: self.resolve_data_dir(config_dir),
            currency: self.currency,
            day_boundary,
            display: self.display,
            challenges: self.challenges,
            analytics: self.analytics,
        })
    }
}

/// Loaded configuration with resolved paths.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The resolved data directory path.
    pub data_dir: PathBuf,

    pub currency: String,

    /// Parsed `timezone` setting.
    pub day_boundary: DayBoundary,

    pub display: MoneyFormat,

    pub challenges: ChallengeSettings,

    pub analytics: AnalyticsConfig,
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./spendwise.toml` if it exists in current directory
/// 2. `~/.local/share/spendwise/spendwise.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("spendwise.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("spendwise").join("spendwise.toml");
    }

    local_config
}

impl ResolvedConfig {
    /// Load and resolve config from a file path.
    ///
    /// The data directory is resolved relative to the config file's parent directory.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = config_path
            .canonicalize()
            .with_context(|| format!("Config file not found: {}", config_path.display()))?;

        let config_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;

        Config::load(&config_path)?.resolve(config_dir)
    }

    /// Load config, falling back to defaults if the file doesn't exist.
    ///
    /// If the config file doesn't exist, uses the config file's intended
    /// parent directory as the data directory.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load(config_path);
        }

        let config_path = if config_path.is_relative() {
            std::env::current_dir()
                .context("Failed to get current directory")?
                .join(config_path)
        } else {
            config_path.to_path_buf()
        };

        let config_dir = config_path
            .parent()
            .context("Config path has no parent directory")?;

        Config::default().resolve(config_dir)
    }

    /// Config pointing at `data_dir` with every other setting at its default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            currency: default_currency(),
            day_boundary: DayBoundary::Local,
            display: MoneyFormat::default(),
            challenges: ChallengeSettings::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_data_dir_is_config_dir() {
        let config = Config::default();
        let config_dir = Path::new("/home/user/budget");
        assert_eq!(
            config.resolve_data_dir(config_dir),
            PathBuf::from("/home/user/budget")
        );
    }

    #[test]
    fn test_relative_data_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("data")),
            ..Default::default()
        };
        let config_dir = Path::new("/home/user/budget");
        assert_eq!(
            config.resolve_data_dir(config_dir),
            PathBuf::from("/home/user/budget/data")
        );
    }

    #[test]
    fn test_absolute_data_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("/var/spendwise/data")),
            ..Default::default()
        };
        let config_dir = Path::new("/home/user/budget");
        assert_eq!(
            config.resolve_data_dir(config_dir),
            PathBuf::from("/var/spendwise/data")
        );
    }

    #[test]
    fn test_load_empty_config() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("spendwise.toml");
        std::fs::File::create(&config_path)?;

        let config = Config::load(&config_path)?;
        assert_eq!(config.data_dir, None);
        assert_eq!(config.currency, "USD");
        assert_eq!(config.timezone, "local");
        assert_eq!(config.challenges, ChallengeSettings::default());
        assert_eq!(config.analytics, AnalyticsConfig::default());

        Ok(())
    }

    #[test]
    fn test_load_challenge_and_analytics_sections() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("spendwise.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "[challenges]")?;
        writeln!(file, "swear_jar_penalty = 2.5")?;
        writeln!(file, "baseline_days = 14")?;
        writeln!(file, "[analytics]")?;
        writeln!(file, "reminder_window_days = 3")?;

        let config = Config::load(&config_path)?;
        assert_eq!(config.challenges.swear_jar_penalty, Decimal::new(25, 1));
        assert_eq!(config.challenges.baseline_days, 14);
        assert_eq!(config.challenges.smart_save_percent, Decimal::from(10));
        assert_eq!(config.analytics.reminder_window_days, 3);
        assert_eq!(config.analytics.top_n, 5);

        Ok(())
    }

    #[test]
    fn test_load_display_currency_formatting_options() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("spendwise.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "[display]")?;
        writeln!(file, "currency_grouping = false")?;
        writeln!(file, "currency_symbol = \"€\"")?;

        let config = Config::load(&config_path)?;
        assert!(!config.display.currency_grouping);
        assert_eq!(config.display.currency_symbol.as_deref(), Some("€"));
        assert_eq!(config.display.currency_decimals, Some(2));

        Ok(())
    }

    #[test]
    fn test_resolved_config_parses_timezone() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("spendwise.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "timezone = \"America/New_York\"")?;

        let resolved = ResolvedConfig::load(&config_path)?;
        assert_eq!(
            resolved.day_boundary,
            DayBoundary::Named(chrono_tz::America::New_York)
        );

        Ok(())
    }

    #[test]
    fn test_invalid_timezone_is_an_error() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("spendwise.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "timezone = \"Mars/Olympus\"")?;

        assert!(ResolvedConfig::load(&config_path).is_err());

        Ok(())
    }

    #[test]
    fn test_resolved_config_load_or_default_missing_file() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("spendwise.toml");

        let resolved = ResolvedConfig::load_or_default(&config_path)?;
        assert_eq!(resolved.data_dir, dir.path());
        assert_eq!(resolved.currency, "USD");
        assert_eq!(resolved.day_boundary, DayBoundary::Local);

        Ok(())
    }

    #[test]
    fn test_resolved_config_resolves_relative_data_dir() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("spendwise.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "data_dir = \"./data\"")?;

        let resolved = ResolvedConfig::load(&config_path)?;
        assert_eq!(resolved.data_dir, dir.path().canonicalize()?.join("data"));

        Ok(())
    }
}
