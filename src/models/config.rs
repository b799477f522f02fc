//! Configuration types for allocview.
//!
//! This module contains configuration structures for customizing the dashboard,
//! including snapshot refresh, table layout, display settings and behavior options.

use serde::{Deserialize, Serialize};

/// TUI configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TuiConfig {
    pub refresh: RefreshConfig,

    pub display: DisplayConfig,

    pub layout: LayoutConfig,

    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Snapshot reload interval in seconds
    pub snapshot_interval: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 5,
        }
    }
}

/// Minimum allowed refresh interval in seconds (prevents tight polling loops)
const MIN_REFRESH_INTERVAL: u64 = 1;

impl RefreshConfig {
    /// Validate refresh configuration values.
    /// Returns a list of warnings for invalid values that were corrected to defaults.
    /// If `strict` is true, returns Err instead of correcting values.
    pub fn validate(&mut self, strict: bool) -> Result<Vec<String>, String> {
        let mut warnings = Vec::new();
        if self.snapshot_interval < MIN_REFRESH_INTERVAL {
            let msg = format!(
                "refresh.snapshot_interval must be at least {MIN_REFRESH_INTERVAL} second(s), got {}",
                self.snapshot_interval
            );
            if strict {
                return Err(msg);
            }
            let default = Self::default().snapshot_interval;
            warnings.push(format!("{msg} - using default ({default})"));
            self.snapshot_interval = default;
        }
        Ok(warnings)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Theme name
    pub theme: String,

    /// Show the Job column and the job filter menu
    pub show_job_column: bool,

    /// Show the Client column and the client filter menu
    pub show_client_column: bool,

    /// Location used when none is given on the command line
    /// Example: "/allocations?status=running"
    pub default_location: String,
}

impl DisplayConfig {
    #[must_use]
    pub fn columns(&self) -> ColumnVisibility {
        ColumnVisibility {
            show_job: self.show_job_column,
            show_client: self.show_client_column,
        }
    }
}

/// Which optional allocation columns (and their filter menus) are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnVisibility {
    pub show_job: bool,
    pub show_client: bool,
}

impl Default for ColumnVisibility {
    fn default() -> Self {
        Self {
            show_job: true,
            show_client: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            show_job_column: true,
            show_client_column: true,
            default_location: String::new(),
        }
    }
}

/// Table sizing relative to the terminal.
///
/// Table width is the terminal width minus `width_margin`; table height is the
/// terminal height minus `height_allowance` for the surrounding chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width_margin: u16,

    pub height_allowance: u16,

    /// Extra rows materialized beyond the visible window
    pub overscan: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width_margin: 2,
            // title bar, filter panel (3), status bar (2)
            height_allowance: 6,
            overscan: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Enable clipboard support
    pub copy_to_clipboard: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            copy_to_clipboard: true,
        }
    }
}

impl TuiConfig {
    /// Get the user config file path, respecting XDG_CONFIG_HOME
    ///
    /// Resolution order:
    /// 1. $XDG_CONFIG_HOME/allocview/config.toml (if XDG_CONFIG_HOME is set)
    /// 2. $HOME/.config/allocview/config.toml (if HOME is set)
    /// 3. dirs::config_dir()/allocview/config.toml
    #[must_use]
    pub fn user_config_path() -> Option<std::path::PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
            && !xdg_config.is_empty()
        {
            return Some(std::path::PathBuf::from(xdg_config).join("allocview/config.toml"));
        }

        if let Some(home) = std::env::var_os("HOME") {
            return Some(std::path::PathBuf::from(home).join(".config/allocview/config.toml"));
        }

        dirs::config_dir().map(|dir| dir.join("allocview/config.toml"))
    }

    /// Load configuration from files and environment.
    /// Returns the config and any warnings encountered during loading.
    pub fn load() -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();
        let strict = Self::is_strict_mode();

        Self::load_config_file(&mut config, "/etc/allocview/config.toml", &mut warnings);

        if let Some(user_path) = Self::user_config_path() {
            Self::load_config_file(&mut config, &user_path.to_string_lossy(), &mut warnings);
        }

        config.apply_env_overrides(&mut warnings);

        match config.refresh.validate(strict) {
            Ok(validation_warnings) => warnings.extend(validation_warnings),
            Err(err) => {
                eprintln!("Error: {}", err);
                eprintln!("(ALLOCVIEW_STRICT_CONFIG is set - config errors are fatal)");
                std::process::exit(1);
            }
        }

        for warning in &warnings {
            tracing::warn!(%warning, "config");
        }

        (config, warnings)
    }

    /// Check if strict config mode is enabled via ALLOCVIEW_STRICT_CONFIG
    fn is_strict_mode() -> bool {
        std::env::var("ALLOCVIEW_STRICT_CONFIG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Load a config file, collecting warnings on parse errors but not on missing files.
    fn load_config_file(config: &mut Self, path: &str, warnings: &mut Vec<String>) {
        let strict = Self::is_strict_mode();

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(parsed) => {
                    tracing::debug!(path, "loaded config file");
                    *config = parsed;
                }
                Err(e) => {
                    if strict {
                        eprintln!("Error: Failed to parse config file '{}': {}", path, e);
                        eprintln!("(ALLOCVIEW_STRICT_CONFIG is set - config errors are fatal)");
                        std::process::exit(1);
                    }
                    warnings.push(format!("Config parse error in '{}': {}", path, e));
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                if strict {
                    eprintln!("Error: Could not read config file '{}': {}", path, e);
                    eprintln!("(ALLOCVIEW_STRICT_CONFIG is set - config errors are fatal)");
                    std::process::exit(1);
                }
                warnings.push(format!("Could not read config '{}': {}", path, e));
            }
        }
    }

    /// Parse a TOML document; missing sections and keys take their defaults.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn apply_env_overrides(&mut self, warnings: &mut Vec<String>) {
        let strict = Self::is_strict_mode();
        self.apply_env_from(strict, |name| std::env::var(name).ok(), warnings);
    }

    /// Apply overrides read through `env`. Invalid values exit in strict mode.
    fn apply_env_from<F>(&mut self, strict: bool, env: F, warnings: &mut Vec<String>)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = env("ALLOCVIEW_REFRESH") {
            match val.parse::<u64>() {
                Ok(secs) if secs >= MIN_REFRESH_INTERVAL => {
                    self.refresh.snapshot_interval = secs;
                }
                Ok(_) => Self::report_env_error(
                    strict,
                    warnings,
                    "ALLOCVIEW_REFRESH",
                    &val,
                    &format!("must be at least {} second(s)", MIN_REFRESH_INTERVAL),
                ),
                Err(_) => Self::report_env_error(
                    strict,
                    warnings,
                    "ALLOCVIEW_REFRESH",
                    &val,
                    "expected a positive integer (seconds)",
                ),
            }
        }
        if let Some(val) = env("ALLOCVIEW_THEME") {
            self.display.theme = val;
        }
        if env("ALLOCVIEW_NO_CLIPBOARD").is_some() {
            self.behavior.copy_to_clipboard = false;
        }
    }

    fn report_env_error(
        strict: bool,
        warnings: &mut Vec<String>,
        var_name: &str,
        value: &str,
        reason: &str,
    ) {
        if strict {
            eprintln!("Error: Invalid value '{}' for {}: {}", value, var_name, reason);
            eprintln!("(ALLOCVIEW_STRICT_CONFIG is set - config errors are fatal)");
            std::process::exit(1);
        }
        warnings.push(format!(
            "Invalid value '{}' for {}, {} - using default",
            value, var_name, reason
        ));
    }
}
