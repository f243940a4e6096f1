// include-walker - platform/config.rs
//
// Platform-specific configuration, directory resolution, and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use directories::ProjectDirs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Resolved platform paths for include-walker configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/include-walker/ or %APPDATA%\include-walker\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// Colour mode
// =============================================================================

/// When to emit ANSI colour in the rendered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorMode {
    /// Colour when stdout is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "always" => Some(Self::Always),
            "never" => Some(Self::Never),
            _ => None,
        }
    }

    /// Decide for the current process.
    pub fn enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => {
                std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[filters]` section.
    pub filters: FiltersSection,
    /// `[view]` section.
    pub view: ViewSection,
    /// `[paths]` section.
    pub paths: PathsSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[filters]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FiltersSection {
    /// Suppress standard-library headers without passing --no-std.
    pub ignore_std: Option<bool>,
    /// Regexes locating standard include roots inside a header path.
    pub std_include_patterns: Option<Vec<String>>,
}

/// `[view]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ViewSection {
    /// Strip per-module common path prefixes.
    pub simplify_paths: Option<bool>,
    /// Expand only nodes on cycle or match paths.
    pub auto_expand: Option<bool>,
    /// "auto", "always" or "never".
    pub color: Option<String>,
}

/// `[paths]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Fold case and slash direction when comparing header paths.
    pub case_insensitive: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Filters --
    pub ignore_std: bool,
    pub std_include_patterns: Vec<String>,

    // -- View --
    pub simplify_paths: bool,
    pub auto_expand: bool,
    pub color: ColorMode,

    // -- Paths --
    /// Defaults to the host convention (true on Windows).
    pub case_insensitive_paths: bool,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ignore_std: false,
            std_include_patterns: constants::DEFAULT_STD_INCLUDE_PATTERNS
                .iter()
                .map(|p| (*p).to_owned())
                .collect(),
            simplify_paths: true,
            auto_expand: false,
            color: ColorMode::Auto,
            case_insensitive_paths: cfg!(windows),
            log_level: None,
        }
    }
}

/// Load and validate a config.toml file.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unreadable or unparseable, returns defaults with a warning.
///
/// Runs before logging is initialised (the file may set the log level), so
/// problems are reported only through the returned warnings.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    let metadata = match std::fs::metadata(config_path) {
        Ok(m) => m,
        Err(_) => return (AppConfig::default(), warnings),
    };

    if metadata.len() > constants::MAX_CONFIG_FILE_SIZE {
        warnings.push(format!(
            "Config file '{}' is {} bytes, exceeds maximum of {} bytes. Using defaults.",
            config_path.display(),
            metadata.len(),
            constants::MAX_CONFIG_FILE_SIZE
        ));
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            warnings.push(format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            ));
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            warnings.push(format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            ));
            return (AppConfig::default(), warnings);
        }
    };

    let config = validate(raw, &mut warnings);
    (config, warnings)
}

/// Validate each field of a parsed config, accumulating all problems.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Filters --
    if let Some(ignore_std) = raw.filters.ignore_std {
        config.ignore_std = ignore_std;
    }

    if let Some(patterns) = raw.filters.std_include_patterns {
        if let Some(problem) = check_patterns(&patterns) {
            warnings.push(format!(
                "[filters] std_include_patterns: {problem}. Using built-in patterns."
            ));
        } else {
            config.std_include_patterns = patterns;
        }
    }

    // -- View --
    if let Some(simplify) = raw.view.simplify_paths {
        config.simplify_paths = simplify;
    }
    if let Some(auto_expand) = raw.view.auto_expand {
        config.auto_expand = auto_expand;
    }
    if let Some(ref color) = raw.view.color {
        match ColorMode::parse(color) {
            Some(mode) => config.color = mode,
            None => warnings.push(format!(
                "[view] color = \"{color}\" is not recognised. \
                 Expected \"auto\", \"always\" or \"never\". Using default (auto).",
            )),
        }
    }

    // -- Paths --
    if let Some(case_insensitive) = raw.paths.case_insensitive {
        config.case_insensitive_paths = case_insensitive;
    }

    // -- Logging --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    config
}

/// Returns a description of the first problem in a pattern list, if any.
fn check_patterns(patterns: &[String]) -> Option<String> {
    if patterns.len() > constants::MAX_STD_INCLUDE_PATTERNS {
        return Some(format!(
            "{} patterns exceeds maximum of {}",
            patterns.len(),
            constants::MAX_STD_INCLUDE_PATTERNS
        ));
    }
    for pattern in patterns {
        if pattern.len() > constants::MAX_REGEX_PATTERN_LENGTH {
            return Some(format!(
                "pattern is {} chars, exceeds maximum of {}",
                pattern.len(),
                constants::MAX_REGEX_PATTERN_LENGTH
            ));
        }
        if let Err(e) = regex::Regex::new(pattern) {
            return Some(format!("invalid regex '{pattern}': {e}"));
        }
    }
    None
}
