// include-walker - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation. All errors preserve the causal chain
// for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all include-walker operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum IncludeWalkerError {
    /// The forest was asked to do something inconsistent with its contents.
    Model(ModelError),

    /// A log line referenced a project or module that was never introduced
    /// (or re-introduced one that already exists).
    Structure {
        line_number: u64,
        source: ModelError,
    },

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Export operation failed.
    Export(ExportError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for IncludeWalkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(e) => write!(f, "Model error: {e}"),
            Self::Structure {
                line_number,
                source,
            } => write!(f, "Inconsistent build log at line {line_number}: {source}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for IncludeWalkerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Model(e) => Some(e),
            Self::Structure { source, .. } => Some(source),
            Self::Config(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Model errors
// ---------------------------------------------------------------------------

/// Structural-consistency violations raised by the dependency forest.
///
/// These are never recovered from: a tree built on top of an unknown or
/// duplicated project/module would be silently wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// No project was started for this stream id.
    UnknownProject { project_id: u32 },

    /// The project exists but has no module with this name.
    UnknownModule { project_id: u32, module: String },

    /// A second project-start line arrived for an id already in use.
    DuplicateProject { project_id: u32, name: String },

    /// A module with this name was already started in the project.
    DuplicateModule { project_id: u32, module: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProject { project_id } => {
                write!(f, "project id {project_id} does not exist")
            }
            Self::UnknownModule { project_id, module } => {
                if module.is_empty() {
                    write!(
                        f,
                        "include note for project id {project_id} before any module was started"
                    )
                } else {
                    write!(
                        f,
                        "module '{module}' does not exist in project id {project_id}"
                    )
                }
            }
            Self::DuplicateProject { project_id, name } => {
                write!(f, "project id {project_id} already exists (new project '{name}')")
            }
            Self::DuplicateModule { project_id, module } => {
                write!(
                    f,
                    "module '{module}' already exists in project id {project_id}"
                )
            }
        }
    }
}

impl std::error::Error for ModelError {}

impl From<ModelError> for IncludeWalkerError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A std include pattern is not a valid regex.
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::InvalidPattern { pattern, source } => {
                write!(f, "Invalid std include pattern '{pattern}': {source}")
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::InvalidPattern { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for IncludeWalkerError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for IncludeWalkerError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

/// Convenience type alias for include-walker results.
pub type Result<T> = std::result::Result<T, IncludeWalkerError>;
