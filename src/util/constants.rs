// include-walker - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "include-walker";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "include-walker";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Log recognition
// =============================================================================

/// Default standard-library / platform-SDK include roots suppressed by
/// `--no-std`. Each entry is a regex searched within the include path.
///
/// 1. The MSVC toolchain's bundled headers:
///    `...\VC\Tools\MSVC\14.36.32532\include\...`
/// 2. The Windows SDK universal C runtime:
///    `...\Windows Kits\10\Include\10.0.22621.0\ucrt\...`
pub const DEFAULT_STD_INCLUDE_PATTERNS: &[&str] = &[
    r"\\VC\\Tools\\MSVC\\[\.\d]+\\include\\",
    r"\\Windows Kits\\.+\\ucrt\\",
];

/// Maximum number of user-configured std include patterns.
pub const MAX_STD_INCLUDE_PATTERNS: usize = 64;

/// Maximum regex pattern length to prevent ReDoS.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 1_024;

// =============================================================================
// File reading
// =============================================================================

/// File size threshold above which the log is read through a memory map
/// instead of a heap buffer.
pub const LARGE_FILE_THRESHOLD: u64 = 64 * 1024 * 1024; // 64 MB

/// Retry limits for transient I/O errors when reading the input log.
pub const MAX_READ_RETRIES: usize = 3;

/// Backoff between read retries, indexed by attempt.
pub const READ_RETRY_DELAYS_MS: [u64; MAX_READ_RETRIES] = [50, 100, 200];

// =============================================================================
// Rendering
// =============================================================================

/// Spaces per nesting level in the rendered tree.
pub const TREE_INDENT_WIDTH: usize = 2;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Maximum size of config.toml in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024; // 64 KB
