// include-walker - core/classifier.rs
//
// Line classification for MSVC multi-project build logs with /showIncludes.
// Core layer: pure, stateless functions over borrowed text. Every function
// is total: `None` means "not this kind of line", never an error.
//
// Recognised shapes (after the `N>` stream prefix is removed):
//   "------ Build started: Project: test, Configuration: Debug x64 ------"
//   "some_module.cpp"
//   "Note: including file:  C:\src\foo.h"      (extra spaces = nesting depth)
//   "C:\src\unit.cpp(58,26): warning C4099: ..."  (unrecognised, skipped)

use crate::util::constants;
use crate::util::error::ConfigError;
use regex::{Regex, RegexSet};
use std::sync::OnceLock;

/// Identifier of a concurrently built project, as printed before `>`.
pub type StreamId = u32;

/// What a single stream line announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// A project started building on this stream.
    ProjectStart(&'a str),

    /// The compiler echoed the translation unit it is about to compile.
    ModuleStart(&'a str),

    /// A header was opened at the given nesting level.
    IncludeNote { level: usize, path: &'a str },

    /// An include note for a standard-library header, dropped by the std filter.
    SuppressedInclude,

    /// Anything else carried on the stream (warnings, summaries, ...).
    Unrecognized,
}

// =============================================================================
// Std include filter
// =============================================================================

/// Compiled set of standard-library / platform-SDK include root patterns.
///
/// A path is considered "std" when any pattern matches somewhere inside it.
/// This is a text test only; nothing is looked up on disk.
#[derive(Debug, Clone)]
pub struct StdIncludeFilter {
    patterns: RegexSet,
}

impl StdIncludeFilter {
    /// Compile a filter from user-supplied patterns.
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_owned())
            .collect();

        // Compile individually first so the error names the offending pattern.
        for pattern in &patterns {
            if let Err(source) = Regex::new(pattern) {
                return Err(ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                });
            }
        }

        let set = RegexSet::new(&patterns).map_err(|source| ConfigError::InvalidPattern {
            pattern: patterns.join(" | "),
            source,
        })?;
        Ok(Self { patterns: set })
    }

    /// True if the path lies under a recognised standard include root.
    pub fn is_std_path(&self, path: &str) -> bool {
        self.patterns.is_match(path)
    }

    /// Number of configured patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when no pattern is configured (nothing is ever suppressed).
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for StdIncludeFilter {
    fn default() -> Self {
        // Built-in patterns are covered by the unit tests below.
        Self::new(constants::DEFAULT_STD_INCLUDE_PATTERNS)
            .expect("built-in std include patterns must compile")
    }
}

// =============================================================================
// Classifiers
// =============================================================================

fn stream_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([0-9]+)>\s*(\S.*)$").expect("stream line regex"))
}

fn project_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Project:\s*(\w+)").expect("project name regex"))
}

fn module_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\w+(\.\w+)+$").expect("module name regex"))
}

fn include_note_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Note: including file: (.+)$").expect("include note regex"))
}

/// Split `"<digits>> rest"` into the stream id and the remainder.
///
/// Whitespace around the prefix is consumed. Returns `None` for lines without
/// a prefix (e.g. the final build summary), with an empty remainder, or whose
/// id does not fit a `StreamId`.
pub fn split_stream_prefix(line: &str) -> Option<(StreamId, &str)> {
    let caps = stream_line_regex().captures(line)?;
    let id = caps.get(1)?.as_str().parse::<StreamId>().ok()?;
    let rest = caps.get(2)?.as_str();
    Some((id, rest))
}

/// Extract the project name from a "... Project: <name>, ..." line.
pub fn extract_new_project_name(rest: &str) -> Option<&str> {
    project_name_regex()
        .captures(rest)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extract a bare translation-unit file name such as `some_module.cpp`.
///
/// The whole (trimmed) remainder must be a dotted file name without any
/// whitespace or path separators.
pub fn extract_module_name(rest: &str) -> Option<&str> {
    let trimmed = rest.trim();
    if module_name_regex().is_match(trimmed) {
        Some(trimmed)
    } else {
        None
    }
}

/// Extract the raw (still indented) path from an include note.
///
/// With a `std_filter`, notes for headers under a standard include root are
/// suppressed and yield `None`.
pub fn extract_include_note<'a>(
    rest: &'a str,
    std_filter: Option<&StdIncludeFilter>,
) -> Option<&'a str> {
    let raw_path = include_note_regex().captures(rest)?.get(1)?.as_str();

    if let Some(filter) = std_filter {
        if filter.is_std_path(raw_path) {
            return None;
        }
    }

    Some(raw_path)
}

/// Split the leading spaces of an include-note path into a nesting level.
pub fn split_indent(raw_path: &str) -> (usize, &str) {
    let path = raw_path.trim_start_matches(' ');
    (raw_path.len() - path.len(), path)
}

/// Classify one raw log line.
///
/// Project detection is attempted first because a project-start line can also
/// look like other categories.
pub fn classify<'a>(
    line: &'a str,
    std_filter: Option<&StdIncludeFilter>,
) -> Option<(StreamId, LineKind<'a>)> {
    let (id, rest) = split_stream_prefix(line)?;

    if let Some(name) = extract_new_project_name(rest) {
        return Some((id, LineKind::ProjectStart(name)));
    }

    if let Some(name) = extract_module_name(rest) {
        return Some((id, LineKind::ModuleStart(name)));
    }

    if let Some(raw_path) = extract_include_note(rest, std_filter) {
        let (level, path) = split_indent(raw_path);
        if path.is_empty() {
            return Some((id, LineKind::Unrecognized));
        }
        return Some((id, LineKind::IncludeNote { level, path }));
    }

    if std_filter.is_some() && extract_include_note(rest, None).is_some() {
        return Some((id, LineKind::SuppressedInclude));
    }

    Some((id, LineKind::Unrecognized))
}
