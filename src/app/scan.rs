// include-walker - app/scan.rs
//
// Scan orchestration. Replays a build log line by line into a
// `DependencyForest`, then runs the terminal purge / simplify steps.
//
// The scan is strictly sequential: insertion relies on the log describing
// walks along the most recently extended include path, which only holds in
// file order. Unrecognised lines are skipped and counted; structural
// inconsistencies abort the scan with the offending line number.

use crate::core::classifier::{self, LineKind, StdIncludeFilter, StreamId};
use crate::core::model::{DependencyForest, ForestOptions};
use crate::platform;
use crate::util::error::{IncludeWalkerError, ModelError, Result};
use crate::util::logging::preview;
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

/// Options consumed by the scan driver (not by the forest).
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Drop include notes for standard-library / SDK headers.
    pub ignore_std: bool,
    /// Patterns used when `ignore_std` is set.
    pub std_filter: StdIncludeFilter,
}

/// Counters from one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Total lines read from the log.
    pub lines_read: u64,
    /// Lines without an `N>` stream prefix (build summaries, blank lines).
    pub lines_without_stream: u64,
    /// Stream lines that were neither project, module nor include notes.
    pub lines_unrecognized: u64,
    /// Include notes dropped by the std filter.
    pub std_headers_skipped: u64,
    pub projects_started: usize,
    pub modules_started: usize,
    pub headers_inserted: usize,
    pub cycles_detected: usize,
    pub headers_matched: usize,
    /// Filled in by `build_forest` after purging.
    pub modules_purged: usize,
    pub projects_purged: usize,
    /// Wall-clock scan duration.
    pub duration: Duration,
}

// =============================================================================
// LogScanner
// =============================================================================

/// Feeds classified lines into a forest.
///
/// Owns the per-stream "most recently started module" association: include
/// notes only carry a stream id, so the module they belong to is whatever
/// module line that stream printed last.
pub struct LogScanner<'a> {
    forest: &'a mut DependencyForest,
    std_filter: Option<&'a StdIncludeFilter>,
    most_recent_module: HashMap<StreamId, String>,
    summary: ScanSummary,
}

impl<'a> LogScanner<'a> {
    pub fn new(forest: &'a mut DependencyForest, options: &'a ScanOptions) -> Self {
        Self {
            forest,
            std_filter: options.ignore_std.then_some(&options.std_filter),
            most_recent_module: HashMap::new(),
            summary: ScanSummary::default(),
        }
    }

    /// Apply one raw log line. `line_number` is 1-based and used only for
    /// error context.
    pub fn feed_line(&mut self, line_number: u64, line: &str) -> Result<()> {
        self.summary.lines_read += 1;

        let Some((stream, kind)) = classifier::classify(line, self.std_filter) else {
            self.summary.lines_without_stream += 1;
            return Ok(());
        };

        if let Err(source) = self.apply(stream, kind) {
            tracing::debug!(line_number, line = preview(line), "Offending log line");
            return Err(IncludeWalkerError::Structure {
                line_number,
                source,
            });
        }
        Ok(())
    }

    fn apply(
        &mut self,
        stream: StreamId,
        kind: LineKind<'_>,
    ) -> std::result::Result<(), ModelError> {
        match kind {
            LineKind::ProjectStart(name) => {
                self.forest.add_project(stream, name)?;
                self.summary.projects_started += 1;
            }
            LineKind::ModuleStart(name) => {
                self.forest.add_module(stream, name)?;
                self.most_recent_module.insert(stream, name.to_owned());
                self.summary.modules_started += 1;
            }
            LineKind::IncludeNote { level, path } => {
                let module = self
                    .most_recent_module
                    .get(&stream)
                    .map(String::as_str)
                    .unwrap_or_default();
                let outcome = self.forest.insert_header(stream, module, level, path)?;
                self.summary.headers_inserted += 1;
                if outcome.is_cycle {
                    self.summary.cycles_detected += 1;
                }
                if outcome.is_matched {
                    self.summary.headers_matched += 1;
                }
            }
            LineKind::SuppressedInclude => self.summary.std_headers_skipped += 1,
            LineKind::Unrecognized => self.summary.lines_unrecognized += 1,
        }
        Ok(())
    }

    /// Finish the scan and return its counters.
    pub fn finish(self) -> ScanSummary {
        self.summary
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Scan already-read lines into `forest`.
pub fn scan_lines<'l, I>(
    lines: I,
    forest: &mut DependencyForest,
    options: &ScanOptions,
) -> Result<ScanSummary>
where
    I: IntoIterator<Item = &'l str>,
{
    let started = Instant::now();
    let mut scanner = LogScanner::new(forest, options);
    for (idx, line) in lines.into_iter().enumerate() {
        scanner.feed_line(idx as u64 + 1, line)?;
    }
    let mut summary = scanner.finish();
    summary.duration = started.elapsed();
    Ok(summary)
}

/// Read the log at `path` fully, then scan it into `forest`.
pub fn scan_file(
    path: &Path,
    forest: &mut DependencyForest,
    options: &ScanOptions,
) -> Result<ScanSummary> {
    let content = platform::fs::read_log_file(path).map_err(|e| IncludeWalkerError::Io {
        path: path.to_path_buf(),
        operation: "read build log",
        source: e,
    })?;

    tracing::info!(
        file = %path.display(),
        bytes = content.len(),
        ignore_std = options.ignore_std,
        "Scanning build log"
    );

    scan_lines(content.lines(), forest, options)
}

/// Build a finished forest from the log at `path`.
///
/// Scans, purges empty modules and projects, and strips common prefixes when
/// `forest_options.simplify_paths` is set. Any error aborts the whole build;
/// no partial forest is returned.
pub fn build_forest(
    path: &Path,
    forest_options: ForestOptions,
    scan_options: &ScanOptions,
) -> Result<(DependencyForest, ScanSummary)> {
    let mut forest = DependencyForest::new(forest_options);
    let mut summary = scan_file(path, &mut forest, scan_options)?;
    finalize(&mut forest, &mut summary);
    Ok((forest, summary))
}

/// Terminal mutation steps, in order: purge, then simplify.
pub fn finalize(forest: &mut DependencyForest, summary: &mut ScanSummary) {
    let (modules_purged, projects_purged) = forest.purge_empties();
    summary.modules_purged = modules_purged;
    summary.projects_purged = projects_purged;

    if forest.options().simplify_paths {
        forest.simplify_paths();
    }

    tracing::info!(
        lines = summary.lines_read,
        projects = forest.projects().len(),
        headers = summary.headers_inserted,
        cycles = summary.cycles_detected,
        matches = summary.headers_matched,
        std_skipped = summary.std_headers_skipped,
        duration_ms = summary.duration.as_millis() as u64,
        "Scan complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::NameNormalizer;

    fn options() -> ForestOptions {
        ForestOptions::new(NameNormalizer::Identity)
    }

    fn scan(
        log: &str,
        forest_options: ForestOptions,
        scan_options: &ScanOptions,
    ) -> Result<(DependencyForest, ScanSummary)> {
        let mut forest = DependencyForest::new(forest_options);
        let mut summary = scan_lines(log.lines(), &mut forest, scan_options)?;
        finalize(&mut forest, &mut summary);
        Ok((forest, summary))
    }

    #[test]
    fn test_demo_scenario() {
        let log = "\
1>------ Build started: Project: demo, Configuration: Debug x64 ------
1> main.cpp
1> Note: including file: a.h
1> Note: including file:  b.h
1> Note: including file: a.h
========== Build: 1 succeeded, 0 failed ==========";
        let (forest, summary) = scan(log, options(), &ScanOptions::default()).unwrap();

        assert_eq!(forest.projects().len(), 1);
        let project = forest.project(1).unwrap();
        assert_eq!(project.name(), "demo");
        let module = project.module("main.cpp").unwrap();
        let roots = module.headers();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].display_name(), "a.h");
        assert_eq!(roots[0].children()[0].display_name(), "b.h");
        assert_eq!(roots[1].display_name(), "a.h");
        assert!(!module.has_cycle());
        assert!(!roots[1].is_cycle());

        assert_eq!(summary.lines_read, 6);
        assert_eq!(summary.lines_without_stream, 1);
        assert_eq!(summary.headers_inserted, 3);
        assert_eq!(summary.cycles_detected, 0);
    }

    #[test]
    fn test_interleaved_streams_keep_their_own_module() {
        let log = "\
1>------ Build started: Project: alpha, Configuration: Debug ------
2>------ Build started: Project: beta, Configuration: Debug ------
1> a.cpp
2> b.cpp
1> Note: including file: alpha.h
2> Note: including file: beta.h
1> Note: including file:  alpha_detail.h
2> c.cpp
2> Note: including file: gamma.h";
        let forest_options = options().with_simplify_paths(false);
        let (forest, summary) = scan(log, forest_options, &ScanOptions::default()).unwrap();

        let alpha = forest.project(1).unwrap().module("a.cpp").unwrap();
        assert_eq!(alpha.headers()[0].display_name(), "alpha.h");
        assert_eq!(alpha.headers()[0].children()[0].display_name(), "alpha_detail.h");

        let beta = forest.project(2).unwrap();
        assert_eq!(beta.module("b.cpp").unwrap().headers()[0].display_name(), "beta.h");
        assert_eq!(beta.module("c.cpp").unwrap().headers()[0].display_name(), "gamma.h");
        assert_eq!(summary.projects_started, 2);
        assert_eq!(summary.modules_started, 3);
    }

    #[test]
    fn test_cycle_is_detected_and_counted() {
        let log = "\
1> Project: app
1> main.cpp
1> Note: including file: a.h
1> Note: including file:  b.h
1> Note: including file:   a.h";
        let (forest, summary) = scan(log, options(), &ScanOptions::default()).unwrap();
        assert_eq!(summary.cycles_detected, 1);
        assert!(forest.project(1).unwrap().has_cycle());
    }

    #[test]
    fn test_ignore_std_skips_toolchain_headers() {
        let log = "\
1> Project: app
1> main.cpp
1> Note: including file: C:\\VS\\VC\\Tools\\MSVC\\14.36.32532\\include\\vector
1> Note: including file: C:\\app\\widget.h";
        let scan_options = ScanOptions {
            ignore_std: true,
            ..ScanOptions::default()
        };
        let (forest, summary) = scan(log, options(), &scan_options).unwrap();
        let module = forest.project(1).unwrap().module("main.cpp").unwrap();
        assert_eq!(module.headers().len(), 1);
        assert_eq!(summary.std_headers_skipped, 1);

        let (forest, _) = scan(log, options(), &ScanOptions::default()).unwrap();
        let module = forest.project(1).unwrap().module("main.cpp").unwrap();
        assert_eq!(module.headers().len(), 2);
    }

    #[test]
    fn test_empty_modules_and_projects_are_purged() {
        let log = "\
1> Project: app
1> empty.cpp
1> main.cpp
1> Note: including file: a.h
2> Project: tool
2> nothing.cpp";
        let (forest, summary) = scan(log, options(), &ScanOptions::default()).unwrap();
        assert_eq!(forest.projects().keys().copied().collect::<Vec<_>>(), vec![1]);
        assert!(forest.project(1).unwrap().module("empty.cpp").is_none());
        assert_eq!(summary.modules_purged, 2);
        assert_eq!(summary.projects_purged, 1);
    }

    #[test]
    fn test_simplify_applied_after_scan() {
        let log = "\
1> Project: app
1> main.cpp
1> Note: including file: C:\\app\\inc\\a.h
1> Note: including file:  C:\\app\\inc\\b.h";
        let (forest, _) = scan(log, options(), &ScanOptions::default()).unwrap();
        let root = &forest.project(1).unwrap().module("main.cpp").unwrap().headers()[0];
        assert_eq!(root.display_name(), "a.h");

        let no_simplify = options().with_simplify_paths(false);
        let (forest, _) = scan(log, no_simplify, &ScanOptions::default()).unwrap();
        let root = &forest.project(1).unwrap().module("main.cpp").unwrap().headers()[0];
        assert_eq!(root.display_name(), "C:\\app\\inc\\a.h");
    }

    #[test]
    fn test_include_before_module_is_a_structure_error() {
        let log = "\
1> Project: app
1> Note: including file: a.h";
        let err = scan(log, options(), &ScanOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            IncludeWalkerError::Structure {
                line_number: 2,
                source: ModelError::UnknownModule { project_id: 1, .. }
            }
        ));
    }

    #[test]
    fn test_module_for_unknown_project_is_a_structure_error() {
        let err = scan("3> main.cpp", options(), &ScanOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            IncludeWalkerError::Structure {
                line_number: 1,
                source: ModelError::UnknownProject { project_id: 3 }
            }
        ));
    }

    #[test]
    fn test_unrecognized_lines_are_skipped() {
        let log = "\
1> Project: app
1>C:\\app\\main.cpp(12,5): warning C4996: 'strcpy': This function may be unsafe.
1> main.cpp
1>   Creating library app.lib
1> Note: including file: a.h";
        let (forest, summary) = scan(log, options(), &ScanOptions::default()).unwrap();
        assert_eq!(summary.lines_unrecognized, 2);
        assert_eq!(forest.project(1).unwrap().module("main.cpp").unwrap().headers().len(), 1);
    }

    #[test]
    fn test_scan_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.log");
        let err = build_forest(&path, options(), &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, IncludeWalkerError::Io { .. }));
    }
}
