// include-walker - core/export.rs
//
// JSON export of the reconstructed forest.
// Core layer: writes to any Write trait object.

use crate::core::model::{DependencyForest, Project, ProjectId};
use crate::core::report::{collect_cycles, CycleReport, ForestStats};
use crate::util::error::ExportError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Serialised shape of an export: the forest plus its derived reports.
#[derive(Debug, Serialize)]
struct ForestExport<'a> {
    tool: &'static str,
    version: &'static str,
    search: &'a str,
    stats: ForestStats,
    cycles: Vec<CycleReport>,
    projects: Vec<ProjectExport<'a>>,
}

#[derive(Debug, Serialize)]
struct ProjectExport<'a> {
    id: ProjectId,
    #[serde(flatten)]
    project: &'a Project,
}

/// Export the forest as pretty-printed JSON.
///
/// Returns the number of projects written.
pub fn export_json<W: Write>(
    forest: &DependencyForest,
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    use crate::util::constants;

    let projects: Vec<ProjectExport<'_>> = forest
        .projects()
        .iter()
        .map(|(&id, project)| ProjectExport { id, project })
        .collect();
    let count = projects.len();

    let export = ForestExport {
        tool: constants::APP_NAME,
        version: constants::APP_VERSION,
        search: forest.options().search(),
        stats: ForestStats::collect(forest),
        cycles: collect_cycles(forest),
        projects,
    };

    serde_json::to_writer_pretty(&mut writer, &export).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %export_path.display(), projects = count, "Forest exported");
    Ok(count)
}
