// include-walker - core/report.rs
//
// Read-only summaries over a finished forest: cyclic include chains and
// aggregate statistics. Core layer: no I/O.

use crate::core::model::{DependencyForest, Header};
use serde::Serialize;

/// One cyclic include, with the chain that leads to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub project: String,
    pub module: String,
    /// Display names from the module root down to the repeated header.
    pub chain: Vec<String>,
}

impl CycleReport {
    /// The header whose inclusion closed the cycle.
    pub fn cycle_header(&self) -> &str {
        self.chain.last().map(String::as_str).unwrap_or_default()
    }
}

/// Collect every cycle node in the forest, in project / module / log order.
pub fn collect_cycles(forest: &DependencyForest) -> Vec<CycleReport> {
    let mut reports = Vec::new();
    for project in forest.projects().values() {
        for module in project.modules().values().filter(|m| m.has_cycle()) {
            let mut chain = Vec::new();
            for header in module.headers() {
                walk_cycles(header, &mut chain, &mut |chain: &[String]| {
                    reports.push(CycleReport {
                        project: project.name().to_owned(),
                        module: module.name().to_owned(),
                        chain: chain.to_vec(),
                    });
                });
            }
        }
    }
    reports
}

fn walk_cycles(header: &Header, chain: &mut Vec<String>, found: &mut impl FnMut(&[String])) {
    if !header.has_cycle() && !header.is_cycle() {
        return;
    }
    chain.push(header.display_name().to_owned());
    if header.is_cycle() {
        found(chain);
    }
    for child in header.children() {
        walk_cycles(child, chain, found);
    }
    chain.pop();
}

/// Aggregate counts over a forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ForestStats {
    pub projects: usize,
    pub modules: usize,
    pub headers: usize,
    pub cycle_nodes: usize,
    pub matched_nodes: usize,
    /// Deepest include chain across all modules (a lone root counts as 1).
    pub max_depth: usize,
}

impl ForestStats {
    pub fn collect(forest: &DependencyForest) -> Self {
        let mut stats = Self {
            projects: forest.projects().len(),
            ..Self::default()
        };
        for project in forest.projects().values() {
            stats.modules += project.modules().len();
            for module in project.modules().values() {
                for header in module.headers() {
                    stats.add_subtree(header);
                    stats.max_depth = stats.max_depth.max(header.depth());
                }
            }
        }
        stats
    }

    fn add_subtree(&mut self, header: &Header) {
        self.headers += 1;
        if header.is_cycle() {
            self.cycle_nodes += 1;
        }
        if header.is_matched() {
            self.matched_nodes += 1;
        }
        for child in header.children() {
            self.add_subtree(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ForestOptions;
    use crate::core::normalize::NameNormalizer;

    fn sample_forest() -> DependencyForest {
        let options = ForestOptions::new(NameNormalizer::Identity).with_search("util");
        let mut forest = DependencyForest::new(options);
        forest.add_project(1, "app").unwrap();
        forest.add_module(1, "main.cpp").unwrap();
        forest.add_module(1, "clean.cpp").unwrap();
        let notes = [
            (0, "a.h"),
            (1, "b.h"),
            (2, "a.h"),
            (1, "util.h"),
            (2, "b.h"),
            (3, "util.h"),
        ];
        for (level, name) in notes {
            forest.insert_header(1, "main.cpp", level, name).unwrap();
        }
        forest.insert_header(1, "clean.cpp", 0, "x.h").unwrap();
        forest
    }

    #[test]
    fn test_collect_cycles_reports_chains_in_log_order() {
        let reports = collect_cycles(&sample_forest());
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].project, "app");
        assert_eq!(reports[0].module, "main.cpp");
        assert_eq!(reports[0].chain, vec!["a.h", "b.h", "a.h"]);
        assert_eq!(reports[0].cycle_header(), "a.h");
        assert_eq!(reports[1].chain, vec!["a.h", "util.h", "b.h", "util.h"]);
    }

    #[test]
    fn test_collect_cycles_empty_when_acyclic() {
        let mut forest = DependencyForest::new(ForestOptions::new(NameNormalizer::Identity));
        forest.add_project(1, "app").unwrap();
        forest.add_module(1, "main.cpp").unwrap();
        forest.insert_header(1, "main.cpp", 0, "a.h").unwrap();
        forest.insert_header(1, "main.cpp", 1, "b.h").unwrap();
        assert!(collect_cycles(&forest).is_empty());
    }

    #[test]
    fn test_forest_stats() {
        let stats = ForestStats::collect(&sample_forest());
        assert_eq!(
            stats,
            ForestStats {
                projects: 1,
                modules: 2,
                headers: 7,
                cycle_nodes: 2,
                matched_nodes: 2,
                max_depth: 4,
            }
        );
    }
}
