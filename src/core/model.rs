// include-walker - core/model.rs
//
// The dependency forest: Project -> Module -> Header trees reconstructed from
// include notes. Pure data and tree algorithms; no I/O, no UI.
//
// Nodes own their children outright. Insertion recomputes the ancestor chain
// by descending the rightmost path instead of storing parent pointers.

use crate::core::classifier::StreamId;
use crate::core::normalize::NameNormalizer;
use crate::util::error::ModelError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Projects are keyed by the stream id that announced them.
pub type ProjectId = StreamId;

// =============================================================================
// Header
// =============================================================================

/// Location of a search hit, as byte offsets into the normalised name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

/// Boolean traits of a header node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeaderTraits {
    /// The node lies on the path from a module root to a cycle node.
    pub has_cycle: bool,
    /// The node repeats one of its own ancestors.
    pub is_cycle: bool,
    /// The node's normalised name contains the search string.
    pub is_matched: bool,
    /// Some descendant is matched.
    pub has_match: bool,
}

/// One node of an include tree.
#[derive(Debug, Clone, Serialize)]
pub struct Header {
    display_name: String,
    normalized_name: String,
    #[serde(flatten)]
    traits: HeaderTraits,
    #[serde(skip_serializing_if = "Option::is_none")]
    match_span: Option<MatchSpan>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Header>,
}

impl Header {
    fn new(display_name: &str, normalized_name: String) -> Self {
        Self {
            display_name: display_name.to_owned(),
            normalized_name,
            traits: HeaderTraits::default(),
            match_span: None,
            children: Vec::new(),
        }
    }

    /// Path as shown to the user (possibly with the module prefix removed).
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Canonical path used for comparisons.
    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    /// Headers included from this one, in log order.
    pub fn children(&self) -> &[Header] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn traits(&self) -> HeaderTraits {
        self.traits
    }

    pub fn has_cycle(&self) -> bool {
        self.traits.has_cycle
    }

    pub fn is_cycle(&self) -> bool {
        self.traits.is_cycle
    }

    pub fn is_matched(&self) -> bool {
        self.traits.is_matched
    }

    pub fn has_match(&self) -> bool {
        self.traits.has_match
    }

    /// Search hit within `normalized_name`, set only when `is_matched`.
    pub fn match_span(&self) -> Option<MatchSpan> {
        self.match_span
    }

    /// The search hit re-based onto `display_name`.
    ///
    /// After path simplification the display name is a suffix of the
    /// original path; the part of the hit that fell inside the removed
    /// prefix is dropped. `None` when nothing of the hit remains visible.
    pub fn display_match_span(&self) -> Option<MatchSpan> {
        let span = self.match_span?;
        let removed = self
            .normalized_name
            .len()
            .saturating_sub(self.display_name.len());
        let start = span.start.saturating_sub(removed);
        let end = span.end.saturating_sub(removed);
        let visible = start < end
            && self.display_name.is_char_boundary(start)
            && self.display_name.is_char_boundary(end);
        visible.then_some(MatchSpan { start, end })
    }

    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Depth of the subtree rooted here (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Header::depth).max().unwrap_or(0)
    }

    /// Record a substring hit of `needle` (already normalised).
    /// An empty needle never matches.
    fn try_match(&mut self, needle: &str) -> bool {
        if needle.is_empty() {
            return false;
        }
        match self.normalized_name.find(needle) {
            Some(start) => {
                self.match_span = Some(MatchSpan {
                    start,
                    end: start + needle.len(),
                });
                self.traits.is_matched = true;
                true
            }
            None => false,
        }
    }

    /// Remove `prefix_len` bytes from the front of the display name of every
    /// node in this subtree.
    fn simplify_path(&mut self, prefix_len: usize) {
        let cut = prefix_len.min(self.display_name.len());
        if self.display_name.is_char_boundary(cut) {
            self.display_name.drain(..cut);
        }
        for child in &mut self.children {
            child.simplify_path(prefix_len);
        }
    }
}

/// What happened to a freshly inserted header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub is_cycle: bool,
    pub is_matched: bool,
}

/// Descend `depth_left` more steps along the rightmost path below `parent`
/// and append `node` at the end. Stops early when the path runs out.
///
/// `cycle` carries whether an ancestor above `parent` already has the same
/// normalised name. Flags are propagated to every visited ancestor on unwind.
fn attach(
    parent: &mut Header,
    depth_left: usize,
    mut node: Header,
    cycle: bool,
) -> InsertOutcome {
    let cycle = cycle || parent.normalized_name == node.normalized_name;

    let outcome = if depth_left > 0 && !parent.children.is_empty() {
        let last = parent.children.len() - 1;
        attach(&mut parent.children[last], depth_left - 1, node, cycle)
    } else {
        node.traits.is_cycle = cycle;
        let outcome = InsertOutcome {
            is_cycle: cycle,
            is_matched: node.traits.is_matched,
        };
        parent.children.push(node);
        outcome
    };

    if outcome.is_cycle {
        parent.traits.has_cycle = true;
    }
    if outcome.is_matched {
        parent.traits.has_match = true;
    }
    outcome
}

// =============================================================================
// Module
// =============================================================================

/// One translation unit and the include trees it opened.
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    name: String,
    headers: Vec<Header>,
    #[serde(skip_serializing_if = "String::is_empty")]
    longest_common_prefix: String,
    has_cycle: bool,
}

impl Module {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            headers: Vec::new(),
            longest_common_prefix: String::new(),
            has_cycle: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root-level headers, in log order.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn has_cycle(&self) -> bool {
        self.has_cycle
    }

    /// True if any root header is on a search-hit path.
    pub fn has_match(&self) -> bool {
        self.headers.iter().any(|h| h.is_matched() || h.has_match())
    }

    /// Prefix shared by every normalised header name in this module.
    /// Only maintained while path simplification is enabled.
    pub fn longest_common_prefix(&self) -> &str {
        &self.longest_common_prefix
    }

    fn insert_header(
        &mut self,
        level: usize,
        display_name: &str,
        normalized_name: String,
        options: &ForestOptions,
    ) -> InsertOutcome {
        if options.simplify_paths {
            self.update_longest_prefix(&normalized_name);
        }

        let mut node = Header::new(display_name, normalized_name);
        let is_matched = node.try_match(&options.search);

        if level == 0 || self.headers.is_empty() {
            self.headers.push(node);
            return InsertOutcome {
                is_cycle: false,
                is_matched,
            };
        }

        let last = self.headers.len() - 1;
        let outcome = attach(&mut self.headers[last], level - 1, node, false);
        self.has_cycle = self.has_cycle || outcome.is_cycle;
        outcome
    }

    /// Fold one more normalised name into the running common prefix.
    fn update_longest_prefix(&mut self, normalized_name: &str) {
        if self.headers.is_empty() {
            self.longest_common_prefix = normalized_name.to_owned();
            return;
        }
        if self.longest_common_prefix.is_empty() {
            return;
        }

        let common = self
            .longest_common_prefix
            .char_indices()
            .zip(normalized_name.chars())
            .find(|((_, a), b)| a != b)
            .map(|((idx, _), _)| idx)
            .unwrap_or_else(|| self.longest_common_prefix.len().min(normalized_name.len()));
        self.longest_common_prefix.truncate(common);
    }

    fn simplify_path(&mut self) {
        let prefix_len = self.longest_common_prefix.len();
        if prefix_len == 0 {
            return;
        }
        for header in &mut self.headers {
            header.simplify_path(prefix_len);
        }
    }
}

// =============================================================================
// Project
// =============================================================================

/// One project of a multi-project build, with its translation units.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    name: String,
    modules: BTreeMap<String, Module>,
}

impl Project {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            modules: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Modules keyed by name.
    pub fn modules(&self) -> &BTreeMap<String, Module> {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    /// True when the project has no module with at least one header.
    pub fn is_empty(&self) -> bool {
        self.modules.values().all(Module::is_empty)
    }

    pub fn has_cycle(&self) -> bool {
        self.modules.values().any(Module::has_cycle)
    }

    pub fn has_match(&self) -> bool {
        self.modules.values().any(Module::has_match)
    }
}

// =============================================================================
// Forest
// =============================================================================

/// Configuration snapshot the forest consults during insertion.
#[derive(Debug, Clone)]
pub struct ForestOptions {
    /// Maintain per-module common prefixes so `simplify_paths` can trim them.
    pub simplify_paths: bool,
    /// Normalisation policy for header names and the search string.
    pub normalizer: NameNormalizer,
    search: String,
}

impl ForestOptions {
    pub fn new(normalizer: NameNormalizer) -> Self {
        Self {
            simplify_paths: true,
            normalizer,
            search: String::new(),
        }
    }

    /// Set the search string. It is normalised with the same rule as header
    /// names; an empty string disables matching.
    pub fn with_search(mut self, search: &str) -> Self {
        self.search = self.normalizer.normalize(search);
        self
    }

    pub fn with_simplify_paths(mut self, simplify_paths: bool) -> Self {
        self.simplify_paths = simplify_paths;
        self
    }

    /// The normalised search string.
    pub fn search(&self) -> &str {
        &self.search
    }
}

impl Default for ForestOptions {
    fn default() -> Self {
        Self::new(NameNormalizer::for_host())
    }
}

/// All projects reconstructed from one build log.
#[derive(Debug, Clone)]
pub struct DependencyForest {
    projects: BTreeMap<ProjectId, Project>,
    options: ForestOptions,
}

impl DependencyForest {
    pub fn new(options: ForestOptions) -> Self {
        Self {
            projects: BTreeMap::new(),
            options,
        }
    }

    pub fn options(&self) -> &ForestOptions {
        &self.options
    }

    /// Projects keyed by stream id.
    pub fn projects(&self) -> &BTreeMap<ProjectId, Project> {
        &self.projects
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.get(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Register a project started on stream `id`.
    pub fn add_project(&mut self, id: ProjectId, name: &str) -> Result<(), ModelError> {
        if self.projects.contains_key(&id) {
            return Err(ModelError::DuplicateProject {
                project_id: id,
                name: name.to_owned(),
            });
        }
        self.projects.insert(id, Project::new(name));
        tracing::debug!(project_id = id, name, "Project started");
        Ok(())
    }

    /// Register a translation unit in an existing project.
    pub fn add_module(&mut self, id: ProjectId, module: &str) -> Result<(), ModelError> {
        let project = self
            .projects
            .get_mut(&id)
            .ok_or(ModelError::UnknownProject { project_id: id })?;
        if project.modules.contains_key(module) {
            return Err(ModelError::DuplicateModule {
                project_id: id,
                module: module.to_owned(),
            });
        }
        project.modules.insert(module.to_owned(), Module::new(module));
        tracing::debug!(project_id = id, module, "Module started");
        Ok(())
    }

    /// Insert one include note into `module` of project `id`.
    ///
    /// `level` is the note's indentation. Level 0 starts a new root; deeper
    /// levels attach below the rightmost path, or at its deepest node when
    /// the path is shorter than requested.
    pub fn insert_header(
        &mut self,
        id: ProjectId,
        module: &str,
        level: usize,
        raw_path: &str,
    ) -> Result<InsertOutcome, ModelError> {
        let normalized = self.options.normalizer.normalize(raw_path);
        let project = self
            .projects
            .get_mut(&id)
            .ok_or(ModelError::UnknownProject { project_id: id })?;
        let target = project
            .modules
            .get_mut(module)
            .ok_or_else(|| ModelError::UnknownModule {
                project_id: id,
                module: module.to_owned(),
            })?;

        let outcome = target.insert_header(level, raw_path, normalized, &self.options);
        if outcome.is_cycle {
            tracing::debug!(
                project_id = id,
                module,
                header = raw_path,
                level,
                "Cyclic include detected"
            );
        }
        Ok(outcome)
    }

    /// Strip each module's common prefix from every display name.
    pub fn simplify_paths(&mut self) {
        for project in self.projects.values_mut() {
            for module in project.modules.values_mut() {
                module.simplify_path();
            }
        }
    }

    /// Drop modules without headers, then projects without modules.
    ///
    /// Returns `(modules_removed, projects_removed)`.
    pub fn purge_empties(&mut self) -> (usize, usize) {
        let mut modules_removed = 0;
        for project in self.projects.values_mut() {
            let before = project.modules.len();
            project.modules.retain(|_, module| !module.is_empty());
            modules_removed += before - project.modules.len();
        }

        let before = self.projects.len();
        self.projects.retain(|_, project| !project.modules.is_empty());
        let projects_removed = before - self.projects.len();

        tracing::debug!(modules_removed, projects_removed, "Purged empty modules and projects");
        (modules_removed, projects_removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: ProjectId = 1;
    const MODULE: &str = "main.cpp";

    fn forest_with(options: ForestOptions) -> DependencyForest {
        let mut forest = DependencyForest::new(options);
        forest.add_project(PROJECT, "demo").unwrap();
        forest.add_module(PROJECT, MODULE).unwrap();
        forest
    }

    fn forest() -> DependencyForest {
        forest_with(ForestOptions::new(NameNormalizer::Identity))
    }

    fn insert(forest: &mut DependencyForest, level: usize, name: &str) -> InsertOutcome {
        forest.insert_header(PROJECT, MODULE, level, name).unwrap()
    }

    fn module(forest: &DependencyForest) -> &Module {
        forest.project(PROJECT).unwrap().module(MODULE).unwrap()
    }

    fn names(headers: &[Header]) -> Vec<&str> {
        headers.iter().map(Header::display_name).collect()
    }

    /// Every ancestor of an `is_cycle` node has `has_cycle`, and every
    /// ancestor of an `is_matched` node has `has_match`.
    fn assert_propagation(header: &Header) -> (bool, bool) {
        let mut below_cycle = false;
        let mut below_match = false;
        for child in header.children() {
            let (c, m) = assert_propagation(child);
            below_cycle |= c;
            below_match |= m;
        }
        if below_cycle {
            assert!(header.has_cycle(), "{} should have has_cycle", header.display_name());
        }
        if below_match {
            assert!(header.has_match(), "{} should have has_match", header.display_name());
        }
        (
            below_cycle || header.is_cycle(),
            below_match || header.is_matched(),
        )
    }

    // -------------------------------------------------------------------------
    // Tree shape
    // -------------------------------------------------------------------------

    #[test]
    fn test_indentation_builds_nesting() {
        let mut f = forest();
        insert(&mut f, 0, "a.h");
        insert(&mut f, 1, "b.h");
        insert(&mut f, 2, "c.h");
        insert(&mut f, 1, "d.h");
        insert(&mut f, 0, "e.h");

        let m = module(&f);
        assert_eq!(names(m.headers()), vec!["a.h", "e.h"]);
        let a = &m.headers()[0];
        assert_eq!(names(a.children()), vec!["b.h", "d.h"]);
        assert_eq!(names(a.children()[0].children()), vec!["c.h"]);
        assert!(a.children()[1].is_leaf());
        assert_eq!(a.descendant_count(), 3);
        assert_eq!(a.depth(), 3);
    }

    #[test]
    fn test_first_header_becomes_root_regardless_of_level() {
        let mut f = forest();
        let outcome = insert(&mut f, 3, "a.h");
        assert_eq!(outcome, InsertOutcome::default());
        assert_eq!(names(module(&f).headers()), vec!["a.h"]);
    }

    #[test]
    fn test_level_deeper_than_path_attaches_at_deepest_node() {
        let mut f = forest();
        insert(&mut f, 0, "a.h");
        insert(&mut f, 1, "b.h");
        // Jumps from depth 1 to depth 5: attaches below b.h, the deepest node.
        insert(&mut f, 5, "z.h");

        let a = &module(&f).headers()[0];
        assert_eq!(names(a.children()), vec!["b.h"]);
        assert_eq!(names(a.children()[0].children()), vec!["z.h"]);
    }

    // -------------------------------------------------------------------------
    // Cycles
    // -------------------------------------------------------------------------

    #[test]
    fn test_cycle_marks_node_and_ancestors_only() {
        // Levels 0,1,2,1,2,1 : A, B, C, B2, D, B3 where D repeats B2.
        let mut f = forest();
        insert(&mut f, 0, "A");
        insert(&mut f, 1, "B");
        insert(&mut f, 2, "C");
        insert(&mut f, 1, "B2");
        let outcome = insert(&mut f, 2, "B2");
        insert(&mut f, 1, "B3");

        assert!(outcome.is_cycle);
        let m = module(&f);
        assert!(m.has_cycle());

        let a = &m.headers()[0];
        assert!(a.has_cycle());
        assert!(!a.is_cycle());

        let (b, b2, b3) = (&a.children()[0], &a.children()[1], &a.children()[2]);
        assert!(!b.has_cycle() && !b.is_cycle());
        assert!(!b.children()[0].has_cycle() && !b.children()[0].is_cycle());
        assert!(b2.has_cycle() && !b2.is_cycle());
        assert!(b2.children()[0].is_cycle());
        assert!(!b3.has_cycle() && !b3.is_cycle());

        assert_propagation(a);
    }

    #[test]
    fn test_sibling_repeat_is_not_a_cycle() {
        let mut f = forest();
        insert(&mut f, 0, "A");
        insert(&mut f, 1, "B");
        let outcome = insert(&mut f, 1, "B");
        assert!(!outcome.is_cycle);
        assert!(!module(&f).has_cycle());
        assert!(!module(&f).headers()[0].has_cycle());
    }

    #[test]
    fn test_repeated_root_is_not_a_cycle() {
        let mut f = forest();
        insert(&mut f, 0, "a.h");
        insert(&mut f, 1, "b.h");
        let outcome = insert(&mut f, 0, "a.h");
        assert!(!outcome.is_cycle);
        assert_eq!(names(module(&f).headers()), vec!["a.h", "a.h"]);
    }

    #[test]
    fn test_direct_self_include_is_a_cycle() {
        let mut f = forest();
        insert(&mut f, 0, "a.h");
        assert!(insert(&mut f, 1, "a.h").is_cycle);
        let a = &module(&f).headers()[0];
        assert!(a.has_cycle());
        assert!(a.children()[0].is_cycle());
    }

    #[test]
    fn test_cycle_detection_uses_normalized_names() {
        let mut f = forest_with(ForestOptions::new(NameNormalizer::CaseInsensitive));
        insert(&mut f, 0, "C:/Src/A.h");
        insert(&mut f, 1, "C:\\src\\b.h");
        assert!(insert(&mut f, 2, "c:\\SRC\\a.H").is_cycle);

        let mut f = forest_with(ForestOptions::new(NameNormalizer::Identity));
        insert(&mut f, 0, "C:/Src/A.h");
        insert(&mut f, 1, "C:\\src\\b.h");
        assert!(!insert(&mut f, 2, "c:\\SRC\\a.H").is_cycle);
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    #[test]
    fn test_search_marks_match_and_ancestors() {
        let options = ForestOptions::new(NameNormalizer::Identity).with_search("needle");
        let mut f = forest_with(options);
        insert(&mut f, 0, "a.h");
        insert(&mut f, 1, "b.h");
        let outcome = insert(&mut f, 2, "inc/needle.h");
        insert(&mut f, 1, "c.h");

        assert!(outcome.is_matched);
        let a = &module(&f).headers()[0];
        assert!(a.has_match() && !a.is_matched());
        let b = &a.children()[0];
        assert!(b.has_match());
        let hit = &b.children()[0];
        assert!(hit.is_matched() && !hit.has_match());
        assert_eq!(hit.match_span(), Some(MatchSpan { start: 4, end: 10 }));
        assert!(!a.children()[1].has_match());
        assert!(module(&f).has_match());
        assert_propagation(a);
    }

    #[test]
    fn test_matched_root_header() {
        let options = ForestOptions::new(NameNormalizer::Identity).with_search("a.h");
        let mut f = forest_with(options);
        assert!(insert(&mut f, 0, "a.h").is_matched);
        assert!(module(&f).headers()[0].is_matched());
    }

    #[test]
    fn test_search_is_normalized() {
        let options = ForestOptions::new(NameNormalizer::CaseInsensitive).with_search("SRC/Util");
        assert_eq!(options.search(), "src\\util");
        let mut f = forest_with(options);
        assert!(insert(&mut f, 0, "C:\\Src\\Util.h").is_matched);
    }

    #[test]
    fn test_empty_search_never_matches() {
        let mut f = forest_with(ForestOptions::new(NameNormalizer::Identity).with_search(""));
        insert(&mut f, 0, "a.h");
        insert(&mut f, 1, "b.h");
        let a = &module(&f).headers()[0];
        for h in [a, &a.children()[0]] {
            assert!(!h.is_matched() && !h.has_match());
            assert_eq!(h.match_span(), None);
        }
    }

    // -------------------------------------------------------------------------
    // Longest common prefix / simplification
    // -------------------------------------------------------------------------

    #[test]
    fn test_longest_prefix_running_reduction() {
        let mut f = forest();
        insert(&mut f, 0, "C:\\proj\\include\\a.h");
        assert_eq!(module(&f).longest_common_prefix(), "C:\\proj\\include\\a.h");
        insert(&mut f, 1, "C:\\proj\\include\\b.h");
        assert_eq!(module(&f).longest_common_prefix(), "C:\\proj\\include\\");
        insert(&mut f, 1, "C:\\proj\\src\\c.h");
        assert_eq!(module(&f).longest_common_prefix(), "C:\\proj\\");
        insert(&mut f, 0, "D:\\other.h");
        assert_eq!(module(&f).longest_common_prefix(), "");
        insert(&mut f, 0, "C:\\proj\\x.h");
        assert_eq!(module(&f).longest_common_prefix(), "");
    }

    #[test]
    fn test_longest_prefix_stops_on_char_boundary() {
        let mut f = forest();
        insert(&mut f, 0, "dir/é.h");
        insert(&mut f, 0, "dir/è.h");
        // 'é' and 'è' share their first UTF-8 byte but not the character.
        assert_eq!(module(&f).longest_common_prefix(), "dir/");
    }

    #[test]
    fn test_prefix_not_tracked_when_simplify_disabled() {
        let mut f = forest_with(ForestOptions::new(NameNormalizer::Identity).with_simplify_paths(false));
        insert(&mut f, 0, "C:\\proj\\a.h");
        insert(&mut f, 0, "C:\\proj\\b.h");
        assert_eq!(module(&f).longest_common_prefix(), "");
        f.simplify_paths();
        assert_eq!(names(module(&f).headers()), vec!["C:\\proj\\a.h", "C:\\proj\\b.h"]);
    }

    #[test]
    fn test_simplify_round_trip() {
        let originals = [
            (0, "C:\\proj\\include\\a.h"),
            (1, "C:\\proj\\include\\detail\\b.h"),
            (2, "C:\\proj\\include\\c.h"),
            (0, "C:\\proj\\include\\d.h"),
        ];
        let mut f = forest();
        for (level, name) in originals {
            insert(&mut f, level, name);
        }
        let prefix = module(&f).longest_common_prefix().to_owned();
        assert_eq!(prefix, "C:\\proj\\include\\");

        f.simplify_paths();

        let m = module(&f);
        let a = &m.headers()[0];
        let b = &a.children()[0];
        let c = &b.children()[0];
        let d = &m.headers()[1];
        let simplified = [a, b, c, d];
        for (header, (_, original)) in simplified.iter().zip(originals) {
            assert_eq!(header.display_name().len(), original.len() - prefix.len());
            assert_eq!(format!("{prefix}{}", header.display_name()), original);
            // Comparisons still see the full path.
            assert_eq!(header.normalized_name(), original);
        }
    }

    #[test]
    fn test_simplify_keeps_flags() {
        let options = ForestOptions::new(NameNormalizer::Identity).with_search("inc/b");
        let mut f = forest_with(options);
        insert(&mut f, 0, "inc/a.h");
        insert(&mut f, 1, "inc/b.h");
        insert(&mut f, 2, "inc/a.h");
        f.simplify_paths();

        let a = &module(&f).headers()[0];
        assert_eq!(a.display_name(), "a.h");
        assert!(a.has_cycle() && a.has_match());
        let b = &a.children()[0];
        assert!(b.is_matched());
        assert!(b.children()[0].is_cycle());
    }

    #[test]
    fn test_display_match_span_after_simplify() {
        let options = ForestOptions::new(NameNormalizer::Identity).with_search("ude/b");
        let mut f = forest_with(options);
        insert(&mut f, 0, "include/a.h");
        insert(&mut f, 1, "include/b.h");
        f.simplify_paths();

        let a = &module(&f).headers()[0];
        assert_eq!(a.display_name(), "a.h");
        let b = &a.children()[0];
        assert_eq!(b.display_name(), "b.h");
        assert_eq!(b.match_span(), Some(MatchSpan { start: 4, end: 9 }));
        // "ude/" was trimmed away; only "b" remains visible.
        assert_eq!(b.display_match_span(), Some(MatchSpan { start: 0, end: 1 }));
    }

    #[test]
    fn test_display_match_span_hidden_when_inside_prefix() {
        let options = ForestOptions::new(NameNormalizer::Identity).with_search("inc");
        let mut f = forest_with(options);
        insert(&mut f, 0, "include/a.h");
        insert(&mut f, 0, "include/b.h");
        f.simplify_paths();
        let a = &module(&f).headers()[0];
        assert!(a.is_matched());
        assert_eq!(a.display_match_span(), None);
    }

    // -------------------------------------------------------------------------
    // Registration and purge
    // -------------------------------------------------------------------------

    #[test]
    fn test_unknown_project_and_module() {
        let mut f = forest();
        assert_eq!(
            f.insert_header(7, MODULE, 0, "a.h"),
            Err(ModelError::UnknownProject { project_id: 7 })
        );
        assert_eq!(
            f.insert_header(PROJECT, "other.cpp", 0, "a.h"),
            Err(ModelError::UnknownModule {
                project_id: PROJECT,
                module: "other.cpp".to_string()
            })
        );
        assert_eq!(
            f.add_module(9, "x.cpp"),
            Err(ModelError::UnknownProject { project_id: 9 })
        );
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let mut f = forest();
        assert!(matches!(
            f.add_project(PROJECT, "again"),
            Err(ModelError::DuplicateProject { project_id: PROJECT, .. })
        ));
        assert!(matches!(
            f.add_module(PROJECT, MODULE),
            Err(ModelError::DuplicateModule { project_id: PROJECT, .. })
        ));
    }

    #[test]
    fn test_purge_removes_empty_modules_then_projects() {
        let mut f = forest();
        f.add_module(PROJECT, "empty.cpp").unwrap();
        insert(&mut f, 0, "a.h");
        f.add_project(2, "idle").unwrap();
        f.add_module(2, "nothing.cpp").unwrap();
        f.add_project(3, "bare").unwrap();

        assert_eq!(f.purge_empties(), (2, 2));
        assert_eq!(f.projects().len(), 1);
        let demo = f.project(PROJECT).unwrap();
        assert_eq!(demo.modules().keys().collect::<Vec<_>>(), vec![MODULE]);
        assert!(!demo.is_empty());
    }

    #[test]
    fn test_purge_is_idempotent() {
        let mut f = forest();
        f.add_module(PROJECT, "empty.cpp").unwrap();
        insert(&mut f, 0, "a.h");
        f.add_project(2, "idle").unwrap();

        f.purge_empties();
        let once: Vec<_> = f.projects().keys().copied().collect();
        let once_modules = f.project(PROJECT).unwrap().modules().len();
        assert_eq!(f.purge_empties(), (0, 0));
        let twice: Vec<_> = f.projects().keys().copied().collect();
        assert_eq!(once, twice);
        assert_eq!(f.project(PROJECT).unwrap().modules().len(), once_modules);
    }

    #[test]
    fn test_purge_everything_empty() {
        let mut f = forest();
        f.purge_empties();
        assert!(f.is_empty());
    }
}
