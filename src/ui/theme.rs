// include-walker - ui/theme.rs
//
// ANSI colour scheme for the rendered tree.
// No dependencies on app state or business logic beyond header traits.

use crate::core::model::HeaderTraits;

pub const RESET: &str = "\x1b[0m";

/// The repeated include that closes a cycle.
pub const CYCLE: &str = "\x1b[31m"; // Red

/// Nodes on the path leading to a cycle.
pub const CYCLE_PATH: &str = "\x1b[33m"; // Yellow

/// The matched part of a header name.
pub const MATCH: &str = "\x1b[1;4m"; // Bold + underline

/// Markers and collapsed-node counts.
pub const DIM: &str = "\x1b[2m";

/// Base colour for a header, if any. A cycle node wins over a cycle path.
pub fn header_colour(traits: HeaderTraits) -> Option<&'static str> {
    if traits.is_cycle {
        Some(CYCLE)
    } else if traits.has_cycle {
        Some(CYCLE_PATH)
    } else {
        None
    }
}

/// Base colour for a project or module line.
pub fn container_colour(has_cycle: bool) -> Option<&'static str> {
    has_cycle.then_some(CYCLE_PATH)
}
