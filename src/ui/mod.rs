// include-walker - ui/mod.rs
//
// UI layer: presentation only.
// Dependencies: core (read-only models).
// Must NOT depend on: app, platform, direct file I/O.

pub mod theme;
pub mod tree_view;
