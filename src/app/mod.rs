// include-walker - app/mod.rs
//
// Application layer: scan orchestration.
// Dependencies: core layer, platform (file reads).
// Must NOT depend on: ui.

pub mod scan;
