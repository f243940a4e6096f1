// include-walker - platform/mod.rs
//
// Platform abstraction layer.
// Dependencies: standard library, directories, memmap2.
// Must NOT depend on: core, app, ui.

pub mod config;
pub mod fs;
