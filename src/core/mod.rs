// include-walker - core/mod.rs
//
// Core business logic layer: line classification and the dependency forest.
// Must NOT depend on: ui, platform, app, or read files directly.

pub mod classifier;
pub mod export;
pub mod model;
pub mod normalize;
pub mod report;
