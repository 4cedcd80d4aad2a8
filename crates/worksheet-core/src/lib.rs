//! worksheet-core: exercise datasets, grading, and mistake collection.
//!
//! This crate defines the exercise data model, the answer normalizer, the
//! grading engine, and the per-exercise session state that the rest of the
//! worksheet builds on.

pub mod catalog;
pub mod error;
pub mod grading;
pub mod mistakes;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod session;
pub mod traits;
