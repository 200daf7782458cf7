//! Core cleaning logic for personal and vehicle record datasets
//!
//! This crate provides the extract, transform and load stages, the fixed
//! column vocabulary they share, and a pipeline that runs them in order.

pub mod error;
pub mod exact_dedup;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod schema;
pub mod survey;
pub mod transform;

pub use error::{Error, Result};
pub use extract::extract;
pub use load::{load, OutputFormat};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineConfig, PipelineStats, Stage};
pub use survey::PresenceTally;
pub use transform::{transform, TransformOutput, TransformStats};
