//! Shared models, errors, and configuration for the Tally analytics
//! pipeline.
//!
//! This crate has no engine dependencies so every other pipeline crate can
//! use its types without pulling in DataFusion.

pub mod config;
pub mod errors;
pub mod models;

pub use config::PipelineConfig;
pub use errors::{PipelineError, Result};
pub use models::{
    Aggregation, DimensionRow, EntityValue, Intent, IntentType, MetricsResult, ResultMetadata,
    SegmentRow, StructuredContext, ValidationReport,
};
