//! Shared data models for the analytics pipeline.

pub mod context;
pub mod intent;
pub mod metrics;
pub mod validation;

pub use context::StructuredContext;
pub use intent::{Aggregation, EntityValue, Intent, IntentType};
pub use metrics::{DimensionRow, MetricsResult, ResultMetadata, SegmentRow};
pub use validation::ValidationReport;
