//! Classified request intents.
//!
//! An [`Intent`] is produced by the upstream classifier and consumed
//! read-only by the query builder. The intent type is a closed set so the
//! builder can dispatch to a fixed template per variant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Intent categories the pipeline can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentType {
    Sales,
    Inventory,
    Stockout,
    Comparison,
    Generic,
}

impl IntentType {
    pub fn as_str(self) -> &'static str {
        match self {
            IntentType::Sales => "sales",
            IntentType::Inventory => "inventory",
            IntentType::Stockout => "stockout",
            IntentType::Comparison => "comparison",
            IntentType::Generic => "generic",
        }
    }
}

impl FromStr for IntentType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sales" => Ok(IntentType::Sales),
            "inventory" => Ok(IntentType::Inventory),
            "stockout" => Ok(IntentType::Stockout),
            "comparison" => Ok(IntentType::Comparison),
            "generic" => Ok(IntentType::Generic),
            _ => Err(()),
        }
    }
}

/// Aggregations the classifier may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Sum,
    Avg,
    DistinctCount,
}

impl Aggregation {
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::DistinctCount => "distinct_count",
        }
    }
}

/// A filter entity value: either a single value or a list.
///
/// List values are expanded element-by-element by the query builder, each
/// element passing the same shape check as a single value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityValue {
    Single(String),
    Many(Vec<String>),
}

impl EntityValue {
    /// All values, regardless of arity.
    pub fn values(&self) -> &[String] {
        match self {
            EntityValue::Single(v) => std::slice::from_ref(v),
            EntityValue::Many(vs) => vs.as_slice(),
        }
    }

    /// Render for filter metadata: single value as-is, lists joined.
    pub fn display(&self) -> String {
        match self {
            EntityValue::Single(v) => v.clone(),
            EntityValue::Many(vs) => vs.join(", "),
        }
    }
}

/// A classified user request: category plus extracted filter entities.
///
/// Created per request by the upstream classifier, consumed once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub intent_type: IntentType,
    /// Dimension name → filter value. BTreeMap keeps filter rendering and
    /// predicate order deterministic.
    #[serde(default)]
    pub entities: BTreeMap<String, EntityValue>,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
    #[serde(default)]
    pub confidence: f64,
}

impl Intent {
    pub fn new(intent_type: IntentType) -> Self {
        Self {
            intent_type,
            entities: BTreeMap::new(),
            aggregations: Vec::new(),
            confidence: 1.0,
        }
    }

    pub fn with_entity(mut self, dimension: impl Into<String>, value: EntityValue) -> Self {
        self.entities.insert(dimension.into(), value);
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregations.push(aggregation);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }
}
