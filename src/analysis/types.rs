//! Analysis Wire Types
//!
//! Request and response bodies exchanged with the analysis backend.

use crate::detection::NodePair;
use serde::{Deserialize, Serialize};

/// Payload snapshot posted when the wizard reaches its results step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub selected_bus: String,
    pub bus_data: Vec<Vec<f64>>,
    pub line_data: Vec<Vec<f64>>,
    pub vf_values: [f64; 2],
    #[serde(rename = "PMULocation")]
    pub pmu_location: [u32; 2],
    pub suspected_nodes: Option<NodePair>,
}

/// A value per suspected node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeValues {
    pub node1: f64,
    pub node2: f64,
}

/// Active/reactive load at one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadReading {
    pub active: f64,
    pub reactive: f64,
}

/// Load readings for both suspected nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeLoads {
    pub node1: LoadReading,
    pub node2: LoadReading,
}

/// Backend result; every field is required
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub loadability: NodeValues,
    pub actual_load: NodeLoads,
    pub lrattack_load: NodeLoads,
}
