//! Analysis Report
//!
//! Combines the suspected node pair with the backend response into the
//! figures shown on the results screen and printed by `lrdetect analyze`.

use super::types::{AnalysisResponse, LoadReading};
use crate::detection::NodePair;
use serde::Serialize;
use std::fmt;

/// Format a displayed quantity with exactly four decimals
pub fn fixed4(value: f64) -> String {
    format!("{:.4}", value)
}

/// Status line derived from the two loadability values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackVerdict {
    /// Both loadabilities off 1.0 and on the same side of it
    AttackDetected,
    /// Both loadabilities exactly 1.0
    NoAttack,
    /// Mixed readings
    Inconclusive,
}

impl AttackVerdict {
    pub fn from_loadability(node1: f64, node2: f64) -> Self {
        let both_below = node1 < 1.0 && node2 < 1.0;
        let both_above = node1 > 1.0 && node2 > 1.0;
        if node1 != 1.0 && node2 != 1.0 && (both_below || both_above) {
            Self::AttackDetected
        } else if node1 == 1.0 && node2 == 1.0 {
            Self::NoAttack
        } else {
            Self::Inconclusive
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::AttackDetected => "Load distribution attack occurs between these two nodes.",
            Self::NoAttack => "No Load distribution attack occurs between these two nodes.",
            Self::Inconclusive => "Condition does not indicate a load distribution attack.",
        }
    }
}

/// Figures for one suspected node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeReport {
    /// Bus number, or `node1`/`node2` when no pair was identified
    pub label: String,
    pub loadability: f64,
    pub actual: LoadReading,
    pub attack: LoadReading,
}

/// Rendered view of one analysis result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub suspected: Option<NodePair>,
    pub nodes: [NodeReport; 2],
    pub verdict: AttackVerdict,
}

impl AnalysisReport {
    pub fn new(suspected: Option<NodePair>, response: &AnalysisResponse) -> Self {
        let (label1, label2) = match suspected {
            Some(pair) => (pair.node1.to_string(), pair.node2.to_string()),
            None => ("node1".to_string(), "node2".to_string()),
        };

        Self {
            suspected,
            nodes: [
                NodeReport {
                    label: label1,
                    loadability: response.loadability.node1,
                    actual: response.actual_load.node1,
                    attack: response.lrattack_load.node1,
                },
                NodeReport {
                    label: label2,
                    loadability: response.loadability.node2,
                    actual: response.actual_load.node2,
                    attack: response.lrattack_load.node2,
                },
            ],
            verdict: AttackVerdict::from_loadability(
                response.loadability.node1,
                response.loadability.node2,
            ),
        }
    }

    /// Plain-text report for non-interactive output
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Results")?;
        writeln!(f)?;

        if self.suspected.is_some() {
            for node in &self.nodes {
                writeln!(f, "Node {} Loadability: {}", node.label, fixed4(node.loadability))?;
            }
        } else {
            writeln!(f, "No attack detected")?;
        }
        writeln!(f)?;

        for node in &self.nodes {
            writeln!(f, "Node {} Details:", node.label)?;
            writeln!(
                f,
                "  Actual Load:    Active: {} kW  Reactive: {} kVar",
                fixed4(node.actual.active),
                fixed4(node.actual.reactive)
            )?;
            writeln!(
                f,
                "  LR Attack Load: Active: {} kW  Reactive: {} kVar",
                fixed4(node.attack.active),
                fixed4(node.attack.reactive)
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Status: {}", self.verdict.message())
    }
}
