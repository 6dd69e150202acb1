//! Analysis Module
//!
//! Wire contract, HTTP client and report formatting for the external
//! attack-detection service.

pub mod client;
pub mod report;
pub mod types;

pub use client::{Analyzer, HttpAnalyzer, ANALYSIS_PATH};
pub use report::{AnalysisReport, AttackVerdict, NodeReport};
pub use types::{AnalysisRequest, AnalysisResponse, LoadReading, NodeLoads, NodeValues};
