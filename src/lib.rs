//! # lrdetect
//!
//! Terminal front end for Load Redistribution (LR) attack detection on
//! radial distribution systems.
//!
//! ## Overview
//!
//! A nine-step wizard collects the selected bus, the 33x3 bus matrix and the
//! 32x4 line matrix, runs two placeholder model checks, identifies a pair of
//! suspected nodes, collects PMU locations and voltages, then posts the whole
//! snapshot to an analysis backend and shows per-node loadability along with
//! an attack verdict.
//!
//! ## Modules
//!
//! - [`matrix`]: fixed-shape numeric grids and clipboard paste parsing
//! - [`detection`]: mock LSTM/RF checks and suspected-node selection
//! - [`analysis`]: backend wire types, HTTP client and result report
//! - [`tui`]: the wizard state machine and its ratatui front end
//! - [`cli`]: command-line entry points
//! - [`config`]: TOML and environment configuration
//! - [`logging`]: file-based tracing setup
//! - [`error`]: domain error type

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod logging;
pub mod matrix;
pub mod tui;

pub use error::{ErrorCode, LrDetectError};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
