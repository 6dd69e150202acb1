//! Mock Detection Checks
//!
//! Placeholder LSTM and RF checks plus suspected-node selection. The real
//! models live behind the analysis backend; these stand-ins draw from an
//! injectable [`OutcomeSource`] so callers can seed or script them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Candidate pairs used when no configuration overrides them
pub const DEFAULT_CANDIDATE_PAIRS: &[NodePair] = &[NodePair { node1: 8, node2: 32 }];

/// Result of a mock model check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// 0: no anomaly
    Normal,
    /// 1: anomaly flagged
    Anomalous,
}

impl CheckOutcome {
    pub fn from_bit(bit: u8) -> Self {
        if bit == 0 { Self::Normal } else { Self::Anomalous }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Anomalous => 1,
        }
    }

    pub fn is_normal(&self) -> bool {
        *self == Self::Normal
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Two bus indices flagged as attack candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct NodePair {
    pub node1: u32,
    pub node2: u32,
}

impl NodePair {
    pub fn new(node1: u32, node2: u32) -> Self {
        Self { node1, node2 }
    }
}

impl From<[u32; 2]> for NodePair {
    fn from(pair: [u32; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<NodePair> for [u32; 2] {
    fn from(pair: NodePair) -> Self {
        [pair.node1, pair.node2]
    }
}

/// Source of the randomness behind the mock checks
pub trait OutcomeSource: Send {
    /// Uniform draw from {0, 1}
    fn binary(&mut self) -> u8;

    /// Uniform index in `0..len` (`len` > 0)
    fn index(&mut self, len: usize) -> usize;
}

/// `OutcomeSource` backed by any `rand` generator
pub struct RandomOutcomes<R = StdRng> {
    rng: R,
}

impl RandomOutcomes<StdRng> {
    /// Seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng + Send> OutcomeSource for RandomOutcomes<R> {
    fn binary(&mut self) -> u8 {
        self.rng.random_range(0..=1u8)
    }

    fn index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len.max(1))
    }
}

/// Mock LSTM check
pub fn run_lstm_check(source: &mut dyn OutcomeSource) -> CheckOutcome {
    CheckOutcome::from_bit(source.binary())
}

/// Mock RF check, independent of the LSTM draw
pub fn run_rf_check(source: &mut dyn OutcomeSource) -> CheckOutcome {
    CheckOutcome::from_bit(source.binary())
}

/// Pick one suspected pair uniformly from the candidates
pub fn pick_suspected_pair(
    source: &mut dyn OutcomeSource,
    candidates: &[NodePair],
) -> Option<NodePair> {
    if candidates.is_empty() {
        return None;
    }
    let idx = source.index(candidates.len()).min(candidates.len() - 1);
    Some(candidates[idx])
}

/// Scripted outcomes for tests: replays fixed draws, then repeats the last one
#[cfg(test)]
pub(crate) struct ScriptedOutcomes {
    bits: std::collections::VecDeque<u8>,
    last: u8,
}

#[cfg(test)]
impl ScriptedOutcomes {
    pub(crate) fn new(bits: &[u8]) -> Self {
        Self {
            bits: bits.iter().copied().collect(),
            last: bits.last().copied().unwrap_or(0),
        }
    }
}

#[cfg(test)]
impl OutcomeSource for ScriptedOutcomes {
    fn binary(&mut self) -> u8 {
        self.bits.pop_front().unwrap_or(self.last)
    }

    fn index(&mut self, _len: usize) -> usize {
        0
    }
}
