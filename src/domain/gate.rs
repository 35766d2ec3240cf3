//! Entry gates: an injected yes/no decision consulted before every `Enter`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::error::EngineError;

pub trait EntryGate {
    /// Whether an otherwise valid entry may go ahead.
    fn permit(&mut self) -> bool;
}

/// Disabled gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysPermit;

impl EntryGate for AlwaysPermit {
    fn permit(&mut self) -> bool {
        true
    }
}

/// Lets an entry through with fixed probability.
#[derive(Debug, Clone)]
pub struct ProbabilityGate {
    probability: f64,
    rng: StdRng,
}

impl ProbabilityGate {
    /// Seeded gate; the same seed replays the same decisions.
    pub fn seeded(probability: f64, seed: u64) -> Result<Self, EngineError> {
        Self::with_rng(probability, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(probability: f64) -> Result<Self, EngineError> {
        Self::with_rng(probability, StdRng::from_entropy())
    }

    fn with_rng(probability: f64, rng: StdRng) -> Result<Self, EngineError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(EngineError::configuration(format!(
                "entry probability must be within [0, 1], got {}",
                probability
            )));
        }
        Ok(ProbabilityGate { probability, rng })
    }
}

impl EntryGate for ProbabilityGate {
    fn permit(&mut self) -> bool {
        self.rng.gen_bool(self.probability)
    }
}

/// Adapts a closure into a gate.
pub struct FnGate<F>(pub F);

impl<F: FnMut() -> bool> EntryGate for FnGate<F> {
    fn permit(&mut self) -> bool {
        (self.0)()
    }
}
