//! Call-scoped random sources for the two combat checks.
//!
//! The resolver never touches a global generator. Callers hand in a
//! [`RollSource`]; production code wraps a seeded `rand` generator in
//! [`RngRolls`], tests script the exact rolls with [`ScriptedRolls`].

use std::collections::VecDeque;

use rand::{Rng, RngCore};

/// Produces uniform percentile rolls in `1..=100`.
pub trait RollSource {
    /// Next roll, always within `1..=100`.
    fn roll_percent(&mut self) -> u32;
}

/// Adapts any `rand` generator into a [`RollSource`].
#[derive(Debug, Clone)]
pub struct RngRolls<R>(pub R);

impl<R: RngCore> RollSource for RngRolls<R> {
    fn roll_percent(&mut self) -> u32 {
        self.0.gen_range(1..=100)
    }
}

impl<R: RollSource + ?Sized> RollSource for &mut R {
    fn roll_percent(&mut self) -> u32 {
        (**self).roll_percent()
    }
}

/// Replays a fixed sequence of rolls, then repeats a fallback value.
///
/// Values outside `1..=100` are clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedRolls {
    rolls: VecDeque<u32>,
    fallback: u32,
}

impl ScriptedRolls {
    /// Play `rolls` in order, then keep returning `fallback`.
    #[must_use]
    pub fn new(rolls: impl IntoIterator<Item = u32>, fallback: u32) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback: fallback.clamp(1, 100),
        }
    }

    /// Always roll 1: every check with a positive chance passes.
    #[must_use]
    pub fn always_pass() -> Self {
        Self::new([], 1)
    }

    /// Always roll 100: every check with a chance below 100 fails.
    #[must_use]
    pub fn always_fail() -> Self {
        Self::new([], 100)
    }

    /// Rolls not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl RollSource for ScriptedRolls {
    fn roll_percent(&mut self) -> u32 {
        self.rolls
            .pop_front()
            .map_or(self.fallback, |roll| roll.clamp(1, 100))
    }
}
