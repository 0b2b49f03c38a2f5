//! Static balance judgment for a stack of pebbles.
//!
//! Each pebble may overhang the one below by half the width difference,
//! scaled by a tolerance factor and never less than a fixed floor. The floor
//! matters when the upper pebble is the wider one and the allowed overhang
//! goes to zero or below.

use serde::{Deserialize, Serialize};

use crate::pebble::Pebble;
use crate::tuning::{STABILITY_TOLERANCE_FACTOR, STABILITY_TOLERANCE_FLOOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stability {
    Stable,
    /// `topple_index` is the stack index of the upper pebble in the first
    /// failing pair, scanning bottom to top.
    Unstable { topple_index: usize },
}

impl Stability {
    pub fn is_stable(self) -> bool {
        matches!(self, Stability::Stable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityRule {
    pub factor: f32,
    pub floor: f32,
}

impl Default for StabilityRule {
    fn default() -> Self {
        Self {
            factor: STABILITY_TOLERANCE_FACTOR,
            floor: STABILITY_TOLERANCE_FLOOR,
        }
    }
}

impl StabilityRule {
    pub fn threshold(&self, below: &Pebble, above: &Pebble) -> f32 {
        let allowed_overhang = (below.width() - above.width()) / 2.0;
        (allowed_overhang * self.factor).max(self.floor)
    }

    /// `stack` is ordered bottom to top.
    pub fn evaluate(&self, stack: &[&Pebble]) -> Stability {
        for (index, pair) in stack.windows(2).enumerate() {
            let (below, above) = (pair[0], pair[1]);
            let actual_offset = (above.position().x - below.position().x).abs();
            if actual_offset > self.threshold(below, above) {
                return Stability::Unstable {
                    topple_index: index + 1,
                };
            }
        }
        Stability::Stable
    }
}

/// [`StabilityRule::evaluate`] with the shipped tolerance.
pub fn evaluate(stack: &[&Pebble]) -> Stability {
    StabilityRule::default().evaluate(stack)
}
