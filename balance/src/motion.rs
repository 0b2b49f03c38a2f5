//! Cosmetic smoothing of where each pebble is drawn.
//!
//! Every pebble has a damped spring pulling its visual position toward its
//! logical position. Nothing in the simulation reads these values back.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;
use crate::pebble::{PebbleId, PebbleRegistry};

/// Larger frame deltas are split into steps of at most this size.
const MAX_STEP_SECS: f64 = 0.004;
/// A spring is long settled after this; longer deltas are clamped to it.
const MAX_SIMULATED_SECS: f64 = 10.0;
const REST_DISTANCE: f32 = 0.05;
const REST_SPEED: f32 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Body {
    fn is_at_rest(&self, target: Vec2) -> bool {
        let d = self.position - target;
        d.x.abs() < REST_DISTANCE
            && d.y.abs() < REST_DISTANCE
            && self.velocity.x.abs() < REST_SPEED
            && self.velocity.y.abs() < REST_SPEED
    }

    fn settle(&mut self, target: Vec2) {
        self.position = target;
        self.velocity = Vec2::ZERO;
    }

    fn integrate(&mut self, target: Vec2, stiffness: f32, damping: f32, h: f32) {
        let ax = -stiffness * (self.position.x - target.x) - damping * self.velocity.x;
        let ay = -stiffness * (self.position.y - target.y) - damping * self.velocity.y;
        self.velocity = Vec2::new(self.velocity.x + ax * h, self.velocity.y + ay * h);
        self.position = Vec2::new(
            self.position.x + self.velocity.x * h,
            self.position.y + self.velocity.y * h,
        );
    }
}

#[derive(Debug, Clone)]
pub struct Motion {
    bodies: Vec<Body>,
    stiffness: f32,
    damping: f32,
}

impl Motion {
    pub fn new(registry: &PebbleRegistry, stiffness: f32, damping: f32) -> Self {
        let mut motion = Self {
            bodies: Vec::new(),
            stiffness: stiffness.max(0.1),
            damping: damping.max(0.0),
        };
        motion.sync(registry);
        motion
    }

    /// Places every body exactly on its pebble and zeroes velocities.
    pub fn sync(&mut self, registry: &PebbleRegistry) {
        self.bodies = registry
            .iter()
            .map(|pebble| Body {
                position: pebble.position(),
                velocity: Vec2::ZERO,
            })
            .collect();
    }

    pub fn visual(&self, id: PebbleId) -> Option<Vec2> {
        self.bodies.get(id as usize).map(|body| body.position)
    }

    pub fn snap(&mut self, id: PebbleId, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(id as usize) {
            body.position = position;
            body.velocity = Vec2::ZERO;
        }
    }

    /// Starts a body `height` units above `position` so it visibly falls in.
    pub fn drop_from_above(&mut self, id: PebbleId, position: Vec2, height: f32) {
        self.snap(id, Vec2::new(position.x, position.y - height));
    }

    /// Sub-steps every moving body by `dt`. Bodies already at rest are
    /// left on their targets.
    pub fn step(&mut self, registry: &PebbleRegistry, dt: Duration) {
        let total = dt.as_secs_f64().min(MAX_SIMULATED_SECS);
        if total <= 0.0 {
            return;
        }
        let steps = (total / MAX_STEP_SECS).ceil() as u32;
        let h = (total / f64::from(steps)) as f32;

        for (body, pebble) in self.bodies.iter_mut().zip(registry.iter()) {
            let target = pebble.position();
            if body.is_at_rest(target) {
                body.settle(target);
                continue;
            }
            for _ in 0..steps {
                body.integrate(target, self.stiffness, self.damping, h);
            }
            if body.is_at_rest(target) {
                body.settle(target);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_at_rest(&self, registry: &PebbleRegistry) -> bool {
        self.bodies
            .iter()
            .zip(registry.iter())
            .all(|(body, pebble)| body.is_at_rest(pebble.position()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{BalanceTuning, SPRING_DAMPING, SPRING_STIFFNESS};

    #[test]
    fn bodies_start_on_their_pebbles() {
        let registry = PebbleRegistry::new(2, &BalanceTuning::default());
        let motion = Motion::new(&registry, SPRING_STIFFNESS, SPRING_DAMPING);
        for pebble in registry.iter() {
            assert_eq!(motion.visual(pebble.id()), Some(pebble.position()));
        }
        assert!(motion.is_at_rest(&registry));
    }

    #[test]
    fn dropped_body_settles_onto_target() {
        let registry = PebbleRegistry::new(2, &BalanceTuning::default());
        let mut motion = Motion::new(&registry, SPRING_STIFFNESS, SPRING_DAMPING);
        let target = registry.get(0).expect("pebble 0").position();

        motion.drop_from_above(0, target, 200.0);
        assert!(!motion.is_at_rest(&registry));

        for _ in 0..240 {
            motion.step(&registry, Duration::from_millis(16));
        }
        let visual = motion.visual(0).expect("body 0");
        assert!((visual.y - target.y).abs() < 0.5, "visual {visual:?}");
        assert!(motion.is_at_rest(&registry));
    }

    #[test]
    fn huge_delta_is_clamped_and_lands_on_target() {
        let registry = PebbleRegistry::new(2, &BalanceTuning::default());
        let mut motion = Motion::new(&registry, SPRING_STIFFNESS, SPRING_DAMPING);
        let target = registry.get(1).expect("pebble 1").position();

        motion.drop_from_above(1, target, 200.0);
        motion.step(&registry, Duration::from_secs(60 * 60 * 24 * 365));

        assert_eq!(motion.visual(1), Some(target));
        assert!(motion.is_at_rest(&registry));
    }

    #[test]
    fn zero_delta_leaves_bodies_alone() {
        let registry = PebbleRegistry::new(2, &BalanceTuning::default());
        let mut motion = Motion::new(&registry, SPRING_STIFFNESS, SPRING_DAMPING);
        let target = registry.get(0).expect("pebble 0").position();

        motion.drop_from_above(0, target, 200.0);
        motion.step(&registry, Duration::ZERO);

        assert_eq!(motion.visual(0), Some(Vec2::new(target.x, target.y - 200.0)));
    }
}
