use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;
use crate::pebble::{PebbleId, PebbleRegistry, tray_position};
use crate::stack::Stack;
use crate::tuning::{BalanceTuning, PlacementMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Placed { stack_index: usize },
    Returned,
}

/// Horizontal band around the board's center line that accepts drops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetZone {
    pub center_x: f32,
    pub half_width: f32,
}

impl TargetZone {
    pub fn contains(&self, x: f32) -> bool {
        x >= self.center_x - self.half_width && x <= self.center_x + self.half_width
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlacementResolver<'a> {
    tuning: &'a BalanceTuning,
    zone: TargetZone,
}

impl<'a> PlacementResolver<'a> {
    pub fn new(tuning: &'a BalanceTuning, board_width: f32) -> Self {
        Self {
            tuning,
            zone: TargetZone {
                center_x: board_width / 2.0,
                half_width: tuning.zone_half_width,
            },
        }
    }

    /// Slot the next stacked pebble would occupy, before any horizontal
    /// adjustment for [`PlacementMode::Free`].
    pub fn next_slot(&self, registry: &PebbleRegistry, stack: &Stack) -> Vec2 {
        let height_so_far = stack.height_so_far(registry, self.tuning.stack_spacing);
        Vec2::new(self.zone.center_x, self.tuning.stack_base_y - height_so_far)
    }

    /// Commits a released pebble to the stack or sends it back to its tray
    /// slot. `None` means the id isn't part of the current batch (or is
    /// already stacked) and nothing changed.
    pub fn resolve(
        &self,
        registry: &mut PebbleRegistry,
        stack: &mut Stack,
        id: PebbleId,
        pointer_x: f32,
    ) -> Option<Placement> {
        if stack.contains(id) {
            return None;
        }
        let slot = self.next_slot(registry, stack);
        let pebble = registry.get_mut(id)?;

        if !self.zone.contains(pointer_x) {
            pebble.position = tray_position(id, self.tuning);
            pebble.placed = false;
            return Some(Placement::Returned);
        }

        let target_x = match self.tuning.placement_mode {
            PlacementMode::Snap => slot.x,
            PlacementMode::Free => pebble.position.x,
        };
        pebble.position = Vec2::new(target_x, slot.y);
        pebble.placed = true;
        let stack_index = stack.push(id)?;
        Some(Placement::Placed { stack_index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD_WIDTH: f32 = 600.0;

    fn setup(mode: PlacementMode) -> (BalanceTuning, PebbleRegistry, Stack) {
        let tuning = BalanceTuning::default().with_placement_mode(mode);
        let registry = PebbleRegistry::new(9, &tuning);
        (tuning, registry, Stack::default())
    }

    #[test]
    fn zone_edges_are_inclusive() {
        let zone = TargetZone {
            center_x: 300.0,
            half_width: 140.0,
        };
        assert!(zone.contains(160.0));
        assert!(zone.contains(440.0));
        assert!(!zone.contains(159.9));
        assert!(!zone.contains(440.1));
    }

    #[test]
    fn drop_in_zone_snaps_to_center_and_stacks_upward() {
        let (tuning, mut registry, mut stack) = setup(PlacementMode::Snap);
        registry.replace_dimensions(0, 120.0, 30.0);
        let resolver = PlacementResolver::new(&tuning, BOARD_WIDTH);

        assert_eq!(
            resolver.resolve(&mut registry, &mut stack, 0, 310.0),
            Some(Placement::Placed { stack_index: 0 })
        );
        let first = registry.get(0).expect("pebble 0");
        assert_eq!(first.position(), Vec2::new(300.0, 350.0));
        assert!(first.is_placed());

        assert_eq!(
            resolver.resolve(&mut registry, &mut stack, 1, 250.0),
            Some(Placement::Placed { stack_index: 1 })
        );
        assert_eq!(
            registry.get(1).expect("pebble 1").position(),
            Vec2::new(300.0, 350.0 - 36.0)
        );
        assert_eq!(stack.ids(), &[0, 1]);
    }

    #[test]
    fn drop_outside_zone_returns_to_tray() {
        let (tuning, mut registry, mut stack) = setup(PlacementMode::Snap);
        registry.get_mut(2).expect("pebble 2").position = Vec2::new(20.0, 100.0);
        let resolver = PlacementResolver::new(&tuning, BOARD_WIDTH);

        assert_eq!(
            resolver.resolve(&mut registry, &mut stack, 2, 20.0),
            Some(Placement::Returned)
        );
        let pebble = registry.get(2).expect("pebble 2");
        assert_eq!(pebble.position(), tray_position(2, &tuning));
        assert!(!pebble.is_placed());
        assert!(stack.is_empty());
    }

    #[test]
    fn free_mode_keeps_release_x() {
        let (tuning, mut registry, mut stack) = setup(PlacementMode::Free);
        registry.get_mut(0).expect("pebble 0").position = Vec2::new(330.0, 200.0);
        let resolver = PlacementResolver::new(&tuning, BOARD_WIDTH);

        resolver.resolve(&mut registry, &mut stack, 0, 330.0);
        assert_eq!(
            registry.get(0).expect("pebble 0").position(),
            Vec2::new(330.0, 350.0)
        );
    }

    #[test]
    fn unknown_or_stacked_ids_are_noops() {
        let (tuning, mut registry, mut stack) = setup(PlacementMode::Snap);
        let resolver = PlacementResolver::new(&tuning, BOARD_WIDTH);

        assert_eq!(resolver.resolve(&mut registry, &mut stack, 77, 300.0), None);
        resolver.resolve(&mut registry, &mut stack, 0, 300.0);
        assert_eq!(resolver.resolve(&mut registry, &mut stack, 0, 300.0), None);
        assert_eq!(stack.len(), 1);
    }
}
