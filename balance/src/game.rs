use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::drag::{DragSession, DragTracker};
use crate::geometry::{BoardRect, Vec2};
use crate::motion::Motion;
use crate::pebble::{Pebble, PebbleId, PebbleRegistry};
use crate::placement::{Placement, PlacementResolver};
use crate::snapshot::{BalanceSnapshot, PebbleView};
use crate::stability::{Stability, StabilityRule};
use crate::stack::Stack;
use crate::timer::{Countdown, tick_slot};
use crate::tuning::BalanceTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Dragging,
    /// A placement is waiting for its settle check.
    Resolving,
    ToppledFlash,
    Won,
}

/// What happened during a pointer release or a clock advance, in order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BalanceEvent {
    Placed { id: PebbleId, stack_index: usize },
    Returned { id: PebbleId },
    Settled { stack_len: usize },
    WinPending { remaining_ms: u64 },
    Toppled { id: PebbleId, topple_index: usize },
    FlashCleared { id: PebbleId },
    Won,
}

/// The stacking game: owns the batch, the stack, the drag session and every
/// pending countdown. Hosts feed it pointer events and frame deltas and read
/// [`BalanceSnapshot`]s back.
#[derive(Debug, Clone)]
pub struct PebbleBalance {
    tuning: BalanceTuning,
    rule: StabilityRule,
    registry: PebbleRegistry,
    stack: Stack,
    drag: DragTracker,
    motion: Motion,
    settle_checks: Vec<Countdown>,
    /// One countdown per falling pebble, oldest first.
    flashes: Vec<(PebbleId, Countdown)>,
    win_timer: Option<Countdown>,
    won: bool,
}

impl PebbleBalance {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, BalanceTuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: BalanceTuning) -> Self {
        let registry = PebbleRegistry::new(seed, &tuning);
        let motion = Motion::new(&registry, tuning.spring_stiffness, tuning.spring_damping);
        Self {
            rule: StabilityRule {
                factor: tuning.tolerance_factor,
                floor: tuning.tolerance_floor,
            },
            tuning,
            registry,
            stack: Stack::default(),
            drag: DragTracker::default(),
            motion,
            settle_checks: Vec::new(),
            flashes: Vec::new(),
            win_timer: None,
            won: false,
        }
    }

    pub fn tuning(&self) -> &BalanceTuning {
        &self.tuning
    }

    pub fn registry(&self) -> &PebbleRegistry {
        &self.registry
    }

    pub fn pebble(&self, id: PebbleId) -> Option<&Pebble> {
        self.registry.get(id)
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn drag_session(&self) -> Option<DragSession> {
        self.drag.session()
    }

    pub fn pending_settle_checks(&self) -> usize {
        self.settle_checks.len()
    }

    pub fn win_timer(&self) -> Option<&Countdown> {
        self.win_timer.as_ref()
    }

    pub fn is_toppled_flash(&self) -> bool {
        !self.flashes.is_empty()
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn has_pending_timers(&self) -> bool {
        !self.settle_checks.is_empty() || !self.flashes.is_empty() || self.win_timer.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.won {
            Phase::Won
        } else if self.drag.is_active() {
            Phase::Dragging
        } else if !self.flashes.is_empty() {
            Phase::ToppledFlash
        } else if !self.settle_checks.is_empty() {
            Phase::Resolving
        } else {
            Phase::Idle
        }
    }

    /// Overrides a pebble's dimensions so scenarios don't depend on the
    /// random batch.
    pub fn set_pebble_size_for_test(&mut self, id: PebbleId, width: f32, height: f32) {
        self.registry.replace_dimensions(id, width, height);
    }

    pub fn pointer_down(&mut self, id: PebbleId, screen: Vec2, board: BoardRect) -> bool {
        if self.won {
            debug!(id, "pointer down ignored: game already won");
            return false;
        }
        let pointer = board.to_local(screen);
        let grabbed = self.drag.begin(&self.registry, id, pointer);
        if grabbed {
            debug!(id, x = pointer.x, y = pointer.y, "drag started");
        } else {
            debug!(id, "pointer down ignored");
        }
        grabbed
    }

    pub fn pointer_move(&mut self, screen: Vec2, board: BoardRect) -> bool {
        let pointer = board.to_local(screen);
        let Some(id) = self.drag.update(&mut self.registry, pointer) else {
            return false;
        };
        if let Some(pebble) = self.registry.get(id) {
            self.motion.snap(id, pebble.position());
        }
        true
    }

    /// Ends the drag and resolves where the pebble lands. `None` when no
    /// drag was active.
    pub fn pointer_up(&mut self, screen: Vec2, board: BoardRect) -> Option<BalanceEvent> {
        let pointer = board.to_local(screen);
        let id = self.drag.end(&mut self.registry, pointer)?;
        let resolver = PlacementResolver::new(&self.tuning, board.width);
        let placement = resolver.resolve(&mut self.registry, &mut self.stack, id, pointer.x)?;

        match placement {
            Placement::Placed { stack_index } => {
                self.win_timer = None;
                self.settle_checks.push(Countdown::new(self.tuning.settle_delay));
                if let Some(pebble) = self.registry.get(id) {
                    self.motion
                        .drop_from_above(id, pebble.position(), self.tuning.drop_height);
                }
                info!(id, stack_index, stack_len = self.stack.len(), "pebble placed");
                Some(BalanceEvent::Placed { id, stack_index })
            }
            Placement::Returned => {
                debug!(id, "pebble returned to tray");
                Some(BalanceEvent::Returned { id })
            }
        }
    }

    /// Advances every countdown and the cosmetic motion by `dt`. A countdown
    /// started by this call (win debounce, topple flash) is not charged
    /// any of `dt`.
    pub fn advance(&mut self, dt: Duration) -> Vec<BalanceEvent> {
        let mut events = Vec::new();

        for (id, flash) in &mut self.flashes {
            if flash.tick(dt) {
                if let Some(pebble) = self.registry.get_mut(*id) {
                    pebble.send_to_tray(&self.tuning);
                }
                debug!(id = *id, "toppled pebble back in tray");
                events.push(BalanceEvent::FlashCleared { id: *id });
            }
        }
        self.flashes.retain(|(_, flash)| !flash.is_done());

        if tick_slot(&mut self.win_timer, dt) {
            self.won = true;
            info!(batch = self.registry.batch(), "stack held; game won");
            events.push(BalanceEvent::Won);
        }

        // Settle checks share one delay, so the due ones are the oldest.
        let due = self
            .settle_checks
            .iter_mut()
            .map(|check| check.tick(dt))
            .filter(|&fired| fired)
            .count();
        self.settle_checks.retain(|check| !check.is_done());
        for _ in 0..due {
            if let Some(event) = self.check_stability() {
                events.push(event);
            }
        }

        self.motion.step(&self.registry, dt);
        if let Some(id) = self.drag.dragging() {
            if let Some(pebble) = self.registry.get(id) {
                self.motion.snap(id, pebble.position());
            }
        }

        events
    }

    /// Fresh batch, empty stack, no drag and no pending timers.
    pub fn reset(&mut self) {
        self.registry.reset(&self.tuning);
        self.stack.clear();
        self.drag.cancel();
        self.settle_checks.clear();
        self.flashes.clear();
        self.win_timer = None;
        self.won = false;
        self.motion.sync(&self.registry);
        info!(batch = self.registry.batch(), "game reset");
    }

    fn check_stability(&mut self) -> Option<BalanceEvent> {
        if self.won {
            return None;
        }
        let verdict = self.rule.evaluate(&self.stack.pebbles(&self.registry));
        match verdict {
            Stability::Unstable { topple_index } => self.topple_top(topple_index),
            Stability::Stable if self.stack.len() == self.registry.len() => {
                let countdown = Countdown::new(self.tuning.win_debounce);
                let remaining_ms = countdown.remaining().as_millis() as u64;
                if self.win_timer.replace(countdown).is_some() {
                    debug!(remaining_ms, "win debounce restarted");
                } else {
                    debug!(remaining_ms, "win debounce started");
                }
                Some(BalanceEvent::WinPending { remaining_ms })
            }
            Stability::Stable => Some(BalanceEvent::Settled {
                stack_len: self.stack.len(),
            }),
        }
    }

    /// Only the topmost pebble falls, whichever pair failed.
    fn topple_top(&mut self, topple_index: usize) -> Option<BalanceEvent> {
        let id = self.stack.pop()?;
        if let Some(pebble) = self.registry.get_mut(id) {
            pebble.placed = false;
            pebble.toppled = true;
            pebble.angle = Some(self.tuning.topple_angle_deg);
        }
        self.win_timer = None;
        self.flashes.push((id, Countdown::new(self.tuning.topple_flash)));
        info!(id, topple_index, stack_len = self.stack.len(), "pebble toppled");
        Some(BalanceEvent::Toppled { id, topple_index })
    }

    /// Back to front: tray, falling, stacked bottom to top, then the held
    /// pebble.
    pub fn paint_order(&self) -> Vec<PebbleId> {
        let dragging = self.drag.dragging();
        let mut order = Vec::with_capacity(self.registry.len());
        let mut falling = Vec::new();
        for pebble in self.registry.iter() {
            if pebble.is_placed() || Some(pebble.id()) == dragging {
                continue;
            }
            if pebble.is_toppled() {
                falling.push(pebble.id());
            } else {
                order.push(pebble.id());
            }
        }
        order.extend(falling);
        order.extend(
            self.stack
                .ids()
                .iter()
                .copied()
                .filter(|&id| Some(id) != dragging),
        );
        order.extend(dragging);
        order
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        let dragging = self.drag.dragging();
        BalanceSnapshot {
            batch: self.registry.batch(),
            phase: self.phase(),
            pebbles: self
                .registry
                .iter()
                .map(|pebble| PebbleView {
                    id: pebble.id(),
                    position: pebble.position(),
                    visual: self.motion.visual(pebble.id()).unwrap_or(pebble.position()),
                    width: pebble.width(),
                    height: pebble.height(),
                    color: pebble.color().to_string(),
                    placed: pebble.is_placed(),
                    toppled: pebble.is_toppled(),
                    angle: pebble.angle(),
                    dragging: Some(pebble.id()) == dragging,
                })
                .collect(),
            stack: self.stack.ids().to_vec(),
            paint_order: self.paint_order(),
            toppled_flash: self.is_toppled_flash(),
            won: self.won,
        }
    }
}
