use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::Vec2;
use crate::tuning::{BalanceTuning, PALETTE};

pub type PebbleId = u32;

/// One placeable stone. Dimensions are fixed at creation; position and
/// flags change as the player drags, stacks and topples it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pebble {
    id: PebbleId,
    width: f32,
    height: f32,
    color: String,
    pub(crate) position: Vec2,
    pub(crate) placed: bool,
    pub(crate) toppled: bool,
    pub(crate) angle: Option<f32>,
}

impl Pebble {
    pub fn new(id: PebbleId, width: f32, height: f32, position: Vec2) -> Self {
        Self {
            id,
            width,
            height,
            color: palette_color(id).to_string(),
            position,
            placed: false,
            toppled: false,
            angle: None,
        }
    }

    pub fn id(&self) -> PebbleId {
        self.id
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn is_placed(&self) -> bool {
        self.placed
    }

    pub fn is_toppled(&self) -> bool {
        self.toppled
    }

    pub fn angle(&self) -> Option<f32> {
        self.angle
    }

    /// Tray pebbles can be picked up; stacked or falling ones cannot.
    pub fn is_draggable(&self) -> bool {
        !self.placed && !self.toppled
    }

    pub(crate) fn send_to_tray(&mut self, tuning: &BalanceTuning) {
        self.position = tray_position(self.id, tuning);
        self.placed = false;
        self.toppled = false;
        self.angle = None;
    }
}

pub fn palette_color(id: PebbleId) -> &'static str {
    PALETTE[id as usize % PALETTE.len()]
}

/// Resting slot in the tray for a pebble id.
pub fn tray_position(id: PebbleId, tuning: &BalanceTuning) -> Vec2 {
    Vec2::new(
        tuning.tray_origin_x + id as f32 * tuning.tray_spacing,
        tuning.tray_y,
    )
}

/// Arena of the current batch. The pebble with id `n` lives at index `n`;
/// the vector is only ever replaced wholesale, never reordered.
#[derive(Debug, Clone)]
pub struct PebbleRegistry {
    pebbles: Vec<Pebble>,
    batch: u32,
    rng: StdRng,
}

impl PebbleRegistry {
    pub fn new(seed: u64, tuning: &BalanceTuning) -> Self {
        let mut registry = Self {
            pebbles: Vec::new(),
            batch: 0,
            rng: StdRng::seed_from_u64(seed),
        };
        registry.pebbles = registry.create_batch(tuning.pebble_count, tuning);
        registry
    }

    pub fn create_batch(&mut self, n: usize, tuning: &BalanceTuning) -> Vec<Pebble> {
        (0..n as PebbleId)
            .map(|id| {
                let width = self.rng.random_range(tuning.width_range()) as f32;
                let height = self.rng.random_range(tuning.height_range()) as f32;
                Pebble::new(id, width, height, tray_position(id, tuning))
            })
            .collect()
    }

    pub fn reset(&mut self, tuning: &BalanceTuning) {
        self.pebbles = self.create_batch(tuning.pebble_count, tuning);
        self.batch = self.batch.wrapping_add(1);
        debug!(batch = self.batch, count = self.pebbles.len(), "new pebble batch");
    }

    /// Increments on every reset so hosts can tell batches apart.
    pub fn batch(&self) -> u32 {
        self.batch
    }

    pub fn len(&self) -> usize {
        self.pebbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pebbles.is_empty()
    }

    pub fn get(&self, id: PebbleId) -> Option<&Pebble> {
        self.pebbles.get(id as usize)
    }

    pub(crate) fn get_mut(&mut self, id: PebbleId) -> Option<&mut Pebble> {
        self.pebbles.get_mut(id as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pebble> {
        self.pebbles.iter()
    }

    pub(crate) fn replace_dimensions(&mut self, id: PebbleId, width: f32, height: f32) {
        if let Some(pebble) = self.get_mut(id) {
            pebble.width = width;
            pebble.height = height;
        }
    }
}
