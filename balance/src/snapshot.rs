use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::game::Phase;
use crate::geometry::Vec2;
use crate::pebble::PebbleId;

/// Everything the host needs to draw one pebble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PebbleView {
    pub id: PebbleId,
    pub position: Vec2,
    pub visual: Vec2,
    pub width: f32,
    pub height: f32,
    pub color: String,
    pub placed: bool,
    pub toppled: bool,
    pub angle: Option<f32>,
    pub dragging: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub batch: u32,
    pub phase: Phase,
    /// Indexed by pebble id.
    pub pebbles: Vec<PebbleView>,
    /// Bottom to top.
    pub stack: Vec<PebbleId>,
    /// Back to front.
    pub paint_order: Vec<PebbleId>,
    pub toppled_flash: bool,
    pub won: bool,
}

impl BalanceSnapshot {
    pub fn pebble(&self, id: PebbleId) -> Option<&PebbleView> {
        self.pebbles.iter().find(|view| view.id == id)
    }

    /// Lowercase hex SHA-256 of the snapshot's JSON encoding.
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}
