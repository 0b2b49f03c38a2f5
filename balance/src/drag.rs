use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;
use crate::pebble::{PebbleId, PebbleRegistry};

/// The pebble currently held and where on it the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSession {
    pub pebble: PebbleId,
    pub offset: Vec2,
}

/// Pointer positions are board-local here; screen conversion happens in
/// the game layer.
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    session: Option<DragSession>,
}

impl DragTracker {
    pub fn session(&self) -> Option<DragSession> {
        self.session
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn dragging(&self) -> Option<PebbleId> {
        self.session.map(|s| s.pebble)
    }

    /// Returns false (and changes nothing) when a drag is already active or
    /// the pebble can't be picked up.
    pub fn begin(&mut self, registry: &PebbleRegistry, id: PebbleId, pointer: Vec2) -> bool {
        if self.session.is_some() {
            return false;
        }
        let Some(pebble) = registry.get(id) else {
            return false;
        };
        if !pebble.is_draggable() {
            return false;
        }
        self.session = Some(DragSession {
            pebble: id,
            offset: pointer - pebble.position(),
        });
        true
    }

    /// Moves the held pebble so the grab point stays under the pointer.
    pub fn update(&self, registry: &mut PebbleRegistry, pointer: Vec2) -> Option<PebbleId> {
        let session = self.session?;
        let pebble = registry.get_mut(session.pebble)?;
        pebble.position = pointer - session.offset;
        Some(session.pebble)
    }

    /// Applies the final pointer position and ends the session. The caller
    /// resolves the placement with the returned id.
    pub fn end(&mut self, registry: &mut PebbleRegistry, pointer: Vec2) -> Option<PebbleId> {
        let id = self.update(registry, pointer);
        self.session = None;
        id
    }

    pub fn cancel(&mut self) {
        self.session = None;
    }
}
