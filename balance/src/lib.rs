pub mod drag;
pub mod game;
pub mod geometry;
pub mod motion;
pub mod pebble;
pub mod placement;
pub mod script;
pub mod snapshot;
pub mod stability;
pub mod stack;
pub mod timer;
pub mod tuning;

pub use game::{BalanceEvent, PebbleBalance, Phase};
pub use geometry::{BoardRect, Vec2};
pub use pebble::{Pebble, PebbleId};
pub use snapshot::BalanceSnapshot;
pub use tuning::{BalanceTuning, PlacementMode};
