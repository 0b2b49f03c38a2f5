//! Headless playtests: a JSON list of pointer and clock steps replayed
//! against a [`PebbleBalance`], recording a snapshot after every step.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{BalanceEvent, PebbleBalance};
use crate::geometry::{BoardRect, Vec2};
use crate::pebble::PebbleId;
use crate::snapshot::BalanceSnapshot;
use crate::tuning::BalanceTuning;

pub const DEFAULT_BOARD: BoardRect = BoardRect::at_origin(600.0, 520.0);

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed reading script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed parsing script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("board must have positive size, got {width}x{height}")]
    BadBoard { width: f32, height: f32 },
}

/// Pointer coordinates are screen space; the script's board rect converts
/// them the way a host view would.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Down { pebble: PebbleId, x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32 },
    /// Grab `pebble` where it currently rests and release it at `(x, y)`.
    Drop { pebble: PebbleId, x: f32, y: f32 },
    Advance { ms: u64 },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaytestScript {
    #[serde(default = "default_board")]
    pub board: BoardRect,
    pub steps: Vec<ScriptStep>,
}

fn default_board() -> BoardRect {
    DEFAULT_BOARD
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub step: usize,
    pub op: ScriptStep,
    pub events: Vec<BalanceEvent>,
    pub snapshot: BalanceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub initial: BalanceSnapshot,
    pub frames: Vec<Frame>,
}

impl Recording {
    pub fn last(&self) -> &BalanceSnapshot {
        self.frames
            .last()
            .map(|frame| &frame.snapshot)
            .unwrap_or(&self.initial)
    }

    pub fn events(&self) -> impl Iterator<Item = &BalanceEvent> {
        self.frames.iter().flat_map(|frame| frame.events.iter())
    }
}

impl PlaytestScript {
    pub fn parse(json: &str) -> Result<Self, ScriptError> {
        let script: PlaytestScript = serde_json::from_str(json)?;
        script.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    fn validated(self) -> Result<Self, ScriptError> {
        if self.board.width <= 0.0 || self.board.height <= 0.0 {
            return Err(ScriptError::BadBoard {
                width: self.board.width,
                height: self.board.height,
            });
        }
        Ok(self)
    }

    /// Drops every pebble onto the center line in id order, waits out each
    /// settle check, then waits out the win debounce.
    pub fn centered_stack(tuning: &BalanceTuning, board: BoardRect) -> Self {
        let frame = Duration::from_millis(16);
        let settle_ms = (tuning.settle_delay + frame).as_millis() as u64;
        let win_ms = (tuning.win_debounce + frame).as_millis() as u64;
        let center = Vec2::new(board.left + board.center_x(), board.top + board.height / 3.0);

        let mut steps = Vec::with_capacity(tuning.pebble_count * 2 + 1);
        for pebble in 0..tuning.pebble_count as PebbleId {
            steps.push(ScriptStep::Drop {
                pebble,
                x: center.x,
                y: center.y,
            });
            steps.push(ScriptStep::Advance { ms: settle_ms });
        }
        steps.push(ScriptStep::Advance { ms: win_ms });
        Self { board, steps }
    }

    pub fn run(&self, game: &mut PebbleBalance) -> Recording {
        let initial = game.snapshot();
        let frames = self
            .steps
            .iter()
            .enumerate()
            .map(|(step, op)| {
                let events = apply_step(game, self.board, *op);
                Frame {
                    step,
                    op: *op,
                    events,
                    snapshot: game.snapshot(),
                }
            })
            .collect();
        Recording { initial, frames }
    }
}

pub fn apply_step(game: &mut PebbleBalance, board: BoardRect, step: ScriptStep) -> Vec<BalanceEvent> {
    match step {
        ScriptStep::Down { pebble, x, y } => {
            game.pointer_down(pebble, Vec2::new(x, y), board);
            Vec::new()
        }
        ScriptStep::Move { x, y } => {
            game.pointer_move(Vec2::new(x, y), board);
            Vec::new()
        }
        ScriptStep::Up { x, y } => game.pointer_up(Vec2::new(x, y), board).into_iter().collect(),
        ScriptStep::Drop { pebble, x, y } => {
            let Some(rest) = game.pebble(pebble).map(|p| p.position()) else {
                return Vec::new();
            };
            let grab = Vec2::new(rest.x + board.left, rest.y + board.top);
            if !game.pointer_down(pebble, grab, board) {
                return Vec::new();
            }
            let target = Vec2::new(x, y);
            game.pointer_move(target, board);
            game.pointer_up(target, board).into_iter().collect()
        }
        ScriptStep::Advance { ms } => game.advance(Duration::from_millis(ms)),
        ScriptStep::Reset => {
            game.reset();
            Vec::new()
        }
    }
}
