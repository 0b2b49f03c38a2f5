use chrono::{DateTime, Utc};
use pebble_balance::script::{Frame, Recording};
use pebble_balance::{BalanceSnapshot, PlacementMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaytestReport {
    pub started_at: DateTime<Utc>,
    pub seed: u64,
    pub mode: PlacementMode,
    pub script: Option<String>,
    pub steps: usize,
    pub won: bool,
    pub final_digest: String,
    pub initial: BalanceSnapshot,
    pub frames: Vec<Frame>,
}

/// The short form printed by `--digest-only`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestReport {
    pub started_at: DateTime<Utc>,
    pub seed: u64,
    pub steps: usize,
    pub won: bool,
    pub final_digest: String,
}

impl PlaytestReport {
    pub fn new(
        started_at: DateTime<Utc>,
        seed: u64,
        mode: PlacementMode,
        script: Option<String>,
        recording: Recording,
    ) -> Result<Self, serde_json::Error> {
        let last = recording.last();
        let final_digest = last.digest()?;
        let won = last.won;
        Ok(Self {
            started_at,
            seed,
            mode,
            script,
            steps: recording.frames.len(),
            won,
            final_digest,
            initial: recording.initial,
            frames: recording.frames,
        })
    }

    pub fn digest_only(&self) -> DigestReport {
        DigestReport {
            started_at: self.started_at,
            seed: self.seed,
            steps: self.steps,
            won: self.won,
            final_digest: self.final_digest.clone(),
        }
    }
}
