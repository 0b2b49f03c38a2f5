use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PEBBLE_COUNT: usize = 5;
pub const PEBBLE_WIDTH_MIN: u32 = 90;
pub const PEBBLE_WIDTH_MAX: u32 = 150;
pub const PEBBLE_HEIGHT_MIN: u32 = 28;
pub const PEBBLE_HEIGHT_MAX: u32 = 44;

pub const STACK_SPACING: f32 = 6.0;
pub const STACK_BASE_Y: f32 = 350.0;
pub const TARGET_ZONE_HALF_WIDTH: f32 = 140.0;
pub const TRAY_Y: f32 = 420.0;
pub const TRAY_ORIGIN_X: f32 = 60.0;
pub const TRAY_SPACING: f32 = 60.0;
pub const DROP_HEIGHT: f32 = 200.0;

pub const STABILITY_TOLERANCE_FACTOR: f32 = 0.5;
pub const STABILITY_TOLERANCE_FLOOR: f32 = 8.0;

pub const SETTLE_DELAY: Duration = Duration::from_millis(600);
pub const TOPPLE_FLASH: Duration = Duration::from_millis(900);
pub const WIN_DEBOUNCE: Duration = Duration::from_millis(2_000);
pub const TOPPLE_ANGLE_DEG: f32 = 22.0;

pub const SPRING_STIFFNESS: f32 = 160.0;
pub const SPRING_DAMPING: f32 = 18.0;

/// Stone tones, assigned round-robin by pebble id.
pub const PALETTE: [&str; 5] = ["#d6ccc2", "#bdb0a5", "#a79a8f", "#d0c7be", "#c3b8ad"];

/// Where a pebble released inside the target zone ends up horizontally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// Snap onto the board's center line.
    #[default]
    Snap,
    /// Keep the x the pebble was released at.
    Free,
}

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed reading tuning file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed parsing tuning file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("pebble count must be at least 1")]
    NoPebbles,

    #[error("{field} range is empty or inverted: [{min}, {max}]")]
    BadRange {
        field: &'static str,
        min: u32,
        max: u32,
    },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
}

/// Every constant the simulation reads. The defaults are the shipped game;
/// other values exist for harnesses and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceTuning {
    pub pebble_count: usize,
    pub width_min: u32,
    pub width_max: u32,
    pub height_min: u32,
    pub height_max: u32,
    pub stack_spacing: f32,
    pub stack_base_y: f32,
    pub zone_half_width: f32,
    pub tray_y: f32,
    pub tray_origin_x: f32,
    pub tray_spacing: f32,
    pub drop_height: f32,
    pub tolerance_factor: f32,
    pub tolerance_floor: f32,
    pub placement_mode: PlacementMode,
    #[serde(with = "millis")]
    pub settle_delay: Duration,
    #[serde(with = "millis")]
    pub topple_flash: Duration,
    #[serde(with = "millis")]
    pub win_debounce: Duration,
    pub topple_angle_deg: f32,
    pub spring_stiffness: f32,
    pub spring_damping: f32,
}

impl Default for BalanceTuning {
    fn default() -> Self {
        Self {
            pebble_count: DEFAULT_PEBBLE_COUNT,
            width_min: PEBBLE_WIDTH_MIN,
            width_max: PEBBLE_WIDTH_MAX,
            height_min: PEBBLE_HEIGHT_MIN,
            height_max: PEBBLE_HEIGHT_MAX,
            stack_spacing: STACK_SPACING,
            stack_base_y: STACK_BASE_Y,
            zone_half_width: TARGET_ZONE_HALF_WIDTH,
            tray_y: TRAY_Y,
            tray_origin_x: TRAY_ORIGIN_X,
            tray_spacing: TRAY_SPACING,
            drop_height: DROP_HEIGHT,
            tolerance_factor: STABILITY_TOLERANCE_FACTOR,
            tolerance_floor: STABILITY_TOLERANCE_FLOOR,
            placement_mode: PlacementMode::Snap,
            settle_delay: SETTLE_DELAY,
            topple_flash: TOPPLE_FLASH,
            win_debounce: WIN_DEBOUNCE,
            topple_angle_deg: TOPPLE_ANGLE_DEG,
            spring_stiffness: SPRING_STIFFNESS,
            spring_damping: SPRING_DAMPING,
        }
    }
}

impl BalanceTuning {
    pub fn with_placement_mode(mut self, mode: PlacementMode) -> Self {
        self.placement_mode = mode;
        self
    }

    pub fn width_range(&self) -> RangeInclusive<u32> {
        self.width_min..=self.width_max
    }

    pub fn height_range(&self) -> RangeInclusive<u32> {
        self.height_min..=self.height_max
    }

    pub fn validate(self) -> Result<Self, TuningError> {
        if self.pebble_count == 0 {
            return Err(TuningError::NoPebbles);
        }
        if self.width_min == 0 || self.width_min > self.width_max {
            return Err(TuningError::BadRange {
                field: "width",
                min: self.width_min,
                max: self.width_max,
            });
        }
        if self.height_min == 0 || self.height_min > self.height_max {
            return Err(TuningError::BadRange {
                field: "height",
                min: self.height_min,
                max: self.height_max,
            });
        }
        if self.zone_half_width <= 0.0 {
            return Err(TuningError::NotPositive {
                field: "zone_half_width",
                value: self.zone_half_width,
            });
        }
        if self.spring_stiffness <= 0.0 {
            return Err(TuningError::NotPositive {
                field: "spring_stiffness",
                value: self.spring_stiffness,
            });
        }
        for (field, value) in [
            ("stack_spacing", self.stack_spacing),
            ("tolerance_factor", self.tolerance_factor),
            ("tolerance_floor", self.tolerance_floor),
            ("spring_damping", self.spring_damping),
        ] {
            if value < 0.0 {
                return Err(TuningError::Negative { field, value });
            }
        }
        Ok(self)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| TuningError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning: BalanceTuning =
            serde_json::from_slice(&bytes).map_err(|source| TuningError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tuning.validate()
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(value.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_constants() {
        let t = BalanceTuning::default();
        assert_eq!(t.pebble_count, 5);
        assert_eq!(t.width_range(), 90..=150);
        assert_eq!(t.height_range(), 28..=44);
        assert_eq!(t.win_debounce, Duration::from_millis(2_000));
        assert_eq!(t.placement_mode, PlacementMode::Snap);
    }

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let parsed: BalanceTuning =
            serde_json::from_str(r#"{"pebble_count":3,"win_debounce":500,"placement_mode":"free"}"#)
                .expect("tuning JSON should parse");
        assert_eq!(parsed.pebble_count, 3);
        assert_eq!(parsed.win_debounce, Duration::from_millis(500));
        assert_eq!(parsed.placement_mode, PlacementMode::Free);
        assert_eq!(parsed.settle_delay, SETTLE_DELAY);
        assert_eq!(parsed.width_min, PEBBLE_WIDTH_MIN);
    }

    #[test]
    fn validate_rejects_inverted_width_range() {
        let tuning = BalanceTuning {
            width_min: 150,
            width_max: 90,
            ..BalanceTuning::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::BadRange { field: "width", .. })
        ));
    }

    #[test]
    fn validate_rejects_empty_batch_and_negative_tolerance() {
        let empty = BalanceTuning {
            pebble_count: 0,
            ..BalanceTuning::default()
        };
        assert!(matches!(empty.validate(), Err(TuningError::NoPebbles)));

        let negative = BalanceTuning {
            tolerance_floor: -1.0,
            ..BalanceTuning::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(TuningError::Negative {
                field: "tolerance_floor",
                ..
            })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = BalanceTuning::load("/definitely/not/here/tuning.json").unwrap_err();
        assert!(matches!(err, TuningError::Read { .. }));
    }
}
