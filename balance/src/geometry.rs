use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Self::Output {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Self::Output {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Screen-space bounds of the play area, as reported by the host view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BoardRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A rect whose board-local and screen coordinates coincide.
    pub const fn at_origin(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    pub fn to_local(&self, screen: Vec2) -> Vec2 {
        Vec2::new(screen.x - self.left, screen.y - self.top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_local_subtracts_rect_origin() {
        let rect = BoardRect::new(100.0, 40.0, 600.0, 520.0);
        assert_eq!(rect.to_local(Vec2::new(400.0, 90.0)), Vec2::new(300.0, 50.0));
        assert_eq!(rect.center_x(), 300.0);
    }

    #[test]
    fn to_local_does_not_clamp_outside_points() {
        let rect = BoardRect::new(10.0, 10.0, 100.0, 100.0);
        assert_eq!(rect.to_local(Vec2::new(-50.0, 500.0)), Vec2::new(-60.0, 490.0));
    }
}
