use serde::{Deserialize, Serialize};

/// 2D vector with f32 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// Create a new vector
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Vector with both components set to `v`
    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }
}

/// 2D point with f32 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Scale grid coordinates into canvas coordinates
    pub fn scale(self, cell: Vec2) -> Self {
        Self {
            x: self.x * cell.x,
            y: self.y * cell.y,
        }
    }
}
