//! Collision detection and response for balls against rectangles
//!
//! Everything the ball can touch (walls, paddle, bricks) is an axis-aligned
//! rectangle. Collisions are resolved per frame with boundary clamping, not
//! swept volumes, so fast balls can clip corners.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Whether `x` lies within the horizontal span (edges inclusive)
    #[inline]
    pub fn spans_x(&self, x: f32) -> bool {
        x >= self.x && x <= self.right()
    }

    /// Strict AABB overlap with another rectangle
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Which velocity component a brick hit reverses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitAxis {
    /// Side hit: dx flips
    Horizontal,
    /// Top/bottom hit: dy flips
    Vertical,
}

impl HitAxis {
    /// Reflect a velocity along this axis
    #[inline]
    pub fn reflect(self, vel: Vec2) -> Vec2 {
        match self {
            HitAxis::Horizontal => Vec2::new(-vel.x, vel.y),
            HitAxis::Vertical => Vec2::new(vel.x, -vel.y),
        }
    }
}

/// Which wall a ball bounced off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wall {
    Left,
    Right,
    Top,
}

/// Circle vs AABB overlap, using the ball's bounding box
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    center.x + radius > rect.x
        && center.x - radius < rect.right()
        && center.y + radius > rect.y
        && center.y - radius < rect.bottom()
}

/// Classify a brick hit from where the ball was one frame ago.
///
/// If the previous center was outside the brick's x-span the ball came in
/// from the side, otherwise from above or below. Corner hits at high speed
/// (or with an enlarged ball) can be misclassified.
pub fn hit_axis(pos: Vec2, vel: Vec2, rect: &Rect) -> HitAxis {
    let prev = pos - vel;
    if rect.spans_x(prev.x) {
        HitAxis::Vertical
    } else {
        HitAxis::Horizontal
    }
}

/// Bounce off the left, right and top walls.
///
/// The ball is clamped back inside the field and its velocity is pointed
/// away from the wall, so a ball can never tunnel through in one frame.
pub fn reflect_off_walls(pos: &mut Vec2, vel: &mut Vec2, radius: f32, width: f32) -> Option<Wall> {
    let mut hit = None;

    if pos.x - radius < 0.0 {
        pos.x = radius;
        vel.x = vel.x.abs();
        hit = Some(Wall::Left);
    } else if pos.x + radius > width {
        pos.x = width - radius;
        vel.x = -vel.x.abs();
        hit = Some(Wall::Right);
    }

    if pos.y - radius < 0.0 {
        pos.y = radius;
        vel.y = vel.y.abs();
        hit = Some(Wall::Top);
    }

    hit
}

/// Bounce off the paddle's top face.
///
/// Only a descending ball whose bottom has reached the paddle top while
/// horizontally overlapping the paddle is deflected. The horizontal
/// velocity is steered by how far from the paddle center the ball landed:
/// `steer` at the very edge, zero at the center. Returns true on a hit.
pub fn bounce_off_paddle(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    paddle: &Rect,
    steer: f32,
    max_dx: f32,
) -> bool {
    if vel.y <= 0.0 {
        return false;
    }
    if pos.y + radius < paddle.y || pos.y - radius > paddle.bottom() {
        return false;
    }
    if pos.x + radius <= paddle.x || pos.x - radius >= paddle.right() {
        return false;
    }

    vel.y = -vel.y;
    pos.y = paddle.y - radius;

    let half = paddle.w / 2.0;
    let offset = ((pos.x - paddle.center().x) / half).clamp(-1.0, 1.0);
    vel.x = (vel.x + offset * steer).clamp(-max_dx, max_dx);
    true
}
