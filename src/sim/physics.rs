//! Axis-aligned collision and platformer physics
//!
//! Everything in the play field is a box. Positions are the top-left corner,
//! +y points down, velocities are in pixels per tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::Platform;
use crate::consts::*;

/// Position, size and velocity shared by every entity kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub facing_right: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            vel: Vec2::ZERO,
            facing_right: true,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Strict AABB overlap; touching edges do not count
    #[inline]
    pub fn collides(&self, other: &Body) -> bool {
        overlaps(self.pos, self.size, other.pos, other.size)
    }

    /// Add one tick of gravity, clamped at terminal fall speed
    pub fn apply_gravity(&mut self) {
        self.vel.y = (self.vel.y + GRAVITY).min(MAX_FALL_SPEED);
    }

    /// Move by one tick of velocity
    #[inline]
    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }

    /// Horizontal wrap: fully leaving one side re-enters from the other.
    /// Vertical bounds are left to the entity's own rules.
    pub fn wrap_around_screen(&mut self) {
        if self.right() < 0.0 {
            self.pos.x = GAME_WIDTH;
        } else if self.pos.x > GAME_WIDTH {
            self.pos.x = -self.size.x;
        }
    }
}

#[inline]
fn overlaps(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    a_pos.x < b_pos.x + b_size.x
        && a_pos.x + a_size.x > b_pos.x
        && a_pos.y < b_pos.y + b_size.y
        && a_pos.y + a_size.y > b_pos.y
}

/// Pixels of slack when deciding which side a body came from
const CONTACT_TOLERANCE: f32 = 2.0;

/// How a body met a platform this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    None,
    /// Was above the surface and moving down (or resting)
    FromAbove,
    /// Was below the underside and moving up
    FromBelow,
    /// Any other overlap
    Side,
}

/// Classify an overlap between `body` and `platform` given the body's
/// y position before this tick's movement
pub fn classify_contact(body: &Body, platform: &Platform, previous_y: f32) -> Contact {
    if !overlaps(body.pos, body.size, platform.pos(), platform.size()) {
        return Contact::None;
    }

    let was_above = previous_y + body.size.y <= platform.y + CONTACT_TOLERANCE;
    if was_above && body.vel.y >= 0.0 {
        return Contact::FromAbove;
    }

    let was_below = previous_y >= platform.y + platform.height - CONTACT_TOLERANCE;
    if was_below && body.vel.y < 0.0 {
        return Contact::FromBelow;
    }

    Contact::Side
}

/// Resolve a single platform contact. Returns true if the body landed.
///
/// Landing from above always snaps and stops the fall. One-way platforms
/// never block from below or the side.
pub fn resolve_platform(body: &mut Body, platform: &Platform, previous_y: f32) -> bool {
    match classify_contact(body, platform, previous_y) {
        Contact::None => false,
        Contact::FromAbove => {
            body.pos.y = platform.y - body.size.y;
            body.vel.y = 0.0;
            true
        }
        Contact::FromBelow if !platform.one_way => {
            body.pos.y = platform.y + platform.height;
            body.vel.y = 0.0;
            false
        }
        Contact::Side if !platform.one_way => {
            if body.vel.x > 0.0 {
                body.pos.x = platform.x - body.size.x;
            } else if body.vel.x < 0.0 {
                body.pos.x = platform.x + platform.width;
            }
            body.vel.x = 0.0;
            false
        }
        Contact::FromBelow | Contact::Side => false,
    }
}

/// Resolve against every platform in order. Returns whether the body is grounded.
pub fn resolve_platforms(body: &mut Body, platforms: &[Platform], previous_y: f32) -> bool {
    let mut on_ground = false;
    for platform in platforms {
        on_ground |= resolve_platform(body, platform, previous_y);
    }
    on_ground
}

/// Nearest platform strictly underneath the body (horizontal overlap required)
pub fn platform_below<'a>(body: &Body, platforms: &'a [Platform]) -> Option<&'a Platform> {
    platforms
        .iter()
        .filter(|p| body.left() < p.x + p.width && body.right() > p.x && p.y > body.bottom())
        .min_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
}
