//! Movement and collision resolution
//!
//! Tanks move with axis-separated displacement-and-revert: X is applied on
//! its own and undone if the hull now overlaps a wall or a blocking tank,
//! then Y is tried the same way from wherever X left it. An entity pushing
//! diagonally into a wall keeps sliding along it instead of sticking.
//!
//! This never tunnels through a static wall as long as the per-tick
//! displacement is smaller than the entity itself.

use glam::Vec2;

use super::geometry::Aabb;

/// Below this an intended move counts as "not moving"
const MOVE_EPSILON: f32 = 0.01;

/// Outcome of one `resolve_move`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    /// Net displacement actually applied
    pub displacement: Vec2,
    pub blocked_x: bool,
    pub blocked_y: bool,
}

impl MoveResult {
    /// Tried to move but nothing happened on either axis
    pub fn is_stuck(&self, intended: Vec2) -> bool {
        self.displacement == Vec2::ZERO
            && (intended.x.abs() > MOVE_EPSILON || intended.y.abs() > MOVE_EPSILON)
    }
}

/// Move a square hull by `intended`, resolving each axis independently
///
/// Walls are checked first, then `blockers` (other tanks this one must not
/// pass through). Finally the hull is clamped inside `interior`.
pub fn resolve_move(
    pos: &mut Vec2,
    size: f32,
    intended: Vec2,
    walls: &[Aabb],
    blockers: &[Aabb],
    interior: &Aabb,
) -> MoveResult {
    let start = *pos;

    let blocked_x = !try_axis(pos, size, Vec2::new(intended.x, 0.0), walls, blockers);
    let blocked_y = !try_axis(pos, size, Vec2::new(0.0, intended.y), walls, blockers);

    *pos = interior.clamp_center(*pos, size);

    MoveResult {
        displacement: *pos - start,
        blocked_x: blocked_x && intended.x != 0.0,
        blocked_y: blocked_y && intended.y != 0.0,
    }
}

/// Apply a single-axis step, restoring the previous position on contact.
/// Returns true if the step was kept.
fn try_axis(pos: &mut Vec2, size: f32, step: Vec2, walls: &[Aabb], blockers: &[Aabb]) -> bool {
    if step == Vec2::ZERO {
        return false;
    }
    let previous = *pos;
    *pos += step;
    let hull = Aabb::square(*pos, size);
    if hits_any(&hull, walls) || hits_any(&hull, blockers) {
        // Restore rather than subtract so a revert is exact
        *pos = previous;
        return false;
    }
    true
}

#[inline]
fn hits_any(hull: &Aabb, others: &[Aabb]) -> bool {
    others.iter().any(|o| hull.overlaps(o))
}

/// First index in `targets` whose box overlaps `query`
pub fn first_overlap<'a, I>(query: &Aabb, targets: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a Aabb>,
{
    targets.into_iter().position(|t| query.overlaps(t))
}
