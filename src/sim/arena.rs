//! Arena layout: border walls and randomly placed barriers
//!
//! Built once per round and never mutated afterwards. Everything else
//! (movement, AI lookahead, spawn placement, projectiles) reads it.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::Aabb;
use crate::Settings;
use crate::consts::*;

/// Number of border walls at the front of `walls`
const BORDER_WALLS: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub border: f32,
    /// Border walls first, then barriers
    pub walls: Vec<Aabb>,
    /// Player spawn center
    pub player_start: Vec2,
}

impl Arena {
    /// Arena with only the border walls
    pub fn open(settings: &Settings) -> Self {
        let (w, h, t) = (
            settings.arena_width,
            settings.arena_height,
            settings.border_thickness,
        );
        Self {
            width: w,
            height: h,
            border: t,
            walls: vec![
                Aabb::from_corner(0.0, 0.0, w, t),
                Aabb::from_corner(0.0, h - t, w, t),
                Aabb::from_corner(0.0, 0.0, t, h),
                Aabb::from_corner(w - t, 0.0, t, h),
            ],
            player_start: Vec2::new(w / 2.0, h / 2.0),
        }
    }

    /// Border walls plus randomly placed barriers
    ///
    /// Each barrier gets a bounded number of placement attempts; a barrier
    /// that cannot be placed is skipped.
    pub fn generate(settings: &Settings, rng: &mut Pcg32) -> Self {
        let mut arena = Self::open(settings);

        let padding = PLAYER_SIZE * BARRIER_PADDING_FACTOR;
        let clearance = PLAYER_SIZE * PLAYER_START_CLEARANCE_FACTOR;
        let start_area = Aabb::square(arena.player_start, PLAYER_SIZE).inflate(clearance * 2.0);

        for i in 0..settings.barrier_count {
            let placed = (0..settings.barrier_attempts).find_map(|_| {
                let width = rng.random_range(settings.barrier_min_size..=settings.barrier_max_size);
                let height =
                    rng.random_range(settings.barrier_min_size..=settings.barrier_max_size);
                let x_lo = arena.border + padding;
                let x_hi = arena.width - arena.border - padding - width;
                let y_lo = arena.border + padding;
                let y_hi = arena.height - arena.border - padding - height;
                if x_hi < x_lo || y_hi < y_lo {
                    return None;
                }
                let candidate = Aabb::from_corner(
                    rng.random_range(x_lo..=x_hi),
                    rng.random_range(y_lo..=y_hi),
                    width,
                    height,
                );

                if candidate.overlaps(&start_area) {
                    return None;
                }
                let crowded = arena
                    .walls
                    .iter()
                    .any(|wall| candidate.overlaps(&wall.inflate(PLAYER_SIZE / 2.0)));
                if crowded { None } else { Some(candidate) }
            });

            match placed {
                Some(barrier) => arena.walls.push(barrier),
                None => log::warn!(
                    "Could not place barrier {} after {} attempts",
                    i + 1,
                    settings.barrier_attempts
                ),
            }
        }

        arena.settle_player_start();
        arena
    }

    /// Add a barrier while building a custom layout
    pub fn with_barrier(mut self, barrier: Aabb) -> Self {
        self.walls.push(barrier);
        self
    }

    /// Whole arena rectangle, border included
    pub fn bounds(&self) -> Aabb {
        Aabb::from_corner(0.0, 0.0, self.width, self.height)
    }

    /// Playable area inside the border
    pub fn interior(&self) -> Aabb {
        self.bounds().inset(Vec2::splat(self.border))
    }

    /// Interior barriers (border walls excluded)
    pub fn barriers(&self) -> &[Aabb] {
        &self.walls[BORDER_WALLS.min(self.walls.len())..]
    }

    pub fn overlaps_wall(&self, b: &Aabb) -> bool {
        self.walls.iter().any(|wall| wall.overlaps(b))
    }

    /// Would a small box at `p` hit a wall or leave the interior?
    pub fn point_blocked(&self, p: Vec2) -> bool {
        !self.interior().contains_point(p)
            || self.overlaps_wall(&Aabb::square(p, LOOKAHEAD_PROBE_SIZE))
    }

    /// Nudge the player start sideways until it is clear of walls
    fn settle_player_start(&mut self) {
        let origin = self.player_start;
        let limit = self.interior().max.x;
        while self.overlaps_wall(&Aabb::square(self.player_start, PLAYER_SIZE)) {
            self.player_start.x += PLAYER_NUDGE_STEP;
            if self.player_start.x + PLAYER_SIZE / 2.0 > limit {
                log::warn!("Could not find a clear player start, keeping the center");
                self.player_start = origin;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_open_arena_has_border_only() {
        let arena = Arena::open(&Settings::default());
        assert_eq!(arena.walls.len(), 4);
        assert!(arena.barriers().is_empty());
        let interior = arena.interior();
        assert_eq!(interior.min, Vec2::new(10.0, 10.0));
        assert_eq!(interior.max, Vec2::new(990.0, 790.0));
    }

    #[test]
    fn test_generated_barriers_respect_constraints() {
        let settings = Settings::default();
        for seed in 0..20 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let arena = Arena::generate(&settings, &mut rng);
            assert!(arena.barriers().len() <= settings.barrier_count as usize);

            let clearance = PLAYER_SIZE * PLAYER_START_CLEARANCE_FACTOR;
            let start_area =
                Aabb::square(Vec2::new(500.0, 400.0), PLAYER_SIZE).inflate(clearance * 2.0);
            let interior = arena.interior();
            for barrier in arena.barriers() {
                assert!(!barrier.overlaps(&start_area), "seed {seed}: barrier in start area");
                assert!(barrier.min.x >= interior.min.x && barrier.max.x <= interior.max.x);
                assert!(barrier.min.y >= interior.min.y && barrier.max.y <= interior.max.y);
            }
            assert!(!arena.overlaps_wall(&Aabb::square(arena.player_start, PLAYER_SIZE)));
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let settings = Settings::default();
        let a = Arena::generate(&settings, &mut Pcg32::seed_from_u64(42));
        let b = Arena::generate(&settings, &mut Pcg32::seed_from_u64(42));
        assert_eq!(a.walls, b.walls);
    }

    #[test]
    fn test_point_blocked() {
        let arena = Arena::open(&Settings::default())
            .with_barrier(Aabb::from_corner(200.0, 200.0, 20.0, 20.0));
        assert!(arena.point_blocked(Vec2::new(210.0, 210.0)));
        assert!(arena.point_blocked(Vec2::new(5.0, 400.0)));
        assert!(!arena.point_blocked(Vec2::new(400.0, 400.0)));
    }

    #[test]
    fn test_player_start_nudged_off_barrier() {
        let mut arena = Arena::open(&Settings::default())
            .with_barrier(Aabb::from_corner(490.0, 390.0, 20.0, 20.0));
        arena.settle_player_start();
        assert!(!arena.overlaps_wall(&Aabb::square(arena.player_start, PLAYER_SIZE)));
        assert!(arena.player_start.x > 500.0);
        assert_eq!(arena.player_start.y, 400.0);
    }
}
