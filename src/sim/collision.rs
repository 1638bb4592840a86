//! Overlap detection between sprites
//!
//! The rules only need a yes/no answer per pair. Hosts with their own
//! physics implement [`Overlap`]; [`AabbOverlap`] is the built-in
//! box test using sprite-sized hitboxes.

use glam::Vec2;

use crate::tuning::{Hitbox, Tuning};

/// What a collision body belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Player,
    Enemy,
    PlayerBullet,
    EnemyBullet,
}

impl BodyKind {
    /// Sprite anchor as a fraction of its size. Bullets hang from their
    /// bottom-center, everything else is centered.
    pub fn anchor(self) -> Vec2 {
        match self {
            BodyKind::PlayerBullet | BodyKind::EnemyBullet => Vec2::new(0.5, 1.0),
            BodyKind::Player | BodyKind::Enemy => Vec2::new(0.5, 0.5),
        }
    }
}

/// A body offered to the overlap test
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub kind: BodyKind,
    pub pos: Vec2,
}

impl Body {
    pub fn new(kind: BodyKind, pos: Vec2) -> Self {
        Self { kind, pos }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box of `size` placed so that `anchor` (fraction of size) sits at `pos`
    pub fn from_anchor(pos: Vec2, size: Vec2, anchor: Vec2) -> Self {
        let min = pos - size * anchor;
        Self {
            min,
            max: min + size,
        }
    }

    /// Strict overlap: touching edges do not count
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Overlap test supplied by the host
pub trait Overlap {
    fn overlaps(&self, a: &Body, b: &Body) -> bool;
}

/// Sprite-box overlap using the tuned hitboxes
#[derive(Debug, Clone)]
pub struct AabbOverlap {
    pub player: Hitbox,
    pub enemy: Hitbox,
    pub player_bullet: Hitbox,
    pub enemy_bullet: Hitbox,
}

impl AabbOverlap {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            player: tuning.player_hitbox,
            enemy: tuning.enemy_hitbox,
            player_bullet: tuning.player_bullet_hitbox,
            enemy_bullet: tuning.enemy_bullet_hitbox,
        }
    }

    fn hitbox(&self, kind: BodyKind) -> Hitbox {
        match kind {
            BodyKind::Player => self.player,
            BodyKind::Enemy => self.enemy,
            BodyKind::PlayerBullet => self.player_bullet,
            BodyKind::EnemyBullet => self.enemy_bullet,
        }
    }

    pub fn aabb(&self, body: &Body) -> Aabb {
        let hitbox = self.hitbox(body.kind);
        Aabb::from_anchor(
            body.pos,
            Vec2::new(hitbox.width, hitbox.height),
            body.kind.anchor(),
        )
    }
}

impl Default for AabbOverlap {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

impl Overlap for AabbOverlap {
    fn overlaps(&self, a: &Body, b: &Body) -> bool {
        self.aabb(a).intersects(&self.aabb(b))
    }
}
