//! Clipping - axis-aligned rectangles in root space.
//!
//! A node's clipping rect is its own border-inset box intersected with the
//! nearest clipping ancestor. Children of a `visible` node inherit the
//! ancestor rect unchanged.

use glam::{Mat4, Vec2, Vec3};

use crate::types::{Inset, Overflow};

/// Axis-aligned rect in root space, world units, Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl ClipRect {
    /// Clips everything.
    pub const EMPTY: Self = Self { min: Vec2::ZERO, max: Vec2::ZERO };

    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Bounding box of a set of points.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for p in points {
            min = min.min(p);
            max = max.max(p);
        }
        if min.x > max.x { Self::EMPTY } else { Self { min, max } }
    }

    pub fn size(&self) -> Vec2 {
        (self.max - self.min).max(Vec2::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    /// Check if a point is inside this rect.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn contains_rect(&self, other: &ClipRect) -> bool {
        other.is_empty() || (self.contains(other.min) && self.contains(other.max))
    }

    /// Compute intersection of two rects; disjoint rects give [`ClipRect::EMPTY`].
    pub fn intersect(&self, other: &ClipRect) -> ClipRect {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if max.x > min.x && max.y > min.y { ClipRect { min, max } } else { ClipRect::EMPTY }
    }

    /// `[min.x, min.y, max.x, max.y]` for instance attributes.
    pub fn to_array(self) -> [f32; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }
}

/// Root-space bounds of a node's box shrunk by `inset`.
pub fn inset_rect(matrix: &Mat4, size: Vec2, inset: Inset, pixel_size: f32) -> ClipRect {
    let half = size * 0.5;
    let left = (-half.x + inset.left) * pixel_size;
    let right = (half.x - inset.right) * pixel_size;
    let top = (half.y - inset.top) * pixel_size;
    let bottom = (-half.y + inset.bottom) * pixel_size;

    if right <= left || top <= bottom {
        return ClipRect::EMPTY;
    }
    ClipRect::from_points(
        [
            Vec3::new(left, top, 0.0),
            Vec3::new(right, top, 0.0),
            Vec3::new(right, bottom, 0.0),
            Vec3::new(left, bottom, 0.0),
        ]
        .map(|corner| matrix.transform_point3(corner).truncate()),
    )
}

/// Clip rect for a node.
///
/// `matrix` is the node's global matrix relative to the root. Returns `None`
/// when neither the node nor any ancestor clips.
pub fn compute_clipping_rect(
    matrix: &Mat4,
    size: Vec2,
    border_inset: Inset,
    overflow: Overflow,
    pixel_size: f32,
    parent: Option<&ClipRect>,
) -> Option<ClipRect> {
    if !overflow.clips() {
        return parent.copied();
    }

    let own = inset_rect(matrix, size, border_inset, pixel_size);
    Some(match parent {
        Some(parent) => own.intersect(parent),
        None => own,
    })
}
