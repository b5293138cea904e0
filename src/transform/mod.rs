//! Transform pipeline - local, root alignment and global matrices.
//!
//! Layout space has Y pointing down; world space has Y pointing up. Every
//! conversion from layout units to world units goes through `pixel_size`.

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use crate::properties::{MergedProperties, PropertyKey, Value};
use crate::types::{AnchorX, AnchorY};

/// Transform properties read from merged properties, layout units and degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformProps {
    pub translate: Vec3,
    pub rotate: Vec3,
    pub scale: Vec3,
    /// Pivot as a fraction of the size, `(0, 0)` top-left, `(0.5, 0.5)` center.
    pub origin: Vec2,
}

impl Default for TransformProps {
    fn default() -> Self {
        Self { translate: Vec3::ZERO, rotate: Vec3::ZERO, scale: Vec3::ONE, origin: Vec2::splat(0.5) }
    }
}

impl TransformProps {
    /// Read from merged properties (tracked).
    pub fn read(props: &MergedProperties) -> Self {
        use PropertyKey as K;
        Self {
            translate: Vec3::new(
                props.number_or(K::TranslateX, 0.0),
                props.number_or(K::TranslateY, 0.0),
                props.number_or(K::TranslateZ, 0.0),
            ),
            rotate: Vec3::new(
                props.number_or(K::RotateX, 0.0),
                props.number_or(K::RotateY, 0.0),
                props.number_or(K::RotateZ, 0.0),
            ),
            scale: Vec3::new(
                props.number_or(K::ScaleX, 1.0),
                props.number_or(K::ScaleY, 1.0),
                props.number_or(K::ScaleZ, 1.0),
            ),
            origin: Vec2::new(
                origin_fraction(props.read(K::TransformOriginX), "left", "right"),
                origin_fraction(props.read(K::TransformOriginY), "top", "bottom"),
            ),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.translate == Vec3::ZERO && self.rotate == Vec3::ZERO && self.scale == Vec3::ONE
    }
}

fn origin_fraction(value: Option<Value>, start: &str, end: &str) -> f32 {
    match value {
        Some(Value::Number(n)) => n,
        Some(Value::Percent(p)) => p / 100.0,
        Some(Value::Str(s)) if s == start => 0.0,
        Some(Value::Str(s)) if s == end => 1.0,
        _ => 0.5,
    }
}

/// Layout-space offset to world-space offset.
pub fn layout_to_world(offset: Vec2, pixel_size: f32) -> Vec3 {
    Vec3::new(offset.x * pixel_size, -offset.y * pixel_size, 0.0)
}

/// Local matrix of a node relative to its parent's children matrix.
///
/// `relative_center` and `size` are layout outputs in layout units.
pub fn local_matrix(transform: &TransformProps, relative_center: Vec2, size: Vec2, pixel_size: f32) -> Mat4 {
    let position = layout_to_world(relative_center, pixel_size)
        + Vec3::new(transform.translate.x, -transform.translate.y, transform.translate.z) * pixel_size;

    if transform.rotate == Vec3::ZERO && transform.scale == Vec3::ONE {
        return Mat4::from_translation(position);
    }

    let pivot = layout_to_world((transform.origin - Vec2::splat(0.5)) * size, pixel_size);
    let rotation = Quat::from_euler(
        EulerRot::XYZ,
        transform.rotate.x.to_radians(),
        transform.rotate.y.to_radians(),
        transform.rotate.z.to_radians(),
    );

    Mat4::from_translation(position + pivot)
        * Mat4::from_scale_rotation_translation(transform.scale, rotation, Vec3::ZERO)
        * Mat4::from_translation(-pivot)
}

/// Aligns a root relative to its scene-graph origin.
pub fn root_matrix(anchor_x: AnchorX, anchor_y: AnchorY, size: Vec2, pixel_size: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(
        anchor_x.offset() * size.x * pixel_size,
        anchor_y.offset() * size.y * pixel_size,
        0.0,
    ))
}

/// Content offset of a scrolled container.
pub fn scroll_matrix(position: Vec2, pixel_size: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(-position.x * pixel_size, position.y * pixel_size, 0.0))
}

/// What children of a node are placed against: its global matrix moved by
/// its scroll offset.
pub fn children_matrix(global: &Mat4, scroll: Option<&Mat4>) -> Mat4 {
    match scroll {
        Some(scroll) => *global * *scroll,
        None => *global,
    }
}

pub fn global_matrix(parent_children_matrix: &Mat4, local: &Mat4) -> Mat4 {
    *parent_children_matrix * *local
}

/// Read `anchorX`/`anchorY`; unset anchors fall back to the given defaults.
pub fn read_anchors(props: &MergedProperties, default_x: AnchorX, default_y: AnchorY) -> (AnchorX, AnchorY) {
    let x = props.read(PropertyKey::AnchorX).and_then(|v| v.as_keyword()).unwrap_or(default_x);
    let y = props.read(PropertyKey::AnchorY).and_then(|v| v.as_keyword()).unwrap_or(default_y);
    (x, y)
}
