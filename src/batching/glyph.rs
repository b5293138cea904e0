//! Glyph instances.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::clipping::ClipRect;
use crate::order::OrderInfo;
use crate::types::Color;

use super::group::{GroupKey, GroupManager};
use super::{matrix_array, matrix_position, Instance, InstanceAttributes};

/// Instance data of one glyph quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlyphInstance {
    pub matrix: [[f32; 4]; 4],
    /// Atlas rect: u, v, width, height.
    pub uv: [f32; 4],
    pub color: [f32; 4],
    pub clipping: [f32; 4],
}

impl Instance for GlyphInstance {
    fn position(&self) -> Vec3 {
        matrix_position(&self.matrix)
    }

    fn changes(&self, previous: &Self) -> InstanceAttributes {
        let mut changed = InstanceAttributes::empty();
        changed.set(InstanceAttributes::MATRIX, self.matrix != previous.matrix);
        changed.set(InstanceAttributes::UV, self.uv != previous.uv);
        changed.set(InstanceAttributes::COLOR, self.color != previous.color);
        changed.set(InstanceAttributes::CLIPPING, self.clipping != previous.clipping);
        changed
    }
}

impl GlyphInstance {
    /// `matrix` places and scales the glyph quad in root space.
    pub fn new(matrix: &Mat4, uv: [f32; 4], color: Color, clipping: Option<&ClipRect>) -> Self {
        Self {
            matrix: matrix_array(matrix),
            uv,
            color: color.to_array(),
            clipping: clipping.map_or([f32::MIN, f32::MIN, f32::MAX, f32::MAX], |c| c.to_array()),
        }
    }
}

/// Glyphs grouped by font and paint order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphGroupKey {
    pub font: String,
    pub order: OrderInfo,
}

impl GroupKey for GlyphGroupKey {
    fn order(&self) -> OrderInfo {
        self.order
    }
}

pub type GlyphGroupManager = GroupManager<GlyphGroupKey, GlyphInstance>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementType;

    #[test]
    fn test_glyph_groups_by_font() {
        let mut manager = GlyphGroupManager::new(1.0);
        let order = OrderInfo::new(0, ElementType::Text, 1);
        let glyph = GlyphInstance::new(&Mat4::IDENTITY, [0.0, 0.0, 0.1, 0.1], Color::WHITE, None);

        let a = manager.register(GlyphGroupKey { font: "inter".into(), order }, glyph);
        manager.register(GlyphGroupKey { font: "inter".into(), order }, glyph);
        manager.register(GlyphGroupKey { font: "mono".into(), order }, glyph);

        assert_eq!(manager.group_count(), 2);
        assert_eq!(manager.group(a.key()).map(|g| g.len()), Some(2));
        assert_eq!(manager.get(&a).map(|g| g.color), Some([1.0; 4]));
    }
}
