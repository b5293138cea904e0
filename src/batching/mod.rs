//! Instanced batching - panels and glyphs that share a material and paint
//! order are drawn from one instance buffer.

mod buffer;
mod glyph;
mod group;
mod panel;
mod slots;

pub use buffer::InstanceBuffer;
pub use glyph::{GlyphGroupKey, GlyphGroupManager, GlyphInstance};
pub use group::{GroupKey, GroupManager, InstanceGroup, InstanceHandle};
pub use panel::{PanelGroupKey, PanelGroupManager, PanelInstance, PanelStyle};
pub use slots::InstanceSlots;

use bitflags::bitflags;
use bytemuck::Pod;
use glam::Vec3;

bitflags! {
    /// Instance attributes changed since the last upload.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InstanceAttributes: u8 {
        const MATRIX   = 0b0000_0001;
        const COLOR    = 0b0000_0010;
        const BORDER   = 0b0000_0100;
        const CLIPPING = 0b0000_1000;
        const UV       = 0b0001_0000;
        const PARAMS   = 0b0010_0000;
    }
}

/// Per-instance GPU data.
pub trait Instance: Pod + std::fmt::Debug {
    /// Position in root space, used for camera-distance ordering.
    fn position(&self) -> Vec3;

    /// Attributes that differ from `previous`.
    fn changes(&self, previous: &Self) -> InstanceAttributes;
}

/// Column-major matrix array for instance data.
pub(crate) fn matrix_array(matrix: &glam::Mat4) -> [[f32; 4]; 4] {
    matrix.to_cols_array_2d()
}

pub(crate) fn matrix_position(cols: &[[f32; 4]; 4]) -> Vec3 {
    Vec3::new(cols[3][0], cols[3][1], cols[3][2])
}
