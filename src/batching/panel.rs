//! Panel instances.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::clipping::ClipRect;
use crate::order::OrderInfo;
use crate::properties::{MergedProperties, PropertyKey};
use crate::types::{Color, Inset};

use super::group::{GroupKey, GroupManager};
use super::{matrix_array, matrix_position, Instance, InstanceAttributes};

/// Instance data of one panel quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PanelInstance {
    /// World matrix of the unit quad, scaled to the panel size.
    pub matrix: [[f32; 4]; 4],
    pub background_color: [f32; 4],
    pub border_color: [f32; 4],
    /// Border widths relative to the panel height: top, right, bottom, left.
    pub border_size: [f32; 4],
    /// Corner radii relative to the panel height: tl, tr, br, bl.
    pub border_radius: [f32; 4],
    /// `[min.x, min.y, max.x, max.y]` in root space.
    pub clipping: [f32; 4],
    /// border bend, aspect ratio, has clipping, unused.
    pub params: [f32; 4],
}

impl Instance for PanelInstance {
    fn position(&self) -> Vec3 {
        matrix_position(&self.matrix)
    }

    fn changes(&self, previous: &Self) -> InstanceAttributes {
        let mut changed = InstanceAttributes::empty();
        changed.set(InstanceAttributes::MATRIX, self.matrix != previous.matrix);
        changed.set(
            InstanceAttributes::COLOR,
            self.background_color != previous.background_color || self.border_color != previous.border_color,
        );
        changed.set(
            InstanceAttributes::BORDER,
            self.border_size != previous.border_size || self.border_radius != previous.border_radius,
        );
        changed.set(InstanceAttributes::CLIPPING, self.clipping != previous.clipping);
        changed.set(InstanceAttributes::PARAMS, self.params != previous.params);
        changed
    }
}

/// Visual panel properties resolved from merged properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelStyle {
    pub background_color: Color,
    pub border_color: Color,
    /// Corner radii in layout units: tl, tr, br, bl.
    pub border_radius: [f32; 4],
    pub border_bend: f32,
    /// Multiplies both colors' alpha.
    pub opacity: f32,
}

impl PanelStyle {
    /// Read from merged properties (tracked). `opacity` is inherited, so an
    /// unset value follows the parent.
    pub fn read(props: &MergedProperties) -> Self {
        use PropertyKey as K;
        let opacity = props.number_or(K::Opacity, 1.0);
        let background = props.color(K::BackgroundColor).unwrap_or(Color::TRANSPARENT);
        let border = props.color(K::BorderColor).unwrap_or(Color::BLACK);
        Self {
            background_color: background.with_opacity(props.number_or(K::BackgroundOpacity, 1.0)),
            border_color: border.with_opacity(props.number_or(K::BorderOpacity, 1.0)),
            border_radius: [
                props.number_or(K::BorderTopLeftRadius, 0.0),
                props.number_or(K::BorderTopRightRadius, 0.0),
                props.number_or(K::BorderBottomRightRadius, 0.0),
                props.number_or(K::BorderBottomLeftRadius, 0.0),
            ],
            border_bend: props.number_or(K::BorderBend, 0.0),
            opacity,
        }
    }

    /// Whether the panel draws anything at all.
    pub fn is_visible(&self, border: &Inset) -> bool {
        let has_border = border.horizontal() + border.vertical() > 0.0 && self.border_color.a > 0.0;
        self.opacity > 0.0 && (self.background_color.a > 0.0 || has_border)
    }
}

impl PanelInstance {
    /// `matrix` is the node's global matrix, `size` and `border` are in
    /// layout units.
    pub fn new(
        matrix: &Mat4,
        size: Vec2,
        border: Inset,
        pixel_size: f32,
        style: &PanelStyle,
        clipping: Option<&ClipRect>,
    ) -> Self {
        let world_size = (size * pixel_size).max(Vec2::splat(f32::EPSILON));
        let quad = *matrix * Mat4::from_scale(Vec3::new(world_size.x, world_size.y, 1.0));
        let height = size.y.max(f32::EPSILON);

        let opacity = style.opacity.clamp(0.0, 1.0);
        let background = style.background_color.with_opacity(opacity);
        let border_color = style.border_color.with_opacity(opacity);

        Self {
            matrix: matrix_array(&quad),
            background_color: background.to_array(),
            border_color: border_color.to_array(),
            border_size: border.to_array().map(|b| b / height),
            border_radius: style.border_radius.map(|r| r.min(size.x.min(size.y) * 0.5) / height),
            clipping: clipping.map_or([0.0; 4], |c| c.to_array()),
            params: [
                style.border_bend,
                size.x / height,
                if clipping.is_some() { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// Panels grouped by material class and paint order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelGroupKey {
    pub material_class: String,
    pub order: OrderInfo,
}

impl GroupKey for PanelGroupKey {
    fn order(&self) -> OrderInfo {
        self.order
    }
}

pub type PanelGroupManager = GroupManager<PanelGroupKey, PanelInstance>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batching::InstanceAttributes;
    use crate::types::ElementType;

    fn key(class: &str, z: i32) -> PanelGroupKey {
        PanelGroupKey { material_class: class.to_string(), order: OrderInfo::new(z, ElementType::Panel, 0) }
    }

    fn instance_at(x: f32, y: f32, z: f32) -> PanelInstance {
        let style = PanelStyle {
            background_color: Color::WHITE,
            border_color: Color::BLACK,
            border_radius: [0.0; 4],
            border_bend: 0.0,
            opacity: 1.0,
        };
        PanelInstance::new(
            &Mat4::from_translation(Vec3::new(x, y, z)),
            Vec2::new(1.0, 0.5),
            Inset::ZERO,
            1.0,
            &style,
            None,
        )
    }

    #[test]
    fn test_instance_layout() {
        let instance = instance_at(1.0, 2.0, 3.0);
        assert_eq!(instance.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(instance.matrix[0][0], 1.0);
        assert_eq!(instance.matrix[1][1], 0.5);
        assert_eq!(instance.params[1], 2.0);
        assert_eq!(std::mem::size_of::<PanelInstance>(), (16 + 6 * 4) * 4);
    }

    #[test]
    fn test_changes_per_attribute() {
        let a = instance_at(0.0, 0.0, 0.0);
        let mut b = instance_at(1.0, 0.0, 0.0);
        assert_eq!(b.changes(&a), InstanceAttributes::MATRIX);
        b.border_color = [1.0, 0.0, 0.0, 1.0];
        assert_eq!(b.changes(&a), InstanceAttributes::MATRIX | InstanceAttributes::COLOR);
        assert!(a.changes(&a).is_empty());
    }

    #[test]
    fn test_same_key_shares_group() {
        let mut manager = PanelGroupManager::new(1.0);
        let a = manager.register(key("default", 0), instance_at(0.0, 0.0, 0.0));
        let b = manager.register(key("default", 0), instance_at(1.0, 0.0, 0.0));
        let c = manager.register(key("glass", 0), instance_at(2.0, 0.0, 0.0));

        assert_eq!(manager.group_count(), 2);
        assert_eq!(manager.instance_count(), 3);
        assert_eq!(manager.group(a.key()).map(|g| g.len()), Some(2));
        assert_ne!(a.id(), b.id());
        assert_eq!(c.key().material_class, "glass");
    }

    #[test]
    fn test_draw_order_follows_order_info() {
        let mut manager = PanelGroupManager::new(1.0);
        manager.register(key("b", 1), instance_at(0.0, 0.0, 0.0));
        manager.register(key("a", 0), instance_at(0.0, 0.0, 0.0));
        manager.register(key("c", 0), instance_at(0.0, 0.0, 0.0));

        let order = manager.on_frame(0.016, None);
        let classes: Vec<_> = order.iter().map(|k| k.material_class.as_str()).collect();
        assert_eq!(classes, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_back_to_front_sort() {
        let mut manager = PanelGroupManager::new(1.0);
        let near = manager.register(key("default", 0), instance_at(0.0, 0.0, 1.0));
        let far = manager.register(key("default", 0), instance_at(0.0, 0.0, -10.0));

        let camera = Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0));
        manager.on_frame(0.016, Some(&camera));

        let group = manager.group(near.key()).unwrap();
        assert_eq!(group.slot(far.id()), Some(0));
        assert_eq!(group.slot(near.id()), Some(1));
    }

    #[test]
    fn test_unregister_and_release_empty_group() {
        let mut manager = PanelGroupManager::new(1.0);
        let a = manager.register(key("default", 0), instance_at(0.0, 0.0, 0.0));
        manager.update(&a, instance_at(5.0, 0.0, 0.0), InstanceAttributes::MATRIX);
        assert_eq!(manager.get(&a).map(|i| i.position().x), Some(5.0));

        manager.unregister(&a);
        assert_eq!(manager.get(&a), None);
        manager.on_frame(0.5, None);
        assert_eq!(manager.group_count(), 1);
        manager.on_frame(0.6, None);
        assert_eq!(manager.group_count(), 0);
    }

    #[test]
    fn test_change_key_moves_instance() {
        let mut manager = PanelGroupManager::new(1.0);
        let a = manager.register(key("default", 0), instance_at(3.0, 0.0, 0.0));
        let moved = manager.change_key(&a, key("default", 2));

        assert_eq!(moved.id(), a.id());
        assert_eq!(manager.get(&a), None);
        assert_eq!(manager.get(&moved).map(|i| i.position().x), Some(3.0));
    }

    #[test]
    #[should_panic(expected = "destroyed")]
    fn test_register_after_destroy_panics() {
        let mut manager = PanelGroupManager::new(1.0);
        manager.destroy();
        manager.register(key("default", 0), instance_at(0.0, 0.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "destroyed group")]
    fn test_insert_into_destroyed_group_panics() {
        let mut manager = PanelGroupManager::new(1.0);
        let a = manager.register(key("default", 0), instance_at(0.0, 0.0, 0.0));
        let group = manager.group_mut(a.key()).unwrap();
        group.destroy();
        group.insert(99, instance_at(0.0, 0.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_double_registration_panics() {
        let mut manager = PanelGroupManager::new(1.0);
        let a = manager.register(key("default", 0), instance_at(0.0, 0.0, 0.0));
        let group = manager.group_mut(a.key()).unwrap();
        group.insert(a.id(), instance_at(0.0, 0.0, 0.0));
    }
}
