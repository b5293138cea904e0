use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3};

use super::*;
use crate::config::UiConfig;
use crate::interaction::{EventHandlers, PointerAction, PointerEvent, WheelEvent};
use crate::properties::{Condition, PropertyKey as K, PropertySource};
use crate::scene::SceneObject;
use crate::text::MonospaceFont;
use crate::theme::reset_theme_state;
use crate::types::{Color, ElementType};

fn setup(width: f32, height: f32) -> Root {
    reset_theme_state();
    Root::builder()
        .source(
            PropertySource::new()
                .set(K::Width, width)
                .set(K::Height, height)
                .set(K::FlexDirection, "column"),
        )
        .build()
        .unwrap()
}

fn filled() -> PropertySource {
    PropertySource::new()
        .set(K::FlexGrow, 1.0)
        .set(K::BackgroundColor, "#ff0000")
}

#[test]
fn test_root_activates_and_lays_out() {
    let root = setup(200.0, 100.0);
    assert_eq!(root.lifecycle(), Lifecycle::Active);

    let panel = root.container().add_panel([filled()]).unwrap();
    assert_eq!(panel.size(), Vec2::ZERO);

    let groups = root.on_frame(0.016, None);
    assert_eq!(panel.size(), Vec2::new(200.0, 100.0));
    assert_eq!(groups.len(), 1);
    assert!(matches!(&groups[0], DrawGroup::Panel(key) if key.material_class == DEFAULT_MATERIAL_CLASS));
    assert_eq!(root.with_panel_groups(|groups| groups.instance_count()), 1);
}

#[test]
fn test_hidden_panel_registers_nothing() {
    let root = setup(200.0, 100.0);
    let panel = root
        .container()
        .add_panel([filled().set(K::Visibility, "hidden")])
        .unwrap();
    root.on_frame(0.016, None);
    assert!(!panel.visible().get());
    assert_eq!(root.with_panel_groups(|groups| groups.instance_count()), 0);

    panel.set_sources([filled()]);
    root.on_frame(0.016, None);
    assert_eq!(root.with_panel_groups(|groups| groups.instance_count()), 1);
}

#[test]
fn test_child_order_and_inherited_opacity() {
    let root = setup(200.0, 100.0);
    let outer = root
        .container()
        .add_container([filled().set(K::Opacity, 0.5).set(K::ZIndexOffset, 2.0)])
        .unwrap();
    let inner = outer.add_panel([filled()]).unwrap();

    let (outer_order, inner_order) = (outer.order().get(), inner.order().get());
    assert_eq!(outer_order.major_index, 2);
    assert_eq!(inner_order.major_index, 2);
    assert_eq!(inner_order.minor_index, outer_order.minor_index + 1);
    assert_eq!(inner.properties().number(K::Opacity), Some(0.5));
}

#[test]
fn test_hover_variant_and_cursor() {
    let root = setup(200.0, 100.0);
    let panel = root
        .container()
        .add_panel([filled()
            .set(K::Cursor, "pointer")
            .variant(Condition::Hover, PropertySource::new().set(K::BackgroundColor, "#0000ff"))])
        .unwrap();
    root.on_frame(0.016, None);
    assert_eq!(panel.properties().color(K::BackgroundColor), Some(Color::RED));

    root.router().pointer_move(&PointerEvent::new(0, Vec2::ZERO));
    assert!(panel.interaction().hovered().get());
    assert_eq!(panel.properties().color(K::BackgroundColor), Some(Color::BLUE));
    assert_eq!(root.cursors().current().get().as_deref(), Some("pointer"));

    root.router().pointer_move(&PointerEvent::new(0, Vec2::new(50.0, 0.0)));
    assert!(!panel.interaction().hovered().get());
    assert_eq!(root.cursors().current().get(), None);
}

#[test]
fn test_pointer_events_none_is_not_hit() {
    let root = setup(200.0, 100.0);
    let panel = root
        .container()
        .add_panel([filled().set(K::PointerEvents, "none")])
        .unwrap();
    root.on_frame(0.016, None);

    let hit = root.router().hit_test(Vec2::ZERO);
    assert_eq!(hit, Some(root.container().target()));
    assert_ne!(hit, Some(panel.target()));
}

#[test]
fn test_user_handlers_keep_interaction() {
    let root = setup(200.0, 100.0);
    let panel = root.container().add_panel([filled()]).unwrap();
    root.on_frame(0.016, None);

    let clicks = Rc::new(Cell::new(0));
    let counter = clicks.clone();
    panel.set_handlers(EventHandlers::new().on(PointerAction::Down, move |_| counter.set(counter.get() + 1)));

    root.router().pointer_down(&PointerEvent::new(0, Vec2::ZERO));
    assert_eq!(clicks.get(), 1);
    assert!(panel.interaction().active().get());

    root.router().pointer_up(&PointerEvent::new(0, Vec2::ZERO));
    assert!(!panel.interaction().active().get());
}

#[test]
fn test_wheel_scrolls_container() {
    let root = Root::builder()
        .source(
            PropertySource::new()
                .set(K::Width, 200.0)
                .set(K::Height, 100.0)
                .set(K::FlexDirection, "column")
                .set(K::Overflow, "scroll"),
        )
        .build()
        .unwrap();
    let content = root
        .container()
        .add_panel([PropertySource::new().set(K::Height, 300.0).set(K::FlexShrink, 0.0)])
        .unwrap();
    root.on_frame(0.016, None);

    let scroll = root.container().scroll().unwrap().clone();
    assert_eq!(scroll.max(), Vec2::new(0.0, 200.0));
    // one vertical scrollbar
    assert_eq!(root.with_panel_groups(|groups| groups.instance_count()), 1);

    let consumed = root.router().wheel(&WheelEvent::new(0, Vec2::ZERO, Vec2::new(0.0, 50.0)));
    assert!(consumed);
    assert_eq!(scroll.position().get(), Vec2::new(0.0, 50.0));

    // content center starts 100 units below the root center and moves up by the scrolled distance
    let y = content.global_matrix().get().w_axis.y;
    let expected = (-100.0 + 50.0) * 0.01;
    assert!((y - expected).abs() < 1e-5, "{y} != {expected}");

    assert!(root.router().wheel(&WheelEvent::new(0, Vec2::ZERO, Vec2::new(0.0, 1000.0))));
    assert_eq!(scroll.position().get().y, 200.0);
    assert!(!root.router().wheel(&WheelEvent::new(0, Vec2::ZERO, Vec2::new(0.0, 10.0))));
}

#[test]
fn test_text_glyphs_follow_content() {
    let root = setup(200.0, 100.0);
    let font = Rc::new(MonospaceFont::new("mono", 0.5));
    let text = root
        .container()
        .add_text(font, [PropertySource::new().set(K::Text, "hi you")])
        .unwrap();
    root.on_frame(0.016, None);

    assert_eq!(text.content().get(), "hi you");
    assert_eq!(root.with_glyph_groups(|groups| groups.instance_count()), 5);
    let groups = root.on_frame(0.016, None);
    assert!(matches!(groups.last(), Some(DrawGroup::Glyph(key)) if key.font == "mono"));

    text.set_sources([PropertySource::new().set(K::Text, "hello")]);
    root.on_frame(0.016, None);
    assert_eq!(root.with_glyph_groups(|groups| groups.instance_count()), 5);
    assert_eq!(text.layout().lines.len(), 1);

    text.destroy();
    assert_eq!(root.with_glyph_groups(|groups| groups.instance_count()), 0);
}

#[test]
fn test_text_measures_its_content() {
    let root = Root::builder()
        .source(
            PropertySource::new()
                .set(K::Width, 200.0)
                .set(K::Height, 100.0)
                .set(K::AlignItems, "flex-start"),
        )
        .build()
        .unwrap();
    let font = Rc::new(MonospaceFont::new("mono", 0.5));
    let text = root
        .container()
        .add_text(font, [PropertySource::new().set(K::Text, "abcd").set(K::FontSize, 10.0)])
        .unwrap();
    root.on_frame(0.016, None);
    assert_eq!(text.size(), Vec2::new(20.0, 12.0));
}

struct RecordingObject {
    matrix: RefCell<Mat4>,
    visible: Cell<bool>,
}

impl SceneObject for RecordingObject {
    fn set_matrix(&self, matrix: &Mat4) {
        *self.matrix.borrow_mut() = *matrix;
    }

    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }
}

#[test]
fn test_object_fills_its_box() {
    let root = setup(200.0, 100.0);
    let object = Rc::new(RecordingObject { matrix: RefCell::new(Mat4::IDENTITY), visible: Cell::new(true) });
    let element = root
        .container()
        .add_object(object.clone(), [PropertySource::new().set(K::Width, 50.0).set(K::Height, 20.0)])
        .unwrap();
    assert!(!object.visible.get());

    root.on_frame(0.016, None);
    assert!(object.visible.get());
    let (scale, _, _) = object.matrix.borrow().to_scale_rotation_translation();
    assert!((scale - Vec3::new(0.5, 0.2, 0.2)).length() < 1e-5);

    element.destroy();
    assert!(!object.visible.get());
}

#[test]
fn test_destroy_is_idempotent_and_releases() {
    let hooks = crate::frame::FrameHooks::new();
    let before = hooks.len();
    let root = Root::builder()
        .config(UiConfig::default())
        .frame_hooks(hooks.clone())
        .source(PropertySource::new().set(K::Width, 100.0).set(K::Height, 100.0))
        .build()
        .unwrap();
    let child = root.container().add_container([filled()]).unwrap();
    child.add_panel([filled()]).unwrap();
    root.on_frame(0.016, None);
    assert_eq!(hooks.len(), before + 2);
    assert_eq!(root.router().target_count(), 3);

    root.destroy();
    assert_eq!(root.lifecycle(), Lifecycle::Destroyed);
    assert_eq!(hooks.len(), before);
    assert_eq!(root.router().target_count(), 0);
    assert!(child.is_destroyed());
    assert!(child.children().is_empty());

    root.destroy();
    assert_eq!(hooks.len(), before);
}

#[test]
#[should_panic(expected = "root used after destroy")]
fn test_frame_after_destroy_panics() {
    let root = setup(10.0, 10.0);
    root.destroy();
    root.on_frame(0.016, None);
}

#[test]
#[should_panic(expected = "element used after destroy")]
fn test_add_to_destroyed_container_panics() {
    let root = setup(10.0, 10.0);
    let child = root.container().add_container([PropertySource::new()]).unwrap();
    child.destroy();
    let _ = child.add_panel([PropertySource::new()]);
}

#[test]
fn test_element_destroy_detaches_from_parent() {
    let root = setup(100.0, 100.0);
    let a = root.container().add_panel([PropertySource::new()]).unwrap();
    let b = root.container().insert_container(0, [PropertySource::new()]).unwrap();
    let children = root.container().children();
    assert!(children[0].ptr_eq(&b));
    assert!(children[1].ptr_eq(&a));

    a.destroy();
    assert_eq!(root.container().children().len(), 1);
    assert!(!a.node().is_alive());
}

#[test]
fn test_destroying_a_child_reflows_siblings() {
    let root = Root::builder()
        .source(PropertySource::new().set(K::Height, 10.0).set(K::FlexDirection, "row"))
        .build()
        .unwrap();
    let sized = || PropertySource::new().set(K::Width, 50.0).set(K::Height, 10.0);
    let a = root.container().add_panel([sized()]).unwrap();
    let b = root.container().add_panel([sized()]).unwrap();
    root.on_frame(0.016, None);
    assert_eq!(root.container().size(), Vec2::new(100.0, 10.0));
    assert_eq!(b.node().outputs().relative_center.get(), Vec2::new(25.0, 0.0));

    a.destroy();
    root.on_frame(0.016, None);
    assert_eq!(root.container().size(), Vec2::new(50.0, 10.0));
    assert_eq!(b.node().outputs().relative_center.get(), Vec2::ZERO);
}

#[test]
fn test_element_types_in_paint_order() {
    let root = setup(200.0, 100.0);
    let panel = root.container().add_panel([filled()]).unwrap();
    let object = Rc::new(RecordingObject { matrix: RefCell::new(Mat4::IDENTITY), visible: Cell::new(false) });
    let element = root.container().add_object(object, [filled()]).unwrap();
    let text = root
        .container()
        .add_text(Rc::new(MonospaceFont::new("mono", 0.5)), [PropertySource::new().set(K::Text, "ab")])
        .unwrap();

    assert_eq!(panel.order().get().element_type, ElementType::Panel);
    assert_eq!(element.order().get().element_type, ElementType::Object);
    assert!(panel.order().get() < element.order().get());

    let groups = root.on_frame(0.016, None);
    let glyph_order = groups
        .iter()
        .find_map(|group| match group {
            DrawGroup::Glyph(key) => Some(key.order),
            DrawGroup::Panel(_) => None,
        })
        .unwrap();
    assert_eq!(glyph_order.element_type, ElementType::Text);
    assert!(element.order().get() < glyph_order);
    assert_eq!(text.order().get().minor_index, glyph_order.minor_index);
}
