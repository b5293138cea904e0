//! End-to-end scenarios through the public API.

use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3};
use spark_spatial::component::{DrawGroup, Lifecycle, Root};
use spark_spatial::frame::FrameHooks;
use spark_spatial::properties::{PropValue, PropertyKey as K, PropertySource};
use spark_spatial::reactive::signal;
use spark_spatial::scene::SceneObject;
use spark_spatial::text::MonospaceFont;
use spark_spatial::theme::{reset_theme_state, set_preferred_color_scheme, ColorScheme};
use spark_spatial::types::Color;
use spark_spatial::UiConfig;

fn sized(width: f32, height: f32) -> PropertySource {
    PropertySource::new().set(K::Width, width).set(K::Height, height)
}

#[test]
fn size_x_converts_world_size_to_layout_units() {
    let root = Root::new(
        UiConfig::default(),
        [PropertySource::new().set(K::SizeX, 100.0).set(K::SizeY, 1.0).set(K::PixelSize, 0.002)],
    )
    .unwrap();
    let width = root.container().properties().number(K::Width).unwrap();
    assert!((width - 50000.0).abs() < 0.01, "{width}");

    root.on_frame(0.016, None);
    let size = root.container().size();
    assert!((size - Vec2::new(50000.0, 500.0)).abs().max_element() < 0.01, "{size}");
}

#[test]
fn anchors_offset_by_root_size() {
    let (width, height, pixel_size) = (300.0, 120.0, 0.01);
    let translation = |anchor_x: &str, anchor_y: &str| {
        let root = Root::new(
            UiConfig::default(),
            [sized(width, height).set(K::AnchorX, anchor_x).set(K::AnchorY, anchor_y)],
        )
        .unwrap();
        root.on_frame(0.016, None);
        root.container().global_matrix().get().w_axis.truncate()
    };

    let left_top = translation("left", "top");
    let right_bottom = translation("right", "bottom");
    let center = translation("center", "center");

    assert!((left_top.x - right_bottom.x - width * pixel_size).abs() < 1e-5);
    assert!((right_bottom.y - left_top.y - height * pixel_size).abs() < 1e-5);
    assert_eq!(center, Vec3::ZERO);
}

#[test]
fn unset_anchor_uses_configured_default() {
    let config = UiConfig::from_json(r#"{ "default_anchor_x": "left" }"#).unwrap();
    let root = Root::new(config, [sized(200.0, 100.0)]).unwrap();
    root.on_frame(0.016, None);
    let x = root.container().global_matrix().get().w_axis.x;
    assert!((x - 1.0).abs() < 1e-6);
}

#[test]
fn double_destroy_restores_frame_hooks() {
    let hooks = FrameHooks::new();
    let _host_hook = hooks.register(|_| {});
    let before = hooks.len();

    let root = Root::builder().frame_hooks(hooks.clone()).source(sized(100.0, 100.0)).build().unwrap();
    let inner = root.container().add_container([sized(50.0, 50.0)]).unwrap();
    inner.add_container([sized(10.0, 10.0)]).unwrap();
    root.on_frame(0.016, None);
    assert_eq!(hooks.len(), before + 3);

    root.destroy();
    root.destroy();
    assert_eq!(root.lifecycle(), Lifecycle::Destroyed);
    assert_eq!(hooks.len(), before);
    assert!(!inner.node().is_alive());
}

#[test]
fn nested_clip_rects_shrink() {
    let root = Root::new(UiConfig::default(), [sized(200.0, 100.0).set(K::Overflow, "hidden")]).unwrap();
    let child = root
        .container()
        .add_container([sized(100.0, 100.0).set(K::Overflow, "hidden").set(K::TranslateX, 150.0)])
        .unwrap();
    let grandchild = child.add_panel([sized(20.0, 20.0)]).unwrap();
    root.on_frame(0.016, None);

    let outer = root.container().children_clipping().get().unwrap();
    let inner = child.children_clipping().get().unwrap();
    assert!(outer.contains_rect(&inner));
    assert!(inner.size().x < 1.0);
    assert_eq!(grandchild.clipping().get(), Some(inner));
}

#[test]
fn deferred_layout_coalesces_writes() {
    let width = signal(100.0f32);
    let root = Root::new(
        UiConfig::default(),
        [PropertySource::new()
            .set(K::Width, PropValue::from_signal(width.clone()))
            .set(K::Height, 50.0)],
    )
    .unwrap();
    root.on_frame(0.016, None);
    assert_eq!(root.engine().passes(), 1);

    for step in 1..=10 {
        width.set(100.0 + step as f32);
    }
    assert_eq!(root.engine().passes(), 1);
    root.on_frame(0.016, None);
    assert_eq!(root.engine().passes(), 2);
    assert_eq!(root.container().size().x, 110.0);

    root.on_frame(0.016, None);
    assert_eq!(root.engine().passes(), 2);
}

#[test]
fn destroy_before_first_frame_skips_layout() {
    let root = Root::new(UiConfig::default(), [sized(100.0, 100.0)]).unwrap();
    root.container().add_panel([sized(10.0, 10.0)]).unwrap();
    assert!(root.scheduler().has_pending());

    root.destroy();
    assert!(!root.scheduler().run_pending());
    assert_eq!(root.engine().passes(), 0);
    assert_eq!(root.engine().node_count(), 0);
}

#[test]
fn dark_scheme_restyles_text() {
    reset_theme_state();
    let root = Root::new(UiConfig::default(), [sized(200.0, 100.0)]).unwrap();
    let text = root
        .container()
        .add_text(Rc::new(MonospaceFont::new("mono", 0.5)), [PropertySource::new().set(K::Text, "hi")])
        .unwrap();
    let theme = root.theme().clone();

    assert_eq!(text.properties().color(K::Color), Some(theme.light.foreground));
    set_preferred_color_scheme(ColorScheme::Dark);
    assert_eq!(text.properties().color(K::Color), Some(theme.dark.foreground));

    let explicit = root
        .container()
        .add_text(
            Rc::new(MonospaceFont::new("mono", 0.5)),
            [PropertySource::new().set(K::Text, "hi").set(K::Color, Color::RED)],
        )
        .unwrap();
    assert_eq!(explicit.properties().color(K::Color), Some(Color::RED));
    reset_theme_state();
}

#[test]
fn json_sources_build_a_tree() {
    let source = PropertySource::from_json_str(
        r##"{ "width": 300, "height": 200, "flexDirection": "column", "padding": 10,
              "md": { "backgroundColor": "#222222" } }"##,
    )
    .unwrap();
    let root = Root::new(UiConfig::default(), [source]).unwrap();
    let row = root
        .container()
        .add_container([PropertySource::from_json_str(r#"{ "flexGrow": 1 }"#).unwrap()])
        .unwrap();
    root.on_frame(0.016, None);
    root.on_frame(0.016, None);

    assert_eq!(row.size(), Vec2::new(280.0, 180.0));
    // 300 is below the `md` breakpoint
    assert_eq!(root.container().properties().color(K::BackgroundColor), None);
}

struct Anchor {
    world: Mat4,
}

impl SceneObject for Anchor {
    fn set_matrix(&self, _matrix: &Mat4) {}

    fn world_matrix(&self) -> Mat4 {
        self.world
    }
}

/// Root-space x of the panel in slot 0 of the only panel group.
fn first_panel_x(root: &Root, camera_world: Mat4) -> f32 {
    let groups = root.on_frame(0.016, Some(&camera_world));
    assert_eq!(groups.len(), 1);
    let DrawGroup::Panel(key) = &groups[0] else { panic!("expected a panel group") };
    root.with_panel_groups(|manager| {
        let group = manager.group(key).unwrap();
        assert_eq!(group.len(), 2);
        group.buffer().as_slice()[0].matrix[3][0]
    })
}

#[test]
fn camera_is_brought_into_root_space() {
    let root = Root::builder()
        .object(Rc::new(Anchor { world: Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)) }))
        .source(sized(200.0, 100.0).set(K::FlexDirection, "row"))
        .build()
        .unwrap();
    let red = PropertySource::new().set(K::FlexGrow, 1.0).set(K::BackgroundColor, "#ff0000");
    root.container().add_panel([red.clone()]).unwrap();
    root.container().add_panel([red]).unwrap();
    root.on_frame(0.016, None);

    // Panels sit at x = -0.5 and x = 0.5 in root space; the farther one draws first.
    let right_of_root = Mat4::from_translation(Vec3::new(15.0, 0.0, 1.0));
    assert!((first_panel_x(&root, right_of_root) + 0.5).abs() < 1e-5);

    // World x = 5 is still right of the origin but left of the root.
    let left_of_root = Mat4::from_translation(Vec3::new(5.0, 0.0, 1.0));
    assert!((first_panel_x(&root, left_of_root) - 0.5).abs() < 1e-5);

    assert!((first_panel_x(&root, right_of_root) + 0.5).abs() < 1e-5);
}
