//! Property-based invariant tests.
//!
//! 1. Merged properties resolve to the highest-precedence defined value
//! 2. Unset inheritable keys follow the parent
//! 3. Scroll positions stay inside `[0, max]` under any input sequence
//! 4. Child clip rects stay inside their parent's

use glam::{Mat4, Vec2, Vec3};
use proptest::prelude::*;
use spark_spatial::clipping::compute_clipping_rect;
use spark_spatial::properties::{
    Condition, ConditionContext, MergedProperties, PropertyKey, PropertySource, Transformers,
};
use spark_spatial::reactive::signal;
use spark_spatial::scroll::{clamp_scroll, ScrollState};
use spark_spatial::types::{Inset, Overflow};

// ── Strategies ──────────────────────────────────────────────────────────

/// One source: optional explicit width, optional hover width.
#[derive(Debug, Clone)]
struct SourceSpec {
    explicit: Option<f32>,
    hover: Option<f32>,
}

fn source_strategy() -> impl Strategy<Value = SourceSpec> {
    (
        proptest::option::of(1.0f32..1000.0),
        proptest::option::of(1.0f32..1000.0),
    )
        .prop_map(|(explicit, hover)| SourceSpec { explicit, hover })
}

fn build(spec: &SourceSpec) -> PropertySource {
    let mut source = PropertySource::new();
    if let Some(width) = spec.explicit {
        source.insert(PropertyKey::Width, width);
    }
    match spec.hover {
        Some(width) => source.variant(Condition::Hover, PropertySource::new().set(PropertyKey::Width, width)),
        None => source,
    }
}

/// Scan sources from the last: a met hover variant first, then the plain entry.
fn expected(specs: &[SourceSpec], hovered: bool) -> Option<f32> {
    specs.iter().rev().find_map(|spec| spec.hover.filter(|_| hovered).or(spec.explicit))
}

#[derive(Debug, Clone)]
enum ScrollOp {
    Wheel(f32, f32),
    Drag(f32, f32),
    Frame(f32),
    Resize(f32, f32),
}

fn scroll_op_strategy() -> impl Strategy<Value = ScrollOp> {
    prop_oneof![
        (-500.0f32..500.0, -500.0f32..500.0).prop_map(|(x, y)| ScrollOp::Wheel(x, y)),
        (-200.0f32..200.0, -200.0f32..200.0).prop_map(|(x, y)| ScrollOp::Drag(x, y)),
        (0.0f32..0.1).prop_map(ScrollOp::Frame),
        (-50.0f32..400.0, -50.0f32..400.0).prop_map(|(x, y)| ScrollOp::Resize(x, y)),
    ]
}

fn within(position: Vec2, max: Vec2) -> bool {
    let bound = max.max(Vec2::ZERO);
    position.x >= 0.0 && position.y >= 0.0 && position.x <= bound.x && position.y <= bound.y
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Precedence
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn merged_value_follows_precedence(
        specs in proptest::collection::vec(source_strategy(), 0..6),
        hovered in any::<bool>(),
    ) {
        let hover = signal(false);
        let context = ConditionContext { hovered: hover.clone().into(), ..Default::default() };
        let merged = MergedProperties::new(Transformers::standard(), context, None);
        merged.add_all(specs.iter().map(build));

        prop_assert_eq!(merged.number(PropertyKey::Width), expected(&specs, false));
        hover.set(hovered);
        prop_assert_eq!(merged.number(PropertyKey::Width), expected(&specs, hovered));
    }

    #[test]
    fn unset_inheritable_key_follows_parent(
        parent_opacity in 0.0f32..1.0,
        child_opacity in proptest::option::of(0.0f32..1.0),
    ) {
        let parent = MergedProperties::standalone();
        parent.add_all([PropertySource::new().set(PropertyKey::Opacity, parent_opacity)]);
        let child = MergedProperties::new(Transformers::standard(), ConditionContext::default(), Some(parent));

        let mut source = PropertySource::new();
        if let Some(opacity) = child_opacity {
            source.insert(PropertyKey::Opacity, opacity);
        }
        child.add_all([source]);

        prop_assert_eq!(child.number(PropertyKey::Opacity), Some(child_opacity.unwrap_or(parent_opacity)));
        prop_assert_eq!(child.number(PropertyKey::Width), None);
    }

    #[test]
    fn size_x_divides_by_pixel_size(size in 1.0f32..1000.0, pixel_size in 0.001f32..1.0) {
        let merged = MergedProperties::standalone();
        merged.add_all([PropertySource::new()
            .set(PropertyKey::SizeX, size)
            .set(PropertyKey::PixelSize, pixel_size)]);
        let width = merged.number(PropertyKey::Width).unwrap_or_default();
        prop_assert!((width - size / pixel_size).abs() <= (size / pixel_size) * 1e-5);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Scroll clamp
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clamp_scroll_stays_in_range(
        x in -1000.0f32..1000.0,
        y in -1000.0f32..1000.0,
        max_x in -100.0f32..500.0,
        max_y in -100.0f32..500.0,
    ) {
        let max = Vec2::new(max_x, max_y);
        let clamped = clamp_scroll(Vec2::new(x, y), max);
        prop_assert!(within(clamped, max));
        if max_x < 0.0 {
            prop_assert_eq!(clamped.x, 0.0);
        }
    }

    #[test]
    fn scroll_state_stays_in_range(ops in proptest::collection::vec(scroll_op_strategy(), 1..40)) {
        let max = signal(Vec2::new(100.0, 300.0));
        let state = ScrollState::new(max.clone(), 0.05, 1.0);

        for op in &ops {
            match *op {
                ScrollOp::Wheel(x, y) => {
                    state.on_wheel(Vec2::new(x, y));
                }
                ScrollOp::Drag(x, y) => {
                    state.on_pointer_down(1, Vec2::ZERO);
                    state.on_pointer_move(1, Vec2::new(x, y));
                    state.on_frame(0.016);
                    state.on_pointer_up(1);
                }
                ScrollOp::Frame(delta) => state.on_frame(delta),
                ScrollOp::Resize(x, y) => max.set(Vec2::new(x, y)),
            }
            prop_assert!(within(state.position().get(), max.get()));
        }
        state.destroy();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Clipping
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn child_clip_inside_parent_clip(
        offset_x in -200.0f32..200.0,
        offset_y in -200.0f32..200.0,
        width in 1.0f32..300.0,
        height in 1.0f32..300.0,
        border in 0.0f32..5.0,
    ) {
        let pixel_size = 0.01;
        let parent = compute_clipping_rect(
            &Mat4::IDENTITY,
            Vec2::new(200.0, 100.0),
            Inset::ZERO,
            Overflow::Hidden,
            pixel_size,
            None,
        );
        let moved = Mat4::from_translation(Vec3::new(offset_x * pixel_size, offset_y * pixel_size, 0.0));
        let child = compute_clipping_rect(
            &moved,
            Vec2::new(width, height),
            Inset::new(border, border, border, border),
            Overflow::Scroll,
            pixel_size,
            parent.as_ref(),
        );

        let (Some(parent), Some(child)) = (parent, child) else {
            return Err(TestCaseError::fail("clipping overflow always yields a rect"));
        };
        prop_assert!(child.is_empty() || parent.contains_rect(&child));
    }
}
