//! Root - owns everything one UI tree shares and drives it per frame.
//!
//! # Example
//!
//! ```
//! use spark_spatial::component::Root;
//! use spark_spatial::properties::{PropertyKey, PropertySource};
//!
//! let root = Root::builder()
//!     .source(PropertySource::new().set(PropertyKey::Width, 200.0).set(PropertyKey::Height, 100.0))
//!     .build()
//!     .unwrap();
//! let panel = root
//!     .container()
//!     .add_panel([PropertySource::new().set(PropertyKey::FlexGrow, 1.0).set(PropertyKey::BackgroundColor, "#ff0000")])
//!     .unwrap();
//!
//! let groups = root.on_frame(0.016, None);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(panel.size().x, 200.0);
//!
//! root.destroy();
//! ```

use std::rc::Rc;

use glam::Mat4;
use tracing::{debug, trace};

use crate::batching::{GlyphGroupKey, GlyphGroupManager, GroupKey, PanelGroupKey, PanelGroupManager};
use crate::config::UiConfig;
use crate::error::Result;
use crate::frame::FrameHooks;
use crate::interaction::{CursorRegistry, PointerRouter};
use crate::layout::{LayoutEngine, LayoutScheduler};
use crate::order::OrderInfo;
use crate::properties::PropertySource;
use crate::reactive::effect;
use crate::scene::{camera_in_root, SceneObject};
use crate::subscriptions::Subscriptions;
use crate::theme::Theme;

use super::container::Container;
use super::context::{Lifecycle, RootContext};

/// One instance group to draw this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawGroup {
    Panel(PanelGroupKey),
    Glyph(GlyphGroupKey),
}

impl DrawGroup {
    pub fn order(&self) -> OrderInfo {
        match self {
            DrawGroup::Panel(key) => key.order(),
            DrawGroup::Glyph(key) => key.order(),
        }
    }
}

/// Builder for [`Root`].
#[derive(Default)]
pub struct RootBuilder {
    config: UiConfig,
    theme: Theme,
    sources: Vec<PropertySource>,
    object: Option<Rc<dyn SceneObject>>,
    frame_hooks: Option<FrameHooks>,
}

impl std::fmt::Debug for RootBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootBuilder")
            .field("config", &self.config)
            .field("theme", &self.theme.name)
            .field("sources", &self.sources.len())
            .field("has_object", &self.object.is_some())
            .finish()
    }
}

impl RootBuilder {
    pub fn config(mut self, config: UiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Add a property source of the root container, above earlier ones.
    pub fn source(mut self, source: PropertySource) -> Self {
        self.sources.push(source);
        self
    }

    /// The host scene object the UI hangs under; read to bring the camera
    /// into root space.
    pub fn object(mut self, object: Rc<dyn SceneObject>) -> Self {
        self.object = Some(object);
        self
    }

    /// Share a frame hook registry with the host.
    pub fn frame_hooks(mut self, frame_hooks: FrameHooks) -> Self {
        self.frame_hooks = Some(frame_hooks);
        self
    }

    pub fn build(self) -> Result<Root> {
        let ctx = Rc::new(RootContext::new(self.config, self.theme, self.frame_hooks.unwrap_or_default()));
        let container = Container::create(&ctx, None, None, self.sources)?;
        let subscriptions = Subscriptions::new();

        let (size, root_width) = (container.node().outputs().size.clone(), ctx.root_width.clone());
        subscriptions.add_effect(effect(move || root_width.set(size.get().x)));

        ctx.lifecycle.set(Lifecycle::Active);
        debug!(target: "spark_spatial::component", "root active");
        Ok(Root { ctx, container, object: self.object, subscriptions })
    }
}

/// A UI tree inside the host scene.
///
/// Dropping a root destroys it.
pub struct Root {
    ctx: Rc<RootContext>,
    container: Container,
    object: Option<Rc<dyn SceneObject>>,
    subscriptions: Subscriptions,
}

impl std::fmt::Debug for Root {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Root")
            .field("lifecycle", &self.ctx.lifecycle.get())
            .field("container", &self.container)
            .finish()
    }
}

impl Root {
    pub fn builder() -> RootBuilder {
        RootBuilder::default()
    }

    /// Root with the given config, default theme and the given sources.
    pub fn new(config: UiConfig, sources: impl IntoIterator<Item = PropertySource>) -> Result<Self> {
        sources.into_iter().fold(Self::builder().config(config), RootBuilder::source).build()
    }

    fn assert_active(&self) {
        assert!(self.ctx.lifecycle.get() == Lifecycle::Active, "root used after destroy");
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.ctx.lifecycle.get()
    }

    pub fn config(&self) -> &UiConfig {
        &self.ctx.config
    }

    pub fn theme(&self) -> &Theme {
        &self.ctx.theme
    }

    /// The root container; add children here.
    pub fn container(&self) -> &Container {
        self.assert_active();
        &self.container
    }

    pub fn router(&self) -> &PointerRouter {
        &self.ctx.router
    }

    pub fn cursors(&self) -> &CursorRegistry {
        &self.ctx.cursors
    }

    pub fn frame_hooks(&self) -> &FrameHooks {
        &self.ctx.frame_hooks
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.ctx.engine
    }

    pub fn scheduler(&self) -> &LayoutScheduler {
        &self.ctx.scheduler
    }

    pub fn with_panel_groups<R>(&self, f: impl FnOnce(&PanelGroupManager) -> R) -> R {
        f(&self.ctx.panels.borrow())
    }

    pub fn with_glyph_groups<R>(&self, f: impl FnOnce(&GlyphGroupManager) -> R) -> R {
        f(&self.ctx.glyphs.borrow())
    }

    /// Per-frame pass: pending layout, frame hooks, then group ordering.
    ///
    /// `camera_world` is the camera's world matrix; it is brought into root
    /// space through the root's scene object. Returns the groups to draw,
    /// in paint order. Panics after destroy.
    pub fn on_frame(&self, delta: f32, camera_world: Option<&Mat4>) -> Vec<DrawGroup> {
        self.assert_active();
        let ran_layout = self.ctx.scheduler.run_pending();
        self.ctx.frame_hooks.run(delta);

        let camera = camera_world.map(|camera| match &self.object {
            Some(object) => camera_in_root(camera, &object.world_matrix()),
            None => *camera,
        });
        let panels = self.ctx.panels.borrow_mut().on_frame(delta, camera.as_ref());
        let glyphs = self.ctx.glyphs.borrow_mut().on_frame(delta, camera.as_ref());

        let mut groups: Vec<DrawGroup> = panels
            .into_iter()
            .map(DrawGroup::Panel)
            .chain(glyphs.into_iter().map(DrawGroup::Glyph))
            .collect();
        groups.sort_by_key(DrawGroup::order);
        trace!(target: "spark_spatial::component", ran_layout, groups = groups.len(), "frame");
        groups
    }

    /// Tear everything down. Calling it again is a no-op.
    pub fn destroy(&self) {
        if self.ctx.lifecycle.get() == Lifecycle::Destroyed {
            return;
        }
        self.container.destroy();
        self.subscriptions.drain();
        self.ctx.panels.borrow_mut().destroy();
        self.ctx.glyphs.borrow_mut().destroy();
        self.ctx.lifecycle.set(Lifecycle::Destroyed);
        debug!(target: "spark_spatial::component", "root destroyed");
    }
}

impl Drop for Root {
    fn drop(&mut self) {
        self.destroy();
    }
}
