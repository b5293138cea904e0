//! State shared by every element under one root.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::batching::{GlyphGroupManager, PanelGroupManager};
use crate::config::UiConfig;
use crate::frame::FrameHooks;
use crate::interaction::{CursorRegistry, PointerRouter};
use crate::layout::{LayoutEngine, LayoutScheduler};
use crate::reactive::{signal, Signal};
use crate::theme::Theme;

/// Lifecycle of a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Constructing,
    Active,
    Destroyed,
}

pub(crate) struct RootContext {
    pub config: UiConfig,
    pub theme: Theme,
    pub engine: LayoutEngine,
    pub scheduler: LayoutScheduler,
    pub frame_hooks: FrameHooks,
    pub panels: Rc<RefCell<PanelGroupManager>>,
    pub glyphs: Rc<RefCell<GlyphGroupManager>>,
    pub router: PointerRouter,
    pub cursors: CursorRegistry,
    /// Root width in layout units, for breakpoint conditions.
    pub root_width: Signal<f32>,
    pub lifecycle: Cell<Lifecycle>,
}

impl RootContext {
    pub fn new(config: UiConfig, theme: Theme, frame_hooks: FrameHooks) -> Self {
        let release_delay = config.group_release_delay;
        Self {
            engine: LayoutEngine::new(config.point_scale_factor),
            scheduler: LayoutScheduler::new(),
            frame_hooks,
            panels: Rc::new(RefCell::new(PanelGroupManager::new(release_delay))),
            glyphs: Rc::new(RefCell::new(GlyphGroupManager::new(release_delay))),
            router: PointerRouter::new(),
            cursors: CursorRegistry::new(),
            root_width: signal(0.0),
            lifecycle: Cell::new(Lifecycle::Constructing),
            config,
            theme,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle.get() == Lifecycle::Destroyed
    }
}
