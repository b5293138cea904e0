//! Host scene objects placed by layout.

use std::ops::Deref;
use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::error::Result;
use crate::properties::PropertySource;
use crate::reactive::effect;
use crate::scene::SceneObject;
use crate::types::ElementType;

use super::element::{Element, ElementOptions};

/// An element whose box is filled by a host scene object.
///
/// The object's matrix is the element's global matrix scaled to the box, so
/// a unit-sized object fills it. A zero-sized or hidden box hides the
/// object.
#[derive(Clone)]
pub struct ObjectElement {
    element: Element,
    object: Rc<dyn SceneObject>,
}

impl std::fmt::Debug for ObjectElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectElement").field("element", &self.element).finish()
    }
}

impl Deref for ObjectElement {
    type Target = Element;

    fn deref(&self) -> &Element {
        &self.element
    }
}

impl ObjectElement {
    pub(crate) fn create(parent: &Element, object: Rc<dyn SceneObject>, sources: Vec<PropertySource>) -> Result<Self> {
        let options = ElementOptions { element_type: ElementType::Object, ..Default::default() };
        let element = Element::new(parent.context(), Some(parent), sources, options)?;

        let outputs = element.node().outputs().clone();
        let (p, visible, global) = (element.pixel_size(), element.visible(), element.global_matrix());
        let target = object.clone();
        element.track(effect(move || {
            let (size, p) = (outputs.size.get(), p.get());
            let shown = visible.get() && size.x > 0.0 && size.y > 0.0;
            target.set_visible(shown);
            if shown {
                let depth = size.x.min(size.y) * p;
                target.set_matrix(&(global.get() * Mat4::from_scale(Vec3::new(size.x * p, size.y * p, depth))));
            }
        }));

        let hidden = object.clone();
        element.on_destroy(move || hidden.set_visible(false));
        Ok(Self { element, object })
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn object(&self) -> &Rc<dyn SceneObject> {
        &self.object
    }
}
