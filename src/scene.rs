//! Host scene-graph boundary.

use glam::Mat4;

/// An object owned by the host scene graph.
///
/// The UI never reads or builds scene objects itself; it only writes
/// matrices and visibility onto the handles it is given.
pub trait SceneObject {
    /// Matrix relative to the root's scene object.
    fn set_matrix(&self, matrix: &Mat4);

    fn set_visible(&self, _visible: bool) {}

    /// World matrix of this object. Only read for a root's object, to bring
    /// the camera into root space.
    fn world_matrix(&self) -> Mat4 {
        Mat4::IDENTITY
    }
}

/// Camera position in the root's local space.
pub fn camera_in_root(camera_world: &Mat4, root_world: &Mat4) -> Mat4 {
    root_world.inverse() * *camera_world
}
