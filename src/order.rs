//! Paint order.
//!
//! Instances are bucketed and drawn by [`OrderInfo`]: first the z-index
//! offset, then the element type, then the depth in the tree.

use std::cmp::Ordering;

use crate::types::ElementType;

/// Draw order key; smaller draws first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderInfo {
    /// Explicit `zIndexOffset`, accumulated down the tree.
    pub major_index: i32,
    pub element_type: ElementType,
    /// Depth below the root.
    pub minor_index: u32,
}

impl OrderInfo {
    pub const ROOT: Self = Self { major_index: 0, element_type: ElementType::Panel, minor_index: 0 };

    pub const fn new(major_index: i32, element_type: ElementType, minor_index: u32) -> Self {
        Self { major_index, element_type, minor_index }
    }

    /// Order of a child element under `parent`.
    ///
    /// The child's `zIndexOffset` adds to the parent's major index; the
    /// minor index is the depth, so a child draws above its parent.
    pub fn child(parent: &OrderInfo, z_index_offset: i32, element_type: ElementType) -> Self {
        Self {
            major_index: parent.major_index.saturating_add(z_index_offset),
            element_type,
            minor_index: parent.minor_index + 1,
        }
    }
}

impl PartialOrd for OrderInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major_index
            .cmp(&other.major_index)
            .then(self.element_type.cmp(&other.element_type))
            .then(self.minor_index.cmp(&other.minor_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        let panel = OrderInfo::new(0, ElementType::Panel, 5);
        let text = OrderInfo::new(0, ElementType::Text, 0);
        let raised = OrderInfo::new(1, ElementType::Panel, 0);

        assert!(panel < text);
        assert!(text < raised);
        assert!(ElementType::Image < ElementType::Object);
    }

    #[test]
    fn test_child_order() {
        let root = OrderInfo::ROOT;
        let child = OrderInfo::child(&root, 0, ElementType::Panel);
        assert_eq!(child.minor_index, 1);
        assert!(root < child);

        let text = OrderInfo::child(&child, 0, ElementType::Text);
        assert_eq!(text.minor_index, 2);
        assert!(child < text);

        let raised = OrderInfo::child(&child, 2, ElementType::Panel);
        assert_eq!(raised.major_index, 2);
        assert!(text < raised);
    }
}
