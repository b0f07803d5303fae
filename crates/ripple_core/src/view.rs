//! Retained view tree
//!
//! Host elements and the transient overlays attached to them live in one
//! [`ViewTree`]. Each view has a frame in its parent's coordinate space, an
//! optional background, a mask shape, an opacity, an affine transform applied
//! around the frame's center, and a clipping flag that governs its children.
//!
//! Removing a view from its superview releases it (and its subtree): the id
//! becomes stale and every later operation on it is a no-op.

use std::sync::{Arc, Mutex};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::error::{Result, ViewError};
use crate::geometry::{Affine2D, Color, Rect};
use crate::shape::{ClipShape, ViewShape};

new_key_type! {
    /// Handle to a view in the tree
    pub struct ViewId;
}

/// A single view
#[derive(Clone, Debug, PartialEq)]
pub struct ViewNode {
    frame: Rect,
    background: Option<Color>,
    shape: ViewShape,
    opacity: f32,
    transform: Affine2D,
    clips_to_bounds: bool,
    parent: Option<ViewId>,
    children: SmallVec<[ViewId; 4]>,
}

impl ViewNode {
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            background: None,
            shape: ViewShape::Rect,
            opacity: 1.0,
            transform: Affine2D::IDENTITY,
            clips_to_bounds: false,
            parent: None,
            children: SmallVec::new(),
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_shape(mut self, shape: ViewShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }


    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn shape(&self) -> ViewShape {
        self.shape
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn transform(&self) -> Affine2D {
        self.transform
    }

    pub fn clips_to_bounds(&self) -> bool {
        self.clips_to_bounds
    }

    pub fn parent(&self) -> Option<ViewId> {
        self.parent
    }

    /// Mask in parent coordinates, before the transform
    pub fn clip_shape(&self) -> ClipShape {
        self.shape.clip(self.frame)
    }

    /// Mask in parent coordinates as currently presented (transform applied)
    pub fn presented_shape(&self) -> ClipShape {
        self.clip_shape().transformed(&self.transform)
    }
}

/// Shared view tree for cross-component access
pub type SharedViewTree = Arc<Mutex<ViewTree>>;

/// The view hierarchy
#[derive(Debug, Default)]
pub struct ViewTree {
    nodes: SlotMap<ViewId, ViewNode>,
}

impl ViewTree {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    /// Create an empty tree wrapped for sharing
    pub fn shared() -> SharedViewTree {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Insert a top-level view (e.g. a window's button)
    pub fn create_root(&mut self, frame: Rect) -> ViewId {
        self.nodes.insert(ViewNode::new(frame))
    }

    /// Attach a new view as the last child of `parent`
    pub fn add_subview(&mut self, parent: ViewId, mut node: ViewNode) -> Result<ViewId> {
        if !self.nodes.contains_key(parent) {
            return Err(ViewError::UnknownView(parent));
        }
        node.parent = Some(parent);
        node.children.clear();
        let id = self.nodes.insert(node);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        tracing::trace!("ViewTree: attached {:?} to {:?}", id, parent);
        Ok(id)
    }

    /// Detach a view from its parent and release it with its subtree
    ///
    /// Returns `false` when the view was already gone.
    pub fn remove_from_superview(&mut self, id: ViewId) -> bool {
        let Some(node) = self.nodes.remove(id) else {
            return false;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|child| *child != id);
        }

        let mut pending: Vec<ViewId> = node.children.into_vec();
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.nodes.remove(child) {
                pending.extend(removed.children);
            }
        }
        tracing::trace!("ViewTree: released {:?}", id);
        true
    }

    pub fn get(&self, id: ViewId) -> Option<&ViewNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Children in attach order (empty for unknown views)
    pub fn children(&self, id: ViewId) -> &[ViewId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_clips_to_bounds(&mut self, id: ViewId, clips: bool) -> bool {
        self.update(id, |n| n.clips_to_bounds = clips)
    }

    pub fn set_opacity(&mut self, id: ViewId, opacity: f32) -> bool {
        self.update(id, |n| n.opacity = opacity.clamp(0.0, 1.0))
    }

    pub fn set_transform(&mut self, id: ViewId, transform: Affine2D) -> bool {
        self.update(id, |n| n.transform = transform)
    }

    /// Number of live views
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn update<F: FnOnce(&mut ViewNode)>(&mut self, id: ViewId, f: F) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                f(node);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_attach_and_detach() {
        let mut tree = ViewTree::new();
        let host = tree.create_root(Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(tree.get(host).unwrap().parent(), None);

        let overlay = tree
            .add_subview(host, ViewNode::new(Rect::new(10.0, 10.0, 1.0, 1.0)))
            .unwrap();
        assert_eq!(tree.get(overlay).unwrap().parent(), Some(host));
        assert_eq!(tree.children(host), &[overlay]);
        assert_eq!(tree.len(), 2);

        assert!(tree.remove_from_superview(overlay));
        assert!(!tree.contains(overlay));
        assert!(tree.children(host).is_empty());
        assert!(!tree.remove_from_superview(overlay));
    }

    #[test]
    fn test_stale_id_operations_noop() {
        let mut tree = ViewTree::new();
        let host = tree.create_root(Rect::new(0.0, 0.0, 10.0, 10.0));
        let child = tree.add_subview(host, ViewNode::new(Rect::ZERO)).unwrap();
        tree.remove_from_superview(child);

        assert!(!tree.set_opacity(child, 0.5));
        assert!(!tree.set_transform(child, Affine2D::scale(2.0, 2.0)));
        assert_eq!(
            tree.add_subview(child, ViewNode::new(Rect::ZERO)),
            Err(ViewError::UnknownView(child))
        );
    }

    #[test]
    fn test_remove_releases_subtree() {
        let mut tree = ViewTree::new();
        let root = tree.create_root(Rect::new(0.0, 0.0, 10.0, 10.0));
        let a = tree.add_subview(root, ViewNode::new(Rect::ZERO)).unwrap();
        let b = tree.add_subview(a, ViewNode::new(Rect::ZERO)).unwrap();
        let c = tree.add_subview(b, ViewNode::new(Rect::ZERO)).unwrap();

        assert!(tree.remove_from_superview(a));
        assert!(!tree.contains(b));
        assert!(!tree.contains(c));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_property_setters() {
        let mut tree = ViewTree::new();
        let host = tree.create_root(Rect::new(0.0, 0.0, 10.0, 10.0));

        assert!(tree.set_clips_to_bounds(host, true));
        assert!(tree.set_opacity(host, 1.5));
        assert!(tree.set_transform(host, Affine2D::scale(3.0, 3.0)));

        let node = tree.get(host).unwrap();
        assert!(node.clips_to_bounds());
        assert_eq!(node.opacity(), 1.0);
        assert_eq!(node.transform().scale_x(), 3.0);
    }

    #[test]
    fn test_presented_shape_follows_transform() {
        let mut tree = ViewTree::new();
        let host = tree.create_root(Rect::new(0.0, 0.0, 100.0, 100.0));
        let frame = Rect::new(49.5, 49.5, 1.0, 1.0);
        let overlay = tree
            .add_subview(host, ViewNode::new(frame).with_shape(ViewShape::Circle))
            .unwrap();
        tree.set_transform(overlay, Affine2D::scale_about(20.0, 20.0, frame.center()));

        let shape = tree.get(overlay).unwrap().presented_shape();
        assert!(shape.contains(Point::new(59.0, 50.0)));
        assert!(!shape.contains(Point::new(61.0, 50.0)));
    }
}
