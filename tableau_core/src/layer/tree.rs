// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays layer storage with allocation and property management.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, Point, Size, Vec2};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, LayerId, ListenerKey, ResourceKey};
use super::lifecycle::Lifecycle;
use super::props::{Content, LayerFlags, LayerKind, LayerState, Origin};
use super::traverse::Children;
use crate::dirty;
use crate::input::ListenerRef;
use crate::surface::Batch;
use crate::tint::NO_TINT;

/// Struct-of-arrays storage for a layer tree.
///
/// Layers are addressed by [`LayerId`] handles. Each layer occupies a slot
/// in parallel arrays; disposed layers are recycled via a free list, and
/// generation counters make stale handles panic instead of aliasing a new
/// layer.
///
/// Slot 0 holds the root, a group that is created with the tree and is
/// always [`Added`](LayerState::Added).
pub struct LayerTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    /// Children of each slot, sorted by ascending depth.
    pub(crate) children: Vec<Vec<u32>>,

    // -- Local properties --
    pub(crate) translation: Vec<Vec2>,
    pub(crate) rotation: Vec<f64>,
    pub(crate) scale: Vec<Vec2>,
    pub(crate) origin: Vec<Origin>,
    pub(crate) depth: Vec<f32>,
    pub(crate) flags: Vec<LayerFlags>,
    pub(crate) alpha: Vec<f32>,
    pub(crate) tint: Vec<u32>,
    pub(crate) batch: Vec<Option<Batch>>,
    pub(crate) size: Vec<Size>,
    pub(crate) kind: Vec<LayerKind>,
    pub(crate) content: Vec<Content>,
    pub(crate) name: Vec<Option<String>>,

    // -- Lifecycle and input --
    pub(crate) state: Vec<LayerState>,
    pub(crate) hooks: Vec<Option<Box<dyn Lifecycle>>>,
    pub(crate) listeners: Vec<Vec<(ListenerKey, ListenerRef)>>,
    pub(crate) next_listener: u32,

    // -- Computed properties (written by evaluate) --
    pub(crate) world_transform: Vec<Affine>,
    pub(crate) effective_alpha: Vec<f32>,
    pub(crate) effective_visible: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Change tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
    pub(crate) pending_released: Vec<ResourceKey>,
}

impl fmt::Debug for LayerTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerTree")
            .field("len", &self.len)
            .field("free", &self.free_list.len())
            .field("traversal_dirty", &self.traversal_dirty)
            .finish_non_exhaustive()
    }
}

impl Default for LayerTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Slot index of the root layer.
pub(crate) const ROOT: u32 = 0;

impl LayerTree {
    /// Creates a tree containing only the root layer.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Self {
            parent: Vec::new(),
            children: Vec::new(),
            translation: Vec::new(),
            rotation: Vec::new(),
            scale: Vec::new(),
            origin: Vec::new(),
            depth: Vec::new(),
            flags: Vec::new(),
            alpha: Vec::new(),
            tint: Vec::new(),
            batch: Vec::new(),
            size: Vec::new(),
            kind: Vec::new(),
            content: Vec::new(),
            name: Vec::new(),
            state: Vec::new(),
            hooks: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
            world_transform: Vec::new(),
            effective_alpha: Vec::new(),
            effective_visible: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            pending_released: Vec::new(),
        };
        let root = tree.alloc(LayerKind::Group { clip: false });
        debug_assert_eq!(root, ROOT, "root occupies the first slot");
        tree.state[ROOT as usize] = LayerState::Added;
        tree.name[ROOT as usize] = Some(String::from("root"));
        tree
    }

    /// Returns the root layer.
    #[inline]
    #[must_use]
    pub fn root(&self) -> LayerId {
        self.id_at(ROOT)
    }

    // -- Allocation API --

    /// Creates a detached leaf layer.
    ///
    /// The layer starts at the origin with no rotation, unit scale, depth 0,
    /// full alpha, no tint, no content and zero size.
    pub fn create_layer(&mut self) -> LayerId {
        let idx = self.alloc(LayerKind::Leaf);
        self.id_at(idx)
    }

    /// Creates a detached group layer.
    pub fn create_group(&mut self) -> LayerId {
        let idx = self.alloc(LayerKind::Group { clip: false });
        self.id_at(idx)
    }

    /// Creates a detached group that clips its children to `(0, 0)..(w, h)`
    /// in layer space.
    pub fn create_clipped(&mut self, width: f64, height: f64) -> LayerId {
        let idx = self.alloc(LayerKind::Group { clip: true });
        self.size[idx as usize] = Size::new(width, height);
        self.id_at(idx)
    }

    /// Returns whether the given handle refers to a live layer.
    #[must_use]
    pub fn is_alive(&self, id: LayerId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.state[id.idx as usize] != LayerState::Disposed
    }

    /// Returns the number of live layers, including the root.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns the handle of the live layer at raw slot `idx`, if any.
    #[must_use]
    pub fn layer_at(&self, idx: u32) -> Option<LayerId> {
        let id = (idx < self.len).then(|| self.id_at(idx))?;
        self.is_alive(id).then_some(id)
    }

    // -- Topology queries --

    /// Returns the parent of a layer, if any.
    #[must_use]
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a layer, lowest depth
    /// first.
    #[must_use]
    pub fn children(&self, id: LayerId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.children[id.idx as usize])
    }

    /// Returns the number of direct children.
    #[must_use]
    pub fn child_count(&self, id: LayerId) -> usize {
        self.validate(id);
        self.children[id.idx as usize].len()
    }

    /// Returns the lifecycle state of a layer. Stale handles report
    /// [`Disposed`](LayerState::Disposed).
    #[must_use]
    pub fn state(&self, id: LayerId) -> LayerState {
        if self.is_alive(id) {
            self.state[id.idx as usize]
        } else {
            LayerState::Disposed
        }
    }

    /// Returns whether the layer is connected to the root.
    #[must_use]
    pub fn is_added(&self, id: LayerId) -> bool {
        self.state(id) == LayerState::Added
    }

    /// Returns whether `ancestor` is `id` or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: LayerId, id: LayerId) -> bool {
        self.validate(ancestor);
        self.validate(id);
        self.is_ancestor_idx(ancestor.idx, id.idx)
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the kind of a layer.
    #[must_use]
    pub fn kind(&self, id: LayerId) -> LayerKind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    /// Returns the translation of a layer in its parent's space.
    #[must_use]
    pub fn translation(&self, id: LayerId) -> Vec2 {
        self.validate(id);
        self.translation[id.idx as usize]
    }

    /// Returns the rotation of a layer in radians.
    #[must_use]
    pub fn rotation(&self, id: LayerId) -> f64 {
        self.validate(id);
        self.rotation[id.idx as usize]
    }

    /// Returns the x and y scale of a layer.
    #[must_use]
    pub fn scale(&self, id: LayerId) -> Vec2 {
        self.validate(id);
        self.scale[id.idx as usize]
    }

    /// Returns the origin setting of a layer.
    #[must_use]
    pub fn origin(&self, id: LayerId) -> Origin {
        self.validate(id);
        self.origin[id.idx as usize]
    }

    /// Returns the origin resolved against the layer size.
    #[must_use]
    pub fn origin_point(&self, id: LayerId) -> Point {
        self.validate(id);
        self.origin_at(id.idx)
    }

    /// Returns the depth of a layer among its siblings.
    #[must_use]
    pub fn depth(&self, id: LayerId) -> f32 {
        self.validate(id);
        self.depth[id.idx as usize]
    }

    /// Returns the flags of a layer.
    #[must_use]
    pub fn flags(&self, id: LayerId) -> LayerFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns whether a layer is visible.
    #[must_use]
    pub fn visible(&self, id: LayerId) -> bool {
        self.flags(id).visible
    }

    /// Returns whether a layer is interactive.
    #[must_use]
    pub fn interactive(&self, id: LayerId) -> bool {
        self.flags(id).interactive
    }

    /// Returns the local alpha of a layer.
    #[must_use]
    pub fn alpha(&self, id: LayerId) -> f32 {
        self.validate(id);
        self.alpha[id.idx as usize]
    }

    /// Returns the local ARGB tint of a layer.
    #[must_use]
    pub fn tint(&self, id: LayerId) -> u32 {
        self.validate(id);
        self.tint[id.idx as usize]
    }

    /// Returns the batch override of a layer.
    #[must_use]
    pub fn batch(&self, id: LayerId) -> Option<Batch> {
        self.validate(id);
        self.batch[id.idx as usize]
    }

    /// Returns the size of a layer.
    #[must_use]
    pub fn size(&self, id: LayerId) -> Size {
        self.validate(id);
        self.size[id.idx as usize]
    }

    /// Returns the content of a layer.
    #[must_use]
    pub fn content(&self, id: LayerId) -> &Content {
        self.validate(id);
        &self.content[id.idx as usize]
    }

    /// Returns the debug name of a layer.
    #[must_use]
    pub fn name(&self, id: LayerId) -> Option<&str> {
        self.validate(id);
        self.name[id.idx as usize].as_deref()
    }

    /// Returns the local transform `T(translation) * R(rotation) * S(scale)`.
    #[must_use]
    pub fn local_transform(&self, id: LayerId) -> Affine {
        self.validate(id);
        self.local_transform_at(id.idx)
    }

    /// Returns the cached layer-to-screen transform, including the origin
    /// offset.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn world_transform(&self, id: LayerId) -> Affine {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Returns the product of local alphas along the ancestor chain.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_alpha(&self, id: LayerId) -> f32 {
        self.validate(id);
        self.effective_alpha[id.idx as usize]
    }

    /// Returns whether the layer and all its ancestors are visible.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_visible(&self, id: LayerId) -> bool {
        self.validate(id);
        self.effective_visible[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the translation of a layer.
    pub fn set_translation(&mut self, id: LayerId, translation: Vec2) {
        self.validate(id);
        self.translation[id.idx as usize] = translation;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the rotation of a layer in radians.
    pub fn set_rotation(&mut self, id: LayerId, angle: f64) {
        self.validate(id);
        self.rotation[id.idx as usize] = angle;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the x and y scale of a layer.
    pub fn set_scale(&mut self, id: LayerId, scale: Vec2) {
        self.validate(id);
        self.scale[id.idx as usize] = scale;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the origin of a layer.
    pub fn set_origin(&mut self, id: LayerId, origin: Origin) {
        self.validate(id);
        self.origin[id.idx as usize] = origin;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the depth of a layer and re-sorts it among its siblings.
    ///
    /// A layer whose depth changes moves after every sibling of equal depth.
    pub fn set_depth(&mut self, id: LayerId, depth: f32) {
        self.validate(id);
        let idx = id.idx;
        if self.depth[idx as usize] == depth {
            return;
        }
        self.depth[idx as usize] = depth;
        let p = self.parent[idx as usize];
        if p != INVALID {
            let kids = &mut self.children[p as usize];
            if let Some(pos) = kids.iter().position(|&k| k == idx) {
                kids.remove(pos);
            }
            self.insert_sorted(p, idx);
            self.traversal_dirty = true;
            self.dirty.mark(p, dirty::TOPOLOGY);
        }
    }

    /// Shows or hides a layer and its subtree.
    pub fn set_visible(&mut self, id: LayerId, visible: bool) {
        self.validate(id);
        self.flags[id.idx as usize].visible = visible;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets whether a layer can be hit by [`hit_test`](Self::hit_test).
    pub fn set_interactive(&mut self, id: LayerId, interactive: bool) {
        self.validate(id);
        self.flags[id.idx as usize].interactive = interactive;
    }

    /// Sets whether an interactive layer claims every point tested against
    /// it.
    pub fn set_absorb_hits(&mut self, id: LayerId, absorb: bool) {
        self.validate(id);
        self.flags[id.idx as usize].absorb_hits = absorb;
    }

    /// Sets the local alpha of a layer.
    pub fn set_alpha(&mut self, id: LayerId, alpha: f32) {
        self.validate(id);
        self.alpha[id.idx as usize] = alpha;
        self.dirty.mark_with(id.idx, dirty::VISUAL, &EagerPolicy);
    }

    /// Sets the local ARGB tint of a layer.
    pub fn set_tint(&mut self, id: LayerId, tint: u32) {
        self.validate(id);
        self.tint[id.idx as usize] = tint;
        self.dirty.mark_with(id.idx, dirty::VISUAL, &EagerPolicy);
    }

    /// Sets the batch override used for the layer and its subtree.
    pub fn set_batch(&mut self, id: LayerId, batch: Option<Batch>) {
        self.validate(id);
        self.batch[id.idx as usize] = batch;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Sets the size of a layer.
    pub fn set_size(&mut self, id: LayerId, size: Size) {
        self.validate(id);
        self.size[id.idx as usize] = size;
        self.dirty.mark(id.idx, dirty::CONTENT);
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Replaces the content of a layer and returns the previous content.
    ///
    /// Only the content held at disposal time is reported as released; a
    /// texture returned here stays owned by the caller.
    pub fn set_content(&mut self, id: LayerId, content: Content) -> Content {
        self.validate(id);
        self.dirty.mark(id.idx, dirty::CONTENT);
        core::mem::replace(&mut self.content[id.idx as usize], content)
    }

    /// Sets the debug name of a layer.
    pub fn set_name(&mut self, id: LayerId, name: impl Into<String>) {
        self.validate(id);
        self.name[id.idx as usize] = Some(name.into());
    }

    /// Installs a lifecycle hook, returning the previous one.
    pub fn set_lifecycle(
        &mut self,
        id: LayerId,
        hook: Box<dyn Lifecycle>,
    ) -> Option<Box<dyn Lifecycle>> {
        self.validate(id);
        self.hooks[id.idx as usize].replace(hook)
    }

    /// Removes and returns the lifecycle hook of a layer.
    pub fn take_lifecycle(&mut self, id: LayerId) -> Option<Box<dyn Lifecycle>> {
        self.validate(id);
        self.hooks[id.idx as usize].take()
    }

    // -- Listeners --

    /// Attaches an interaction listener and marks the layer interactive.
    pub fn add_listener(&mut self, id: LayerId, listener: ListenerRef) -> ListenerKey {
        self.validate(id);
        let key = ListenerKey(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        self.listeners[id.idx as usize].push((key, listener));
        self.flags[id.idx as usize].interactive = true;
        key
    }

    /// Detaches a listener. Returns `false` if the key was not attached to
    /// this layer.
    ///
    /// Removing the last listener of a leaf clears its interactive flag;
    /// groups stay interactive.
    pub fn remove_listener(&mut self, id: LayerId, key: ListenerKey) -> bool {
        self.validate(id);
        let i = id.idx as usize;
        let Some(pos) = self.listeners[i].iter().position(|(k, _)| *k == key) else {
            return false;
        };
        self.listeners[i].remove(pos);
        if self.listeners[i].is_empty() && self.kind[i] == LayerKind::Leaf {
            self.flags[i].interactive = false;
        }
        true
    }

    /// Returns whether any listener is attached to the layer.
    #[must_use]
    pub fn has_listeners(&self, id: LayerId) -> bool {
        self.validate(id);
        !self.listeners[id.idx as usize].is_empty()
    }

    /// Returns a snapshot of the listeners attached to a layer.
    #[must_use]
    pub fn listeners(&self, id: LayerId) -> Vec<ListenerRef> {
        self.validate(id);
        self.listeners[id.idx as usize]
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect()
    }

    // -- Raw-index accessors for backends --
    //
    // These accept raw slot indices (as found in `FrameChanges` or
    // `traversal_order()`) and skip generation validation.

    /// Returns the cached world transform at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn world_transform_at(&self, idx: u32) -> Affine {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.world_transform[idx as usize]
    }

    /// Returns the effective alpha at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_alpha_at(&self, idx: u32) -> f32 {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.effective_alpha[idx as usize]
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: LayerId) {
        assert!(
            self.is_alive(id),
            "stale LayerId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> LayerId {
        LayerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    pub(crate) fn local_transform_at(&self, idx: u32) -> Affine {
        let i = idx as usize;
        Affine::translate(self.translation[i])
            * Affine::rotate(self.rotation[i])
            * Affine::scale_non_uniform(self.scale[i].x, self.scale[i].y)
    }

    pub(crate) fn origin_at(&self, idx: u32) -> Point {
        let i = idx as usize;
        self.origin[i].resolve(self.size[i])
    }

    /// Maps layer space to parent space: `local * T(-origin)`.
    pub(crate) fn layer_to_parent_at(&self, idx: u32) -> Affine {
        let o = self.origin_at(idx);
        self.local_transform_at(idx) * Affine::translate(-o.to_vec2())
    }

    pub(crate) fn is_ancestor_idx(&self, ancestor: u32, mut idx: u32) -> bool {
        while idx != INVALID {
            if idx == ancestor {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    /// Inserts `child` into `parent`'s children after every sibling whose
    /// depth is less than or equal to its own.
    pub(crate) fn insert_sorted(&mut self, parent: u32, child: u32) {
        let d = self.depth[child as usize];
        let depth = &self.depth;
        let kids = &mut self.children[parent as usize];
        match kids.last() {
            Some(&last) if depth[last as usize] > d => {
                let pos = kids.partition_point(|&k| depth[k as usize] <= d);
                kids.insert(pos, child);
            }
            _ => kids.push(child),
        }
    }

    fn alloc(&mut self, kind: LayerKind) -> u32 {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.translation[i] = Vec2::ZERO;
            self.rotation[i] = 0.0;
            self.scale[i] = Vec2::new(1.0, 1.0);
            self.origin[i] = Origin::default();
            self.depth[i] = 0.0;
            self.flags[i] = LayerFlags::default();
            self.alpha[i] = 1.0;
            self.tint[i] = NO_TINT;
            self.batch[i] = None;
            self.size[i] = Size::ZERO;
            self.kind[i] = kind;
            self.content[i] = Content::None;
            self.name[i] = None;
            self.state[i] = LayerState::Removed;
            self.hooks[i] = None;
            self.listeners[i].clear();
            self.world_transform[i] = Affine::IDENTITY;
            self.effective_alpha[i] = 1.0;
            self.effective_visible[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.translation.push(Vec2::ZERO);
            self.rotation.push(0.0);
            self.scale.push(Vec2::new(1.0, 1.0));
            self.origin.push(Origin::default());
            self.depth.push(0.0);
            self.flags.push(LayerFlags::default());
            self.alpha.push(1.0);
            self.tint.push(NO_TINT);
            self.batch.push(None);
            self.size.push(Size::ZERO);
            self.kind.push(kind);
            self.content.push(Content::None);
            self.name.push(None);
            self.state.push(LayerState::Removed);
            self.hooks.push(None);
            self.listeners.push(Vec::new());
            self.world_transform.push(Affine::IDENTITY);
            self.effective_alpha.push(1.0);
            self.effective_visible.push(true);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark(idx, dirty::TRANSFORM);
        self.dirty.mark(idx, dirty::VISUAL);
        idx
    }

    /// Returns a disposed slot to the free list, bumping its generation so
    /// old handles fail validation.
    pub(crate) fn free(&mut self, idx: u32) {
        let i = idx as usize;
        self.dirty.remove_key(idx);
        self.content[i] = Content::None;
        self.hooks[i] = None;
        self.listeners[i].clear();
        self.batch[i] = None;
        self.generation[i] += 1;
        self.free_list.push(idx);
        self.traversal_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_added_group() {
        let tree = LayerTree::new();
        let root = tree.root();
        assert!(tree.is_added(root));
        assert!(tree.kind(root).is_group());
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.layer_count(), 1);
    }

    #[test]
    fn new_layer_defaults() {
        let mut tree = LayerTree::new();
        let id = tree.create_layer();
        assert_eq!(tree.state(id), LayerState::Removed);
        assert_eq!(tree.translation(id), Vec2::ZERO);
        assert_eq!(tree.scale(id), Vec2::new(1.0, 1.0));
        assert!(tree.visible(id));
        assert!(!tree.interactive(id));
        assert_eq!(tree.tint(id), NO_TINT);
        assert!((tree.alpha(id) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn local_transform_composes_translate_rotate_scale() {
        let mut tree = LayerTree::new();
        let id = tree.create_layer();
        tree.set_translation(id, Vec2::new(10.0, 20.0));
        tree.set_rotation(id, core::f64::consts::FRAC_PI_2);
        tree.set_scale(id, Vec2::new(2.0, 2.0));
        let p = tree.local_transform(id) * Point::new(1.0, 0.0);
        let eps = 1e-9;
        assert!((p.x - 10.0).abs() < eps, "got {p:?}");
        assert!((p.y - 22.0).abs() < eps, "got {p:?}");
    }

    #[test]
    fn set_depth_resorts_siblings() {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let a = tree.create_layer();
        let b = tree.create_layer();
        let c = tree.create_layer();
        tree.set_depth(b, 1.0);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.add_child(root, c).unwrap();
        let kids: Vec<_> = tree.children(root).collect();
        assert_eq!(kids, [a, c, b], "c inserted before deeper b");

        tree.set_depth(a, 2.0);
        let kids: Vec<_> = tree.children(root).collect();
        assert_eq!(kids, [c, b, a]);
    }

    #[test]
    fn equal_depth_keeps_insertion_order() {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let ids: Vec<_> = (0..4).map(|_| tree.create_layer()).collect();
        for &id in &ids {
            tree.add_child(root, id).unwrap();
        }
        let kids: Vec<_> = tree.children(root).collect();
        assert_eq!(kids, ids);
    }

    #[test]
    fn listeners_toggle_interactive_on_leaves() {
        use alloc::rc::Rc;
        use core::cell::RefCell;

        use crate::input::InteractionListener;

        struct Nop;
        impl InteractionListener for Nop {}

        let mut tree = LayerTree::new();
        let leaf = tree.create_layer();
        let key = tree.add_listener(leaf, Rc::new(RefCell::new(Nop)));
        assert!(tree.interactive(leaf));
        assert!(tree.has_listeners(leaf));
        assert!(tree.remove_listener(leaf, key));
        assert!(!tree.interactive(leaf));
        assert!(!tree.remove_listener(leaf, key), "second removal is a miss");

        let group = tree.create_group();
        let key = tree.add_listener(group, Rc::new(RefCell::new(Nop)));
        assert!(tree.remove_listener(group, key));
        assert!(tree.interactive(group), "groups stay interactive");
    }

    #[test]
    #[should_panic(expected = "stale LayerId")]
    fn disposed_handle_panics_on_get() {
        let mut tree = LayerTree::new();
        let id = tree.create_layer();
        tree.dispose(id).unwrap();
        let _ = tree.translation(id);
    }

    #[test]
    #[should_panic(expected = "stale LayerId")]
    fn disposed_handle_panics_on_set() {
        let mut tree = LayerTree::new();
        let id = tree.create_layer();
        tree.dispose(id).unwrap();
        tree.set_alpha(id, 0.5);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut tree = LayerTree::new();
        let id1 = tree.create_layer();
        tree.dispose(id1).unwrap();
        let id2 = tree.create_layer();
        assert!(!tree.is_alive(id1));
        assert!(tree.is_alive(id2));
        assert_eq!(id1.index(), id2.index());
        assert_ne!(id1.generation(), id2.generation());
        assert_eq!(tree.state(id1), LayerState::Disposed);
    }
}
