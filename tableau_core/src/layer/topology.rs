// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attach, detach and disposal.

use alloc::vec::Vec;

use kurbo::Vec2;
use understory_dirty::EagerPolicy;

use super::id::{INVALID, LayerId};
use super::props::{Content, LayerState};
use super::tree::{LayerTree, ROOT};
use crate::dirty;
use crate::error::Error;
use crate::surface::Batch;

impl LayerTree {
    /// Adds `child` under `parent`, after every sibling of lower or equal
    /// depth.
    ///
    /// If `child` already has a different parent it is detached first,
    /// running its removed lifecycle if it was added. If `parent` is added,
    /// the added lifecycle then runs over `child`'s subtree in pre-order.
    /// Adding a layer to its current parent is a no-op.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAGroup`] if `parent` is a leaf.
    /// - [`Error::RootReparent`] if `child` is the root.
    /// - [`Error::Cycle`] if `child` is `parent` or one of its ancestors.
    /// - Any error returned by a lifecycle hook.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn add_child(&mut self, parent: LayerId, child: LayerId) -> Result<(), Error> {
        self.validate(parent);
        self.validate(child);
        let (p, c) = (parent.idx, child.idx);
        if !self.kind[p as usize].is_group() {
            return Err(Error::NotAGroup(parent));
        }
        if c == ROOT {
            return Err(Error::RootReparent);
        }
        if self.is_ancestor_idx(c, p) {
            return Err(Error::Cycle { parent, child });
        }
        if self.parent[c as usize] == p {
            return Ok(());
        }

        self.detach(c)?;
        if !self.is_alive(parent) || !self.is_alive(child) {
            log::debug!("add_child({parent:?}, {child:?}) abandoned: disposed by a removal hook");
            return Ok(());
        }
        if self.parent[c as usize] != INVALID {
            // A removal hook re-attached the child elsewhere.
            self.unlink(c);
        }
        self.link(p, c);
        if self.state[p as usize] == LayerState::Added {
            self.enter_added(c)?;
        } else {
            // Only does anything if a removal hook re-added the child.
            self.enter_removed(c)?;
        }
        Ok(())
    }

    /// Sets `child`'s translation to `(x, y)` and adds it under `parent`.
    ///
    /// # Errors
    ///
    /// See [`add_child`](Self::add_child).
    pub fn add_child_at(
        &mut self,
        parent: LayerId,
        child: LayerId,
        x: f64,
        y: f64,
    ) -> Result<(), Error> {
        self.set_translation(child, Vec2::new(x, y));
        self.add_child(parent, child)
    }

    /// Detaches `child` from `parent`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAChild`] if `child` is not a direct child of `parent`.
    /// - Any error returned by a removal hook.
    pub fn remove_child(&mut self, parent: LayerId, child: LayerId) -> Result<(), Error> {
        self.validate(parent);
        self.validate(child);
        if self.parent[child.idx as usize] != parent.idx {
            return Err(Error::NotAChild { parent, child });
        }
        self.detach(child.idx)
    }

    /// Detaches `child` from its parent, if it has one.
    ///
    /// # Errors
    ///
    /// Any error returned by a removal hook.
    pub fn remove_from_parent(&mut self, child: LayerId) -> Result<(), Error> {
        self.validate(child);
        self.detach(child.idx)
    }

    /// Detaches every child of `parent`, highest depth first.
    ///
    /// # Errors
    ///
    /// Any error returned by a removal hook. Children not yet visited stay
    /// attached.
    pub fn remove_all(&mut self, parent: LayerId) -> Result<(), Error> {
        self.validate(parent);
        let p = parent.idx;
        let snapshot: Vec<u32> = self.children[p as usize].clone();
        for &c in snapshot.iter().rev() {
            if self.parent[c as usize] == p {
                self.detach(c)?;
            }
        }
        Ok(())
    }

    /// Disposes every child of `parent`, highest depth first.
    ///
    /// # Errors
    ///
    /// Any error returned by a removal hook.
    pub fn dispose_all(&mut self, parent: LayerId) -> Result<(), Error> {
        self.validate(parent);
        let p = parent.idx;
        let snapshot: Vec<u32> = self.children[p as usize].clone();
        for &c in snapshot.iter().rev() {
            if self.parent[c as usize] == p && self.state[c as usize] != LayerState::Disposed {
                self.dispose_idx(c)?;
            }
        }
        Ok(())
    }

    /// Disposes a layer and the children still attached to it.
    ///
    /// The layer is detached (running its removed lifecycle), marked
    /// [`Disposed`](LayerState::Disposed), and its texture and custom batch
    /// keys are reported once in the next
    /// [`FrameChanges::released`](super::FrameChanges). Children that a
    /// removal hook moved elsewhere survive. The slot is then recycled.
    ///
    /// Disposing a stale or already disposed handle is a no-op. Disposing
    /// the root disposes its children and keeps the root.
    ///
    /// # Errors
    ///
    /// Any error returned by a removal hook. The layer is still disposed.
    pub fn dispose(&mut self, id: LayerId) -> Result<(), Error> {
        if !self.is_alive(id) {
            return Ok(());
        }
        if id.idx == ROOT {
            return self.dispose_all(id);
        }
        self.dispose_idx(id.idx)
    }

    fn dispose_idx(&mut self, idx: u32) -> Result<(), Error> {
        let i = idx as usize;
        let id = self.id_at(idx);
        let mut result = self.detach(idx);
        if !self.is_alive(id) {
            // A removal hook disposed it already.
            return result;
        }
        if self.parent[i] != INVALID {
            // A removal hook re-attached it. Detach once more so the hooks
            // see the removal that pairs with the re-add.
            let r = self.detach(idx);
            if result.is_ok() {
                result = r;
            }
            if !self.is_alive(id) {
                return result;
            }
        }
        if self.parent[i] != INVALID {
            log::warn!(
                "{id:?} re-attached itself while being disposed; removing it without its hook"
            );
            self.hooks[i] = None;
            self.unlink(idx);
            let r = self.enter_removed(idx);
            if result.is_ok() {
                result = r;
            }
            if !self.is_alive(id) {
                return result;
            }
            if self.parent[i] != INVALID {
                self.unlink(idx);
            }
        }
        self.state[i] = LayerState::Disposed;

        if let Content::Texture(key) = self.content[i] {
            self.pending_released.push(key);
        }
        if let Some(Batch::Custom(key)) = self.batch[i] {
            self.pending_released.push(key);
        }

        let snapshot: Vec<u32> = self.children[i].clone();
        for &c in snapshot.iter().rev() {
            if self.parent[c as usize] == idx && self.state[c as usize] != LayerState::Disposed {
                let r = self.dispose_idx(c);
                if result.is_ok() {
                    result = r;
                }
            }
        }
        // Anything a hook attached to the dying layer is orphaned.
        for c in core::mem::take(&mut self.children[i]) {
            self.parent[c as usize] = INVALID;
            self.dirty.remove_dependency(c, idx, dirty::TRANSFORM);
            self.dirty.remove_dependency(c, idx, dirty::VISUAL);
        }

        self.free(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        result
    }

    /// Unlinks `idx` from its parent and runs the removed lifecycle if it
    /// was added.
    pub(crate) fn detach(&mut self, idx: u32) -> Result<(), Error> {
        if self.parent[idx as usize] == INVALID {
            return Ok(());
        }
        self.unlink(idx);
        if self.state[idx as usize] == LayerState::Added {
            self.enter_removed(idx)?;
        }
        Ok(())
    }

    /// Removes `idx` from its parent's child list without lifecycle calls.
    fn unlink(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let kids = &mut self.children[p as usize];
        if let Some(pos) = kids.iter().position(|&k| k == idx) {
            kids.remove(pos);
        }
        self.parent[idx as usize] = INVALID;

        self.dirty.remove_dependency(idx, p, dirty::TRANSFORM);
        self.dirty.remove_dependency(idx, p, dirty::VISUAL);
        self.mark_subtree_inherited_dirty(idx);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Inserts `c` under `p` by depth without lifecycle calls.
    fn link(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.insert_sorted(p, c);

        // Child depends on parent for inherited channels.
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        let _ = self.dirty.add_dependency(c, p, dirty::VISUAL);

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::VISUAL, &EagerPolicy);
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use core::cell::Cell;

    use super::*;
    use crate::layer::{Lifecycle, ResourceKey};

    #[test]
    fn add_child_errors() {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let leaf = tree.create_layer();
        let g = tree.create_group();
        let inner = tree.create_group();

        assert!(matches!(
            tree.add_child(leaf, g),
            Err(Error::NotAGroup(id)) if id == leaf
        ));
        assert!(matches!(
            tree.add_child(g, root),
            Err(Error::RootReparent)
        ));
        tree.add_child(g, inner).unwrap();
        assert!(matches!(
            tree.add_child(inner, g),
            Err(Error::Cycle { .. })
        ));
        assert!(matches!(tree.add_child(g, g), Err(Error::Cycle { .. })));
    }

    #[test]
    fn add_child_to_current_parent_is_noop() {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let a = tree.create_layer();
        let b = tree.create_layer();
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.add_child(root, a).unwrap();
        let kids: Vec<_> = tree.children(root).collect();
        assert_eq!(kids, [a, b], "order unchanged");
    }

    #[test]
    fn add_child_at_sets_translation() {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let a = tree.create_layer();
        tree.add_child_at(root, a, 5.0, 7.0).unwrap();
        assert_eq!(tree.translation(a), Vec2::new(5.0, 7.0));
    }

    #[test]
    fn remove_child_requires_membership() {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let g = tree.create_group();
        let a = tree.create_layer();
        tree.add_child(g, a).unwrap();
        assert!(matches!(
            tree.remove_child(root, a),
            Err(Error::NotAChild { .. })
        ));
        tree.remove_child(g, a).unwrap();
        assert_eq!(tree.parent(a), None);
        tree.remove_from_parent(a).unwrap();
    }

    #[test]
    fn remove_all_detaches_every_child() {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let kids: Vec<_> = (0..3).map(|_| tree.create_layer()).collect();
        for &k in &kids {
            tree.add_child(root, k).unwrap();
        }
        tree.remove_all(root).unwrap();
        assert_eq!(tree.child_count(root), 0);
        for k in kids {
            assert!(tree.is_alive(k));
            assert_eq!(tree.state(k), LayerState::Removed);
        }
    }

    #[test]
    fn dispose_cascades_and_is_idempotent() {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let g = tree.create_group();
        let a = tree.create_layer();
        let b = tree.create_layer();
        tree.add_child(root, g).unwrap();
        tree.add_child(g, a).unwrap();
        tree.add_child(g, b).unwrap();

        tree.dispose(g).unwrap();
        for id in [g, a, b] {
            assert!(!tree.is_alive(id));
        }
        assert_eq!(tree.child_count(root), 0);
        tree.dispose(g).unwrap();
        tree.dispose(a).unwrap();
        assert_eq!(tree.layer_count(), 1);
    }

    #[test]
    fn dispose_root_keeps_root() {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let a = tree.create_layer();
        tree.add_child(root, a).unwrap();
        tree.dispose(root).unwrap();
        assert!(tree.is_alive(root));
        assert!(tree.is_added(root));
        assert!(!tree.is_alive(a));
    }

    #[test]
    fn dispose_releases_resources_once() {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let a = tree.create_layer();
        tree.set_content(a, Content::Texture(ResourceKey(7)));
        tree.set_batch(a, Some(Batch::Custom(ResourceKey(9))));
        tree.add_child(root, a).unwrap();
        let _ = tree.evaluate();

        tree.dispose(a).unwrap();
        tree.dispose(a).unwrap();
        let changes = tree.evaluate();
        assert_eq!(changes.released, [ResourceKey(7), ResourceKey(9)]);
        assert!(changes.removed.contains(&a.index()));
        assert!(tree.evaluate().released.is_empty());
    }

    #[test]
    fn dispose_spares_children_moved_by_hook() {
        struct Evacuate {
            kid: LayerId,
            to: LayerId,
            ran: Rc<Cell<bool>>,
        }
        impl Lifecycle for Evacuate {
            fn was_removed(&mut self, tree: &mut LayerTree, _: LayerId) -> Result<(), Error> {
                self.ran.set(true);
                tree.add_child(self.to, self.kid)
            }
        }

        let mut tree = LayerTree::new();
        let root = tree.root();
        let g = tree.create_group();
        let kid = tree.create_layer();
        let doomed = tree.create_layer();
        tree.add_child(g, kid).unwrap();
        tree.add_child(g, doomed).unwrap();
        tree.add_child(root, g).unwrap();
        let ran = Rc::new(Cell::new(false));
        tree.set_lifecycle(
            g,
            Box::new(Evacuate {
                kid,
                to: root,
                ran: Rc::clone(&ran),
            }),
        );

        tree.dispose(g).unwrap();
        assert!(ran.get());
        assert!(tree.is_alive(kid), "moved child survives");
        assert!(tree.is_added(kid));
        assert!(!tree.is_alive(doomed));
    }
}
