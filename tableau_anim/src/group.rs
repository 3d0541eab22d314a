// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parallel composition of chains.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use tableau_core::Error;
use tableau_core::layer::LayerTree;

use crate::animation::Animation;
use crate::builder::AnimBuilder;
use crate::chain::{Anim, Node, Runner, complete_root};

/// Collects chains that run side by side once the group is started.
///
/// ```ignore
/// let group = AnimGroup::new();
/// group.tween_x(card).to(200.0);
/// group.delay(250.0).then().tween_alpha(card)?.to(0.0);
/// animator.add(group.into_anim()).then().dispose(card)?;
/// ```
///
/// Turn the group into a single animation with
/// [`into_anim`](Self::into_anim) and add that to an animator or chain.
#[derive(Default)]
pub struct AnimGroup {
    members: RefCell<Vec<Rc<Node>>>,
}

impl fmt::Debug for AnimGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimGroup")
            .field("members", &self.members.borrow().len())
            .finish()
    }
}

impl AnimGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of chains in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    /// Returns whether no chain was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// Converts the group into one animation that completes when its last
    /// chain completes.
    #[must_use]
    pub fn into_anim(self) -> GroupAnim {
        let members = self.members.into_inner();
        GroupAnim {
            runners: Vec::with_capacity(members.len()),
            members,
            started: false,
        }
    }
}

impl AnimBuilder for AnimGroup {
    type Added<A: Animation + 'static> = Anim<A>;

    fn add<A: Animation + 'static>(&self, anim: A) -> Anim<A> {
        Anim::build(anim, |anim| {
            let node = Node::root(anim);
            self.members.borrow_mut().push(node.clone());
            node
        })
    }
}

/// The animation produced by [`AnimGroup::into_anim`].
pub struct GroupAnim {
    members: Vec<Rc<Node>>,
    runners: Vec<Option<Runner>>,
    started: bool,
}

impl fmt::Debug for GroupAnim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupAnim")
            .field("members", &self.members.len())
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl Animation for GroupAnim {
    fn init(&mut self, tree: &mut LayerTree, time: f64) {
        self.started = true;
        self.runners.clear();
        for member in &self.members {
            self.runners.push(Some(Runner::start(member.clone(), tree, time)));
        }
    }

    fn apply(&mut self, tree: &mut LayerTree, time: f64) -> Result<f64, Error> {
        let mut remain = f64::NEG_INFINITY;
        let mut processed = 0;
        for slot in &mut self.runners {
            let Some(runner) = slot else {
                continue;
            };
            let r = runner.apply(tree, time)?;
            if r <= 0.0 {
                *slot = None;
            }
            remain = remain.max(r);
            processed += 1;
        }
        Ok(if processed == 0 { 0.0 } else { remain })
    }

    fn make_complete(&mut self, tree: &mut LayerTree) -> Result<(), Error> {
        let mut result = Ok(());
        for (i, member) in self.members.iter().enumerate() {
            let active = !self.started || self.runners.get(i).is_some_and(Option::is_some);
            if active {
                let r = complete_root(member, tree);
                if result.is_ok() {
                    result = r;
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use tableau_core::layer::LayerId;

    fn setup() -> (LayerTree, LayerId) {
        let mut tree = LayerTree::new();
        let root = tree.root();
        let id = tree.create_layer();
        tree.add_child(root, id).unwrap();
        (tree, id)
    }

    #[test]
    fn remaining_time_is_the_longest_member() {
        let (mut tree, id) = setup();
        let group = AnimGroup::new();
        group.tween_x(id).to(10.0).duration(100.0);
        group.tween_y(id).to(10.0).duration(300.0);
        assert_eq!(group.len(), 2);
        let mut anim = group.into_anim();
        anim.init(&mut tree, 0.0);

        assert!((anim.apply(&mut tree, 50.0).unwrap() - 250.0).abs() < 1e-9);
        assert!((anim.apply(&mut tree, 200.0).unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(tree.translation(id).x, 10.0);
        assert!(anim.apply(&mut tree, 320.0).unwrap() <= 0.0);
        assert_eq!(tree.translation(id).y, 10.0);
    }

    #[test]
    fn empty_group_completes_immediately() {
        let (mut tree, _) = setup();
        let mut anim = AnimGroup::new().into_anim();
        anim.init(&mut tree, 0.0);
        assert_eq!(anim.apply(&mut tree, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn members_chain_in_sequence() {
        let (mut tree, id) = setup();
        let group = AnimGroup::new();
        group
            .delay(100.0)
            .then()
            .tween_alpha(id)
            .unwrap()
            .from(1.0)
            .to(0.0)
            .duration(100.0);
        let root = Node::root(Rc::new(RefCell::new(group.into_anim())));
        let mut runner = Runner::start(root, &mut tree, 0.0);
        assert!(runner.apply(&mut tree, 150.0).unwrap() > 0.0);
        assert!((tree.alpha(id) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn complete_before_start_finishes_every_member() {
        let (mut tree, id) = setup();
        let log = Rc::new(RefCell::new(vec![]));
        let group = AnimGroup::new();
        group.tween_x(id).to(5.0);
        let l = log.clone();
        group
            .delay(10.0)
            .then()
            .action(move |_| {
                l.borrow_mut().push(1);
                Ok(())
            })
            .unwrap();
        let mut anim = group.into_anim();
        anim.make_complete(&mut tree).unwrap();
        assert_eq!(tree.translation(id).x, 5.0);
        assert_eq!(*log.borrow(), [1]);
    }
}
