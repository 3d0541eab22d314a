// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer tree data model.
//!
//! A *layer* is a node in a retained-mode scene graph. Each layer has:
//!
//! - An identity ([`LayerId`]): a generational handle that becomes stale when
//!   the layer is disposed. Using a stale handle panics.
//! - Topology: an optional parent and, for groups, children kept sorted by
//!   [`depth`](LayerTree::set_depth).
//! - **Local properties** set by the caller: translation, rotation, scale,
//!   [`Origin`], depth, [`LayerFlags`], alpha, tint, batch, size and
//!   [`Content`].
//! - A [`LayerState`] driven by attachment to the root, with optional
//!   [`Lifecycle`] hooks.
//! - **Computed properties** produced by [`evaluate`](LayerTree::evaluate):
//!   world transform, effective alpha and effective visibility.
//!
//! Layers are stored in struct-of-arrays layout with index-based handles.
//!
//! # Dirty tracking
//!
//! Property mutations automatically mark the corresponding dirty channel
//! (see [`dirty`](crate::dirty)):
//!
//! - **TRANSFORM** / **VISUAL**: propagate to all descendants.
//! - **CONTENT**: local only.
//! - **TOPOLOGY**: attach, detach and depth re-sorts.

mod evaluate;
mod hit;
mod id;
mod lifecycle;
mod paint;
mod props;
mod topology;
mod traverse;
mod tree;

pub use evaluate::FrameChanges;
pub use id::{INVALID, LayerId, ListenerKey, ResourceKey};
pub use lifecycle::Lifecycle;
pub use props::{Content, LayerFlags, LayerKind, LayerState, Origin};
pub use traverse::Children;
pub use tree::LayerTree;
