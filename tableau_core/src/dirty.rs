// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The layer tree uses multi-channel dirty tracking (via [`understory_dirty`])
//! so that [`evaluate`](crate::layer::LayerTree::evaluate) only revisits
//! layers whose inputs changed. Each channel is an independent category of
//! change.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`TRANSFORM`] and [`VISUAL`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) along child-to-parent
//!   dependency edges. World transforms, effective visibility and effective
//!   alpha are inherited, so marking a parent marks its whole subtree.
//!   Visibility and origin changes are routed through [`TRANSFORM`].
//!
//! - **Local-only**: [`CONTENT`] covers textures, painters, batches and
//!   sizes. Only the marked layer is reported.
//!
//! - **Structural**: [`TOPOLOGY`] is marked by attach, detach, depth
//!   re-sorting and disposal. It triggers a traversal-order rebuild.

use understory_dirty::Channel;

/// Transform, origin or visibility changed.
pub const TRANSFORM: Channel = Channel::new(0);

/// Alpha or tint changed.
pub const VISUAL: Channel = Channel::new(1);

/// Content, batch or size changed.
pub const CONTENT: Channel = Channel::new(2);

/// Tree topology or sibling order changed.
pub const TOPOLOGY: Channel = Channel::new(3);
