// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-clocked animation for `tableau_core` layer trees.
//!
//! Animations are small steps (tweens, delays, actions, loops) linked into
//! chains. An [`Animator`] owns the chains it was given and advances them on
//! every tick; time a step overshoots is carried into the next step, so a
//! chain stays in sync with the clock regardless of frame rate.
//!
//! ```ignore
//! let anim = Animator::new();
//! anim.tween_alpha(card).to(0.0).duration(300.0).ease_out()
//!     .then().dispose(card)?;
//! anim.add_barrier();
//! anim.tween_x(next).from(-200.0).to(0.0);
//! frame_loop.add_ticker(anim.clone());
//! ```
//!
//! - [`Interpolator`]: easing curves.
//! - [`Animation`]: the step trait, with [`Tween`], [`TweenXy`], [`Shake`],
//!   [`Delay`], [`Action`] and [`Repeat`].
//! - [`AnimBuilder`]: fluent construction shared by [`Animator`],
//!   [`AnimGroup`] and [`Then`].
//! - [`AnimHandle`]: cancels or completes a running chain.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod animation;
mod animator;
mod builder;
mod chain;
mod group;
mod interp;

pub use animation::{
    Action, ActionFn, Animation, DEFAULT_DURATION, DEFAULT_SHAKE_SEED, Delay, Interped, Repeat,
    Shake, Target, TargetXy, Tween, TweenXy,
};
pub use animator::Animator;
pub use builder::AnimBuilder;
pub use chain::{Anim, AnimHandle, ChainError, Then};
pub use group::{AnimGroup, GroupAnim};
pub use interp::Interpolator;
