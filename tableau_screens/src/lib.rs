// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen stack and screen transitions for `tableau_core` layer trees.
//!
//! A [`ScreenStack`] holds the screens of an app, bottom to top, and keeps
//! the top one attached under a root layer. Pushing, popping, replacing and
//! removing screens hands over from one screen to the next through a
//! [`Transition`]:
//!
//! - [`Slide`]: moves both screens in one direction.
//! - [`Fade`]: fades the incoming screen in.
//! - [`Flip`]: turns the pair over like a card.
//! - [`PageTurn`]: turns the outgoing screen away like a page.
//! - [`Noop`]: swaps instantly.
//!
//! ```ignore
//! let mut stack = ScreenStack::new(tree.root()).with_input(dispatcher.enabled().clone());
//! stack.push(&mut tree, screen_ref(menu), Noop)?;
//! stack.push(&mut tree, screen_ref(level), stack.slide().up())?;
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod screen;
mod stack;
mod transition;

pub use screen::{Screen, ScreenRef, ScreenView, screen_ref};
pub use stack::{ScreenError, ScreenStack};
pub use transition::{
    Dir, FADE_DURATION, FLIP_DURATION, Fade, Flip, Noop, PAGE_TURN_DURATION, PageTurn,
    SLIDE_DURATION, Slide, Timed, Timing, Transition, TransitionAction,
};
