// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use tableau_core::layer::LayerTree;

use super::Transition;
use crate::screen::ScreenView;

/// Swaps the screens at once.
#[derive(Clone, Copy, Debug, Default)]
pub struct Noop;

impl Transition for Noop {
    fn update(&mut self, _: &mut LayerTree, _: ScreenView, _: ScreenView, _: f64) -> bool {
        true
    }

    fn is_noop(&self) -> bool {
        true
    }
}
