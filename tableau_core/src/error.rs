// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by tree, input, and frame operations.

use alloc::boxed::Box;

use crate::layer::LayerId;

/// A boxed error raised by user code (lifecycle hooks, actions, listeners).
pub type BoxError = Box<dyn core::error::Error + 'static>;

/// Errors reported by layer tree and dispatch operations.
///
/// Stale [`LayerId`]s are not reported here; they are programming errors and
/// panic at the call site.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The parent passed to an add operation is a leaf layer.
    #[error("layer {0:?} cannot hold children")]
    NotAGroup(LayerId),
    /// The layer is not a direct child of the given parent.
    #[error("layer {child:?} is not a child of {parent:?}")]
    NotAChild {
        /// The parent that was asked to remove the child.
        parent: LayerId,
        /// The layer that was not found among its children.
        child: LayerId,
    },
    /// The add would make a layer its own ancestor.
    #[error("adding {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// The requested parent.
        parent: LayerId,
        /// The requested child.
        child: LayerId,
    },
    /// The root layer cannot be attached under another layer.
    #[error("the root layer cannot be reparented")]
    RootReparent,
    /// A point could not be mapped into a layer with a singular transform.
    #[error("transform of layer {0:?} is not invertible")]
    NonInvertible(LayerId),
    /// Custom layer content failed to paint.
    #[error("painter failed: {0}")]
    Painter(&'static str),
    /// A user callback failed.
    #[error("callback failed: {0}")]
    Callback(#[source] BoxError),
}

impl Error {
    /// Wraps an arbitrary error raised from a user callback.
    #[must_use]
    pub fn callback(err: impl Into<BoxError>) -> Self {
        Self::Callback(err.into())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn callback_wraps_message() {
        let err = Error::callback("boom");
        assert_eq!(err.to_string(), "callback failed: boom");
        let source = core::error::Error::source(&err);
        assert!(source.is_some(), "callback errors expose their source");
    }
}
