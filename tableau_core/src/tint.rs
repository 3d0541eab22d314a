// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! ARGB tint arithmetic.
//!
//! Tints are packed `0xAARRGGBB` colors that multiply whatever a layer draws.
//! Layer alpha is folded into the alpha byte before tints are combined down
//! the tree.

/// The identity tint: opaque white.
pub const NO_TINT: u32 = 0xFFFF_FFFF;

/// Multiplies two tints channel by channel.
#[must_use]
pub fn combine(a: u32, b: u32) -> u32 {
    if a == NO_TINT {
        return b;
    }
    if b == NO_TINT {
        return a;
    }
    let mut out = 0_u32;
    for shift in [24_u32, 16, 8, 0] {
        let ca = (a >> shift) & 0xFF;
        let cb = (b >> shift) & 0xFF;
        out |= ((ca * cb + 127) / 255) << shift;
    }
    out
}

/// Replaces the alpha byte of `tint` with `alpha` scaled by the existing
/// alpha byte.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "alpha is clamped to [0, 1] so the scaled byte fits in u8"
)]
pub fn with_alpha(tint: u32, alpha: f32) -> u32 {
    let alpha = alpha.clamp(0.0, 1.0);
    let base = ((tint >> 24) & 0xFF) as f32;
    let scaled = (base * alpha + 0.5) as u32;
    (scaled.min(255) << 24) | (tint & 0x00FF_FFFF)
}

/// Extracts the alpha channel as a float in `[0, 1]`.
#[must_use]
pub fn alpha_of(tint: u32) -> f32 {
    ((tint >> 24) & 0xFF) as f32 / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_with_identity_is_identity() {
        assert_eq!(combine(NO_TINT, 0x80FF_0000), 0x80FF_0000);
        assert_eq!(combine(0x80FF_0000, NO_TINT), 0x80FF_0000);
    }

    #[test]
    fn combine_multiplies_channels() {
        assert_eq!(combine(0xFF80_FF00, 0x80FF_FFFF), 0x8080_FF00);
    }

    #[test]
    fn half_alpha() {
        let t = with_alpha(NO_TINT, 0.5);
        assert_eq!(t >> 24, 128);
        assert_eq!(t & 0x00FF_FFFF, 0x00FF_FFFF);
        assert!((alpha_of(t) - 0.502).abs() < 1e-3, "got {}", alpha_of(t));
    }
}
