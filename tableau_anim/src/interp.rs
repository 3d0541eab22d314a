// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing functions.

use core::f64::consts::PI;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

const BACK_CURVATURE: f64 = 1.70158;
const BOUNCE: f64 = 7.5625;
const ELASTIC_PERIOD: f64 = 0.3;

/// Maps normalized progress in `[0, 1]` to eased progress.
#[derive(Clone, Copy, Debug, Default)]
pub enum Interpolator {
    /// Always reports the starting position.
    Noop,
    /// Constant speed.
    #[default]
    Linear,
    /// Starts slowly and ramps up (`v³`).
    EaseIn,
    /// Starts quickly and eases into the end.
    EaseOut,
    /// Eases in for the first half and out for the second.
    EaseInOut,
    /// Backs up past the start before heading to the end.
    EaseInBack,
    /// Overshoots the end before settling on it.
    EaseOutBack,
    /// Bounces against the end like a dropped ball.
    BounceOut,
    /// Springs past the end and oscillates back.
    EaseOutElastic,
    /// A caller-supplied curve.
    Custom(fn(f64) -> f64),
}

impl Interpolator {
    /// Eases normalized progress `v`.
    #[must_use]
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Self::Noop => 0.0,
            Self::Linear => v,
            Self::EaseIn => v * v * v,
            Self::EaseOut => {
                let vv = v - 1.0;
                1.0 + vv * vv * vv
            }
            Self::EaseInOut => {
                let v2 = 2.0 * v;
                if v2 < 1.0 {
                    v2 * v2 * v2 / 2.0
                } else {
                    let ov = v2 - 2.0;
                    (2.0 + ov * ov * ov) / 2.0
                }
            }
            Self::EaseInBack => v * v * ((BACK_CURVATURE + 1.0) * v - BACK_CURVATURE),
            Self::EaseOutBack => {
                let v1 = v - 1.0;
                v1 * v1 * ((BACK_CURVATURE + 1.0) * v1 + BACK_CURVATURE) + 1.0
            }
            Self::BounceOut => bounce_out(v),
            Self::EaseOutElastic => {
                let k = ELASTIC_PERIOD / 4.0;
                let j = 2.0 * PI / ELASTIC_PERIOD;
                2.0_f64.powf(-10.0 * v) * ((v - k) * j).sin() + 1.0
            }
            Self::Custom(f) => f(v),
        }
    }

    /// Interpolates from `start` by `range` after `dt` of a `t` long
    /// animation.
    ///
    /// `dt` is clamped to `[0, t]`. A `t` that is not positive yields
    /// `start + range`.
    #[must_use]
    pub fn apply_clamp(self, start: f64, range: f64, dt: f64, t: f64) -> f64 {
        if t > 0.0 {
            start + range * self.apply(dt.clamp(0.0, t) / t)
        } else {
            start + range
        }
    }
}

fn bounce_out(v: f64) -> f64 {
    if v < 1.0 / 2.75 {
        BOUNCE * v * v
    } else if v < 2.0 / 2.75 {
        let b = v - 1.5 / 2.75;
        BOUNCE * b * b + 0.75
    } else if v < 2.5 / 2.75 {
        let b = v - 2.25 / 2.75;
        BOUNCE * b * b + 0.9375
    } else {
        let b = v - 2.625 / 2.75;
        BOUNCE * b * b + 0.984_375
    }
}
