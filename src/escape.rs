// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time iteration.

use num::Complex;
use std::f64::consts::LN_2;

/// Where and how a point left the radius-2 disc.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Escape {
    /// The step at which |z|² was first seen above 4.
    pub iteration: usize,
    /// A continuous reinterpretation of `iteration`, used for coloring
    /// without banding.
    pub smoothed: f64,
}

/// Iterates z ← z² + c from z = 0 under a fixed budget.  Holds no
/// shared state, so one copy per worker (or one shared reference) is
/// equally fine.
#[derive(Copy, Clone, Debug)]
pub struct EscapeIterator {
    max_iterations: usize,
}

impl EscapeIterator {
    /// An iterator giving up after `max_iterations` steps.
    pub fn new(max_iterations: usize) -> EscapeIterator {
        EscapeIterator { max_iterations }
    }

    /// Returns `None` if `c` stays within the disc for the whole
    /// budget, otherwise the escape step and its smoothed count.
    pub fn iterate(&self, c: Complex<f64>) -> Option<Escape> {
        let (mut xp, mut yp) = (0.0_f64, 0.0_f64);
        for i in 0..self.max_iterations {
            let xp2 = xp * xp;
            let yp2 = yp * yp;
            if xp2 + yp2 > 4.0 {
                return Some(Escape {
                    iteration: i,
                    smoothed: smooth(i, xp2 + yp2),
                });
            }
            let next = xp2 - yp2 + c.re;
            yp = 2.0 * xp * yp + c.im;
            xp = next;
        }
        None
    }

    /// Convenience for callers that only care about membership.
    pub fn escapes(&self, c: Complex<f64>) -> bool {
        self.iterate(c).is_some()
    }
}

/// Normalized iteration count: i - log2(log2|z|) + 1.
fn smooth(iteration: usize, modulus_sqr: f64) -> f64 {
    let log_zn = modulus_sqr.ln() / 2.0;
    let nu = (log_zn / LN_2).ln() / LN_2;
    iteration as f64 - nu + 1.0
}
