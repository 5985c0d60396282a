// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Boundary tracing.
//!
//! The Mandelbrot set is connected, so a closed ring of pixels that are
//! all inside the set very likely encloses only more of the set.  The
//! tracer exploits that: for a large rectangle it evaluates only the
//! perimeter, and if not a single perimeter pixel escaped it paints the
//! whole interior black without iterating it.  Otherwise it peels off
//! the perimeter and hands the four quadrants of what is left back to
//! the scheduler.  Small rectangles are cheaper to brute-force than to
//! subdivide further.
//!
//! At pixel resolution the ring can miss thin escaping filaments that
//! cross it between two samples, which shows up as small black islands
//! that should have been colored.  `Fidelity` controls how far the
//! tracer trusts the ring.

use rand::Rng;
use std::fmt;
use std::str::FromStr;

use color::Palette;
use error::GridError;
use escape::EscapeIterator;
use grid::PixelGrid;
use planes::{Pixel, PlaneMapper};
use rect::Rect;

/// Rectangles whose right - left or bottom - top is below this are
/// brute-forced instead of traced.
pub const SMALL_SPAN: usize = 8;

/// How much the tracer trusts an all-black perimeter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Fidelity {
    /// Paint the interior black without looking at it.
    Trust,
    /// Probe this many random interior points first; any escape forces
    /// a subdivision.
    Sampled(usize),
    /// Never skip an interior.  Equivalent to brute force, only with
    /// the subdivision's scheduling.
    Exact,
}

impl Default for Fidelity {
    fn default() -> Fidelity {
        Fidelity::Trust
    }
}

impl fmt::Display for Fidelity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Fidelity::Trust => write!(f, "trust"),
            Fidelity::Sampled(n) => write!(f, "sampled:{}", n),
            Fidelity::Exact => write!(f, "exact"),
        }
    }
}

impl FromStr for Fidelity {
    type Err = String;

    fn from_str(s: &str) -> Result<Fidelity, String> {
        match s {
            "trust" => Ok(Fidelity::Trust),
            "exact" => Ok(Fidelity::Exact),
            _ if s.starts_with("sampled:") => match usize::from_str(&s["sampled:".len()..]) {
                Ok(n) if n > 0 => Ok(Fidelity::Sampled(n)),
                _ => Err(format!("Could not parse probe count in '{}'", s)),
            },
            _ => Err(format!(
                "Unknown fidelity '{}', expected trust, exact or sampled:N",
                s
            )),
        }
    }
}

/// What tracing one rectangle accomplished.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
    /// Pixels this rectangle accounts for, excluding its children.
    pub pixels: usize,
    /// Pixels run through the escape iterator.
    pub evaluated: usize,
    /// How many of those escaped.
    pub escaped: usize,
    /// The interior was painted black without evaluation.
    pub collapsed: bool,
    /// Quadrants still to be traced.
    pub children: Vec<Rect>,
}

/// Evaluates rectangles against one grid.  Cheap to share: every
/// worker traces through the same `&Tracer`.
pub struct Tracer<'a> {
    grid: &'a PixelGrid,
    palette: &'a Palette,
    plane: PlaneMapper,
    escape: EscapeIterator,
    fidelity: Fidelity,
}

impl<'a> Tracer<'a> {
    /// A tracer painting into `grid` with `palette`.
    pub fn new(
        grid: &'a PixelGrid,
        palette: &'a Palette,
        plane: PlaneMapper,
        escape: EscapeIterator,
        fidelity: Fidelity,
    ) -> Tracer<'a> {
        Tracer {
            grid,
            palette,
            plane,
            escape,
            fidelity,
        }
    }

    /// Evaluate and paint one pixel; true if it escaped.
    fn handle_pixel(&self, pixel: Pixel) -> Result<bool, GridError> {
        let c = self.plane.pixel_to_point(&pixel);
        match self.escape.iterate(c) {
            Some(escape) => {
                self.grid
                    .paint(pixel.0, pixel.1, self.palette.lookup(escape.smoothed))?;
                Ok(true)
            }
            None => {
                self.grid.paint(pixel.0, pixel.1, self.palette.black())?;
                Ok(false)
            }
        }
    }

    fn handle_pixels(&self, pixels: Vec<Pixel>) -> Result<(usize, usize), GridError> {
        let mut escaped = 0;
        let count = pixels.len();
        for pixel in pixels {
            if self.handle_pixel(pixel)? {
                escaped += 1;
            }
        }
        Ok((count, escaped))
    }

    /// Evaluate every pixel of `rect` with no tracing at all.
    pub fn brute_force(&self, rect: &Rect) -> Result<Outcome, GridError> {
        let (evaluated, escaped) = self.handle_pixels(rect.pixels())?;
        Ok(Outcome {
            pixels: evaluated,
            evaluated,
            escaped,
            ..Outcome::default()
        })
    }

    fn is_small(rect: &Rect) -> bool {
        rect.right - rect.left < SMALL_SPAN || rect.bottom - rect.top < SMALL_SPAN
    }

    /// Whether an interior ringed entirely by black may be skipped.
    fn trust_interior(&self, interior: &Rect) -> bool {
        match self.fidelity {
            Fidelity::Trust => true,
            Fidelity::Exact => false,
            Fidelity::Sampled(probes) => {
                let mut rng = rand::thread_rng();
                (0..probes).all(|_| {
                    let pixel = Pixel(
                        rng.gen_range(interior.left, interior.right + 1),
                        rng.gen_range(interior.top, interior.bottom + 1),
                    );
                    !self.escape.escapes(self.plane.pixel_to_point(&pixel))
                })
            }
        }
    }

    /// Trace one rectangle: paint what it owns and return the quadrants
    /// it leaves for later.  The pixels painted here and the pixels of
    /// the returned children never overlap and together make up `rect`.
    pub fn trace(&self, rect: &Rect) -> Result<Outcome, GridError> {
        if rect.is_empty() {
            return Ok(Outcome::default());
        }
        if rect.is_single() || Tracer::is_small(rect) {
            return self.brute_force(rect);
        }

        let (perimeter, escaped) = self.handle_pixels(rect.perimeter())?;
        let interior = rect.interior();

        if escaped == 0 && self.trust_interior(&interior) {
            trace!("black box at {}", rect);
            let filled = self.grid.fill(&interior, self.palette.black())?;
            return Ok(Outcome {
                pixels: perimeter + filled,
                evaluated: perimeter,
                escaped,
                collapsed: true,
                children: vec![],
            });
        }

        Ok(Outcome {
            pixels: perimeter,
            evaluated: perimeter,
            escaped,
            collapsed: false,
            children: interior.quarters(),
        })
    }
}
