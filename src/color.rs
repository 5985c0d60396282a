// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colors and the escape-time palette.
//!
//! A palette is an ordered ring of anchor colors.  The smoothed
//! iteration count of an escaping point is taken on a natural log
//! scale, and the integer part of that logarithm picks two adjacent
//! anchors while the fractional part blends between them.  Because
//! the index wraps around the ring, deep zooms with huge iteration
//! counts cycle back through the hues rather than saturating on the
//! last one.

use failure::Fail;
use image::Rgb;

/// An RGB color with each channel nominally in [0, 1].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
}

impl Color {
    /// Build a color from its three channels.
    pub const fn new(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// Linear interpolation toward `other`; a `fraction` of 0 is
    /// `self` and 1 is `other`.
    pub fn smooth(&self, other: Color, fraction: f64) -> Color {
        Color {
            r: self.r + fraction * (other.r - self.r),
            g: self.g + fraction * (other.g - self.g),
            b: self.b + fraction * (other.b - self.b),
        }
    }

    /// Quantize to an 8-bit pixel, clamping out-of-range channels.
    pub fn to_rgb8(&self) -> Rgb<u8> {
        fn channel(v: f64) -> u8 {
            let v = if v.is_nan() { 0.0 } else { v };
            (num::clamp(v, 0.0, 1.0) * 255.0).round() as u8
        }
        Rgb([channel(self.r), channel(self.g), channel(self.b)])
    }
}

/// The anchor ring used when the caller does not supply one.
pub const DEFAULT_ANCHORS: [Color; 17] = [
    Color::new(0.80, 0.05, 0.05),    // red
    Color::new(0.20, 0.50, 0.10),    // lime
    Color::new(0.40, 0.40, 0.45),    // slate
    Color::new(0.80, 0.90, 0.10),    // gold
    Color::new(0.17, 0.04, 0.30),    // violet
    Color::new(0.02, 0.25, 0.01),    // grass
    Color::new(0.95, 0.97, 0.96),    // cream
    Color::new(0.70, 1.00, 0.00),    // chartreuse
    Color::new(0.22, 0.63, 0.30),    // dark chartreuse
    Color::new(0.50, 0.00, 0.13),    // burgundy
    Color::new(0.968, 0.913, 0.556), // flavescent yellow
    Color::new(0.50, 0.70, 1.00),    // sky
    Color::new(0.074, 0.533, 0.031), // india green
    Color::new(0.513, 0.411, 0.325), // pastel brown
    Color::new(0.854, 0.196, 0.529), // deep cerise pink
    Color::new(0.40, 0.00, 0.00),    // deep red
    Color::new(1.00, 1.00, 1.00),    // white
];

/// The default color for points inside the set.
pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

/// Raised when a palette is built without anchors.
#[derive(Debug, Fail, PartialEq)]
pub enum PaletteError {
    /// No anchor colors were given.
    #[fail(display = "a palette needs at least one anchor color")]
    Empty,
}

/// An immutable anchor ring plus the color used for points inside the
/// set.  Built once per render and shared by reference with every
/// worker.
#[derive(Clone, Debug)]
pub struct Palette {
    anchors: Vec<Color>,
    black: Color,
}

impl Palette {
    /// A palette cycling through `anchors`, with `black` for the
    /// inside of the set.
    pub fn new(anchors: Vec<Color>, black: Color) -> Result<Palette, PaletteError> {
        if anchors.is_empty() {
            return Err(PaletteError::Empty);
        }
        Ok(Palette { anchors, black })
    }

    /// Map a smoothed iteration count to a color.  Counts below one
    /// (and NaN) are treated as exactly one so the lookup is total.
    pub fn lookup(&self, smoothed: f64) -> Color {
        let smoothed = if smoothed.is_nan() || smoothed < 1.0 {
            1.0
        } else {
            smoothed
        };
        let pos = smoothed.ln();
        let floor = pos.floor();
        let count = self.anchors.len();
        let base = (floor as usize) % count;
        let next = (base + 1) % count;
        self.anchors[base].smooth(self.anchors[next], pos - floor)
    }

    /// The color of points that never escape.
    pub fn black(&self) -> Color {
        self.black
    }
}

impl Default for Palette {
    fn default() -> Palette {
        Palette {
            anchors: DEFAULT_ANCHORS.to_vec(),
            black: BLACK,
        }
    }
}
