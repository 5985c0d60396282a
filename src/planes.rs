// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0 in
//! the upper left, and a window on the complex plane described by its
//! center and its width.
use num::Complex;

/// Describes the width and height of an integral plane that is assumed
/// to start at 0,0 and all values are assumed to be non-negative
/// integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the column, row of a point on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Maps pixels of the output image onto the complex plane.  The window
/// is `scale` wide on the real axis and `aspect * scale` tall on the
/// imaginary axis, so pixels stay square; row 0 is the top of the
/// window, which is the largest imaginary value.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    /// The size of the image.
    pub integral_plane: IntegralPlane,
    /// The point of the complex plane at the center of the image.
    pub center: Complex<f64>,
    /// The width of the window on the real axis.
    pub scale: f64,
    aspect: f64,
}

impl PlaneMapper {
    /// The caller is responsible for a non-empty plane and a positive
    /// scale; see `RenderConfig::validate`.
    pub fn new(width: usize, height: usize, center: Complex<f64>, scale: f64) -> PlaneMapper {
        PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            center,
            scale,
            aspect: height as f64 / width as f64,
        }
    }

    /// Height over width of the image.
    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// True if the plane has no points.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Given a pixel on the integral plane, return the point of the
    /// complex plane it samples.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let IntegralPlane(width, height) = self.integral_plane;
        Complex::new(
            self.center.re + self.scale * (pixel.0 as f64 / width as f64 - 0.5),
            self.center.im - self.aspect * self.scale * (pixel.1 as f64 / height as f64 - 0.5),
        )
    }
}
