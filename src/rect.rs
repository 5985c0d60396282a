// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rectangular work units and the geometry of subdividing them.

use itertools::iproduct;
use std::fmt;

use planes::Pixel;

/// A rectangle of pixels with inclusive bounds.  A rectangle whose left
/// is past its right (or top past its bottom) is empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    /// First column.
    pub left: usize,
    /// First row.
    pub top: usize,
    /// Last column.
    pub right: usize,
    /// Last row.
    pub bottom: usize,
}

impl Rect {
    /// A rectangle from its inclusive bounds.
    pub fn new(left: usize, top: usize, right: usize, bottom: usize) -> Rect {
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The rectangle covering an entire `width` x `height` image.
    pub fn image(width: usize, height: usize) -> Rect {
        if width == 0 || height == 0 {
            return Rect::new(1, 1, 0, 0);
        }
        Rect::new(0, 0, width - 1, height - 1)
    }

    /// True if the rectangle holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    /// True for a 1x1 rectangle.
    pub fn is_single(&self) -> bool {
        self.left == self.right && self.top == self.bottom
    }

    /// Number of columns; zero when empty.
    pub fn width(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.right - self.left + 1
        }
    }

    /// Number of rows; zero when empty.
    pub fn height(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.bottom - self.top + 1
        }
    }

    /// Number of pixels.
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// True if `pixel` lies within the bounds.
    pub fn contains(&self, pixel: &Pixel) -> bool {
        pixel.0 >= self.left && pixel.0 <= self.right && pixel.1 >= self.top && pixel.1 <= self.bottom
    }

    /// Every pixel, row by row.
    pub fn pixels(&self) -> Vec<Pixel> {
        if self.is_empty() {
            return vec![];
        }
        iproduct!(self.top..=self.bottom, self.left..=self.right)
            .map(|(y, x)| Pixel(x, y))
            .collect()
    }

    /// The outer ring of pixels: the top row, the bottom row, then the
    /// left and right columns without the corners already visited.
    /// Each pixel appears exactly once, even for rectangles one pixel
    /// thin.
    pub fn perimeter(&self) -> Vec<Pixel> {
        let mut ring = vec![];
        if self.is_empty() {
            return ring;
        }
        for x in self.left..=self.right {
            ring.push(Pixel(x, self.top));
        }
        if self.bottom > self.top {
            for x in self.left..=self.right {
                ring.push(Pixel(x, self.bottom));
            }
        }
        for y in self.top + 1..self.bottom {
            ring.push(Pixel(self.left, y));
        }
        if self.right > self.left {
            for y in self.top + 1..self.bottom {
                ring.push(Pixel(self.right, y));
            }
        }
        ring
    }

    /// The rectangle left after peeling off the perimeter.  Empty when
    /// the rectangle is two pixels or fewer across in either direction.
    pub fn interior(&self) -> Rect {
        if self.width() < 3 || self.height() < 3 {
            return Rect::new(1, 1, 0, 0);
        }
        Rect::new(self.left + 1, self.top + 1, self.right - 1, self.bottom - 1)
    }

    /// Split at the horizontal and vertical midpoints into up to four
    /// quadrants, which never overlap and together cover `self`.  Empty
    /// quadrants are dropped.
    pub fn quarters(&self) -> Vec<Rect> {
        if self.is_empty() {
            return vec![];
        }
        let xm = self.left + (self.right - self.left) / 2;
        let ym = self.top + (self.bottom - self.top) / 2;
        vec![
            Rect::new(self.left, self.top, xm, ym),
            Rect::new(xm + 1, self.top, self.right, ym),
            Rect::new(self.left, ym + 1, xm, self.bottom),
            Rect::new(xm + 1, ym + 1, self.right, self.bottom),
        ]
        .into_iter()
        .filter(|r| !r.is_empty())
        .collect()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "({}, {})-({}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}
