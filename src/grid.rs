// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The write-once raster shared by every render worker.
//!
//! Cells start unpainted and may be painted exactly once.  The
//! subdivision hands every pixel to exactly one rectangle, so workers
//! never contend for the same cell; the per-row lock only makes the
//! "is it still unpainted?" check atomic, so that a bug in the
//! partitioning surfaces as a `GridError::Conflict` instead of a
//! silently overwritten pixel.

use image::{ImageBuffer, RgbImage};
use std::sync::Mutex;

use color::Color;
use error::GridError;
use rect::Rect;

/// A `width` x `height` raster of optional colors, one lock per row.
pub struct PixelGrid {
    width: usize,
    height: usize,
    rows: Vec<Mutex<Vec<Option<Color>>>>,
}

impl PixelGrid {
    /// A grid with every cell unpainted.
    pub fn new(width: usize, height: usize) -> PixelGrid {
        PixelGrid {
            width,
            height,
            rows: (0..height).map(|_| Mutex::new(vec![None; width])).collect(),
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// True if the grid has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self, x: usize, y: usize) -> Result<(), GridError> {
        if x >= self.width || y >= self.height {
            return Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Store `color` at (x, y) if nothing has been stored there yet.
    pub fn paint(&self, x: usize, y: usize, color: Color) -> Result<(), GridError> {
        self.check(x, y)?;
        let mut row = self.rows[y].lock().map_err(|_| GridError::Poisoned(y))?;
        if row[x].is_some() {
            return Err(GridError::Conflict { x, y });
        }
        row[x] = Some(color);
        Ok(())
    }

    /// Paint every cell of `rect` with one color, taking each row lock
    /// once.  Returns the number of cells painted.
    pub fn fill(&self, rect: &Rect, color: Color) -> Result<usize, GridError> {
        if rect.is_empty() {
            return Ok(0);
        }
        self.check(rect.right, rect.bottom)?;
        for y in rect.top..=rect.bottom {
            let mut row = self.rows[y].lock().map_err(|_| GridError::Poisoned(y))?;
            for x in rect.left..=rect.right {
                if row[x].is_some() {
                    return Err(GridError::Conflict { x, y });
                }
                row[x] = Some(color);
            }
        }
        Ok(rect.area())
    }

    /// The stored color, or `None` for a cell never painted.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        match self.rows[y].lock() {
            Ok(row) => row[x],
            Err(poisoned) => poisoned.into_inner()[x],
        }
    }

    /// The stored color, falling back to `background` for cells that
    /// were never painted.
    pub fn read(&self, x: usize, y: usize, background: Color) -> Color {
        self.get(x, y).unwrap_or(background)
    }

    /// How many cells are still unpainted.
    pub fn unpainted(&self) -> usize {
        self.rows
            .iter()
            .map(|row| match row.lock() {
                Ok(row) => row.iter().filter(|c| c.is_none()).count(),
                Err(poisoned) => poisoned.into_inner().iter().filter(|c| c.is_none()).count(),
            })
            .sum()
    }

    /// True once every cell has been painted.
    pub fn is_complete(&self) -> bool {
        self.unpainted() == 0
    }

    /// Quantize the grid into an 8-bit RGB image, pixel (0, 0) at the
    /// top left.
    pub fn to_image(&self, background: Color) -> RgbImage {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            self.read(x as usize, y as usize, background).to_rgb8()
        })
    }
}

#[cfg(test)]
impl PixelGrid {
    /// Poison the lock of row `y`, as a writer panicking mid-row would.
    pub fn poison_row(&self, y: usize) {
        let row = &self.rows[y];
        let _ = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| {
            let _held = row.lock();
            panic!("writer of row {} fell over", y);
        }));
    }
}
