// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors raised by configuration, the pixel grid and the render driver.

pub use color::PaletteError;
use failure::Fail;

/// A rejected render configuration.
#[derive(Debug, Fail, PartialEq)]
pub enum ConfigError {
    /// The image has no columns.
    #[fail(display = "image width must be positive")]
    Width,
    /// The image has no rows.
    #[fail(display = "image height must be positive")]
    Height,
    /// The iteration budget is zero.
    #[fail(display = "iteration count must be positive")]
    Iterations,
    /// The window width is zero, negative or not finite.
    #[fail(display = "scale must be a positive, finite number, not {}", _0)]
    Scale(f64),
    /// The window center is not a finite point.
    #[fail(display = "center must be a finite point")]
    Center,
    /// No worker threads were requested.
    #[fail(display = "at least one worker thread is required")]
    Threads,
    /// `Fidelity::Sampled` with zero probes.
    #[fail(display = "sampled fidelity needs at least one probe")]
    Probes,
}

/// A failed write to the pixel grid.
#[derive(Debug, Fail, PartialEq)]
pub enum GridError {
    /// A cell that was already painted was painted again.
    #[fail(display = "pixel ({}, {}) was painted twice", x, y)]
    Conflict {
        /// Column of the cell.
        x: usize,
        /// Row of the cell.
        y: usize,
    },
    /// A write landed outside the grid.
    #[fail(display = "pixel ({}, {}) is outside the {}x{} grid", x, y, width, height)]
    OutOfBounds {
        /// Column written.
        x: usize,
        /// Row written.
        y: usize,
        /// Width of the grid.
        width: usize,
        /// Height of the grid.
        height: usize,
    },
    /// The lock of this row was poisoned by a panicking writer.
    #[fail(display = "a worker panicked while holding row {}", _0)]
    Poisoned(usize),
}

/// Anything that stops a render from producing a complete grid.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// The configuration was rejected before any work started.
    #[fail(display = "invalid configuration: {}", _0)]
    Config(#[cause] ConfigError),
    /// A worker failed to write the grid.
    #[fail(display = "{}", _0)]
    Grid(#[cause] GridError),
    /// Every rectangle was traced, yet the pixel total is off.  Means
    /// the subdivision lost or duplicated pixels.
    #[fail(
        display = "subdivision accounted for {} pixels, expected {}",
        painted, expected
    )]
    Coverage {
        /// Pixels the reports accounted for.
        painted: usize,
        /// Pixels in the image.
        expected: usize,
    },
    /// A worker thread unwound before finishing.
    #[fail(display = "a render worker panicked")]
    WorkerPanic,
}

impl From<ConfigError> for RenderError {
    fn from(e: ConfigError) -> RenderError {
        RenderError::Config(e)
    }
}

impl From<GridError> for RenderError {
    fn from(e: GridError) -> RenderError {
        RenderError::Grid(e)
    }
}
