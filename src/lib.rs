#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Boundary-tracing Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points c on the complex plane for
//! which repeatedly squaring z and adding c, starting from zero, never
//! carries z further than 2 from the origin.  Points outside the set
//! are colored by how quickly they escape; points inside are black.
//!
//! Most of the cost of a Mandelbrot image is the black: every point
//! inside the set runs the full iteration budget.  Because the set is
//! connected, a rectangle whose border lies entirely inside it almost
//! always has an interior that does too.  This renderer traces the
//! border of the whole image, and either fills a black-bordered
//! rectangle without looking inside, or peels off the border and
//! splits the rest into quarters, which go onto a queue shared by a
//! pool of worker threads.  Small rectangles are simply brute-forced.

extern crate crossbeam;
extern crate env_logger;
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;
extern crate rand;

use std::ops::Range;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub mod color;
pub mod config;
pub mod error;
pub mod escape;
pub mod grid;
pub mod planes;
pub mod rect;
pub mod scheduler;
pub mod tracer;

pub use color::{Color, Palette};
pub use config::RenderConfig;
pub use error::{ConfigError, GridError, RenderError};
pub use escape::{Escape, EscapeIterator};
pub use grid::PixelGrid;
pub use planes::{Pixel, PlaneMapper};
pub use rect::Rect;
pub use scheduler::{Progress, Scheduler};
pub use tracer::{Fidelity, Tracer};

/// What a render did, for logging and for comparing strategies.
#[derive(Copy, Clone, Debug)]
pub struct RenderStats {
    /// Pixels in the image.
    pub pixels: usize,
    /// Pixels run through the escape iterator.
    pub evaluated: usize,
    /// Pixels that escaped.
    pub escaped: usize,
    /// Black boxes filled without evaluation.
    pub collapsed: usize,
    /// Rectangles traced; zero for an exhaustive render.
    pub rectangles: usize,
    /// Worker threads the render ran on.
    pub workers: usize,
    /// Wall-clock time from validation to a complete grid.
    pub elapsed: Duration,
}

impl RenderStats {
    /// The share of the image that was actually iterated.
    pub fn evaluated_ratio(&self) -> f64 {
        if self.pixels == 0 {
            return 0.0;
        }
        self.evaluated as f64 / self.pixels as f64
    }
}

/// A finished render: a fully painted grid plus what it cost.
pub struct Render {
    /// The painted image.
    pub grid: PixelGrid,
    /// What painting it cost.
    pub stats: RenderStats,
}

/// Render the configured view with boundary tracing on a pool of
/// `config.threads` workers.
pub fn render(config: &RenderConfig, palette: &Palette) -> Result<Render, RenderError> {
    config.validate()?;
    info!(
        "tracing {}x{} at {}{:+}i, scale {}, {} iterations, {} fidelity, {} workers",
        config.width,
        config.height,
        config.center_real,
        config.center_imag,
        config.scale,
        config.max_iterations,
        config.fidelity,
        config.threads
    );
    let start = Instant::now();
    let grid = PixelGrid::new(config.width, config.height);
    let scheduler = Scheduler::new(config.threads);
    let progress = {
        let tracer = Tracer::new(
            &grid,
            palette,
            config.plane(),
            EscapeIterator::new(config.max_iterations),
            config.fidelity,
        );
        scheduler.run(&tracer, Rect::image(config.width, config.height))?
    };
    let stats = RenderStats {
        pixels: config.pixels(),
        evaluated: progress.evaluated,
        escaped: progress.escaped,
        collapsed: progress.collapsed,
        rectangles: progress.rectangles,
        workers: scheduler.workers(),
        elapsed: start.elapsed(),
    };
    info!(
        "traced {} rectangles, {} black boxes, evaluated {} of {} pixels ({:.1}%)",
        stats.rectangles,
        stats.collapsed,
        stats.evaluated,
        stats.pixels,
        100.0 * stats.evaluated_ratio()
    );
    Ok(Render { grid, stats })
}

type Rows = Arc<Mutex<Range<usize>>>;

/// Render the configured view by iterating every pixel, row by row
/// across `config.threads` workers.  The reference the traced render is
/// measured against; the fidelity setting is ignored.
pub fn render_exhaustive(config: &RenderConfig, palette: &Palette) -> Result<Render, RenderError> {
    config.validate()?;
    info!(
        "brute-forcing {}x{} with {} workers",
        config.width, config.height, config.threads
    );
    let start = Instant::now();
    let grid = PixelGrid::new(config.width, config.height);
    let escaped = {
        let tracer = Tracer::new(
            &grid,
            palette,
            config.plane(),
            EscapeIterator::new(config.max_iterations),
            Fidelity::Exact,
        );
        let tracer = &tracer;
        let rows: Rows = Arc::new(Mutex::new(0..config.height));
        let width = config.width;
        let result = crossbeam::scope(|spawner| {
            let handles: Vec<_> = (0..config.threads)
                .map(|_| {
                    let rows = rows.clone();
                    spawner.spawn(move |_| -> Result<usize, RenderError> {
                        let mut escaped = 0;
                        loop {
                            let row = {
                                rows.lock()
                                    .map_err(|_| RenderError::WorkerPanic)?
                                    .next()
                            };
                            match row {
                                Some(y) => {
                                    let line = Rect::new(0, y, width - 1, y);
                                    escaped += tracer.brute_force(&line)?.escaped;
                                }
                                None => return Ok(escaped),
                            }
                        }
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or(Err(RenderError::WorkerPanic)))
                .collect::<Result<Vec<usize>, RenderError>>()
        });
        match result {
            Ok(counts) => counts?.into_iter().sum::<usize>(),
            Err(_) => return Err(RenderError::WorkerPanic),
        }
    };
    let stats = RenderStats {
        pixels: config.pixels(),
        evaluated: config.pixels(),
        escaped,
        collapsed: 0,
        rectangles: 0,
        workers: config.threads,
        elapsed: start.elapsed(),
    };
    info!("evaluated all {} pixels", stats.pixels);
    Ok(Render { grid, stats })
}

/// Initialize `env_logger` for a binary, defaulting to `info`.  Safe to
/// call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> RenderConfig {
        RenderConfig {
            width: 100,
            height: 100,
            max_iterations: 100,
            center_real: -0.5,
            center_imag: 0.0,
            scale: 3.0,
            fidelity: Fidelity::Trust,
            threads: 4,
        }
    }

    #[test]
    fn end_to_end_scenario() {
        let config = scenario();
        let palette = Palette::default();
        let render = render(&config, &palette).unwrap();
        assert!(render.grid.is_complete());
        assert_eq!(render.stats.pixels, 10_000);
        assert_eq!(render.stats.workers, 4);

        let plane = config.plane();
        let it = EscapeIterator::new(config.max_iterations);
        assert_eq!(it.iterate(plane.pixel_to_point(&Pixel(50, 50))), None);
        assert_eq!(render.grid.get(50, 50), Some(palette.black()));
        let corner = it.iterate(plane.pixel_to_point(&Pixel(0, 0))).unwrap();
        assert!(corner.iteration <= 2);
        assert_ne!(render.grid.get(0, 0), Some(palette.black()));
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = scenario();
        config.width = 0;
        match render(&config, &Palette::default()) {
            Err(RenderError::Config(ConfigError::Width)) => (),
            other => panic!("unexpected {:?}", other.map(|r| r.stats)),
        }
    }

    #[test]
    fn exact_render_matches_exhaustive_render() {
        let mut config = scenario();
        config.width = 120;
        config.height = 80;
        config.fidelity = Fidelity::Exact;
        let palette = Palette::default();
        let traced = render(&config, &palette).unwrap();
        let brute = render_exhaustive(&config, &palette).unwrap();
        assert_eq!(traced.stats.evaluated, brute.stats.evaluated);
        assert_eq!(traced.stats.escaped, brute.stats.escaped);
        for y in 0..80 {
            for x in 0..120 {
                assert_eq!(traced.grid.get(x, y), brute.grid.get(x, y));
            }
        }
    }

    /// Black-box equivalence is a heuristic: count the pixels the
    /// shortcut painted black that actually escape, on views where the
    /// answer is known.
    fn black_box_misses(config: &RenderConfig) -> usize {
        let palette = Palette::default();
        let traced = render(config, &palette).unwrap();
        let brute = render_exhaustive(config, &palette).unwrap();
        let mut misses = 0;
        for y in 0..config.height {
            for x in 0..config.width {
                if traced.grid.get(x, y) != brute.grid.get(x, y) {
                    assert_eq!(traced.grid.get(x, y), Some(palette.black()));
                    misses += 1;
                }
            }
        }
        misses
    }

    #[test]
    fn black_boxes_hold_on_the_full_view() {
        let mut config = scenario();
        config.width = 300;
        config.height = 200;
        let misses = black_box_misses(&config);
        assert!(misses * 100 <= config.pixels(), "{} misses", misses);
        config.fidelity = Fidelity::Exact;
        assert_eq!(black_box_misses(&config), 0);
    }

    #[test]
    fn black_boxes_are_rarely_wrong_in_seahorse_valley() {
        let config = RenderConfig {
            width: 240,
            height: 160,
            max_iterations: 500,
            center_real: -0.745,
            center_imag: 0.149,
            scale: 0.03,
            fidelity: Fidelity::Trust,
            threads: 4,
        };
        let misses = black_box_misses(&config);
        assert!(misses * 20 <= config.pixels(), "{} misses", misses);
    }
}
