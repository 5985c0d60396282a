// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The worker pool that drives the tracer.
//!
//! All workers pull from one shared queue, and any worker may pick up
//! the quadrants another one produced.  Each traced rectangle sends one
//! report down the completion channel; the driver keeps count of the
//! pixels accounted for and of the rectangles still outstanding, and
//! once nothing is outstanding it feeds every worker a `Work::Stop`.
//!
//! The queue has no fixed capacity, so a worker queueing quadrants never
//! blocks on its peers.  Its length is still bounded: queued rectangles
//! are disjoint and non-empty, so there are never more of them than
//! pixels in the image.

use crossbeam::channel::{self, Receiver, Sender};
use std::thread;

use error::{GridError, RenderError};
use rect::Rect;
use tracer::Tracer;

/// An item on the work queue.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Work {
    /// Trace this rectangle.
    Trace(Rect),
    /// The poison pill: the worker that receives it exits.
    Stop,
}

/// An item on the completion channel.
#[derive(Debug)]
pub enum Report {
    /// One rectangle was traced.
    Done {
        /// Pixels it accounted for, children excluded.
        pixels: usize,
        /// Pixels run through the escape iterator.
        evaluated: usize,
        /// How many of those escaped.
        escaped: usize,
        /// The interior was filled black unseen.
        collapsed: bool,
        /// Quadrants queued after this report.
        spawned: usize,
    },
    /// Tracing hit a grid error; the render is over.
    Failed(GridError),
    /// The worker with this id unwound.
    Panicked(usize),
}

/// Totals accumulated by the driver over a whole render.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Progress {
    /// Pixels accounted for; equals the image area on success.
    pub painted: usize,
    /// Pixels run through the escape iterator.
    pub evaluated: usize,
    /// Pixels that escaped.
    pub escaped: usize,
    /// Black boxes filled without evaluation.
    pub collapsed: usize,
    /// Rectangles traced.
    pub rectangles: usize,
}

/// Tells the driver when a worker unwinds, so it does not wait forever
/// for a report that will never come.
struct PanicGuard {
    id: usize,
    done: Sender<Report>,
}

impl Drop for PanicGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            let _ = self.done.send(Report::Panicked(self.id));
        }
    }
}

/// A fixed-size pool of tracing workers.
pub struct Scheduler {
    workers: usize,
}

impl Scheduler {
    /// A pool of `workers` threads, at least one.
    pub fn new(workers: usize) -> Scheduler {
        Scheduler {
            workers: workers.max(1),
        }
    }

    /// Size of the pool.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Trace `root` and everything it subdivides into, returning once
    /// every pixel of `root` has been accounted for.
    pub fn run(&self, tracer: &Tracer, root: Rect) -> Result<Progress, RenderError> {
        let expected = root.area();
        let (queue_tx, queue_rx) = channel::unbounded::<Work>();
        let (done_tx, done_rx) = channel::unbounded::<Report>();
        submit(&queue_tx, root);

        let workers = self.workers;
        let result = crossbeam::scope(|spawner| {
            for id in 0..workers {
                let queue_rx = queue_rx.clone();
                let queue_tx = queue_tx.clone();
                let done_tx = done_tx.clone();
                spawner.spawn(move |_| work(id, tracer, &queue_rx, &queue_tx, done_tx));
            }
            drop(done_tx);

            let progress = drain(&done_rx, expected);
            for _ in 0..workers {
                let _ = queue_tx.send(Work::Stop);
            }
            progress
        });

        match result {
            Ok(progress) => progress,
            Err(_) => Err(RenderError::WorkerPanic),
        }
    }
}

/// Enqueue a rectangle.  The queue is unbounded, so this never blocks;
/// it only fails once every worker is gone, and then there is nobody
/// left to care.
fn submit(queue: &Sender<Work>, rect: Rect) -> bool {
    queue.send(Work::Trace(rect)).is_ok()
}

fn work(
    id: usize,
    tracer: &Tracer,
    queue: &Receiver<Work>,
    submitter: &Sender<Work>,
    done: Sender<Report>,
) {
    debug!("worker {} started", id);
    let guard = PanicGuard { id, done };
    let mut traced = 0;
    for item in queue.iter() {
        let rect = match item {
            Work::Stop => break,
            Work::Trace(rect) => rect,
        };
        match tracer.trace(&rect) {
            Ok(outcome) => {
                traced += 1;
                // The report goes out before the children are queued, so
                // the driver always hears about a parent before any of
                // its children.
                let report = Report::Done {
                    pixels: outcome.pixels,
                    evaluated: outcome.evaluated,
                    escaped: outcome.escaped,
                    collapsed: outcome.collapsed,
                    spawned: outcome.children.len(),
                };
                if guard.done.send(report).is_err() {
                    break;
                }
                for child in outcome.children {
                    submit(submitter, child);
                }
            }
            Err(e) => {
                error!("worker {} failed on {}: {}", id, rect, e);
                let _ = guard.done.send(Report::Failed(e));
            }
        }
    }
    debug!("worker {} exiting after {} rectangles", id, traced);
}

/// Collect reports until no rectangle is outstanding.  Starts with one
/// outstanding (the root); each report retires its own rectangle and
/// adds the children it spawned.
fn drain(done: &Receiver<Report>, expected: usize) -> Result<Progress, RenderError> {
    let mut progress = Progress::default();
    let mut outstanding: usize = 1;
    while outstanding > 0 {
        match done.recv() {
            Ok(Report::Done {
                pixels,
                evaluated,
                escaped,
                collapsed,
                spawned,
            }) => {
                progress.painted += pixels;
                progress.evaluated += evaluated;
                progress.escaped += escaped;
                progress.rectangles += 1;
                if collapsed {
                    progress.collapsed += 1;
                }
                outstanding = outstanding + spawned - 1;
            }
            Ok(Report::Failed(e)) => return Err(RenderError::Grid(e)),
            Ok(Report::Panicked(id)) => {
                error!("worker {} panicked", id);
                return Err(RenderError::WorkerPanic);
            }
            Err(_) => return Err(RenderError::WorkerPanic),
        }
    }
    if progress.painted != expected {
        return Err(RenderError::Coverage {
            painted: progress.painted,
            expected,
        });
    }
    Ok(progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use color::Palette;
    use escape::EscapeIterator;
    use grid::PixelGrid;
    use num::Complex;
    use planes::PlaneMapper;
    use tracer::Fidelity;

    fn run(w: usize, h: usize, workers: usize, fidelity: Fidelity) -> (PixelGrid, Progress) {
        let grid = PixelGrid::new(w, h);
        let palette = Palette::default();
        let progress = {
            let plane = PlaneMapper::new(w, h, Complex::new(-0.5, 0.0), 3.0);
            let tracer = Tracer::new(&grid, &palette, plane, EscapeIterator::new(100), fidelity);
            Scheduler::new(workers).run(&tracer, Rect::image(w, h)).unwrap()
        };
        (grid, progress)
    }

    #[test]
    fn one_worker_covers_the_image() {
        let (grid, progress) = run(100, 100, 1, Fidelity::Trust);
        assert_eq!(progress.painted, 10_000);
        assert!(grid.is_complete());
    }

    #[test]
    fn many_workers_cover_the_image() {
        for &workers in &[2, 3, 8, 16] {
            let (grid, progress) = run(211, 157, workers, Fidelity::Trust);
            assert_eq!(progress.painted, 211 * 157);
            assert!(grid.is_complete());
            assert!(progress.evaluated <= progress.painted);
        }
    }

    #[test]
    fn tracing_skips_work_inside_the_set() {
        let (_, progress) = run(400, 400, 4, Fidelity::Trust);
        assert!(progress.collapsed > 0);
        assert!(progress.evaluated < 400 * 400);
        let (_, exact) = run(400, 400, 4, Fidelity::Exact);
        assert_eq!(exact.collapsed, 0);
        assert_eq!(exact.evaluated, 400 * 400);
    }

    #[test]
    fn tiny_images() {
        for &(w, h) in &[(1, 1), (1, 50), (50, 1), (8, 8), (9, 9)] {
            let (grid, progress) = run(w, h, 4, Fidelity::Trust);
            assert_eq!(progress.painted, w * h);
            assert!(grid.is_complete());
        }
    }

    #[test]
    fn a_conflict_stops_the_render() {
        let grid = PixelGrid::new(50, 50);
        let palette = Palette::default();
        grid.paint(25, 25, palette.black()).unwrap();
        let plane = PlaneMapper::new(50, 50, Complex::new(-0.5, 0.0), 3.0);
        let tracer = Tracer::new(&grid, &palette, plane, EscapeIterator::new(100), Fidelity::Exact);
        match Scheduler::new(4).run(&tracer, Rect::image(50, 50)) {
            Err(RenderError::Grid(GridError::Conflict { x: 25, y: 25 })) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn short_coverage_is_an_error() {
        let (tx, rx) = channel::unbounded();
        tx.send(Report::Done {
            pixels: 5,
            evaluated: 5,
            escaped: 2,
            collapsed: false,
            spawned: 0,
        })
        .unwrap();
        match drain(&rx, 10) {
            Err(RenderError::Coverage {
                painted: 5,
                expected: 10,
            }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn children_keep_the_driver_waiting() {
        let (tx, rx) = channel::unbounded();
        let done = |pixels, spawned| Report::Done {
            pixels,
            evaluated: pixels,
            escaped: 0,
            collapsed: false,
            spawned,
        };
        tx.send(done(4, 2)).unwrap();
        tx.send(done(3, 0)).unwrap();
        tx.send(done(3, 0)).unwrap();
        let progress = drain(&rx, 10).unwrap();
        assert_eq!(progress.painted, 10);
        assert_eq!(progress.rectangles, 3);
    }

    #[test]
    fn panicked_report_ends_the_render() {
        let (tx, rx) = channel::unbounded();
        tx.send(Report::Panicked(3)).unwrap();
        match drain(&rx, 10) {
            Err(RenderError::WorkerPanic) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn vanished_workers_end_the_render() {
        let (tx, rx) = channel::unbounded::<Report>();
        drop(tx);
        match drain(&rx, 10) {
            Err(RenderError::WorkerPanic) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn a_worker_panicking_mid_run_does_not_hang_the_driver() {
        let (done_tx, done_rx) = channel::unbounded();
        let mut drained = None;
        let scope = crossbeam::scope(|s| {
            s.spawn(move |_| {
                let _guard = PanicGuard { id: 7, done: done_tx };
                panic!("worker 7 fell over");
            });
            drained = Some(drain(&done_rx, 100));
        });
        assert!(scope.is_err());
        match drained {
            Some(Err(RenderError::WorkerPanic)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn a_poisoned_row_stops_the_render() {
        let grid = PixelGrid::new(50, 50);
        grid.poison_row(10);
        let palette = Palette::default();
        let plane = PlaneMapper::new(50, 50, Complex::new(-0.5, 0.0), 3.0);
        let tracer = Tracer::new(&grid, &palette, plane, EscapeIterator::new(100), Fidelity::Exact);
        match Scheduler::new(4).run(&tracer, Rect::image(50, 50)) {
            Err(RenderError::Grid(GridError::Poisoned(10))) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn stop_pills_end_idle_workers() {
        let (tx, rx) = channel::unbounded();
        let (done_tx, done_rx) = channel::unbounded();
        let grid = PixelGrid::new(1, 1);
        let palette = Palette::default();
        let plane = PlaneMapper::new(1, 1, Complex::new(0.0, 0.0), 1.0);
        let tracer = Tracer::new(&grid, &palette, plane, EscapeIterator::new(10), Fidelity::Trust);
        tx.send(Work::Stop).unwrap();
        work(0, &tracer, &rx, &tx, done_tx);
        assert!(done_rx.try_recv().is_err());
        assert_eq!(grid.unpainted(), 1);
    }
}
