// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate mandeltrace;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::{Error, ResultExt};
use std::str::FromStr;

use mandeltrace::{Color, Fidelity, Palette, RenderConfig};

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_color(s: &str) -> Option<Color> {
    let channels: Vec<f64> = s
        .split(',')
        .map(f64::from_str)
        .collect::<Result<Vec<f64>, _>>()
        .ok()?;
    match channels.as_slice() {
        [r, g, b] if channels.iter().all(|c| *c >= 0.0 && *c <= 1.0) => Some(Color::new(*r, *g, *b)),
        _ => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CENTER: &str = "center";
const SCALE: &str = "scale";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const FIDELITY: &str = "fidelity";
const EXHAUSTIVE: &str = "exhaustive";
const BACKGROUND: &str = "background";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandeltrace")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Boundary-tracing Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(false)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("out.png")
                .help("Output file; the extension picks the image format"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("2000x1200")
                .validator(|s| match parse_pair::<u16>(&s, 'x') {
                    Some((w, h)) if w > 0 && h > 0 => Ok(()),
                    _ => Err("Could not parse output image size".to_string()),
                })
                .help("Size of output image, WIDTHxHEIGHT"),
        )
        .arg(
            Arg::with_name(CENTER)
                .required(false)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.745,0.149")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse image center"))
                .help("Point of the complex plane at the center of the image, RE,IM"),
        )
        .arg(
            Arg::with_name(SCALE)
                .required(false)
                .long(SCALE)
                .short("z")
                .takes_value(true)
                .default_value("0.03")
                .validator(|s| {
                    validate_range(
                        &s,
                        ::std::f64::MIN_POSITIVE,
                        ::std::f64::MAX,
                        "Could not parse scale",
                        "Scale must be positive",
                    )
                })
                .help("Width of the view window on the real axis"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of worker threads (default: one per CPU)"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("3000")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        10_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 10000000",
                    )
                })
                .help("Maximum number of iterations per point"),
        )
        .arg(
            Arg::with_name(FIDELITY)
                .required(false)
                .long(FIDELITY)
                .short("f")
                .takes_value(true)
                .default_value("trust")
                .validator(|s| Fidelity::from_str(&s).map(|_| ()))
                .help("How far to trust a black perimeter: trust, exact or sampled:N"),
        )
        .arg(
            Arg::with_name(EXHAUSTIVE)
                .long(EXHAUSTIVE)
                .help("Iterate every pixel instead of tracing boundaries"),
        )
        .arg(
            Arg::with_name(BACKGROUND)
                .required(false)
                .long(BACKGROUND)
                .takes_value(true)
                .default_value("0,0.3,0")
                .validator(|s| match parse_color(&s) {
                    Some(_) => Ok(()),
                    None => Err("Background must be three channels in [0, 1], R,G,B".to_string()),
                })
                .help("Color for any pixel left unpainted"),
        )
        .get_matches()
}

fn config(matches: &ArgMatches) -> Result<RenderConfig, Error> {
    let value = |name: &str| matches.value_of(name).unwrap_or_default().to_string();
    let (width, height) =
        parse_pair::<u16>(&value(SIZE), 'x').ok_or_else(|| format_err!("Error parsing image dimensions"))?;
    let (center_real, center_imag) =
        parse_pair::<f64>(&value(CENTER), ',').ok_or_else(|| format_err!("Error parsing image center"))?;
    Ok(RenderConfig {
        width: width as usize,
        height: height as usize,
        max_iterations: usize::from_str(&value(ITERATIONS)).context("Could not parse iteration count")?,
        center_real,
        center_imag,
        scale: f64::from_str(&value(SCALE)).context("Could not parse scale")?,
        fidelity: Fidelity::from_str(&value(FIDELITY)).map_err(|e| format_err!("{}", e))?,
        threads: match matches.value_of(THREADS) {
            Some(t) => usize::from_str(t).context("Could not parse thread count")?,
            None => num_cpus::get(),
        },
    })
}

fn run() -> Result<(), Error> {
    let matches = args();
    let config = config(&matches)?;
    let background = matches
        .value_of(BACKGROUND)
        .and_then(parse_color)
        .ok_or_else(|| format_err!("Error parsing background color"))?;
    let output = matches.value_of(OUTPUT).unwrap_or("out.png").to_string();
    let palette = Palette::default();

    let render = if matches.is_present(EXHAUSTIVE) {
        mandeltrace::render_exhaustive(&config, &palette)?
    } else {
        mandeltrace::render(&config, &palette)?
    };
    info!(
        "rendered in {}.{:03}s",
        render.stats.elapsed.as_secs(),
        render.stats.elapsed.subsec_millis()
    );

    let unpainted = render.grid.unpainted();
    if unpainted > 0 {
        warn!("{} pixels were never painted", unpainted);
    }

    info!("saving {}", output);
    render
        .grid
        .to_image(background)
        .save(&output)
        .with_context(|_| format!("Could not write {}", output))?;
    Ok(())
}

fn main() {
    mandeltrace::init_logging();
    if let Err(e) = run() {
        error!("{}", e);
        for cause in e.iter_causes() {
            error!("caused by: {}", cause);
        }
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
