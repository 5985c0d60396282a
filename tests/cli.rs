// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate assert_cmd;
extern crate image;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use image::GenericImageView;
use predicates::prelude::*;
use std::process::Command;

fn mandeltrace() -> Command {
    Command::cargo_bin("mandeltrace").unwrap()
}

#[test]
fn renders_a_small_png() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("small.png");
    mandeltrace()
        .args(&["--size", "64x48", "--iterations", "200", "--center", "-0.5,0", "--scale", "3"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    let img = image::open(&out).unwrap();
    assert_eq!(img.dimensions(), (64, 48));
}

#[test]
fn center_of_the_full_view_is_black() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("full.png");
    mandeltrace()
        .args(&["-s", "100x100", "-i", "100", "-c", "-0.5,0", "-z", "3.0", "-t", "1"])
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    let img = image::open(&out).unwrap().to_rgb();
    assert_eq!(img.get_pixel(50, 50).0, [0, 0, 0]);
    assert_ne!(img.get_pixel(0, 0).0, [0, 0, 0]);
}

#[test]
fn exhaustive_and_exact_agree() {
    let dir = tempfile::tempdir().unwrap();
    let traced = dir.path().join("traced.png");
    let brute = dir.path().join("brute.png");
    let view = ["-s", "80x60", "-i", "150", "-c", "-0.75,0.1", "-z", "0.6"];
    mandeltrace()
        .args(&view)
        .args(&["--fidelity", "exact", "-o"])
        .arg(&traced)
        .assert()
        .success();
    mandeltrace()
        .args(&view)
        .arg("--exhaustive")
        .arg("-o")
        .arg(&brute)
        .assert()
        .success();
    let traced = image::open(&traced).unwrap().to_rgb();
    let brute = image::open(&brute).unwrap().to_rgb();
    assert!(traced.pixels().eq(brute.pixels()));
}

#[test]
fn sampled_fidelity_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("sampled.png");
    mandeltrace()
        .args(&["-s", "40x40", "-i", "100", "-c", "-0.5,0", "-z", "3", "-f", "sampled:4"])
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    assert!(out.exists());
}

#[test]
fn rejects_a_zero_size() {
    mandeltrace()
        .args(&["--size", "0x10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse output image size"));
}

#[test]
fn rejects_an_unknown_fidelity() {
    mandeltrace()
        .args(&["--fidelity", "lucky"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown fidelity"));
}

#[test]
fn reports_an_unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("missing").join("out.png");
    mandeltrace()
        .args(&["-s", "16x16", "-i", "20", "-c", "-0.5,0", "-z", "3"])
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render failure: Could not write"));
}
