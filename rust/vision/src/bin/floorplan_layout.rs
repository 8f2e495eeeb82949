// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: Detect walls, doors and windows in a 2D floor plan image
//!
//! Prints the layout as JSON on stdout; progress goes to stderr.
//!
//! Usage:
//!   floorplan-layout <image_path> [options]

use floorplan_lite_vision::{load_image, DetectionConfig, ImageSource, LayoutDetector};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let image_path = PathBuf::from(&args[1]);

    // Parse options
    let mut config_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;
    let mut pretty = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config_path = Some(PathBuf::from(option_value(&args, i, "--config")));
            }
            "--output" => {
                i += 1;
                output_path = Some(PathBuf::from(option_value(&args, i, "--output")));
            }
            "--seed" => {
                i += 1;
                let value = option_value(&args, i, "--seed");
                seed = Some(value.parse().unwrap_or_else(|_| {
                    fail(&format!("Invalid seed value: {}", value))
                }));
            }
            "--pretty" => {
                pretty = true;
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = match &config_path {
        Some(path) => DetectionConfig::from_json_file(path).unwrap_or_else(|e| fail(&e.to_string())),
        None => DetectionConfig::default(),
    };
    if let Some(seed) = seed {
        config.hough.seed = seed;
    }

    let detector = LayoutDetector::new(config).unwrap_or_else(|e| fail(&e.to_string()));

    tracing::info!(path = %image_path.display(), "Loading image");
    let image = load_image(&ImageSource::Path(image_path.clone())).unwrap_or_else(|e| {
        fail(&format!("Cannot load image '{}': {}", image_path.display(), e))
    });
    tracing::info!(width = image.width(), height = image.height(), "Image loaded");

    let layout = detector
        .detect(&image)
        .unwrap_or_else(|e| fail(&format!("Detection failed: {}", e)));

    if layout.used_fallback {
        tracing::warn!("No walls found; output contains the default 8m x 6m room");
    }

    let json = if pretty {
        layout.to_json_pretty()
    } else {
        layout.to_json()
    }
    .unwrap_or_else(|e| fail(&format!("JSON error: {}", e)));

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, json) {
                fail(&format!("Cannot write '{}': {}", path.display(), e));
            }
            tracing::info!(path = %path.display(), "Layout written");
        }
        None => println!("{}", json),
    }
}

fn option_value<'a>(args: &'a [String], i: usize, name: &str) -> &'a str {
    match args.get(i) {
        Some(value) => value.as_str(),
        None => fail(&format!("Missing value for {}", name)),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn print_usage() {
    println!(
        r#"Floor Plan Layout Detector
==========================

Detects walls, doors and windows in a 2D floor plan image and prints them as
JSON in meters on a 10m x 10m canvas.

USAGE:
  floorplan-layout <image_path> [OPTIONS]

ARGUMENTS:
  <image_path>              Path to floor plan image (PNG, JPEG, GIF, BMP)

OPTIONS:
  --config <path>           JSON file overriding detection parameters
  --output <path>           Write JSON to a file instead of stdout
  --seed <n>                Seed for the line detector's visiting order
  --pretty                  Pretty-print the JSON output
  -h, --help                Show this help message

ENVIRONMENT:
  RUST_LOG                  Log filter for stderr output (default: info)"#
    );
}
