//! saavy-poly - play the synth from the computer keyboard
//!
//! Run with: cargo run -- [patch.json]

mod app;
mod keyboard;
mod ui;

use std::{env, fs};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use saavy_poly::Patch;

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let patch = match env::args().nth(1) {
        Some(path) => {
            let json = fs::read_to_string(&path)
                .wrap_err_with(|| format!("failed to read patch file {path}"))?;
            Patch::from_json(&json).wrap_err_with(|| format!("failed to load patch {path}"))?
        }
        None => Patch::default(),
    };

    app::run(patch)
}
