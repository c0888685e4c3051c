//! Paideia CLI binary.

use clap::Parser;
use log::LevelFilter;
use paideia::cli::{args::*, commands::*};
use std::process;

fn main() {
    let args = PaideiaArgs::parse();

    let level = match args.verbosity() {
        0 => LevelFilter::Error,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
