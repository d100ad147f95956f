mod args;
mod tabs;

use clap::Parser;
use log::{debug, warn};
use snafu::ErrorCompat;

use crate::args::Args;
use crate::tabs::{run_tabs, Overrides};

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("main: args {:?}", args);

    let overrides = Overrides {
        input: args.input.clone(),
        input_type: args.input_type.clone(),
        batches: args.batches.clone(),
        exclude: args.exclude.clone(),
        confidence: args.confidence,
        out: args.out.clone(),
        flat_out: args.flat_out.clone(),
    };

    if let Err(e) = run_tabs(args.config.clone(), &overrides, args.reference.clone()) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(e.as_ref()) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
