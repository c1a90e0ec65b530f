// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quire — capture pipeline driver.
//
// Entry point. Initialises logging, parses arguments, and dispatches to the
// subcommands.

mod cli;
mod detect_cmd;
mod scan_cmd;

use clap::Parser;
use cli::Cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        cli::Commands::Scan {
            ref images,
            ref out,
            filter,
            paper,
            ref title,
            no_autodetect,
        } => scan_cmd::run(images, out, filter, paper, title.as_deref(), no_autodetect),
        cli::Commands::Detect { ref image } => detect_cmd::run(image),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
