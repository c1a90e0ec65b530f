// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use quire_core::types::{FilterMode, PaperSize};

/// Scan images into a perspective-corrected, filtered PDF.
#[derive(Debug, Parser)]
#[command(name = "quire", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run images through the full capture pipeline and assemble a PDF
    Scan {
        /// Input images, one page each, in order
        #[arg(value_name = "IMAGES", required = true)]
        images: Vec<PathBuf>,

        /// Output PDF path
        #[arg(long, short, default_value = "scan.pdf")]
        out: PathBuf,

        /// Filter applied to every page
        #[arg(long, value_enum, default_value_t = FilterArg::Normal)]
        filter: FilterArg,

        /// Paper size for the assembled PDF
        #[arg(long, value_enum, default_value_t = PaperArg::A4)]
        paper: PaperArg,

        /// Title embedded in the PDF metadata
        #[arg(long)]
        title: Option<String>,

        /// Skip boundary detection and keep the default inset crop
        #[arg(long)]
        no_autodetect: bool,
    },

    /// Detect the document boundary in one image and print it as JSON
    Detect {
        /// Path to the image file
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },
}

/// Filter selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    Normal,
    Bw,
    Enhance,
}

impl From<FilterArg> for FilterMode {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Normal => FilterMode::Normal,
            FilterArg::Bw => FilterMode::Bw,
            FilterArg::Enhance => FilterMode::Enhance,
        }
    }
}

/// Paper size selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaperArg {
    A4,
    A3,
    A5,
    Letter,
    Legal,
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A4 => PaperSize::A4,
            PaperArg::A3 => PaperSize::A3,
            PaperArg::A5 => PaperSize::A5,
            PaperArg::Letter => PaperSize::Letter,
            PaperArg::Legal => PaperSize::Legal,
        }
    }
}
