use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::generator::Options;

/// Path channels that can be printed to stdout for consumption by build
/// tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Print {
    /// Generated suite registration files.
    Suites,
    /// Fixture source files.
    Fixtures,
    /// Generated fixture header files.
    Headers,
    /// All generated files.
    Generated,
    /// Scanned source files, generated or not.
    Sources,
}

#[derive(Parser, Debug)]
#[command(name = "aceunit-gen")]
#[command(
    about = "Generate unit-test registration code for annotated C/C++ sources",
    long_about = None
)]
pub struct Args {
    /// Directories to scan, or source base names without the .c/.cpp ending
    #[arg(value_name = "ROOT", required = true)]
    pub roots: Vec<String>,

    /// Remove write protection from generated files before overwriting
    #[arg(short, long)]
    pub force: bool,

    /// Print the selected path channels to stdout (comma separated)
    #[arg(long, value_delimiter = ',', value_name = "CHANNELS")]
    pub print: Vec<Print>,

    /// Do not write Suite<N>.c package registration files
    #[arg(long)]
    pub no_gen_suites: bool,

    /// Write a table of all discovered suites and tests to this file
    #[arg(short = 'o', long = "all-tests", value_name = "FILE")]
    pub all_tests: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn options(&self) -> Options {
        Options {
            force: self.force,
            gen_suites: !self.no_gen_suites,
            print: self.print.clone(),
            all_tests: self.all_tests.clone(),
        }
    }
}
