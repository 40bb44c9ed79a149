use anyhow::Result;
use clap::Parser;

use aceunit_gen::{cli, logging, vfs::OsVfs, Generator};

fn main() -> Result<()> {
    let args = cli::Args::parse();
    logging::init(logging::Verbosity::from_flags(args.verbose, args.quiet));

    let vfs = OsVfs;
    let summary = Generator::new(&vfs, args.options()).run(&args.roots)?;
    if !summary.success() {
        std::process::exit(1);
    }
    Ok(())
}
