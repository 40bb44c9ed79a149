//! One generator invocation: processes root arguments strictly left to
//! right, sharing a single id assigner and a single aggregate listing, so
//! ids stay globally consistent across roots. Unresolvable and empty roots
//! are reported and skipped; only I/O failures abort the invocation.

use std::path::PathBuf;

use tracing::{error, warn};

use crate::cli::Print;
use crate::discovery::{Walker, PRIMARY_EXT, SECONDARY_EXT};
use crate::emit::{render_listing, Emitter};
use crate::error::Result;
use crate::model::{IdAssigner, Package};
use crate::vfs::Vfs;

#[derive(Debug, Clone)]
pub struct Options {
    /// Remove write protection from artifacts before overwriting.
    pub force: bool,
    /// Write `Suite<N>.c` package registration files.
    pub gen_suites: bool,
    /// Path channels printed to stdout.
    pub print: Vec<Print>,
    /// Target of the aggregate listing, if requested.
    pub all_tests: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            force: false,
            gen_suites: true,
            print: Vec::new(),
            all_tests: None,
        }
    }
}

/// What one invocation amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Every root argument resolved to a directory or source file.
    pub roots_resolved: bool,
    /// At least one test case was discovered across all roots combined.
    pub tests_found: bool,
}

impl Summary {
    pub fn success(&self) -> bool {
        self.roots_resolved && self.tests_found
    }
}

pub struct Generator<'a, V: Vfs> {
    vfs: &'a V,
    opts: Options,
}

impl<'a, V: Vfs> Generator<'a, V> {
    pub fn new(vfs: &'a V, opts: Options) -> Self {
        Self { vfs, opts }
    }

    pub fn run(&self, roots: &[String]) -> Result<Summary> {
        let mut ids = IdAssigner::new();
        let mut listed_roots: Vec<Package> = Vec::new();
        let mut summary = Summary {
            roots_resolved: true,
            tests_found: false,
        };

        for base in roots {
            let scan = Walker::new(self.vfs, &mut ids).scan_root(base)?;
            if !scan.base_found {
                error!("{base}: no such directory");
                error!("{base}.{PRIMARY_EXT}: no such file");
                error!("{base}.{SECONDARY_EXT}: no such file");
                summary.roots_resolved = false;
                continue;
            }
            if !scan.tests_found {
                warn!("no test cases in {base}; maybe the annotations are missing?");
            }
            summary.tests_found |= scan.tests_found;

            let emitter = Emitter::new(self.vfs, self.opts.force, self.opts.gen_suites, &self.opts.print);
            if let Some(package) = scan.package {
                emitter.emit_package(&package)?;
                listed_roots.push(package);
            }
            for fixture in &scan.file_fixtures {
                emitter.emit_fixture(fixture)?;
            }
        }

        if let Some(path) = &self.opts.all_tests {
            if self.opts.print.contains(&Print::Generated) {
                println!("{}", path.display());
            }
            self.vfs.write(path, &render_listing(&listed_roots))?;
        }
        if !summary.tests_found {
            warn!("no test cases found");
        }
        Ok(summary)
    }
}
