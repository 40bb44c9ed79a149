//! Recursive discovery of test fixtures over a [`Vfs`] tree.
//!
//! Each directory is visited subdirectories-first, then its own source files
//! (`.c` before `.cpp`). A directory that contributes nothing is pruned: it
//! produces no package, consumes no id and is never attached to its parent.
//! The one exception is the root package of a directory argument, which is
//! numbered eagerly before any scanning so the first suite id stays stable.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::model::{qualified_name, Fixture, IdAssigner, Package, Suite, TestCase};
use crate::scanner::{scrub, FixtureScan};
use crate::vfs::Vfs;

/// Extension scanned first within a directory.
pub const PRIMARY_EXT: &str = "c";
/// Extension scanned second within a directory.
pub const SECONDARY_EXT: &str = "cpp";

/// What one root argument resolved to. A base name may name a directory and
/// source files at the same time; both are scanned.
#[derive(Debug, Default)]
pub struct RootScan {
    /// The root resolved to at least a directory or a source file.
    pub base_found: bool,
    /// At least one test case was discovered under this root.
    pub tests_found: bool,
    /// The root package, present iff the root was a directory. Its children
    /// may be empty; its id is burned either way.
    pub package: Option<Package>,
    /// Fixtures from `<base>.c` / `<base>.cpp` root arguments.
    pub file_fixtures: Vec<Fixture>,
}

/// Walks directory trees, building pruned packages and assigning ids.
pub struct Walker<'a, V: Vfs> {
    vfs: &'a V,
    ids: &'a mut IdAssigner,
}

impl<'a, V: Vfs> Walker<'a, V> {
    pub fn new(vfs: &'a V, ids: &'a mut IdAssigner) -> Self {
        Self { vfs, ids }
    }

    /// Resolves and scans one root argument. Unresolvable roots are not an
    /// error here; the caller reports them and moves on.
    pub fn scan_root(&mut self, base: &str) -> Result<RootScan> {
        let mut scan = RootScan::default();
        let base_dir = Path::new(base);
        if self.vfs.is_dir(base_dir) {
            scan.base_found = true;
            let package = self.walk_root_dir(base_dir)?;
            scan.tests_found = !package.children.is_empty();
            scan.package = Some(package);
        }
        for ext in [PRIMARY_EXT, SECONDARY_EXT] {
            let candidate = PathBuf::from(format!("{base}.{ext}"));
            if self.vfs.is_file(&candidate) {
                scan.base_found = true;
                if let Some(fixture) = self.scan_fixture(&candidate)? {
                    scan.tests_found = true;
                    scan.file_fixtures.push(fixture);
                }
            }
        }
        Ok(scan)
    }

    /// The root package is numbered before any scanning, regardless of
    /// eventual emptiness.
    fn walk_root_dir(&mut self, dir: &Path) -> Result<Package> {
        let id = self.ids.next_id();
        let children = self.collect_children(dir)?;
        Ok(Package {
            id,
            name: qualified_name(dir),
            dir: dir.to_path_buf(),
            children,
        })
    }

    /// Returns the package for `dir`, or `None` when its subtree holds no
    /// tests. The id is allocated only after the subtree proved non-empty,
    /// so a package's id is higher than all of its descendants'.
    fn walk_dir(&mut self, dir: &Path) -> Result<Option<Package>> {
        let children = self.collect_children(dir)?;
        if children.is_empty() {
            debug!("pruning {}: no tests in subtree", dir.display());
            return Ok(None);
        }
        Ok(Some(Package {
            id: self.ids.next_id(),
            name: qualified_name(dir),
            dir: dir.to_path_buf(),
            children,
        }))
    }

    fn collect_children(&mut self, dir: &Path) -> Result<Vec<Suite>> {
        let mut children = Vec::new();
        for sub in self.vfs.sub_dirs(dir)? {
            if let Some(package) = self.walk_dir(&sub)? {
                children.push(Suite::Package(package));
            }
        }
        for ext in [PRIMARY_EXT, SECONDARY_EXT] {
            for file in self.vfs.source_files(dir, ext)? {
                if let Some(fixture) = self.scan_fixture(&file)? {
                    children.push(Suite::Fixture(fixture));
                }
            }
        }
        Ok(children)
    }

    /// Builds a fixture for one source file, or `None` when the file holds
    /// no test cases (no id is consumed then). Previously generated
    /// `Suite<N>.c` files are never fixture candidates.
    fn scan_fixture(&mut self, file: &Path) -> Result<Option<Fixture>> {
        let name = match file.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => return Ok(None),
        };
        if is_generated_suite(file) {
            return Ok(None);
        }
        let source = self.vfs.read(file)?;
        let found = FixtureScan::of(&scrub(&source));
        if !found.contains_tests() {
            debug!("skipping {}: no annotated test cases", file.display());
            return Ok(None);
        }
        let id = self.ids.next_id();
        let cases = found
            .tests
            .into_iter()
            .map(|name| TestCase {
                id: self.ids.next_id(),
                name,
            })
            .collect();
        Ok(Some(Fixture {
            id,
            name,
            source: file.to_path_buf(),
            cases,
            before: found.before,
            after: found.after,
            before_class: found.before_class,
            after_class: found.after_class,
        }))
    }
}

/// True for artifacts this generator emits itself, i.e. `Suite<digits>.c`.
fn is_generated_suite(file: &Path) -> bool {
    if file.extension().and_then(|e| e.to_str()) != Some("c") {
        return false;
    }
    file.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|stem| stem.strip_prefix("Suite"))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
