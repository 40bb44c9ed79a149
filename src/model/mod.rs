//! The discovered suite hierarchy: packages (directories), fixtures (source
//! files) and test cases (annotated functions), plus the id counter shared by
//! one generator invocation.

use std::path::{Path, PathBuf};

/// Hands out suite/test ids for one generator invocation.
///
/// Ids start at 1 and increase strictly in assignment order. One assigner is
/// shared across all root arguments of an invocation so ids stay globally
/// unique.
#[derive(Debug)]
pub struct IdAssigner {
    next: u32,
}

impl IdAssigner {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdAssigner {
    fn default() -> Self {
        Self::new()
    }
}

/// One detected test function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub id: u32,
    pub name: String,
}

/// One source file containing at least one detected test case.
///
/// The before/after method lists are registered alongside the test cases but
/// carry no ids and do not affect retention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub id: u32,
    /// Source base name, e.g. `readTest` for `readTest.c`.
    pub name: String,
    /// Path of the scanned source file.
    pub source: PathBuf,
    pub cases: Vec<TestCase>,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub before_class: Vec<String>,
    pub after_class: Vec<String>,
}

/// One retained directory. Children keep discovery order: subdirectory
/// packages first, then this directory's own fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub id: u32,
    /// Dotted qualified name derived from the directory path.
    pub name: String,
    /// The directory this package represents.
    pub dir: PathBuf,
    pub children: Vec<Suite>,
}

/// A node with ordered children: either a package or a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suite {
    Package(Package),
    Fixture(Fixture),
}

impl Suite {
    pub fn id(&self) -> u32 {
        match self {
            Suite::Package(p) => p.id,
            Suite::Fixture(f) => f.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Suite::Package(p) => &p.name,
            Suite::Fixture(f) => &f.name,
        }
    }

    /// Visits this node and then its children in insertion order. Test cases
    /// are visited as the children of their fixture.
    pub fn visit_pre_order<F: FnMut(u32, &str)>(&self, visit: &mut F) {
        match self {
            Suite::Package(p) => p.visit_pre_order(visit),
            Suite::Fixture(f) => f.visit_pre_order(visit),
        }
    }
}

impl Package {
    pub fn visit_pre_order<F: FnMut(u32, &str)>(&self, visit: &mut F) {
        visit(self.id, &self.name);
        for child in &self.children {
            child.visit_pre_order(visit);
        }
    }
}

impl Fixture {
    pub fn visit_pre_order<F: FnMut(u32, &str)>(&self, visit: &mut F) {
        visit(self.id, &self.name);
        for case in &self.cases {
            visit(case.id, &case.name);
        }
    }
}

/// Derives a package's qualified name from its directory path: a leading
/// `./` is stripped and path separators become dots.
pub fn qualified_name(dir: &Path) -> String {
    let raw = dir.to_string_lossy();
    let raw = raw.strip_prefix("./").unwrap_or(&raw);
    raw.replace(['/', '\\'], ".")
}
