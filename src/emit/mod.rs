//! Renders registration artifacts for retained suites and writes them
//! idempotently: a target file is rewritten only when its content would
//! actually change, so repeated runs do not perturb build timestamps.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::Print;
use crate::error::Result;
use crate::model::{Fixture, Package, Suite};
use crate::vfs::Vfs;

/// Writes registration artifacts for a retained tree.
pub struct Emitter<'a, V: Vfs> {
    vfs: &'a V,
    force: bool,
    gen_suites: bool,
    print: &'a [Print],
}

impl<'a, V: Vfs> Emitter<'a, V> {
    pub fn new(vfs: &'a V, force: bool, gen_suites: bool, print: &'a [Print]) -> Self {
        Self {
            vfs,
            force,
            gen_suites,
            print,
        }
    }

    fn prints(&self, channel: Print) -> bool {
        self.print.contains(&channel)
    }

    /// Emits artifacts for `package` and everything below it, children
    /// before the package's own `Suite<id>.c`. An empty package (only the
    /// eagerly numbered root can be one) produces no artifact.
    pub fn emit_package(&self, package: &Package) -> Result<()> {
        for child in &package.children {
            match child {
                Suite::Package(p) => self.emit_package(p)?,
                Suite::Fixture(f) => self.emit_fixture(f)?,
            }
        }
        if package.children.is_empty() {
            return Ok(());
        }
        let path = suite_artifact_path(package);
        if self.prints(Print::Sources) || self.prints(Print::Suites) || self.prints(Print::Generated)
        {
            println!("{}", path.display());
        }
        if self.gen_suites {
            self.write_if_changed(&path, &render_suite(package))?;
        }
        Ok(())
    }

    /// Emits the `<base>.h` registration header next to the fixture source.
    pub fn emit_fixture(&self, fixture: &Fixture) -> Result<()> {
        if self.prints(Print::Sources) || self.prints(Print::Fixtures) {
            println!("{}", fixture.source.display());
        }
        let path = fixture_artifact_path(fixture);
        if self.prints(Print::Headers) || self.prints(Print::Generated) {
            println!("{}", path.display());
        }
        self.write_if_changed(&path, &render_fixture(fixture))
    }

    /// Leaves the target untouched when its content already matches;
    /// otherwise replaces it in full.
    fn write_if_changed(&self, path: &Path, text: &str) -> Result<()> {
        if let Some(existing) = self.vfs.read_if_exists(path)? {
            if existing == text {
                debug!("unchanged: {}", path.display());
                return Ok(());
            }
        }
        if self.force {
            self.vfs.make_writable(path)?;
        }
        self.vfs.write(path, text)
    }
}

pub fn suite_artifact_path(package: &Package) -> PathBuf {
    package.dir.join(format!("Suite{}.c", package.id))
}

pub fn fixture_artifact_path(fixture: &Fixture) -> PathBuf {
    fixture.source.with_extension("h")
}

/// Reference an already-registered child by the name its own artifact
/// declares.
fn child_ref(child: &Suite) -> String {
    match child {
        Suite::Package(p) => format!("suite{}", p.id),
        Suite::Fixture(f) => format!("{}Fixture", f.name),
    }
}

/// Renders the `Suite<id>.c` registration table for a package.
pub fn render_suite(package: &Package) -> String {
    let id = package.id;
    let name = &package.name;
    let mut out = String::new();
    let _ = writeln!(out, "/** Test suite registration for package {name}.");
    let _ = writeln!(out, " *");
    let _ = writeln!(
        out,
        " * @warning This is a generated file. Do not edit. Your changes will be lost."
    );
    let _ = writeln!(out, " * @file Suite{id}.c");
    let _ = writeln!(out, " */");
    let _ = writeln!(out);
    let _ = writeln!(out, "#include \"AceUnit.h\"");
    let _ = writeln!(out);
    let _ = writeln!(out, "#ifdef ACEUNIT_SUITES");
    let _ = writeln!(out);
    for child in &package.children {
        let _ = writeln!(out, "extern TestSuite_t {};", child_ref(child));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "const TestSuite_t *suitesOf{id}[] = {{");
    for child in &package.children {
        let _ = writeln!(out, "    &{},", child_ref(child));
    }
    let _ = writeln!(out, "    NULL");
    let _ = writeln!(out, "}};");
    let _ = writeln!(out);
    let _ = writeln!(out, "#if defined __cplusplus");
    let _ = writeln!(out, "extern");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out, "const TestSuite_t suite{id} = {{");
    let _ = writeln!(out, "    {id},");
    let _ = writeln!(out, "#ifndef ACEUNIT_EMBEDDED");
    let _ = writeln!(out, "    \"{name}\",");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out, "    suitesOf{id}");
    let _ = writeln!(out, "}};");
    let _ = writeln!(out);
    let _ = writeln!(out, "#endif");
    out
}

fn include_guard(name: &str) -> String {
    let upper: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("_{upper}_H")
}

fn method_table(out: &mut String, doc: &str, table: &str, methods: &[String]) {
    let _ = writeln!(out, "/** The {doc} of this fixture. */");
    let _ = writeln!(out, "static const testMethod_t {table}[] = {{");
    for method in methods {
        let _ = writeln!(out, "    {method},");
    }
    let _ = writeln!(out, "    NULL");
    let _ = writeln!(out, "}};");
    let _ = writeln!(out);
}

/// Renders the `<base>.h` registration header for a fixture.
pub fn render_fixture(fixture: &Fixture) -> String {
    let id = fixture.id;
    let name = &fixture.name;
    let guard = include_guard(name);
    let mut out = String::new();
    let _ = writeln!(out, "/** Test fixture registration for {name}.");
    let _ = writeln!(out, " *");
    let _ = writeln!(
        out,
        " * @warning This is a generated file. Do not edit. Your changes will be lost."
    );
    let _ = writeln!(out, " * @file {name}.h");
    let _ = writeln!(out, " */");
    let _ = writeln!(out);
    let _ = writeln!(out, "#ifndef {guard}");
    let _ = writeln!(
        out,
        "/** Include shield to protect this header file from being included more than once. */"
    );
    let _ = writeln!(out, "#define {guard}");
    let _ = writeln!(out);
    let _ = writeln!(out, "/** The id of this fixture. */");
    let _ = writeln!(out, "#define A_FIXTURE_ID {id}");
    let _ = writeln!(out);
    let _ = writeln!(out, "#include \"AceUnit.h\"");
    let _ = writeln!(out);
    for case in &fixture.cases {
        let _ = writeln!(out, "A_Test void {}(void);", case.name);
    }
    for (marker, methods) in [
        ("A_Before", &fixture.before),
        ("A_After", &fixture.after),
        ("A_BeforeClass", &fixture.before_class),
        ("A_AfterClass", &fixture.after_class),
    ] {
        for method in methods {
            let _ = writeln!(out, "{marker} void {method}(void);");
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "/** The test case ids of this fixture. */");
    let _ = writeln!(out, "static const TestCaseId_t testIds[] = {{");
    for case in &fixture.cases {
        let _ = writeln!(out, "    {}, /* {} */", case.id, case.name);
    }
    let _ = writeln!(out, "}};");
    let _ = writeln!(out);
    let _ = writeln!(out, "#ifndef ACEUNIT_EMBEDDED");
    let _ = writeln!(out, "/** The test names of this fixture. */");
    let _ = writeln!(out, "static const char *const testNames[] = {{");
    for case in &fixture.cases {
        let _ = writeln!(out, "    \"{}\",", case.name);
    }
    let _ = writeln!(out, "}};");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out);

    let case_names: Vec<String> = fixture.cases.iter().map(|c| c.name.clone()).collect();
    method_table(&mut out, "test cases", "testCases", &case_names);
    method_table(&mut out, "before methods", "before", &fixture.before);
    method_table(&mut out, "after methods", "after", &fixture.after);
    method_table(&mut out, "beforeClass methods", "beforeClass", &fixture.before_class);
    method_table(&mut out, "afterClass methods", "afterClass", &fixture.after_class);

    let _ = writeln!(out, "/** This fixture. */");
    let _ = writeln!(out, "#if defined __cplusplus");
    let _ = writeln!(out, "extern");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out, "const TestFixture_t {name}Fixture = {{");
    let _ = writeln!(out, "    {id},");
    let _ = writeln!(out, "#ifndef ACEUNIT_EMBEDDED");
    let _ = writeln!(out, "    \"{name}\",");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out, "#ifdef ACEUNIT_SUITES");
    let _ = writeln!(out, "    NULL,");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out, "    testIds,");
    let _ = writeln!(out, "#ifndef ACEUNIT_EMBEDDED");
    let _ = writeln!(out, "    testNames,");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out, "    testCases,");
    let _ = writeln!(out, "    before,");
    let _ = writeln!(out, "    after,");
    let _ = writeln!(out, "    beforeClass,");
    let _ = writeln!(out, "    afterClass");
    let _ = writeln!(out, "}};");
    let _ = writeln!(out);
    let _ = writeln!(out, "#endif /* {guard} */");
    out
}

/// Renders the aggregate listing: one `id: qualified-name` line per retained
/// node, in a single pre-order pass over all retained roots. A derived view
/// only; no ids are allocated here.
pub fn render_listing(roots: &[Package]) -> String {
    let mut out = String::new();
    for root in roots {
        root.visit_pre_order(&mut |id, name| {
            let _ = writeln!(out, "{id}: {name}");
        });
    }
    out
}
