//! Detection of annotated test functions in comment-blanked source text.
//!
//! Markers are matched as whole words, so `A_Before` never fires inside
//! `A_BeforeClass`. Detection runs on scrubbed text (see
//! [`super::comments`]), which is what makes commented-out annotations
//! invisible.

pub const A_TEST: &str = "A_Test";
pub const A_BEFORE: &str = "A_Before";
pub const A_AFTER: &str = "A_After";
pub const A_BEFORE_CLASS: &str = "A_BeforeClass";
pub const A_AFTER_CLASS: &str = "A_AfterClass";

/// The annotated functions found in one source file, by marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureScan {
    pub tests: Vec<String>,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub before_class: Vec<String>,
    pub after_class: Vec<String>,
}

impl FixtureScan {
    /// Scans comment-blanked source for all supported markers.
    pub fn of(scrubbed: &str) -> Self {
        Self {
            tests: annotated_functions(scrubbed, A_TEST),
            before: annotated_functions(scrubbed, A_BEFORE),
            after: annotated_functions(scrubbed, A_AFTER),
            before_class: annotated_functions(scrubbed, A_BEFORE_CLASS),
            after_class: annotated_functions(scrubbed, A_AFTER_CLASS),
        }
    }

    /// A fixture is retained iff it has at least one test case.
    pub fn contains_tests(&self) -> bool {
        !self.tests.is_empty()
    }
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Returns the names of functions annotated with `marker`, in source order.
/// The function name is the last identifier before the `(` that follows the
/// marker.
pub fn annotated_functions(scrubbed: &str, marker: &str) -> Vec<String> {
    let bytes = scrubbed.as_bytes();
    let mut names = Vec::new();
    let mut from = 0;
    while let Some(pos) = scrubbed[from..].find(marker) {
        let at = from + pos;
        let end = at + marker.len();
        let word_start = at == 0 || !is_ident(bytes[at - 1]);
        let word_end = end == bytes.len() || !is_ident(bytes[end]);
        if word_start && word_end {
            if let Some(name) = function_name_after(&scrubbed[end..]) {
                names.push(name);
            }
        }
        from = end;
    }
    names
}

fn function_name_after(rest: &str) -> Option<String> {
    let signature = &rest[..rest.find('(')?];
    let name: String = signature
        .trim_end()
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
