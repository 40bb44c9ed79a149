//! Blanks C/C++ comments to spaces while preserving the input's length and
//! line structure, so searching the result for annotations cannot be fooled
//! by commented-out or quoted text.
//!
//! Line terminators (LF, CR, CR+LF) pass through unchanged everywhere,
//! including inside comments. String and character literals pass through
//! unchanged and never open or close a comment. A backslash immediately
//! before a line terminator inside a line comment continues the comment onto
//! the next physical line.

use std::collections::VecDeque;
use std::io::{self, Read};

const CHUNK: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    /// Saw a `/` in code; its emission is deferred until the next byte
    /// decides whether it starts a comment.
    Slash,
    LineComment,
    /// Last blanked character of the line comment was a backslash.
    LineCommentBackslash,
    /// Backslash continuation consumed a CR; a following LF belongs to the
    /// same terminator and must not end the continuation.
    LineCommentBackslashCr,
    BlockComment,
    /// Saw a `*` inside a block comment; a following `/` closes it.
    BlockCommentStar,
    Str,
    StrEscape,
    Chr,
    ChrEscape,
}

fn is_terminator(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

/// The comment-blanking automaton. Feed it bytes one at a time; each byte
/// yields zero, one or two output bytes (two when a deferred slash turns out
/// not to open a comment).
#[derive(Debug)]
pub struct CommentScrubber {
    state: State,
}

impl CommentScrubber {
    pub fn new() -> Self {
        Self { state: State::Code }
    }

    pub fn feed(&mut self, b: u8, out: &mut Vec<u8>) {
        match self.state {
            State::Code => match b {
                b'/' => self.state = State::Slash,
                b'"' => {
                    out.push(b);
                    self.state = State::Str;
                }
                b'\'' => {
                    out.push(b);
                    self.state = State::Chr;
                }
                _ => out.push(b),
            },
            State::Slash => match b {
                b'/' => {
                    out.extend_from_slice(b"  ");
                    self.state = State::LineComment;
                }
                b'*' => {
                    out.extend_from_slice(b"  ");
                    self.state = State::BlockComment;
                }
                _ => {
                    // A lone slash is ordinary text; release it and rescan
                    // the current byte in code state.
                    out.push(b'/');
                    self.state = State::Code;
                    self.feed(b, out);
                }
            },
            State::LineComment => {
                if is_terminator(b) {
                    out.push(b);
                    self.state = State::Code;
                } else {
                    out.push(b' ');
                    if b == b'\\' {
                        self.state = State::LineCommentBackslash;
                    }
                }
            }
            State::LineCommentBackslash => match b {
                b'\n' => {
                    out.push(b);
                    self.state = State::LineComment;
                }
                b'\r' => {
                    out.push(b);
                    self.state = State::LineCommentBackslashCr;
                }
                b'\\' => out.push(b' '),
                _ => {
                    out.push(b' ');
                    self.state = State::LineComment;
                }
            },
            State::LineCommentBackslashCr => match b {
                b'\n' => {
                    out.push(b);
                    self.state = State::LineComment;
                }
                b'\r' => {
                    // The continuation line is empty; this CR terminates it.
                    out.push(b);
                    self.state = State::Code;
                }
                b'\\' => {
                    out.push(b' ');
                    self.state = State::LineCommentBackslash;
                }
                _ => {
                    out.push(b' ');
                    self.state = State::LineComment;
                }
            },
            State::BlockComment => {
                if is_terminator(b) {
                    out.push(b);
                } else {
                    out.push(b' ');
                    if b == b'*' {
                        self.state = State::BlockCommentStar;
                    }
                }
            }
            State::BlockCommentStar => {
                if is_terminator(b) {
                    out.push(b);
                    self.state = State::BlockComment;
                } else {
                    out.push(b' ');
                    match b {
                        b'/' => self.state = State::Code,
                        b'*' => {}
                        _ => self.state = State::BlockComment,
                    }
                }
            }
            State::Str => {
                out.push(b);
                match b {
                    b'\\' => self.state = State::StrEscape,
                    b'"' => self.state = State::Code,
                    _ => {}
                }
            }
            State::StrEscape => {
                out.push(b);
                self.state = State::Str;
            }
            State::Chr => {
                out.push(b);
                match b {
                    b'\\' => self.state = State::ChrEscape,
                    b'\'' => self.state = State::Code,
                    _ => {}
                }
            }
            State::ChrEscape => {
                out.push(b);
                self.state = State::Chr;
            }
        }
    }

    /// Flushes a deferred slash at end of input. Unterminated comments and
    /// literals are not errors.
    pub fn finish(&mut self, out: &mut Vec<u8>) {
        if self.state == State::Slash {
            out.push(b'/');
        }
        self.state = State::Code;
    }
}

impl Default for CommentScrubber {
    fn default() -> Self {
        Self::new()
    }
}

/// A reader adapter that blanks comments in the bytes of an inner reader.
///
/// Single-byte pull and bulk-buffer pull over the same input yield
/// byte-identical output: both drain the same internal queue fed by the same
/// automaton.
#[derive(Debug)]
pub struct CommentAwareReader<R> {
    inner: R,
    scrubber: CommentScrubber,
    queue: VecDeque<u8>,
    eof: bool,
}

impl<R: Read> CommentAwareReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            scrubber: CommentScrubber::new(),
            queue: VecDeque::new(),
            eof: false,
        }
    }

    fn refill(&mut self) -> io::Result<()> {
        let mut chunk = [0u8; CHUNK];
        let mut scratch = Vec::with_capacity(CHUNK + 1);
        while self.queue.is_empty() && !self.eof {
            scratch.clear();
            let n = self.inner.read(&mut chunk)?;
            if n == 0 {
                self.scrubber.finish(&mut scratch);
                self.eof = true;
            } else {
                for &b in &chunk[..n] {
                    self.scrubber.feed(b, &mut scratch);
                }
            }
            self.queue.extend(&scratch);
        }
        Ok(())
    }
}

impl<R: Read> Read for CommentAwareReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.refill()?;
        let mut written = 0;
        while written < buf.len() {
            match self.queue.pop_front() {
                Some(b) => {
                    buf[written] = b;
                    written += 1;
                }
                None => break,
            }
        }
        Ok(written)
    }
}

/// Blanks comments in an in-memory source, preserving length and line
/// structure. Multi-byte characters outside comments pass through untouched,
/// so valid UTF-8 input stays valid UTF-8.
pub fn scrub(source: &str) -> String {
    let mut scrubber = CommentScrubber::new();
    let mut out = Vec::with_capacity(source.len() + 1);
    for &b in source.as_bytes() {
        scrubber.feed(b, &mut out);
    }
    scrubber.finish(&mut out);
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Asserts the replacement for single-byte pull, bulk-buffer pull and
    /// the in-memory convenience, which must all agree.
    fn assert_replacement(orig: &str, expected: &str) {
        assert_eq!(read_single(orig), expected, "single-byte pull");
        assert_eq!(read_bulk(orig), expected, "bulk-buffer pull");
        assert_eq!(scrub(orig), expected, "scrub");
    }

    fn read_single(orig: &str) -> String {
        let mut reader = CommentAwareReader::new(orig.as_bytes());
        let mut out = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match reader.read(&mut byte).unwrap() {
                0 => break,
                _ => out.push(byte[0]),
            }
        }
        String::from_utf8(out).unwrap()
    }

    fn read_bulk(orig: &str) -> String {
        let mut reader = CommentAwareReader::new(orig.as_bytes());
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_plain_code_lf_unchanged() {
        let orig = "void foo() {\n    bar();\n}\n";
        assert_replacement(orig, orig);
    }

    #[test]
    fn test_plain_code_cr_unchanged() {
        let orig = "void foo() {\r    bar();\r}\r";
        assert_replacement(orig, orig);
    }

    #[test]
    fn test_plain_code_crlf_unchanged() {
        let orig = "void foo() {\r\n    bar();\r\n}\r\n";
        assert_replacement(orig, orig);
    }

    #[test]
    fn test_eol_comments_lf() {
        let orig = "void foo() { // comment\n    bar(); // comment\n} // comment\n";
        let expe = "void foo() {           \n    bar();           \n}           \n";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_eol_comments_cr() {
        let orig = "void foo() { // comment\r    bar(); // comment\r} // comment\r";
        let expe = "void foo() {           \r    bar();           \r}           \r";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_eol_comments_crlf() {
        let orig = "void foo() { // comment\r\n    bar(); // comment\r\n} // comment\r\n";
        let expe = "void foo() {           \r\n    bar();           \r\n}           \r\n";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_block_comments_lf() {
        let orig = "void foo() { /* comment */\n    bar(); /* comment */\n} /* comment */\n";
        let expe = "void foo() {              \n    bar();              \n}              \n";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_block_comments_cr() {
        let orig = "void foo() { /* comment */\r    bar(); /* comment */\r} /* comment */\r";
        let expe = "void foo() {              \r    bar();              \r}              \r";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_block_comments_crlf() {
        let orig = "void foo() { /* comment */\r\n    bar(); /* comment */\r\n} /* comment */\r\n";
        let expe = "void foo() {              \r\n    bar();              \r\n}              \r\n";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_pseudo_eol_comment_in_string() {
        let orig = "void foo() {\n    printf(\"// pseudocomment\");\n}\n";
        assert_replacement(orig, orig);
    }

    #[test]
    fn test_pseudo_block_comment_in_string() {
        let orig = "void foo() {\n    printf(\"/* pseudocomment */\");\n}\n";
        assert_replacement(orig, orig);
    }

    #[test]
    fn test_lone_slash_at_end_of_line() {
        for orig in [
            "someCode(); /\nfoo();\n",
            "someCode(); /\rfoo();\r",
            "someCode(); /\r\nfoo();\r\n",
        ] {
            assert_replacement(orig, orig);
        }
    }

    #[test]
    fn test_lone_slash_at_end_and_start_of_line() {
        for orig in [
            "someCode(); /\n/ foo();\n",
            "someCode(); /\r/ foo();\r",
            "someCode(); /\r\n/ foo();\r\n",
        ] {
            assert_replacement(orig, orig);
        }
    }

    #[test]
    fn test_lone_slash_at_end_of_input() {
        let orig = "someCode(); /";
        assert_replacement(orig, orig);
    }

    #[test]
    fn test_block_comment_spanning_lines_lf() {
        let orig = "/* foo\n * bar\n *\n */\n\nextern void foo();\n";
        let expe = "      \n      \n  \n   \n\nextern void foo();\n";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_block_comment_spanning_lines_cr() {
        let orig = "/* foo\r * bar\r *\r */\r\rextern void foo();\r";
        let expe = "      \r      \r  \r   \r\rextern void foo();\r";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_block_comment_spanning_lines_crlf() {
        let orig = "/* foo\r\n * bar\r\n *\r\n */\r\n\r\nextern void foo();\r\n";
        let expe = "      \r\n      \r\n  \r\n   \r\n\r\nextern void foo();\r\n";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_consecutive_eol_comments() {
        let orig = "// foo\n// bar\n// bazz\nextern void foo();\n";
        let expe = "      \n      \n       \nextern void foo();\n";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_incomplete_last_line() {
        assert_replacement("void foo() { }", "void foo() { }");
    }

    #[test]
    fn test_incomplete_last_line_with_block_comment() {
        assert_replacement("/* foo */", "         ");
    }

    #[test]
    fn test_incomplete_last_line_with_eol_comment() {
        assert_replacement("// foo", "      ");
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert_replacement("/*  ", "    ");
    }

    #[test]
    fn test_unterminated_string() {
        assert_replacement("\"xxx", "\"xxx");
    }

    #[test]
    fn test_unterminated_char() {
        assert_replacement("'x", "'x");
    }

    #[test]
    fn test_trailing_lone_backslash() {
        assert_replacement("\\", "\\");
    }

    #[test]
    fn test_stars_in_block_comment() {
        assert_replacement("foo/***/foo", "foo     foo");
    }

    #[test]
    fn test_slash_in_next_line_does_not_terminate_lf() {
        let orig = "foo/*\n/*/bar/**\n/*/";
        let expe = "foo  \n   bar   \n   ";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_slash_in_next_line_does_not_terminate_cr() {
        let orig = "foo/*\r/*/bar/**\r/*/";
        let expe = "foo  \r   bar   \r   ";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_slash_in_next_line_does_not_terminate_crlf() {
        let orig = "foo/*\r\n/*/bar/**\r\n/*/";
        let expe = "foo  \r\n   bar   \r\n   ";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_escapes_in_string() {
        let orig = "foo\"\\\"\\/\"bar";
        assert_replacement(orig, orig);
    }

    #[test]
    fn test_escapes_in_char() {
        // Not valid C but accepted by the preprocessor.
        let orig = "foo'\\'\\/'bar";
        assert_replacement(orig, orig);
    }

    #[test]
    fn test_backslash_continues_eol_comment_lf() {
        let orig = "foo //comment\\\ncomment";
        let expe = "foo           \n       ";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_backslash_continues_eol_comment_cr() {
        let orig = "foo //comment\\\rcomment";
        let expe = "foo           \r       ";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_backslash_continues_eol_comment_crlf() {
        let orig = "foo //comment\\\r\ncomment";
        let expe = "foo           \r\n       ";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_continued_comment_can_continue_again() {
        let orig = "//a\\\nb\\\nc\nd";
        let expe = "    \n  \n \nd";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_mixed_line_preserves_terminator_positions() {
        let orig = "// a /* b */ c\n";
        let expe = "              \n";
        assert_replacement(orig, expe);
    }

    #[test]
    fn test_output_length_and_terminators_match_input() {
        let orig = "int x; /* b\r\nmore */ y(); // tail\ns(\"/*\"); '\\''\r";
        let scrubbed = scrub(orig);
        assert_eq!(scrubbed.len(), orig.len());
        let terms = |s: &str| {
            s.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n' || *b == b'\r')
                .collect::<Vec<_>>()
        };
        assert_eq!(terms(&scrubbed), terms(orig));
    }
}
