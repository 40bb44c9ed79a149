//! Source scanning: comment-aware character filtering and detection of
//! annotated test functions.

pub mod annotations;
pub mod comments;

pub use annotations::{FixtureScan, A_AFTER, A_AFTER_CLASS, A_BEFORE, A_BEFORE_CLASS, A_TEST};
pub use comments::{scrub, CommentAwareReader};
