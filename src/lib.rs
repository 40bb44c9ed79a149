//! aceunit-gen
//!
//! Discovers annotated test functions in trees of C/C++ sources, builds a
//! pruned hierarchy of packages and fixtures with stable unique ids, and
//! emits the registration code a unit-test execution runtime links against.

pub mod cli;
pub mod discovery;
pub mod emit;
pub mod error;
pub mod generator;
pub mod logging;
pub mod model;
pub mod scanner;
pub mod vfs;

pub use error::{GenError, Result};
pub use generator::{Generator, Options, Summary};
