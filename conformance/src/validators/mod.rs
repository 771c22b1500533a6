//! Validators, one per pipeline concern.
//!
//! Each validator declares fresh fixture hierarchies through the pipeline
//! under test and compares observable results against the expected ones.
//! A mismatch is a violation in the report; only a fixture that cannot be
//! built at all is an error.

pub mod abstracts;
pub mod binder;
pub mod factory;
pub mod hooks;
pub mod order;

use std::fmt::Debug;

/// Records a violation when `actual != expected`.
pub(crate) fn expect_eq<T: PartialEq + Debug>(
    violations: &mut Vec<String>,
    what: &str,
    actual: T,
    expected: T,
) {
    if actual != expected {
        violations.push(format!("{what}: expected {expected:?}, got {actual:?}"));
    }
}

/// Records a violation when `condition` is false.
pub(crate) fn expect(violations: &mut Vec<String>, what: &str, condition: bool) {
    if !condition {
        violations.push(what.to_string());
    }
}
