// Each test binary uses its own subset of the shared helpers.
#![allow(dead_code)]

pub mod fixtures;
pub mod harness;

pub use fixtures::*;
pub use harness::*;
