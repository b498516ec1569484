// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

pub mod batch;
pub mod convert;
pub mod rewrite;

pub use rewrite::{rewrite, Pipeline, Rule};
