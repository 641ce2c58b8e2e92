//! Library-level tests for tarplate-lib.

mod common;
mod pipeline_tests;
mod property_tests;
