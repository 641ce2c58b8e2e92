//! CLI integration tests.

mod eval_tests;
mod render_tests;
