//! The `${ ... }` interpolation language applied to every archived file.
//!
//! A template is literal text with embedded expressions. Expressions can
//! reference variables from a [`VariableScope`], use integer and float
//! literals, quoted strings, the arithmetic operators `+ - * / %`, and call
//! functions from a [`FuncTable`].
//!
//! Rendering is pure: the output depends only on the text, the scope and the
//! function table.
//!
//! # Example
//!
//! ```
//! use tarplate_lib::template::render;
//! use tarplate_lib::vars::VariableScope;
//!
//! let vars: VariableScope = [("bar", "bar")].into_iter().collect();
//! assert_eq!(render("${bar} ${1+2+3}", &vars).unwrap(), "bar 6");
//! ```

mod eval;
mod funcs;
mod parser;
mod types;

pub use eval::{EvalContext, evaluate};
pub use funcs::{Func, FuncBody, FuncTable};
pub use parser::parse;
pub use types::*;

use crate::vars::VariableScope;

/// Render `input` against `vars` using the built-in function table.
pub fn render(input: &str, vars: &VariableScope) -> Result<String, TemplateError> {
  let funcs = FuncTable::builtins();
  render_with(input, &EvalContext::new(vars, &funcs))
}

/// Render `input` with an explicit evaluation context.
pub fn render_with(input: &str, ctx: &EvalContext<'_>) -> Result<String, TemplateError> {
  let template = parse(input)?;
  evaluate(&template, ctx)
}
