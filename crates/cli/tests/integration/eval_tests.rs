//! Eval command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn eval_renders_functions_and_arithmetic() {
  let env = TestEnv::new();
  let file = env.write_file("page.tmpl", r#"${upper(name)}: ${count * 2} ${join(",", split(" ", "a b c"))}"#);

  env
    .tarplate_cmd()
    .arg("eval")
    .arg(&file)
    .args(["--var", "name=total", "--var", "count=21"])
    .assert()
    .success()
    .stdout("TOTAL: 42 a,b,c");
}

#[test]
fn eval_passes_plain_text_through() {
  let env = TestEnv::new();
  let file = env.write_file("plain.txt", "no markers here\n");

  env.tarplate_cmd().arg("eval").arg(&file).assert().success().stdout("no markers here\n");
}

#[test]
fn eval_reports_syntax_errors() {
  let env = TestEnv::new();
  let file = env.write_file("broken.tmpl", "${ 1 + ");

  env
    .tarplate_cmd()
    .arg("eval")
    .arg(&file)
    .assert()
    .failure()
    .stderr(predicate::str::contains("broken.tmpl"));
}

#[test]
fn eval_reports_division_by_zero() {
  let env = TestEnv::new();
  let file = env.write_file("div.tmpl", "${10 / 0}");

  env
    .tarplate_cmd()
    .arg("eval")
    .arg(&file)
    .assert()
    .failure()
    .stderr(predicate::str::contains("division by zero"));
}
