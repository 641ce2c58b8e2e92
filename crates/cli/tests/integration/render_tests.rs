//! Render and id command integration tests.

use predicates::prelude::*;

use super::common::{TestEnv, decode_archive, read_archive};

fn reference_env() -> TestEnv {
  TestEnv::with_tree(&[
    ("foo.txt", "${bar}"),
    ("nested/monkey.txt", "ooh-ooh-ooh-eee-eee"),
    ("maths.txt", "${1+2+3}"),
  ])
}

fn stdout_of(cmd: &mut assert_cmd::Command) -> String {
  let output = cmd.assert().success().get_output().stdout.clone();
  String::from_utf8(output).unwrap()
}

#[test]
fn render_writes_the_archive() {
  let env = reference_env();
  let out = env.path("out.tar");

  env
    .tarplate_cmd()
    .arg("render")
    .arg(env.source_dir())
    .args(["--var", "bar=bar", "-o"])
    .arg(&out)
    .assert()
    .success()
    .stdout(predicate::str::contains("Files: 3"))
    .stdout(predicate::str::contains("Directories: 1"));

  assert_eq!(
    read_archive(&out),
    vec![
      ("foo.txt".to_string(), "bar".to_string()),
      ("maths.txt".to_string(), "6".to_string()),
      ("nested".to_string(), String::new()),
      ("nested/monkey.txt".to_string(), "ooh-ooh-ooh-eee-eee".to_string()),
    ]
  );
}

#[test]
fn id_is_stable_and_matches_render() {
  let env = reference_env();

  let first = stdout_of(env.tarplate_cmd().arg("id").arg(env.source_dir()).args(["--var", "bar=bar"]));
  let second = stdout_of(env.tarplate_cmd().arg("id").arg(env.source_dir()).args(["--var", "bar=bar"]));
  assert_eq!(first, second);

  let id = first.trim();
  assert_eq!(id.len(), 64);
  assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

  env
    .tarplate_cmd()
    .arg("render")
    .arg(env.source_dir())
    .args(["--var", "bar=bar"])
    .assert()
    .success()
    .stdout(predicate::str::contains(id));
}

#[test]
fn id_changes_with_variables() {
  let env = reference_env();

  let one = stdout_of(env.tarplate_cmd().arg("id").arg(env.source_dir()).args(["--var", "bar=one"]));
  let two = stdout_of(env.tarplate_cmd().arg("id").arg(env.source_dir()).args(["--var", "bar=two"]));
  assert_ne!(one, two);
}

#[test]
fn stdout_mode_emits_raw_archive() {
  let env = reference_env();

  let output = env
    .tarplate_cmd()
    .arg("render")
    .arg(env.source_dir())
    .args(["--var", "bar=bar", "--stdout"])
    .assert()
    .success()
    .get_output()
    .clone();

  let records = decode_archive(&output.stdout);
  assert_eq!(records.len(), 4);
  assert_eq!(records[0], ("foo.txt".to_string(), "bar".to_string()));

  let stderr = String::from_utf8(output.stderr).unwrap();
  assert_eq!(stderr.trim().len(), 64);
}

#[test]
fn json_summary() {
  let env = reference_env();
  let out = env.path("out.tar");

  let stdout = stdout_of(
    env
      .tarplate_cmd()
      .arg("render")
      .arg(env.source_dir())
      .args(["--var", "bar=bar", "--format", "json", "-o"])
      .arg(&out),
  );

  let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
  assert_eq!(json["files"], 3);
  assert_eq!(json["directories"], 1);
  assert_eq!(json["id"].as_str().unwrap().len(), 64);
  assert_eq!(json["size"].as_u64().unwrap(), std::fs::metadata(&out).unwrap().len());
  assert_eq!(json["output"].as_str().unwrap(), out.display().to_string());
}

#[test]
fn parallel_render_has_the_same_identity() {
  let env = reference_env();

  let sequential = stdout_of(env.tarplate_cmd().arg("id").arg(env.source_dir()).args(["--var", "bar=bar"]));
  let parallel = stdout_of(
    env
      .tarplate_cmd()
      .arg("render")
      .arg(env.source_dir())
      .args(["--var", "bar=bar", "--parallel", "--format", "json"]),
  );

  let json: serde_json::Value = serde_json::from_str(&parallel).unwrap();
  assert_eq!(json["id"].as_str().unwrap(), sequential.trim());
}

#[test]
fn undefined_variable_names_the_file() {
  let env = reference_env();
  let out = env.path("out.tar");

  env
    .tarplate_cmd()
    .arg("render")
    .arg(env.source_dir())
    .arg("-o")
    .arg(&out)
    .assert()
    .failure()
    .stderr(predicate::str::contains("foo.txt"))
    .stderr(predicate::str::contains("unknown variable accessed: bar"));

  assert!(!out.exists());
}

#[test]
fn verbose_logs_each_entry() {
  let env = reference_env();

  env
    .tarplate_cmd()
    .arg("--verbose")
    .arg("id")
    .arg(env.source_dir())
    .args(["--var", "bar=bar"])
    .assert()
    .success()
    .stderr(predicate::str::contains("archived entry"));
}
