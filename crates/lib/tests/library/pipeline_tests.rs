//! End-to-end archive construction.

use std::fs;

use tarplate_lib::archive::{ArchiveError, Archiver};
use tarplate_lib::template::TemplateError;
use tarplate_lib::{build, hash_bytes};

use super::common::{dir, file, records, scope, tree};

#[test]
fn renders_the_reference_tree() {
  let temp = tree(&[
    ("foo.txt", "${bar}"),
    ("nested/monkey.txt", "ooh-ooh-ooh-eee-eee"),
    ("maths.txt", "${1+2+3}"),
  ]);

  let rendered = Archiver::new()
    .render_dir(temp.path(), &scope(&[("bar", "bar")]))
    .unwrap();

  assert_eq!(
    records(&rendered.bytes),
    vec![
      file("foo.txt", "bar"),
      file("maths.txt", "6"),
      dir("nested"),
      file("nested/monkey.txt", "ooh-ooh-ooh-eee-eee"),
    ]
  );
  assert_eq!(rendered.files, 3);
  assert_eq!(rendered.directories, 1);
  assert_eq!(rendered.identity, hash_bytes(&rendered.bytes));
  assert_eq!(rendered.identity.0.len(), 64);
}

#[test]
fn archive_ends_with_two_zero_blocks() {
  let temp = tree(&[("a.txt", "a")]);
  let bytes = build(temp.path(), &scope(&[])).unwrap();

  assert_eq!(bytes.len() % 512, 0);
  assert!(bytes[bytes.len() - 1024..].iter().all(|b| *b == 0));
}

#[test]
fn undefined_variable_fails_the_whole_build() {
  let temp = tree(&[("good.txt", "${bar}"), ("zz/bad.txt", "${nope}")]);

  let err = build(temp.path(), &scope(&[("bar", "bar")])).unwrap_err();
  match err {
    ArchiveError::Render { path, source } => {
      assert_eq!(path, temp.path().join("zz").join("bad.txt"));
      assert_eq!(source, TemplateError::UndefinedVariable("nope".to_string()));
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn malformed_template_fails_the_whole_build() {
  let temp = tree(&[("a.txt", "fine"), ("b.txt", "${ unclosed")]);

  let err = build(temp.path(), &scope(&[])).unwrap_err();
  assert!(matches!(
    err,
    ArchiveError::Render {
      source: TemplateError::Unclosed(0),
      ..
    }
  ));
}

#[test]
fn empty_directories_are_recorded() {
  let temp = tree(&[("a.txt", "a")]);
  fs::create_dir(temp.path().join("empty")).unwrap();

  let bytes = build(temp.path(), &scope(&[])).unwrap();
  assert_eq!(records(&bytes), vec![file("a.txt", "a"), dir("empty")]);
}

#[test]
fn long_paths_survive() {
  let long = format!("{}/{}.txt", "d".repeat(80), "f".repeat(80));
  let temp = tree(&[(long.as_str(), "${x}")]);

  let bytes = build(temp.path(), &scope(&[("x", "ok")])).unwrap();
  let decoded = records(&bytes);
  assert_eq!(decoded.last().unwrap(), &file(&long, "ok"));
}
