//! Determinism and normalization properties of rendered archives.

use std::fs;

use tarplate_lib::archive::Archiver;
use tarplate_lib::{build, hash_bytes};

use super::common::{scope, tree, write_files};

#[test]
fn same_inputs_same_bytes() {
  let temp = tree(&[("a.txt", "${x}"), ("b/c.txt", "${1+2}")]);
  let vars = scope(&[("x", "1")]);

  let first = Archiver::new().render_dir(temp.path(), &vars).unwrap();
  let second = Archiver::new().render_dir(temp.path(), &vars).unwrap();
  assert_eq!(first.bytes, second.bytes);
  assert_eq!(first.identity, second.identity);
}

#[test]
fn different_variables_change_identity() {
  let temp = tree(&[("a.txt", "${x}")]);

  let one = build(temp.path(), &scope(&[("x", "1")])).unwrap();
  let two = build(temp.path(), &scope(&[("x", "2")])).unwrap();
  assert_ne!(hash_bytes(&one), hash_bytes(&two));
}

#[test]
fn unused_variables_do_not_change_output() {
  let temp = tree(&[("a.txt", "static")]);

  let bare = build(temp.path(), &scope(&[])).unwrap();
  let extra = build(temp.path(), &scope(&[("unused", "x")])).unwrap();
  assert_eq!(bare, extra);
}

#[test]
fn creation_order_does_not_matter() {
  let forward = tree(&[("a.txt", "1"), ("b.txt", "2"), ("c/d.txt", "3")]);
  let backward = tree(&[("c/d.txt", "3"), ("b.txt", "2"), ("a.txt", "1")]);

  assert_eq!(
    build(forward.path(), &scope(&[])).unwrap(),
    build(backward.path(), &scope(&[])).unwrap()
  );
}

#[test]
fn order_changing_rename_changes_bytes() {
  // same names and contents, paired the other way round
  let first = tree(&[("a", "one"), ("b", "two")]);
  let second = tree(&[("a", "two"), ("b", "one")]);

  assert_ne!(
    build(first.path(), &scope(&[])).unwrap(),
    build(second.path(), &scope(&[])).unwrap()
  );
}

#[test]
fn nesting_changes_identity() {
  let flat = tree(&[("file.txt", "content")]);
  let nested = tree(&[("sub/file.txt", "content")]);

  assert_ne!(
    build(flat.path(), &scope(&[])).unwrap(),
    build(nested.path(), &scope(&[])).unwrap()
  );
}

#[test]
fn modification_times_are_ignored() {
  let files = [("a.txt", "${x}"), ("dir/b.txt", "b")];
  let first = tree(&files);
  let second = tree(&files);

  let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
  fs::File::options()
    .write(true)
    .open(second.path().join("a.txt"))
    .unwrap()
    .set_modified(old)
    .unwrap();

  let vars = scope(&[("x", "1")]);
  assert_eq!(
    build(first.path(), &vars).unwrap(),
    build(second.path(), &vars).unwrap()
  );
}

#[cfg(unix)]
#[test]
fn permissions_are_ignored() {
  use std::os::unix::fs::PermissionsExt;

  let first = tree(&[("run.sh", "echo ${x}"), ("etc/conf", "c")]);
  let second = tempfile::TempDir::new().unwrap();
  write_files(second.path(), &[("run.sh", "echo ${x}"), ("etc/conf", "c")]);
  fs::set_permissions(second.path().join("run.sh"), fs::Permissions::from_mode(0o755)).unwrap();
  fs::set_permissions(second.path().join("etc"), fs::Permissions::from_mode(0o700)).unwrap();

  let vars = scope(&[("x", "hi")]);
  assert_eq!(
    build(first.path(), &vars).unwrap(),
    build(second.path(), &vars).unwrap()
  );
}

#[test]
fn parallel_and_sequential_agree() {
  let temp = tree(&[
    ("a.txt", "${x}"),
    ("b/c.txt", "${x + 1}"),
    ("b/d/e.txt", "${upper(x)}"),
    ("f.txt", "plain"),
  ]);
  let vars = scope(&[("x", "41")]);

  assert_eq!(
    Archiver::new().build(temp.path(), &vars).unwrap(),
    Archiver::new().parallel(true).build(temp.path(), &vars).unwrap()
  );
}
