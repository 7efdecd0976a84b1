use dupescan::index::{DuplicateIndex, IndexError, SqliteIndex};
use dupescan::scanner::{Fingerprint, Fingerprinter};
use tempfile::tempdir;

fn fp(content: &str) -> Fingerprint {
    Fingerprinter::default().fingerprint_bytes(content.as_bytes())
}

#[test]
fn test_on_disk_index_keeps_namespaces_apart() {
    let dir = tempdir().unwrap();
    let mut index = SqliteIndex::create(&dir.path().join("idx.db")).unwrap();
    let (x, y) = (fp("x"), fp("y"));

    index.record(&x, "/r/1").unwrap();
    index.record(&y, "/r/2").unwrap();
    index.record(&x, "/r/3").unwrap();
    index.record(&y, "/r/4").unwrap();
    index.record(&x, "/r/5").unwrap();

    assert_eq!(index.list_paths(&x).unwrap(), vec!["/r/1", "/r/3", "/r/5"]);
    assert_eq!(index.list_paths(&y).unwrap(), vec!["/r/2", "/r/4"]);
    assert_eq!(index.namespace_count().unwrap(), 2);

    let seqs: Vec<u64> = index.list_records(&x).unwrap().iter().map(|r| r.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
}

#[test]
fn test_order_survives_many_appends() {
    let dir = tempdir().unwrap();
    let mut index = SqliteIndex::create(&dir.path().join("idx.db")).unwrap();
    let key = fp("bulk");
    let handle = index.ensure_namespace(&key).unwrap();

    let expected: Vec<String> = (0..500).map(|i| format!("/bulk/{i:04}")).collect();
    for (i, path) in expected.iter().enumerate() {
        let seq = index.append(handle, path).unwrap();
        assert_eq!(seq, i as u64 + 1);
    }

    assert_eq!(index.list_paths(&key).unwrap(), expected);
}

#[test]
fn test_two_stores_are_independent() {
    let dir = tempdir().unwrap();
    let mut first = SqliteIndex::create(&dir.path().join("one.db")).unwrap();
    let mut second = SqliteIndex::create(&dir.path().join("two.db")).unwrap();
    let key = fp("shared");

    first.record(&key, "/first").unwrap();

    assert_eq!(first.list_paths(&key).unwrap(), vec!["/first"]);
    assert!(second.list_paths(&key).unwrap().is_empty());
    assert_eq!(second.record(&key, "/second").unwrap(), 1);
}

#[test]
fn test_store_file_cannot_be_reused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("idx.db");
    SqliteIndex::create(&path).unwrap().close().unwrap();

    assert!(matches!(
        SqliteIndex::create(&path),
        Err(IndexError::AlreadyExists(ref p)) if p == &path
    ));
}
