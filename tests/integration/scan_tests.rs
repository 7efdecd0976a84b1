use super::common::{recorded, scan, store_entries, write_file};
use dupescan::error::ScanError;
use dupescan::scanner::FingerprintAlgorithm;
use dupescan::session::{ScanOptions, ScanSession};
use tempfile::tempdir;

#[test]
fn test_flat_directory_groups_identical_files() {
    let root = tempdir().unwrap();
    let store = tempdir().unwrap();
    write_file(root.path(), "A", b"x");
    write_file(root.path(), "B", b"x");
    write_file(root.path(), "C", b"y");

    let report = scan(root.path(), store.path()).unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(
        report.groups[0].paths,
        vec![recorded(root.path(), "A"), recorded(root.path(), "B")]
    );
    assert_eq!(report.stats.files_scanned, 3);
    assert!(store_entries(store.path()).is_empty());
}

#[test]
fn test_nested_duplicate_listed_in_discovery_order() {
    let root = tempdir().unwrap();
    let store = tempdir().unwrap();
    write_file(root.path(), "f", b"same");
    write_file(root.path(), "d/f", b"same");

    let report = scan(root.path(), store.path()).unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(
        report.groups[0].paths,
        vec![recorded(root.path(), "f"), recorded(root.path(), "d/f")]
    );
    assert_eq!(report.stats.directories_scanned, 2);
}

#[test]
fn test_breadth_first_across_levels() {
    let root = tempdir().unwrap();
    let store = tempdir().unwrap();
    write_file(root.path(), "a/b/c/deep", b"dup");
    write_file(root.path(), "z/shallow", b"dup");
    write_file(root.path(), "top", b"dup");

    let report = scan(root.path(), store.path()).unwrap();

    assert_eq!(
        report.groups[0].paths,
        vec![
            recorded(root.path(), "top"),
            recorded(root.path(), "z/shallow"),
            recorded(root.path(), "a/b/c/deep"),
        ]
    );
}

#[test]
fn test_nonexistent_root_aborts_and_cleans_up() {
    let parent = tempdir().unwrap();
    let store = tempdir().unwrap();
    let missing = parent.path().join("does-not-exist");

    let err = scan(&missing, store.path()).unwrap_err();

    match err {
        ScanError::DirectoryReadFailed { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }
    assert!(store_entries(store.path()).is_empty());
}

#[test]
fn test_root_that_is_a_file_aborts() {
    let root = tempdir().unwrap();
    let store = tempdir().unwrap();
    let file = write_file(root.path(), "plain.txt", b"data");

    let err = scan(&file, store.path()).unwrap_err();
    assert!(matches!(err, ScanError::DirectoryReadFailed { .. }));
    assert!(store_entries(store.path()).is_empty());
}

#[test]
fn test_empty_tree_has_no_groups() {
    let root = tempdir().unwrap();
    let store = tempdir().unwrap();

    let report = scan(root.path(), store.path()).unwrap();

    assert!(report.groups.is_empty());
    assert!(!report.has_duplicates());
    assert_eq!(report.stats.files_scanned, 0);
    assert_eq!(report.stats.directories_scanned, 1);
    assert!(store_entries(store.path()).is_empty());
}

#[test]
fn test_unique_files_have_no_groups() {
    let root = tempdir().unwrap();
    let store = tempdir().unwrap();
    for (i, content) in ["one", "two", "three"].iter().enumerate() {
        write_file(root.path(), &format!("f{i}"), content.as_bytes());
    }

    let report = scan(root.path(), store.path()).unwrap();
    assert!(report.groups.is_empty());
    assert_eq!(report.stats.distinct_fingerprints, 3);
}

#[test]
fn test_empty_files_are_duplicates_of_each_other() {
    let root = tempdir().unwrap();
    let store = tempdir().unwrap();
    write_file(root.path(), "e1", b"");
    write_file(root.path(), "e2", b"");

    let report = scan(root.path(), store.path()).unwrap();
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
}

#[test]
fn test_sha256_finds_the_same_groups() {
    let root = tempdir().unwrap();
    let store = tempdir().unwrap();
    write_file(root.path(), "a", b"content");
    write_file(root.path(), "b", b"content");

    let options =
        ScanOptions::new(root.path(), store.path()).with_algorithm(FingerprintAlgorithm::Sha256);
    let report = ScanSession::new(options).run().unwrap();

    assert_eq!(report.algorithm, FingerprintAlgorithm::Sha256);
    assert_eq!(
        report.groups[0].fingerprint_hex(),
        "ed7002b439e9ac845f22357d822bac1444730fbdb6016d3ec9432297b9ec9f73"
    );
}

#[test]
fn test_large_files_differing_in_last_byte() {
    let root = tempdir().unwrap();
    let store = tempdir().unwrap();
    let mut data = vec![7u8; 300 * 1024];
    write_file(root.path(), "big1", &data);
    write_file(root.path(), "big2", &data);
    *data.last_mut().unwrap() = 8;
    write_file(root.path(), "big3", &data);

    let report = scan(root.path(), store.path()).unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(
        report.groups[0].paths,
        vec![recorded(root.path(), "big1"), recorded(root.path(), "big2")]
    );
    assert_eq!(report.stats.bytes_hashed, 3 * 300 * 1024);
}

#[test]
fn test_unicode_and_spaces_in_names() {
    let root = tempdir().unwrap();
    let store = tempdir().unwrap();
    write_file(root.path(), "résumé final.txt", b"cv");
    write_file(root.path(), "日本/コピー.txt", b"cv");

    let report = scan(root.path(), store.path()).unwrap();
    assert_eq!(report.groups.len(), 1);
    assert!(report.groups[0].paths[0].ends_with("résumé final.txt"));
    assert!(report.groups[0].paths[1].ends_with("コピー.txt"));
}

#[test]
fn test_multiple_groups_are_reported_separately() {
    let root = tempdir().unwrap();
    let store = tempdir().unwrap();
    write_file(root.path(), "a1", b"alpha");
    write_file(root.path(), "a2", b"alpha");
    write_file(root.path(), "b1", b"beta");
    write_file(root.path(), "sub/b2", b"beta");
    write_file(root.path(), "sub/b3", b"beta");

    let report = scan(root.path(), store.path()).unwrap();

    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(report.groups[1].len(), 3);
    assert_eq!(report.stats.duplicate_groups, 2);
    assert_eq!(report.stats.duplicate_files, 3);
}

#[cfg(unix)]
mod symlinks {
    use super::*;
    use dupescan::session::UnreadablePolicy;
    use std::os::unix::fs::symlink;

    #[test]
    fn test_file_link_duplicates_its_target_by_default() {
        let root = tempdir().unwrap();
        let store = tempdir().unwrap();
        write_file(root.path(), "a", b"hello");
        symlink(root.path().join("a"), root.path().join("link")).unwrap();

        let report = scan(root.path(), store.path()).unwrap();

        assert_eq!(report.groups.len(), 1);
        assert_eq!(
            report.groups[0].paths,
            vec![recorded(root.path(), "a"), recorded(root.path(), "link")]
        );
        assert_eq!(report.stats.files_scanned, 2);
        assert_eq!(report.stats.skipped_entries, 0);
    }

    #[test]
    fn test_directory_links_skipped_by_default() {
        let root = tempdir().unwrap();
        let store = tempdir().unwrap();
        write_file(root.path(), "d/file", b"x");
        symlink(root.path().join("d"), root.path().join("alias")).unwrap();

        let report = scan(root.path(), store.path()).unwrap();

        assert!(report.groups.is_empty());
        assert_eq!(report.stats.files_scanned, 1);
        assert_eq!(report.stats.skipped_entries, 1);
    }

    #[test]
    fn test_followed_directory_link_is_traversed() {
        let root = tempdir().unwrap();
        let store = tempdir().unwrap();
        write_file(root.path(), "d/file", b"x");
        symlink(root.path().join("d"), root.path().join("alias")).unwrap();

        let options = ScanOptions::new(root.path(), store.path()).with_follow_symlinks(true);
        let report = ScanSession::new(options).run().unwrap();

        // `alias` and `d` are the same directory, listed once.
        assert_eq!(report.stats.files_scanned, 1);
        assert_eq!(report.stats.revisited_directories, 1);
        assert!(report.groups.is_empty());
    }

    #[test]
    fn test_directory_cycle_terminates() {
        let root = tempdir().unwrap();
        let store = tempdir().unwrap();
        write_file(root.path(), "d/file", b"x");
        symlink(root.path(), root.path().join("d").join("back")).unwrap();

        let options = ScanOptions::new(root.path(), store.path()).with_follow_symlinks(true);
        let report = ScanSession::new(options).run().unwrap();

        assert_eq!(report.stats.files_scanned, 1);
        assert_eq!(report.stats.revisited_directories, 1);
        assert!(report.groups.is_empty());
        assert!(store_entries(store.path()).is_empty());
    }

    #[test]
    fn test_dangling_link_follows_unreadable_policy() {
        let root = tempdir().unwrap();
        let store = tempdir().unwrap();
        write_file(root.path(), "real", b"x");
        symlink(root.path().join("gone"), root.path().join("dangling")).unwrap();

        let err = scan(root.path(), store.path()).unwrap_err();
        match err {
            ScanError::FileReadFailed { path, .. } => {
                assert_eq!(path, root.path().join("dangling"))
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store_entries(store.path()).is_empty());

        let options = ScanOptions::new(root.path(), store.path())
            .with_unreadable_policy(UnreadablePolicy::Skip);
        let report = ScanSession::new(options).run().unwrap();
        assert_eq!(report.stats.skipped_files, 1);
        assert_eq!(report.stats.files_scanned, 1);
    }
}
