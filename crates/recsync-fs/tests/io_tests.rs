use recsync_fs::{NormalizedPath, io};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("record.json"));

    io::write_atomic(&path, b"{\"id\":\"1\"}").unwrap();

    let content = fs::read_to_string(path.to_native()).unwrap();
    assert_eq!(content, "{\"id\":\"1\"}");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("record.txt");
    fs::write(&file_path, "original").unwrap();

    io::write_atomic(&NormalizedPath::new(&file_path), b"updated").unwrap();

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "updated");
}

#[test]
fn test_write_text_creates_missing_parents() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("a").join("b").join("c.yaml"));

    io::write_text(&path, "v: 1\n").unwrap();

    assert_eq!(io::read_text(&path).unwrap(), "v: 1\n");
}

#[test]
fn test_write_atomic_leaves_no_temp_file() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("target.txt"));

    io::write_text(&path, "content").unwrap();

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}

#[test]
fn test_read_text_nonexistent_file_is_error() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("missing.txt"));
    assert!(io::read_text(&path).is_err());
}

#[test]
fn test_read_text_opt_maps_missing_to_none() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("missing.txt"));
    assert_eq!(io::read_text_opt(&path).unwrap(), None);
}

#[test]
fn test_remove_file_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("gone.txt"));
    io::write_text(&path, "x").unwrap();

    io::remove_file(&path).unwrap();
    io::remove_file(&path).unwrap();

    assert!(!path.exists());
}
