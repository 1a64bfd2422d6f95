//! Public helper behavior as seen by the executor's front ends

use pipe3_core::{ErrorKind, HexDump, Pipe3Error, full_mkdir, hex_line, hex_line_at};

#[test]
fn hex_cursor_walks_whole_buffer() {
    let data: Vec<u8> = (0u8..40).collect();

    let mut lines = Vec::new();
    let mut pos = 1;
    while pos != 0 {
        let (line, next) = hex_line_at(&data, pos).unwrap();
        lines.push(line);
        pos = next;
    }

    let dumped: Vec<String> = HexDump::new(&data).collect();
    assert_eq!(lines, dumped);
    assert_eq!(lines.len(), 3);
}

#[test]
fn hex_line_matches_documented_layout() {
    let line = hex_line(b"Hello, world!\n\x00\xff");
    assert_eq!(
        line,
        "48 65 6C 6C  6F 2C 20 77  6F 72 6C 64  21 0A 00 FF  Hello, world!..."
    );
}

#[test]
fn hex_errors_are_config_errors() {
    let err = hex_line_at(b"abc", 0).unwrap_err();
    assert!(matches!(err, Pipe3Error::HexPosition));
    assert_eq!(err.kind(), ErrorKind::Config);

    let err = hex_line_at(b"abc", 9).unwrap_err();
    assert_eq!(err.to_string(), "hexline: position (9) exceeds length (3)");
}

#[test]
fn mkdir_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x/y/z");

    full_mkdir(&path).unwrap();
    full_mkdir(&path).unwrap();
    assert!(path.is_dir());
}

#[test]
fn mkdir_over_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain");
    std::fs::write(&file, b"").unwrap();

    let err = full_mkdir(&file).unwrap_err();
    assert!(matches!(err, Pipe3Error::Directory { .. }));
    assert_eq!(err.kind(), ErrorKind::Io);
}
