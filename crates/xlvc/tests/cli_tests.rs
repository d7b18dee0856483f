use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

use xlvc::codec::CodecOptions;
use xlvc::{Cell, CellValue, Document};
use xlvc_model::document::DocumentMetadata;
use xlvc_model::sheet::Sheet;

fn cli_bin() -> PathBuf {
    // cargo test builds the test binary in the target directory.
    // The CLI binary is built separately with the "cli" feature.
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // crates/
    path.pop(); // project root
    path.push("target");
    path.push("debug");
    path.push("xlvc");
    path
}

fn fixture_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn create_fixture() -> PathBuf {
    let dir = fixture_path();
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("cli_test.xlsx");
    if path.exists() {
        return path;
    }

    let mut sheet = Sheet::new("Sheet1", 0);
    sheet.cells.insert("A1".to_string(), Cell::new(CellValue::String("Name".to_string())));
    sheet.cells.insert("B1".to_string(), Cell::new(CellValue::String("Value".to_string())));
    sheet.cells.insert("A2".to_string(), Cell::new(CellValue::String("Alpha".to_string())));
    sheet.cells.insert("B2".to_string(), Cell::new(CellValue::Number(100.0)));

    let doc = Document::build(DocumentMetadata::default(), Default::default(), vec![sheet], BTreeMap::new()).unwrap();
    xlvc::codec::encode_file(&doc, &path, &CodecOptions::default()).unwrap();
    path
}

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(cli_bin())
        .args(args)
        .output()
        .expect("failed to execute CLI binary")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_convert_writes_chunk_directory() {
    let fixture = create_fixture();
    let dest = fixture_path().join("cli_test_chunks");
    let _ = std::fs::remove_dir_all(&dest);

    let output = run_cli(&["convert", fixture.to_str().unwrap(), "--to", dest.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(dest.join(".chunks_manifest.json").exists());
    assert!(dest.join("workbook.json").exists());
}

#[test]
fn test_status_reports_up_to_date_after_convert() {
    let fixture = create_fixture();
    let dest = fixture_path().join("cli_test_status_chunks");
    let _ = std::fs::remove_dir_all(&dest);

    run_cli(&["convert", fixture.to_str().unwrap(), "--to", dest.to_str().unwrap()]);
    let output = run_cli(&["status", fixture.to_str().unwrap(), "--chunks", dest.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("up to date"));
}

#[test]
fn test_status_reports_stale_without_chunks() {
    let fixture = create_fixture();
    let dest = fixture_path().join("cli_test_missing_chunks");
    let _ = std::fs::remove_dir_all(&dest);

    let output = run_cli(&["status", fixture.to_str().unwrap(), "--chunks", dest.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("stale"));
}

#[test]
fn test_convert_then_restore_roundtrips_sheet_names() {
    let fixture = create_fixture();
    let dest = fixture_path().join("cli_test_restore_chunks");
    let _ = std::fs::remove_dir_all(&dest);
    let restored = fixture_path().join("cli_test_restored.xlsx");

    run_cli(&["convert", fixture.to_str().unwrap(), "--to", dest.to_str().unwrap()]);
    let output = run_cli(&["restore", dest.to_str().unwrap(), restored.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let doc = xlvc::codec::decode_file(&restored, &CodecOptions::default()).unwrap();
    assert_eq!(doc.sheet_names(), vec!["Sheet1"]);
}
