mod common;

use common::{fixture_settings, write_config};
use std::process::Command;
use tempfile::tempdir;

fn cnes_beds() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cnes_beds"));
    cmd.env("RUST_LOG", "off");
    cmd
}

fn config_with(dir: &std::path::Path, overrides: &[(&str, &str)]) -> std::path::PathBuf {
    let mut settings = fixture_settings(&dir.join("out").join("beds.csv"));
    for (k, v) in overrides {
        settings.insert(k.to_string(), v.to_string());
    }
    let pairs: Vec<(&str, &str)> = settings
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    write_config(dir, &pairs)
}

#[test]
fn exits_zero_and_writes_output() {
    let dir = tempdir().unwrap();
    let config = config_with(dir.path(), &[]);

    let out = cnes_beds().arg(&config).output().unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(dir.path().join("out").join("beds.csv").exists());
    assert!(String::from_utf8_lossy(&out.stdout).contains("4 records"));
}

#[test]
fn malformed_document_exits_non_zero() {
    let dir = tempdir().unwrap();
    let config = config_with(dir.path(), &[("INDEX_PATH", "sem_tabela.html")]);

    let out = cnes_beds().arg(&config).output().unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("extract stage failed"), "{stderr}");
    assert!(stderr.contains("bed table not found"), "{stderr}");
    assert!(!dir.path().join("out").join("beds.csv").exists());
}

#[test]
fn missing_config_exits_non_zero() {
    let dir = tempdir().unwrap();
    let out = cnes_beds()
        .arg(dir.path().join("absent.env"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("config stage failed"));
}

#[test]
fn missing_required_key_exits_non_zero() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &[("SOURCE_URL", "http://cnes2.datasus.gov.br")]);

    let out = cnes_beds().arg(&config).output().unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("OUTPUT_PATH"));
}
