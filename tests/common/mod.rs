#![allow(dead_code)]

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Write an env-style config file into `dir` and return its path.
pub fn write_config(dir: &Path, pairs: &[(&str, &str)]) -> PathBuf {
    let body: String = pairs
        .iter()
        .map(|(k, v)| format!("{k}='{v}'\n"))
        .collect();
    let path = dir.join("config_file.env");
    fs::write(&path, body).unwrap();
    path
}

/// Settings pointing the collector at the local fixture pages.
pub fn fixture_settings(output: &Path) -> HashMap<String, String> {
    HashMap::from([
        (
            "SOURCE_URL".to_string(),
            fixtures_dir().to_string_lossy().to_string(),
        ),
        ("INDEX_PATH".to_string(), "index_{uf}.html".to_string()),
        ("OUTPUT_PATH".to_string(), output.to_string_lossy().to_string()),
        ("REGION".to_string(), "RJ".to_string()),
        ("PERIOD".to_string(), "2021-03".to_string()),
        ("RETRY_DELAY_MS".to_string(), "1".to_string()),
    ])
}
