// src/config.rs

use std::{
    collections::HashMap,
    env, fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use tracing::debug;
use url::Url;

use crate::error::{ExtractError, Result};
use crate::record::Period;
use crate::uf::Uf;

/// Where the collector looks for its settings when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/config_file.env";

/// Index page of the registry's bed-type indicator, relative to `SOURCE_URL`.
pub const DEFAULT_INDEX_PATH: &str = "Mod_Ind_Tipo_Leito.asp?VEstado={ibge}";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ATTEMPTS: u32 = 1;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
    Parquet,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            "parquet" => Ok(OutputFormat::Parquet),
            other => Err(format!(
                "invalid output format `{other}`, available: csv, tsv, json, parquet"
            )),
        }
    }
}

/// What to do with a bed count cell that is empty, non-numeric or negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidCountPolicy {
    /// Drop the whole row.
    #[default]
    Skip,
    /// Keep the row with the count set to 0.
    Zero,
}

impl FromStr for InvalidCountPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(InvalidCountPolicy::Skip),
            "zero" => Ok(InvalidCountPolicy::Zero),
            other => Err(format!(
                "invalid count policy `{other}`, expected `skip` or `zero`"
            )),
        }
    }
}

/// Fixed attempts, fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// Settings for one run. Built once by the loader and never mutated.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Registry base; always ends with `/` so relative joins stay inside it.
    pub source: Url,
    pub index_path: String,
    pub output_path: PathBuf,
    pub output_format: OutputFormat,
    pub regions: Vec<Uf>,
    pub period: Period,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub invalid_count_policy: InvalidCountPolicy,
}

impl ExtractionConfig {
    /// Load an env-style `KEY=VALUE` file. The process environment is left alone.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            ExtractError::config(format!("cannot read {}: {e}", path.display()))
        })?;

        let mut values = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                ExtractError::config(format!("malformed line in {}: {e}", path.display()))
            })?;
            values.insert(key, value);
        }
        debug!(path = %path.display(), keys = values.len(), "loaded config file");

        Self::from_map(&values)
    }

    pub fn from_map(values: &HashMap<String, String>) -> Result<Self> {
        let lookup = |key: &str| {
            values
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            lookup(key).ok_or_else(|| ExtractError::config(format!("missing required key {key}")))
        };

        let source = parse_source(required("SOURCE_URL")?).map_err(ExtractError::config)?;
        let output_path = PathBuf::from(required("OUTPUT_PATH")?);

        let output_format = match lookup("OUTPUT_FORMAT") {
            Some(v) => v.parse().map_err(ExtractError::config)?,
            None => OutputFormat::from_path(&output_path).unwrap_or(OutputFormat::Csv),
        };

        let regions = match lookup("REGION") {
            Some(v) => Uf::parse_list(v).map_err(ExtractError::config)?,
            None => Uf::ALL.to_vec(),
        };

        let period = match lookup("PERIOD") {
            Some(v) => v.parse().map_err(ExtractError::config)?,
            None => Period::current(),
        };

        let timeout_secs = parse_number(lookup("REQUEST_TIMEOUT"), "REQUEST_TIMEOUT")?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let attempts = parse_number(lookup("MAX_REQUEST_RETRIES"), "MAX_REQUEST_RETRIES")?
            .unwrap_or(DEFAULT_ATTEMPTS as u64);
        if attempts == 0 || attempts > u32::MAX as u64 {
            return Err(ExtractError::config(
                "MAX_REQUEST_RETRIES must be at least 1",
            ));
        }
        let delay_ms = parse_number(lookup("RETRY_DELAY_MS"), "RETRY_DELAY_MS")?
            .unwrap_or(DEFAULT_RETRY_DELAY_MS);

        let invalid_count_policy = match lookup("INVALID_COUNT_POLICY") {
            Some(v) => v.parse().map_err(ExtractError::config)?,
            None => InvalidCountPolicy::default(),
        };

        let config = Self {
            source,
            index_path: lookup("INDEX_PATH").unwrap_or(DEFAULT_INDEX_PATH).to_string(),
            output_path,
            output_format,
            regions,
            period,
            request_timeout: Duration::from_secs(timeout_secs),
            retry: RetryPolicy {
                attempts: attempts as u32,
                delay: Duration::from_millis(delay_ms),
            },
            invalid_count_policy,
        };

        // fail now rather than halfway through the crawl
        for uf in &config.regions {
            config.index_url(*uf)?;
        }
        Ok(config)
    }

    /// Index page listing every bed-type table for `uf`.
    pub fn index_url(&self, uf: Uf) -> Result<Url> {
        let relative = self
            .index_path
            .replace("{ibge}", &uf.ibge_code().to_string())
            .replace("{uf}", uf.acronym())
            .replace("{period}", &self.period.compact());
        self.source.join(&relative).map_err(|e| {
            ExtractError::config(format!("invalid INDEX_PATH `{}`: {e}", self.index_path))
        })
    }
}

fn parse_number(value: Option<&str>, key: &str) -> Result<Option<u64>> {
    value
        .map(|v| {
            v.parse::<u64>()
                .map_err(|_| ExtractError::config(format!("{key} must be a whole number, got `{v}`")))
        })
        .transpose()
}

/// Accepts http(s) and file URLs, or a filesystem directory.
fn parse_source(raw: &str) -> std::result::Result<Url, String> {
    match Url::parse(raw) {
        Ok(url) => match url.scheme() {
            "http" | "https" | "file" => Ok(with_trailing_slash(url)),
            other => Err(format!("unsupported SOURCE_URL scheme `{other}`")),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let path = Path::new(raw);
            let absolute = if path.is_absolute() {
                path.to_path_buf()
            } else {
                env::current_dir()
                    .map_err(|e| format!("cannot resolve SOURCE_URL `{raw}`: {e}"))?
                    .join(path)
            };
            Url::from_directory_path(&absolute)
                .map_err(|_| format!("SOURCE_URL `{raw}` is not a usable directory path"))
        }
        Err(e) => Err(format!("invalid SOURCE_URL `{raw}`: {e}")),
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_env(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    fn minimal() -> HashMap<String, String> {
        HashMap::from([
            ("SOURCE_URL".to_string(), "http://cnes2.datasus.gov.br".to_string()),
            ("OUTPUT_PATH".to_string(), "output/Brazil_Beds.csv".to_string()),
        ])
    }

    #[test]
    fn loads_full_file() {
        let f = write_env(
            "# registry settings\n\
             SOURCE_URL=http://cnes2.datasus.gov.br/\n\
             OUTPUT_PATH=output/RJ_Beds.parquet\n\
             REGION=RJ,SP\n\
             PERIOD=2021-03\n\
             REQUEST_TIMEOUT=10\n\
             MAX_REQUEST_RETRIES=5\n\
             RETRY_DELAY_MS=250\n\
             INVALID_COUNT_POLICY=zero\n",
        );
        let cfg = ExtractionConfig::from_file(f.path()).unwrap();

        assert_eq!(cfg.source.as_str(), "http://cnes2.datasus.gov.br/");
        assert_eq!(cfg.output_path, PathBuf::from("output/RJ_Beds.parquet"));
        assert_eq!(cfg.output_format, OutputFormat::Parquet);
        assert_eq!(cfg.regions, vec![Uf::RJ, Uf::SP]);
        assert_eq!(cfg.period.to_string(), "2021-03");
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));
        assert_eq!(cfg.retry.attempts, 5);
        assert_eq!(cfg.retry.delay, Duration::from_millis(250));
        assert_eq!(cfg.invalid_count_policy, InvalidCountPolicy::Zero);
    }

    #[test]
    fn defaults_apply() {
        let cfg = ExtractionConfig::from_map(&minimal()).unwrap();
        assert_eq!(cfg.regions.len(), 27);
        assert_eq!(cfg.output_format, OutputFormat::Csv);
        assert_eq!(cfg.index_path, DEFAULT_INDEX_PATH);
        assert_eq!(cfg.retry, RetryPolicy::default());
        assert_eq!(cfg.invalid_count_policy, InvalidCountPolicy::Skip);
        assert_eq!(cfg.period, Period::current());
    }

    #[test]
    fn missing_required_keys_fail() {
        for key in ["SOURCE_URL", "OUTPUT_PATH"] {
            let mut values = minimal();
            values.remove(key);
            let err = ExtractionConfig::from_map(&values).unwrap_err();
            assert!(matches!(err, ExtractError::Config(ref m) if m.contains(key)), "{err}");
        }
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let f = write_env("SOURCE_URL=http://cnes2.datasus.gov.br\nOUTPUT_PATH=\n");
        let err = ExtractionConfig::from_file(f.path()).unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
    }

    #[test]
    fn unreadable_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExtractionConfig::from_file(dir.path().join("absent.env")).unwrap_err();
        assert!(matches!(err, ExtractError::Config(ref m) if m.contains("cannot read")));
    }

    #[test]
    fn rejects_bad_values() {
        for (key, value) in [
            ("REGION", "RJ,ZZ"),
            ("PERIOD", "2021-13"),
            ("OUTPUT_FORMAT", "xlsx"),
            ("MAX_REQUEST_RETRIES", "0"),
            ("REQUEST_TIMEOUT", "ten"),
            ("INVALID_COUNT_POLICY", "guess"),
            ("SOURCE_URL", "ftp://cnes2.datasus.gov.br"),
        ] {
            let mut values = minimal();
            values.insert(key.to_string(), value.to_string());
            assert!(
                matches!(ExtractionConfig::from_map(&values), Err(ExtractError::Config(_))),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn index_url_expands_template() {
        let mut values = minimal();
        values.insert("PERIOD".to_string(), "202012".to_string());
        values.insert(
            "INDEX_PATH".to_string(),
            "Mod_Ind_Tipo_Leito.asp?VEstado={ibge}&VComp={period}&uf={uf}".to_string(),
        );
        let cfg = ExtractionConfig::from_map(&values).unwrap();
        assert_eq!(
            cfg.index_url(Uf::RJ).unwrap().as_str(),
            "http://cnes2.datasus.gov.br/Mod_Ind_Tipo_Leito.asp?VEstado=33&VComp=202012&uf=RJ"
        );
    }

    #[test]
    fn directory_source_becomes_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let mut values = minimal();
        values.insert(
            "SOURCE_URL".to_string(),
            dir.path().to_string_lossy().to_string(),
        );
        values.insert("INDEX_PATH".to_string(), "index_{uf}.html".to_string());
        let cfg = ExtractionConfig::from_map(&values).unwrap();
        assert_eq!(cfg.source.scheme(), "file");
        let index = cfg.index_url(Uf::SP).unwrap();
        assert_eq!(
            index.to_file_path().unwrap(),
            dir.path().join("index_SP.html")
        );
    }

    #[test]
    fn base_path_keeps_last_segment() {
        let mut values = minimal();
        values.insert(
            "SOURCE_URL".to_string(),
            "https://mirror.test/cnes".to_string(),
        );
        let cfg = ExtractionConfig::from_map(&values).unwrap();
        assert!(cfg
            .index_url(Uf::AC)
            .unwrap()
            .as_str()
            .starts_with("https://mirror.test/cnes/Mod_Ind_Tipo_Leito.asp"));
    }
}
