// src/pipeline.rs

use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::extract::{extract_bed_table, extract_table_links};
use crate::fetch::Fetcher;
use crate::record::BedRecord;
use crate::uf::Uf;
use crate::write::write_records;

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub tables: usize,
    pub states: usize,
    pub output: PathBuf,
}

/// Load the config file, then [`run`].
pub fn run_from_file<P: AsRef<Path>>(config_path: P) -> Result<RunSummary> {
    let config = ExtractionConfig::from_file(config_path)?;
    run(&config)
}

/// Fetch and extract every selected state, then write the output once.
/// Nothing is written unless every page was fetched and parsed.
pub fn run(config: &ExtractionConfig) -> Result<RunSummary> {
    let fetcher = Fetcher::from_config(config)?;
    info!(
        states = ?config.regions.iter().map(|u| u.acronym()).collect::<Vec<_>>(),
        period = %config.period,
        source = %config.source,
        "starting collection"
    );

    let mut records = Vec::new();
    let mut tables = 0;
    for &uf in &config.regions {
        let (state_records, state_tables) = collect_state(&fetcher, config, uf)?;
        records.extend(state_records);
        tables += state_tables;
    }

    write_records(&records, &config.output_path, config.output_format)?;

    let summary = RunSummary {
        records: records.len(),
        tables,
        states: config.regions.len(),
        output: config.output_path.clone(),
    };
    info!(
        records = summary.records,
        tables = summary.tables,
        output = %summary.output.display(),
        "collection finished"
    );
    Ok(summary)
}

/// Every bed record of one state, plus the number of tables read.
#[instrument(level = "info", skip(fetcher, config, uf), fields(uf = %uf))]
pub fn collect_state(
    fetcher: &Fetcher,
    config: &ExtractionConfig,
    uf: Uf,
) -> Result<(Vec<BedRecord>, usize)> {
    let index_url = config.index_url(uf)?;
    let links = fetcher.fetch_with(&index_url, |index| extract_table_links(&index))?;

    let total = links.len();
    let mut records = Vec::new();
    for (i, link) in links.iter().enumerate() {
        info!("UF: {}. Reading table {} out of {}", uf, i + 1, total);
        records.extend(fetcher.fetch_with(link, |doc| {
            extract_bed_table(&doc, uf, config.period, config.invalid_count_policy)
        })?);
    }
    Ok((records, total))
}
