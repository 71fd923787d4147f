// src/write/mod.rs

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::config::OutputFormat;
use crate::error::{ExtractError, Result};
use crate::record::BedRecord;

mod columnar;

/// Write `records` to `path`, replacing whatever is there.
///
/// Data goes to a hidden sibling first and is renamed over `path`, so a
/// failed write leaves any previous file untouched.
pub fn write_records<P: AsRef<Path>>(
    records: &[BedRecord],
    path: P,
    format: OutputFormat,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ExtractError::write_io(parent, e))?;
    }

    let tmp_path = temp_sibling(path)?;
    debug!(tmp = %tmp_path.display(), %format, "writing records");

    let written = File::create(&tmp_path).and_then(|file| match format {
        OutputFormat::Csv => write_delimited(file, records, b','),
        OutputFormat::Tsv => write_delimited(file, records, b'\t'),
        OutputFormat::Json => write_json(file, records),
        OutputFormat::Parquet => columnar::write(file, records),
    });
    if let Err(e) = written.and_then(|_| fs::rename(&tmp_path, path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(ExtractError::write_io(path, e));
    }

    info!(path = %path.display(), rows = records.len(), %format, "wrote output");
    Ok(())
}

/// Re-parse a file produced by [`write_records`].
pub fn read_records<P: AsRef<Path>>(path: P, format: OutputFormat) -> Result<Vec<BedRecord>> {
    let path = path.as_ref();
    let read = File::open(path).and_then(|file| match format {
        OutputFormat::Csv => read_delimited(file, b','),
        OutputFormat::Tsv => read_delimited(file, b'\t'),
        OutputFormat::Json => {
            serde_json::from_reader(BufReader::new(file)).map_err(io::Error::other)
        }
        OutputFormat::Parquet => columnar::read(file),
    });
    read.map_err(|e| ExtractError::write_io(path, e))
}

fn temp_sibling(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        ExtractError::write_io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name"),
        )
    })?;
    Ok(path.with_file_name(format!(".{}.tmp", name.to_string_lossy())))
}

fn write_delimited(file: File, records: &[BedRecord], delimiter: u8) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    // header goes out even when there are no rows
    wtr.write_record(BedRecord::COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()
}

fn read_delimited(file: File, delimiter: u8) -> io::Result<Vec<BedRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(BufReader::new(file));
    rdr.deserialize()
        .map(|row| row.map_err(io::Error::from))
        .collect()
}

fn write_json(file: File, records: &[BedRecord]) -> io::Result<()> {
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, records)?;
    out.write_all(b"\n")?;
    out.flush()
}
