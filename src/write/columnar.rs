// src/write/columnar.rs

use arrow::{
    array::{Array, ArrayRef, StringArray, UInt32Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::File,
    io::{self, BufWriter},
    sync::Arc,
};

use crate::record::{BedRecord, Period};

pub fn schema() -> Schema {
    let text = |name: &str| Field::new(name, DataType::Utf8, false);
    let count = |name: &str| Field::new(name, DataType::UInt32, false);
    Schema::new(vec![
        text("cnes"),
        text("facility_name"),
        text("uf"),
        text("municipality"),
        text("bed_type"),
        text("specialty"),
        count("existing"),
        count("sus"),
        count("non_sus"),
        text("period"),
    ])
}

fn to_batch(schema: Arc<Schema>, records: &[BedRecord]) -> io::Result<RecordBatch> {
    let text = |f: fn(&BedRecord) -> &str| -> ArrayRef {
        Arc::new(StringArray::from_iter_values(records.iter().map(f)))
    };
    let count = |f: fn(&BedRecord) -> u32| -> ArrayRef {
        Arc::new(UInt32Array::from_iter_values(records.iter().map(f)))
    };
    let periods: Vec<String> = records.iter().map(|r| r.period.to_string()).collect();

    RecordBatch::try_new(
        schema,
        vec![
            text(|r| r.cnes.as_str()),
            text(|r| r.facility_name.as_str()),
            text(|r| r.uf.as_str()),
            text(|r| r.municipality.as_str()),
            text(|r| r.bed_type.as_str()),
            text(|r| r.specialty.as_str()),
            count(|r| r.existing),
            count(|r| r.sus),
            count(|r| r.non_sus),
            Arc::new(StringArray::from(periods)),
        ],
    )
    .map_err(io::Error::other)
}

pub(super) fn write(file: File, records: &[BedRecord]) -> io::Result<()> {
    let schema = Arc::new(schema());
    let batch = to_batch(schema.clone(), records)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), schema, Some(props))
        .map_err(io::Error::other)?;
    writer.write(&batch).map_err(io::Error::other)?;
    writer.close().map_err(io::Error::other)?;
    Ok(())
}

pub(super) fn read(file: File) -> io::Result<Vec<BedRecord>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(io::Error::other)?
        .with_batch_size(1024)
        .build()
        .map_err(io::Error::other)?;

    let mut out = Vec::new();
    for batch in reader {
        let batch = batch.map_err(io::Error::other)?;
        let text = |i: usize| column::<StringArray>(&batch, i);
        let count = |i: usize| column::<UInt32Array>(&batch, i);
        let (cnes, name, uf, municipality, bed_type, specialty) =
            (text(0)?, text(1)?, text(2)?, text(3)?, text(4)?, text(5)?);
        let (existing, sus, non_sus) = (count(6)?, count(7)?, count(8)?);
        let period = text(9)?;

        for row in 0..batch.num_rows() {
            out.push(BedRecord {
                cnes: cnes.value(row).to_string(),
                facility_name: name.value(row).to_string(),
                uf: uf.value(row).to_string(),
                municipality: municipality.value(row).to_string(),
                bed_type: bed_type.value(row).to_string(),
                specialty: specialty.value(row).to_string(),
                existing: existing.value(row),
                sus: sus.value(row),
                non_sus: non_sus.value(row),
                period: period
                    .value(row)
                    .parse::<Period>()
                    .map_err(io::Error::other)?,
            });
        }
    }
    Ok(out)
}

fn column<T: Array + 'static>(batch: &RecordBatch, idx: usize) -> io::Result<&T> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unexpected type for column {}", batch.schema().field(idx).name()),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_matches_record_columns() {
        let names: Vec<String> = schema().fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(names, BedRecord::COLUMNS);
    }

    #[test]
    fn batch_has_one_row_per_record() {
        let record = BedRecord {
            cnes: "1".to_string(),
            facility_name: "A".to_string(),
            uf: "AC".to_string(),
            municipality: "RIO BRANCO".to_string(),
            bed_type: "PEDIATRICO".to_string(),
            specialty: "PEDIATRIA CLINICA".to_string(),
            existing: 3,
            sus: 2,
            non_sus: 1,
            period: Period::new(2020, 1).unwrap(),
        };
        let batch = to_batch(Arc::new(schema()), &[record.clone(), record]).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 10);
    }
}
