//! Fixture builders shared by the data-layer tests.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use super::model::{Column, ColumnKind, Dataset, Partition, PartitionSummary, Record};
use super::reference::StateRegion;

/// A record that passes the baseline eligibility filter.
pub fn eligible(job: &str, employer: &str, city: &str, state: &str, wage: f64) -> Record {
    Record {
        case_status: Some("Certified".into()),
        decision_date: Some("2024-01-15".into()),
        job_title: Some(job.into()),
        soc_code: Some("15-1252".into()),
        soc_title: Some("Software Developers".into()),
        full_time_position: Some("Y".into()),
        employer_name: Some(employer.into()),
        employer_city: Some(city.into()),
        employer_state: Some(state.into()),
        employer_country: Some("UNITED STATES OF AMERICA".into()),
        worksite_city: Some(city.into()),
        worksite_state: Some(state.into()),
        wage_rate_of_pay_from: Some(wage * 1.1),
        wage_unit_of_pay: Some("Year".into()),
        prevailing_wage: Some(wage),
        pw_unit_of_pay: Some("Year".into()),
        pw_wage_level: Some("II".into()),
        h1b_dependent: Some("No".into()),
    }
}

pub fn dataset(records: Vec<Record>) -> Dataset {
    let summary = PartitionSummary {
        partition: Partition::new(2024, 1),
        rows: records.len(),
        quarantined: 0,
    };
    Dataset::concat(vec![(summary, records)])
}

/// Write `records` as a partition file with every column in its declared
/// type, skipping `omit` if given.
pub fn write_partition(
    dir: &Path,
    partition: Partition,
    records: &[Record],
    omit: Option<Column>,
) {
    write_columns(dir, partition, records, omit, None);
}

/// Write a partition whose `PREVAILING_WAGE` column holds raw text.
pub fn write_partition_with_text_wages(
    dir: &Path,
    partition: Partition,
    records: &[Record],
    wages: &[Option<&str>],
) {
    write_columns(dir, partition, records, None, Some(wages));
}

fn write_columns(
    dir: &Path,
    partition: Partition,
    records: &[Record],
    omit: Option<Column>,
    text_wages: Option<&[Option<&str>]>,
) {
    let mut fields = Vec::new();
    let mut arrays: Vec<ArrayRef> = Vec::new();
    for column in Column::ALL {
        if Some(column) == omit {
            continue;
        }
        if let (Column::PrevailingWage, Some(wages)) = (column, text_wages) {
            fields.push(Field::new(column.name(), DataType::Utf8, true));
            arrays.push(Arc::new(StringArray::from(wages.to_vec())));
            continue;
        }
        match column.kind() {
            ColumnKind::Text => {
                fields.push(Field::new(column.name(), DataType::Utf8, true));
                let values: Vec<Option<&str>> = records.iter().map(|r| r.text(column)).collect();
                arrays.push(Arc::new(StringArray::from(values)));
            }
            ColumnKind::Float => {
                fields.push(Field::new(column.name(), DataType::Float64, true));
                let values: Vec<Option<f64>> = records.iter().map(|r| r.float(column)).collect();
                arrays.push(Arc::new(Float64Array::from(values)));
            }
        }
    }
    write_batch(dir, partition, fields, arrays);
}

fn write_batch(dir: &Path, partition: Partition, fields: Vec<Field>, arrays: Vec<ArrayRef>) {
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();
    let file = std::fs::File::create(dir.join(partition.file_name())).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

/// Write bytes that are not a parquet file under the partition's name.
pub fn write_corrupt_partition(dir: &Path, partition: Partition) {
    std::fs::write(dir.join(partition.file_name()), b"definitely not parquet").unwrap();
}

pub fn write_reference(path: &Path, rows: &[StateRegion]) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    for row in rows {
        writer.serialize(row).unwrap();
    }
    writer.flush().unwrap();
}

pub fn region(name: &str, abbreviation: &str, id: u32) -> StateRegion {
    StateRegion {
        name: name.into(),
        abbreviation: abbreviation.into(),
        id,
    }
}
