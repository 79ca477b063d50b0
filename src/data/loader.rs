use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Column, ColumnKind, Dataset, LoadKey, PartitionSummary, Record};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load every partition of `key` from `data_dir` and concatenate them.
///
/// A partition that cannot be read (missing file, schema mismatch, corrupt
/// data) is logged and skipped. Only when no partition loads at all does
/// this fail, with [`DashboardError::NoPartitions`].
pub fn load_dataset(data_dir: &Path, key: &LoadKey) -> Result<Dataset, DashboardError> {
    let mut loaded = Vec::new();

    for partition in key.partitions() {
        let path = data_dir.join(partition.file_name());
        match read_partition(&path) {
            Ok(part) => {
                log::info!(
                    "Loaded {} with {} rows",
                    partition.file_name(),
                    part.records.len()
                );
                if part.quarantined > 0 {
                    log::warn!(
                        "Quarantined {} rows of {} with non-numeric wage values",
                        part.quarantined,
                        partition.file_name()
                    );
                }
                let summary = PartitionSummary {
                    partition,
                    rows: part.records.len(),
                    quarantined: part.quarantined,
                };
                loaded.push((summary, part.records));
            }
            Err(e) => {
                log::warn!(
                    "Skipping partition {partition} ({}): {e:#}",
                    path.display()
                );
            }
        }
    }

    if loaded.is_empty() {
        return Err(DashboardError::NoPartitions {
            years: key.years.iter().copied().collect(),
            quarters: key.quarters.iter().copied().collect(),
        });
    }

    let dataset = Dataset::concat(loaded);
    log::info!(
        "Combined {} rows from {} partitions",
        dataset.len(),
        dataset.partitions.len()
    );
    for summary in &dataset.partitions {
        log::debug!("  {}: {} rows", summary.partition, summary.rows);
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Single partition
// ---------------------------------------------------------------------------

/// Rows decoded from one partition file.
#[derive(Debug, Default)]
pub struct PartitionRows {
    pub records: Vec<Record>,
    /// Rows dropped because a numeric column held unparseable text.
    pub quarantined: usize,
}

/// Read one partition, projecting the fixed column set.
///
/// Accepted storage types:
/// - text columns: `Utf8`, `LargeUtf8`, `Utf8View`, dictionaries of those
/// - float columns: any integer, float or decimal type, or text holding
///   numbers (rows whose text does not parse are quarantined)
/// - all-null columns of type `Null` for either kind
pub fn read_partition(path: &Path) -> Result<PartitionRows> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let file_schema = builder.schema().clone();
    let mut roots = Vec::with_capacity(Column::ALL.len());
    for column in Column::ALL {
        let idx = file_schema
            .index_of(column.name())
            .map_err(|_| anyhow!("missing column {column}"))?;
        check_type(column, file_schema.field(idx).data_type())?;
        roots.push(idx);
    }

    let mask = ProjectionMask::roots(builder.parquet_schema(), roots);
    let reader = builder
        .with_projection(mask)
        .build()
        .context("building parquet reader")?;

    let mut rows = PartitionRows::default();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        decode_batch(&batch, &mut rows)?;
    }
    Ok(rows)
}

fn is_text(dt: &DataType) -> bool {
    match dt {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => true,
        DataType::Dictionary(_, value) => is_text(value),
        _ => false,
    }
}

fn check_type(column: Column, dt: &DataType) -> Result<()> {
    let ok = match column.kind() {
        ColumnKind::Text => is_text(dt) || *dt == DataType::Null,
        ColumnKind::Float => dt.is_numeric() || is_text(dt) || *dt == DataType::Null,
    };
    if !ok {
        bail!(
            "column {column} has type {dt:?}, expected {}",
            match column.kind() {
                ColumnKind::Text => "text",
                ColumnKind::Float => "a number",
            }
        );
    }
    Ok(())
}

// -- Arrow helpers --

/// A projected column normalised to `Utf8` or `Float64`.
enum Values {
    Text(ArrayRef),
    Float(ArrayRef),
    /// Numbers stored as `Utf8`, parsed per row.
    NumericText(ArrayRef),
}

impl Values {
    fn from_column(column: Column, array: &ArrayRef) -> Result<Self> {
        let text = || cast(array, &DataType::Utf8).with_context(|| format!("casting {column}"));
        Ok(match column.kind() {
            ColumnKind::Text => Values::Text(text()?),
            ColumnKind::Float if is_text(array.data_type()) => Values::NumericText(text()?),
            ColumnKind::Float => Values::Float(
                cast(array, &DataType::Float64).with_context(|| format!("casting {column}"))?,
            ),
        })
    }
}

fn text_at(array: &ArrayRef, row: usize) -> Option<&str> {
    if array.is_null(row) {
        return None;
    }
    Some(array.as_string::<i32>().value(row))
}

/// Parse a numeric cell stored as text. Blank is null; anything else that
/// is not a number is an error carrying the raw value.
fn parse_number(raw: &str) -> std::result::Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(|v| (!v.is_nan()).then_some(v))
        .map_err(|_| raw.to_string())
}

fn decode_batch(batch: &RecordBatch, rows: &mut PartitionRows) -> Result<()> {
    let mut columns = Vec::with_capacity(Column::ALL.len());
    for column in Column::ALL {
        let array = batch
            .column_by_name(column.name())
            .with_context(|| format!("batch missing column {column}"))?;
        columns.push((column, Values::from_column(column, array)?));
    }

    'rows: for row in 0..batch.num_rows() {
        let mut record = Record::default();
        for (column, values) in &columns {
            match values {
                Values::Text(array) => {
                    record.set_text(*column, text_at(array, row).map(str::to_string));
                }
                Values::Float(array) => {
                    let value = if array.is_null(row) {
                        None
                    } else {
                        let v = array.as_primitive::<Float64Type>().value(row);
                        (!v.is_nan()).then_some(v)
                    };
                    record.set_float(*column, value);
                }
                Values::NumericText(array) => {
                    let parsed = match text_at(array, row) {
                        Some(raw) => parse_number(raw),
                        None => Ok(None),
                    };
                    match parsed {
                        Ok(value) => record.set_float(*column, value),
                        Err(raw) => {
                            if rows.quarantined == 0 {
                                log::debug!("First quarantined value in {column}: {raw:?}");
                            }
                            rows.quarantined += 1;
                            continue 'rows;
                        }
                    }
                }
            }
        }
        rows.records.push(record);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Partition;
    use crate::data::test_support::{
        eligible, write_corrupt_partition, write_partition, write_partition_with_text_wages,
    };

    fn rows(prefix: &str, n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| eligible(&format!("{prefix} {i}"), "Acme", "Austin", "TX", 90_000.0))
            .collect()
    }

    #[test]
    fn skips_missing_and_corrupt_partitions() {
        let dir = tempfile::tempdir().unwrap();
        write_partition(dir.path(), Partition::new(2024, 1), &rows("q1", 3), None);
        write_partition(dir.path(), Partition::new(2024, 2), &rows("q2", 2), None);
        write_corrupt_partition(dir.path(), Partition::new(2024, 3));
        write_partition(dir.path(), Partition::new(2024, 4), &rows("q4", 4), None);

        let dataset = load_dataset(dir.path(), &LoadKey::new([2024], 1..=4)).unwrap();
        assert_eq!(dataset.len(), 9);

        let loaded: Vec<String> = dataset
            .partitions
            .iter()
            .map(|p| p.partition.to_string())
            .collect();
        assert_eq!(loaded, ["2024_Q1", "2024_Q2", "2024_Q4"]);

        let titles: Vec<&str> = dataset
            .records
            .iter()
            .filter_map(|r| r.job_title.as_deref())
            .collect();
        assert!(titles.iter().all(|t| !t.starts_with("q3")));
        assert_eq!(titles.first(), Some(&"q1 0"));
        assert_eq!(titles.last(), Some(&"q4 3"));
    }

    #[test]
    fn schema_mismatch_skips_partition() {
        let dir = tempfile::tempdir().unwrap();
        write_partition(
            dir.path(),
            Partition::new(2023, 1),
            &rows("a", 2),
            Some(Column::PwWageLevel),
        );
        write_partition(dir.path(), Partition::new(2023, 2), &rows("b", 1), None);

        let err = read_partition(&dir.path().join(Partition::new(2023, 1).file_name()))
            .unwrap_err();
        assert!(format!("{err:#}").contains("PW_WAGE_LEVEL"));

        let dataset = load_dataset(dir.path(), &LoadKey::new([2023], [1, 2])).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn no_partitions_is_explicit_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(dir.path(), &LoadKey::new([2022], [1, 2])).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::NoPartitions { ref years, ref quarters }
                if years == &[2022] && quarters == &[1, 2]
        ));
    }

    #[test]
    fn round_trips_nulls_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = eligible("Data Engineer", "Acme", "Austin", "TX", 101_000.5);
        record.pw_wage_level = None;
        record.wage_rate_of_pay_from = None;
        write_partition(dir.path(), Partition::new(2024, 1), &[record.clone()], None);

        let part = read_partition(&dir.path().join(Partition::new(2024, 1).file_name())).unwrap();
        assert_eq!(part.records, vec![record]);
        assert_eq!(part.quarantined, 0);
    }

    #[test]
    fn quarantines_unparseable_numeric_text() {
        let dir = tempfile::tempdir().unwrap();
        let records = rows("x", 4);
        write_partition_with_text_wages(
            dir.path(),
            Partition::new(2024, 1),
            &records,
            &[Some("85000"), Some("n/a"), None, Some(" 72000.5 ")],
        );

        let dataset = load_dataset(dir.path(), &LoadKey::new([2024], [1])).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.quarantined(), 1);
        let wages: Vec<Option<f64>> = dataset.records.iter().map(|r| r.prevailing_wage).collect();
        assert_eq!(wages, vec![Some(85_000.0), None, Some(72_000.5)]);
    }

    #[test]
    fn parse_number_rules() {
        assert_eq!(parse_number(""), Ok(None));
        assert_eq!(parse_number("  "), Ok(None));
        assert_eq!(parse_number("NaN"), Ok(None));
        assert_eq!(parse_number("1e5"), Ok(Some(100_000.0)));
        assert_eq!(parse_number("$100,000"), Err("$100,000".to_string()));
    }
}
