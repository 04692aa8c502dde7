//! Segment - Columnar storage format
//!
//! A segment is an Arrow IPC file (Feather v2) holding the rows of one
//! partition, one UTF-8 column per [`Field`]. The reader is lenient about the
//! files it accepts so that segments produced by other tools load too:
//! extra columns are ignored, missing attribute columns read as null and
//! non-string columns are cast to UTF-8.

use crate::error::{Result, StorageError};
use arrow::array::{Array, ArrayRef, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field as ArrowField, Schema, SchemaRef};
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use custdb_core::{Field, Record};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::Arc;

/// Suffix of the scratch file a segment is written to before being renamed
const TMP_SUFFIX: &str = ".tmp";

/// Arrow schema of a segment written by this crate
pub fn record_schema() -> SchemaRef {
    let fields: Vec<ArrowField> = Field::ALL
        .iter()
        .map(|field| ArrowField::new(field.as_str(), DataType::Utf8, !field.is_primary_key()))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Write records to a segment file, replacing any existing file.
///
/// The data goes to a sibling scratch file first and is renamed into place,
/// so a concurrent reader sees either the old or the new segment.
pub fn write_records(path: impl AsRef<Path>, records: &[Record]) -> Result<()> {
    let path = path.as_ref();
    let schema = record_schema();

    let columns: Vec<ArrayRef> = Field::ALL
        .iter()
        .map(|&field| {
            let values: Vec<Option<&str>> = records.iter().map(|r| r.get(field)).collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();
    let batch = RecordBatch::try_new(Arc::clone(&schema), columns)?;

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(TMP_SUFFIX);
    let tmp_path = Path::new(&tmp_name);

    let file = File::create(tmp_path)?;
    let mut writer = FileWriter::try_new(file, &schema)?;
    writer.write(&batch)?;
    writer.finish()?;
    drop(writer);

    std::fs::rename(tmp_path, path)?;
    Ok(())
}

/// Read every row of a segment
pub fn read_records<R: Read + Seek>(reader: R) -> Result<Vec<Record>> {
    let reader = FileReader::try_new(reader, None)?;
    let schema = reader.schema();

    if schema.index_of(Field::CustomerId.as_str()).is_err() {
        return Err(StorageError::InvalidData(format!(
            "segment has no {} column",
            Field::CustomerId
        )));
    }

    // Attribute columns absent from the file simply stay null
    let present: Vec<(Field, usize)> = Field::ALL
        .iter()
        .filter_map(|&field| schema.index_of(field.as_str()).ok().map(|idx| (field, idx)))
        .collect();

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;

        let columns: Vec<(Field, ArrayRef)> = present
            .iter()
            .map(|&(field, idx)| Ok((field, utf8_column(batch.column(idx))?)))
            .collect::<Result<_>>()?;

        let views: Vec<(Field, &StringArray)> = columns
            .iter()
            .map(|(field, array)| {
                array
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .map(|strings| (*field, strings))
                    .ok_or_else(|| {
                        StorageError::InvalidData(format!("column {} is not UTF-8", field))
                    })
            })
            .collect::<Result<_>>()?;

        records.reserve(batch.num_rows());
        for row in 0..batch.num_rows() {
            let mut record = Record::default();
            for (field, strings) in &views {
                if strings.is_null(row) {
                    if field.is_primary_key() {
                        return Err(StorageError::InvalidData(format!(
                            "null {} at row {}",
                            field,
                            records.len()
                        )));
                    }
                    continue;
                }
                record.set(*field, Some(strings.value(row).to_string()));
            }
            records.push(record);
        }
    }

    Ok(records)
}

/// Read every row of the segment (or full-data file) at `path`
pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let file = File::open(path.as_ref())?;
    read_records(BufReader::new(file))
}

/// Cast a column to plain UTF-8 unless it already is
fn utf8_column(column: &ArrayRef) -> Result<ArrayRef> {
    if column.data_type() == &DataType::Utf8 {
        return Ok(Arc::clone(column));
    }
    Ok(cast(column.as_ref(), &DataType::Utf8)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use tempfile::TempDir;

    fn sample_records() -> Vec<Record> {
        vec![
            Record::new("cka2501")
                .with(Field::Name, "Alice")
                .with(Field::Gender, "F")
                .with(Field::Age, "34"),
            Record::new("cka2502").with(Field::Name, "Bob"),
        ]
    }

    #[test]
    fn test_segment_write_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.feather");

        write_records(&path, &sample_records()).unwrap();
        let records = read_records_from_path(&path).unwrap();

        assert_eq!(records, sample_records());
        // Nulls survive as absent values, not empty strings
        assert_eq!(records[1].gender, None);
        // No scratch file left behind
        assert!(!dir.path().join("data.feather.tmp").exists());
    }

    #[test]
    fn test_segment_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.feather");

        write_records(&path, &sample_records()).unwrap();
        write_records(&path, &[Record::new("zzz001")]).unwrap();

        let records = read_records_from_path(&path).unwrap();
        assert_eq!(records, vec![Record::new("zzz001")]);
    }

    #[test]
    fn test_segment_foreign_schema() {
        // Integer age, an extra column, and no occupation column at all
        let schema = Arc::new(Schema::new(vec![
            ArrowField::new("customer_id", DataType::Utf8, false),
            ArrowField::new("name", DataType::Utf8, true),
            ArrowField::new("age", DataType::Int64, true),
            ArrowField::new("prefix_hash", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![
                Arc::new(StringArray::from(vec!["cka2501", "cka2502"])) as ArrayRef,
                Arc::new(StringArray::from(vec![Some("Alice"), None])) as ArrayRef,
                Arc::new(Int64Array::from(vec![Some(34), Some(41)])) as ArrayRef,
                Arc::new(StringArray::from(vec!["0x497cb098", "0x497cb098"])) as ArrayRef,
            ],
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("full_data.feather");
        let mut writer = FileWriter::try_new(File::create(&path).unwrap(), &schema).unwrap();
        writer.write(&batch).unwrap();
        writer.finish().unwrap();
        drop(writer);

        let records = read_records_from_path(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("Alice"));
        assert_eq!(records[0].age.as_deref(), Some("34"));
        assert_eq!(records[1].name, None);
        assert_eq!(records[1].age.as_deref(), Some("41"));
        assert_eq!(records[0].occupation, None);
    }

    #[test]
    fn test_segment_without_primary_key_is_invalid() {
        let schema = Arc::new(Schema::new(vec![ArrowField::new("name", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![Arc::new(StringArray::from(vec!["Alice"])) as ArrayRef],
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.feather");
        let mut writer = FileWriter::try_new(File::create(&path).unwrap(), &schema).unwrap();
        writer.write(&batch).unwrap();
        writer.finish().unwrap();
        drop(writer);

        assert!(matches!(
            read_records_from_path(&path),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn test_segment_garbage_is_arrow_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.feather");
        std::fs::write(&path, b"not an arrow file").unwrap();

        assert!(matches!(read_records_from_path(&path), Err(StorageError::Arrow(_))));
    }
}
