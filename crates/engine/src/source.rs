use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};

use crate::error::{EngineError, Result};

/// Rows read by [`estimate_record_count`] to measure the average row length.
const ESTIMATE_SAMPLE_ROWS: usize = 100;

/// Line-numbered CSV rows. Field count is not enforced here; the decoder
/// reports malformed rows itself.
pub struct CsvRows<R: Read> {
    inner: StringRecordsIntoIter<R>,
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<(u64, StringRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|res| {
            res.map(|record| {
                let line = record.position().map_or(0, csv::Position::line);
                (line, record)
            })
            .map_err(EngineError::from)
        })
    }
}

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(false).flexible(true);
    builder
}

/// Wrap any reader as a row source.
pub fn rows_from_reader<R: Read>(reader: R) -> CsvRows<R> {
    CsvRows {
        inner: reader_builder().from_reader(reader).into_records(),
    }
}

/// Open a measurement file as a row source.
///
/// # Errors
/// `FileRead` if the file cannot be opened.
pub fn open_rows(path: &Path) -> Result<CsvRows<File>> {
    let file = File::open(path).map_err(|source| EngineError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(rows_from_reader(file))
}

/// # Errors
/// `FileRead` if the file metadata cannot be read.
pub fn file_size(path: &Path) -> Result<u64> {
    std::fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|source| EngineError::FileRead {
            path: path.to_path_buf(),
            source,
        })
}

/// Rough row count: file size divided by the average length of the first rows.
///
/// # Errors
/// `FileRead` or `Csv` if the head of the file cannot be read.
pub fn estimate_record_count(path: &Path) -> Result<u64> {
    let size = file_size(path)?;
    let file = File::open(path).map_err(|source| EngineError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = reader_builder().from_reader(file);

    let mut record = StringRecord::new();
    let mut rows = 0u64;
    for _ in 0..ESTIMATE_SAMPLE_ROWS {
        if !reader.read_record(&mut record)? {
            break;
        }
        rows += 1;
    }

    let bytes = reader.position().byte();
    if rows == 0 || bytes == 0 {
        return Ok(0);
    }
    let avg_row_bytes = (bytes / rows).max(1);
    Ok(size / avg_row_bytes)
}
