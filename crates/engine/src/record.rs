use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{EngineError, Result};

/// Number of fields in every measurement row.
pub const FIELD_COUNT: usize = 4;

// Column order as written by the device firmware. Older documentation lists
// temperature second; the firmware has always emitted it last.
pub const TIME_COL: usize = 0;
pub const VOLTAGE_COL: usize = 1;
pub const CURRENT_COL: usize = 2;
pub const TEMP_COL: usize = 3;

const MILLI: f64 = 1_000.0;
const MICRO: f64 = 1_000_000.0;
const NANO: f64 = 1_000_000_000.0;

/// One measurement row in device units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RawTuple {
    pub time_delta_ms: i64,
    pub temp_millicelsius: i64,
    pub voltage_microvolts: i64,
    /// Positive while charging, negative while discharging.
    pub current_nanoamps: i64,
}

impl RawTuple {
    #[must_use]
    pub fn celsius(&self) -> f64 {
        self.temp_millicelsius as f64 / MILLI
    }

    #[must_use]
    pub fn volts(&self) -> f64 {
        self.voltage_microvolts as f64 / MICRO
    }

    #[must_use]
    pub fn amps(&self) -> f64 {
        self.current_nanoamps as f64 / NANO
    }
}

/// A row that survived decoding and filtering, stamped with its absolute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecodedRecord {
    #[serde(flatten)]
    pub raw: RawTuple,
    pub timestamp: NaiveDateTime,
}

impl DecodedRecord {
    #[must_use]
    pub const fn new(raw: RawTuple, timestamp: NaiveDateTime) -> Self {
        Self { raw, timestamp }
    }
}

/// Field access over a delimited row, so the decoder can read CSV records and
/// in-memory rows alike without copying.
pub trait Row {
    fn field_count(&self) -> usize;
    fn field(&self, index: usize) -> Option<&str>;
}

impl Row for csv::StringRecord {
    fn field_count(&self) -> usize {
        self.len()
    }

    fn field(&self, index: usize) -> Option<&str> {
        self.get(index)
    }
}

impl<S: AsRef<str>> Row for [S] {
    fn field_count(&self) -> usize {
        self.len()
    }

    fn field(&self, index: usize) -> Option<&str> {
        self.get(index).map(AsRef::as_ref)
    }
}

impl<S: AsRef<str>> Row for Vec<S> {
    fn field_count(&self) -> usize {
        self.len()
    }

    fn field(&self, index: usize) -> Option<&str> {
        self.get(index).map(AsRef::as_ref)
    }
}

impl<S: AsRef<str>, const N: usize> Row for [S; N] {
    fn field_count(&self) -> usize {
        N
    }

    fn field(&self, index: usize) -> Option<&str> {
        self.get(index).map(AsRef::as_ref)
    }
}

/// Check the row shape and parse all four columns.
///
/// `line` is the 1-based line number used in error messages.
///
/// # Errors
/// `MalformedRow` when the row does not have exactly four fields,
/// `FieldParse` naming the first column that is not a base-10 `i64`.
pub fn decode_tuple<R: Row + ?Sized>(line: u64, row: &R) -> Result<RawTuple> {
    let found = row.field_count();
    if found != FIELD_COUNT {
        return Err(EngineError::MalformedRow { line, found });
    }

    Ok(RawTuple {
        time_delta_ms: parse_field(line, row, TIME_COL, "time_delta")?,
        voltage_microvolts: parse_field(line, row, VOLTAGE_COL, "voltage")?,
        current_nanoamps: parse_field(line, row, CURRENT_COL, "current")?,
        temp_millicelsius: parse_field(line, row, TEMP_COL, "temperature")?,
    })
}

fn parse_field<R: Row + ?Sized>(line: u64, row: &R, col: usize, field: &'static str) -> Result<i64> {
    let value = row.field(col).unwrap_or_default();
    value.parse::<i64>().map_err(|source| EngineError::FieldParse {
        line,
        field,
        value: value.to_string(),
        source,
    })
}
