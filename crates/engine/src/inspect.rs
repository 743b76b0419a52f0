//! Quick look at the head of a measurement file: raw samples, per-column
//! ranges and a guess at the units the device wrote them in.

use serde::Serialize;

use crate::error::Result;
use crate::record::{CURRENT_COL, FIELD_COUNT, RawTuple, Row, TEMP_COL, TIME_COL, VOLTAGE_COL};

/// Default number of rows read by the inspector.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InspectIssue {
    /// The row did not have four fields and was left out of the samples.
    FieldCount { line: u64, found: usize },
}

/// Inclusive min/max of one column. `0..=0` when no row was sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnRange {
    pub min: i64,
    pub max: i64,
}

impl ColumnRange {
    fn of(values: impl Iterator<Item = i64>) -> Self {
        values.fold(None, |acc: Option<Self>, value| {
            Some(acc.map_or(Self { min: value, max: value }, |range| Self {
                min: range.min.min(value),
                max: range.max.max(value),
            }))
        })
        .unwrap_or_default()
    }

    /// Both ends divided by `divisor`.
    #[must_use]
    pub fn scaled(&self, divisor: f64) -> (f64, f64) {
        (self.min as f64 / divisor, self.max as f64 / divisor)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnRanges {
    pub time_delta: ColumnRange,
    pub voltage: ColumnRange,
    pub current: ColumnRange,
    pub temperature: ColumnRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub samples: Vec<RawTuple>,
    pub issues: Vec<InspectIssue>,
    pub ranges: ColumnRanges,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    RawAdc,
    Millicelsius,
    Centicelsius,
    Celsius,
}

impl TemperatureUnit {
    /// Divide a raw reading by this to get degrees Celsius.
    #[must_use]
    pub const fn divisor(self) -> f64 {
        match self {
            Self::RawAdc => 10.0,
            Self::Millicelsius => 1_000.0,
            Self::Centicelsius => 100.0,
            Self::Celsius => 1.0,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RawAdc => "raw ADC",
            Self::Millicelsius => "millicelsius",
            Self::Centicelsius => "centicelsius",
            Self::Celsius => "celsius",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoltageUnit {
    Microvolts,
    Millivolts,
    Volts,
}

impl VoltageUnit {
    #[must_use]
    pub const fn divisor(self) -> f64 {
        match self {
            Self::Microvolts => 1_000_000.0,
            Self::Millivolts => 1_000.0,
            Self::Volts => 1.0,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Microvolts => "microvolts",
            Self::Millivolts => "millivolts",
            Self::Volts => "volts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentUnit {
    Nanoamps,
    Microamps,
    Milliamps,
}

impl CurrentUnit {
    #[must_use]
    pub const fn divisor(self) -> f64 {
        match self {
            Self::Nanoamps => 1_000_000_000.0,
            Self::Microamps => 1_000_000.0,
            Self::Milliamps => 1_000.0,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nanoamps => "nanoamperes",
            Self::Microamps => "microamperes",
            Self::Milliamps => "milliamperes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnitSuggestion {
    pub temperature: TemperatureUnit,
    pub voltage: VoltageUnit,
    pub current: CurrentUnit,
}

/// Read up to `sample_size` rows and summarize them.
///
/// Rows with the wrong field count are recorded as issues. Fields that do not
/// parse as integers read as `0`; the inspector is meant for files the
/// decoder rejects, so it does not stop on them.
///
/// # Errors
/// Only errors from the row source itself are returned.
pub fn inspect_rows<I, R>(rows: I, sample_size: usize) -> Result<InspectReport>
where
    I: IntoIterator<Item = Result<(u64, R)>>,
    R: Row,
{
    let mut report = InspectReport::default();

    for item in rows.into_iter().take(sample_size) {
        let (line, row) = item?;
        let found = row.field_count();
        if found != FIELD_COUNT {
            log::debug!("line {line}: {found} fields, expected {FIELD_COUNT}");
            report.issues.push(InspectIssue::FieldCount { line, found });
            continue;
        }

        let lenient = |col| {
            row.field(col)
                .and_then(|value| value.parse::<i64>().ok())
                .unwrap_or(0)
        };
        report.samples.push(RawTuple {
            time_delta_ms: lenient(TIME_COL),
            voltage_microvolts: lenient(VOLTAGE_COL),
            current_nanoamps: lenient(CURRENT_COL),
            temp_millicelsius: lenient(TEMP_COL),
        });
    }

    let samples = &report.samples;
    report.ranges = ColumnRanges {
        time_delta: ColumnRange::of(samples.iter().map(|s| s.time_delta_ms)),
        voltage: ColumnRange::of(samples.iter().map(|s| s.voltage_microvolts)),
        current: ColumnRange::of(samples.iter().map(|s| s.current_nanoamps)),
        temperature: ColumnRange::of(samples.iter().map(|s| s.temp_millicelsius)),
    };
    Ok(report)
}

/// Guess the unit of each channel from the magnitude of its sampled range.
#[must_use]
pub fn suggest_units(ranges: &ColumnRanges) -> UnitSuggestion {
    let temp_max = ranges.temperature.max;
    let temperature = if temp_max > 100_000 {
        TemperatureUnit::RawAdc
    } else if temp_max > 10_000 {
        TemperatureUnit::Millicelsius
    } else if temp_max > 1_000 {
        TemperatureUnit::Centicelsius
    } else {
        TemperatureUnit::Celsius
    };

    let volt_mag = ranges
        .voltage
        .min
        .unsigned_abs()
        .max(ranges.voltage.max.unsigned_abs());
    let voltage = if volt_mag > 1_000_000 {
        VoltageUnit::Microvolts
    } else if volt_mag > 1_000 {
        VoltageUnit::Millivolts
    } else {
        VoltageUnit::Volts
    };

    let ColumnRange { min, max } = ranges.current;
    let current = if max > 1_000_000 || min < -1_000_000 {
        CurrentUnit::Nanoamps
    } else if max > 1_000 || min < -1_000 {
        CurrentUnit::Microamps
    } else {
        CurrentUnit::Milliamps
    };

    UnitSuggestion {
        temperature,
        voltage,
        current,
    }
}
