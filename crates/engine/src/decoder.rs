use chrono::{NaiveDateTime, TimeDelta};

use crate::config::FilterConfig;
use crate::error::{CallbackError, EngineError, Result};
use crate::record::{DecodedRecord, RawTuple, Row, decode_tuple};

/// Why a decoded row was not emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Dropped by the sampling stride.
    Sampled,
    BeforeWindow,
    BelowTemperature,
    VoltageOutOfRange,
    CurrentOutOfRange,
}

/// Why the scan ended before the input was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A record's timestamp passed the configured end bound.
    PastWindow,
    /// The configured maximum number of records was accepted.
    RecordCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept(DecodedRecord),
    Skip(SkipReason),
    Stop(StopReason),
}

/// Stateful row decoder: parses, stamps and filters one row at a time.
///
/// Elapsed time advances for every successfully decoded row, including rows
/// later dropped by sampling or value filters, so timestamps always reflect
/// device time.
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    start_time: NaiveDateTime,
    filter: FilterConfig,
    elapsed_ms: i64,
    sample_counter: usize,
    accepted: usize,
}

impl RecordDecoder {
    /// # Errors
    /// Returns `MissingStartTime` when no start time is supplied.
    pub fn new(start_time: Option<NaiveDateTime>, filter: &FilterConfig) -> Result<Self> {
        let start_time = start_time.ok_or(EngineError::MissingStartTime)?;
        let mut filter = filter.clone();
        filter.sample_rate = filter.sample_rate.max(1);

        Ok(Self {
            start_time,
            filter,
            elapsed_ms: 0,
            sample_counter: 0,
            accepted: 0,
        })
    }

    /// Cumulative time delta over every decoded row so far.
    #[must_use]
    pub const fn elapsed_ms(&self) -> i64 {
        self.elapsed_ms
    }

    #[must_use]
    pub const fn accepted(&self) -> usize {
        self.accepted
    }

    /// True once the record cap has been reached.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.filter.max_records > 0 && self.accepted >= self.filter.max_records
    }

    /// Decode one row and run it through the sampling, window and value gates.
    ///
    /// # Errors
    /// Row shape and field errors from [`decode_tuple`], or
    /// `TimestampOutOfRange` when the derived timestamp overflows.
    pub fn decode<R: Row + ?Sized>(&mut self, line: u64, row: &R) -> Result<Decision> {
        if self.is_exhausted() {
            return Ok(Decision::Stop(StopReason::RecordCap));
        }

        let raw = decode_tuple(line, row)?;
        self.elapsed_ms = self.elapsed_ms.saturating_add(raw.time_delta_ms);

        if !self.take_sample() {
            return Ok(Decision::Skip(SkipReason::Sampled));
        }

        let timestamp = self.timestamp(line)?;

        if self.filter.start.is_some_and(|start| timestamp < start) {
            return Ok(Decision::Skip(SkipReason::BeforeWindow));
        }
        // Rows are in time order, so nothing after this one can qualify.
        if self.filter.end.is_some_and(|end| timestamp > end) {
            return Ok(Decision::Stop(StopReason::PastWindow));
        }

        if let Some(reason) = self.reject_value(&raw) {
            return Ok(Decision::Skip(reason));
        }

        self.accepted += 1;
        Ok(Decision::Accept(DecodedRecord::new(raw, timestamp)))
    }

    fn take_sample(&mut self) -> bool {
        self.sample_counter += 1;
        if self.sample_counter < self.filter.sample_rate {
            return false;
        }
        self.sample_counter = 0;
        true
    }

    fn timestamp(&self, line: u64) -> Result<NaiveDateTime> {
        TimeDelta::try_milliseconds(self.elapsed_ms)
            .and_then(|offset| self.start_time.checked_add_signed(offset))
            .ok_or(EngineError::TimestampOutOfRange { line })
    }

    fn reject_value(&self, raw: &RawTuple) -> Option<SkipReason> {
        if self
            .filter
            .min_temp
            .is_some_and(|threshold| raw.temp_millicelsius < threshold)
        {
            return Some(SkipReason::BelowTemperature);
        }
        if !self.filter.voltage.contains(raw.voltage_microvolts) {
            return Some(SkipReason::VoltageOutOfRange);
        }
        if !self.filter.current.contains(raw.current_nanoamps) {
            return Some(SkipReason::CurrentOutOfRange);
        }
        None
    }
}

/// Counters describing one pass over a row source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub rows_read: u64,
    pub accepted: usize,
    pub sampled_out: u64,
    pub before_window: u64,
    pub below_temperature: u64,
    pub voltage_rejected: u64,
    pub current_rejected: u64,
    pub stop: Option<StopReason>,
    pub elapsed_ms: i64,
}

impl ScanSummary {
    fn record_skip(&mut self, reason: SkipReason) {
        let counter = match reason {
            SkipReason::Sampled => &mut self.sampled_out,
            SkipReason::BeforeWindow => &mut self.before_window,
            SkipReason::BelowTemperature => &mut self.below_temperature,
            SkipReason::VoltageOutOfRange => &mut self.voltage_rejected,
            SkipReason::CurrentOutOfRange => &mut self.current_rejected,
        };
        *counter += 1;
    }
}

/// Pair rows with 1-based line numbers, for in-memory sources.
pub fn numbered<I>(rows: I) -> impl Iterator<Item = Result<(u64, I::Item)>>
where
    I: IntoIterator,
{
    rows.into_iter()
        .zip(1u64..)
        .map(|(row, line)| Ok((line, row)))
}

/// Drive `rows` through `decoder` in order, handing each accepted record to `sink`.
///
/// The scan ends at end of input, at the first record past the end bound, or
/// once the record cap is reached; rows after that point are never read.
///
/// # Errors
/// Any source, decode or sink error aborts the scan. Sink errors are wrapped
/// in [`EngineError::Callback`].
pub fn scan<I, R, F>(rows: I, decoder: &mut RecordDecoder, mut sink: F) -> Result<ScanSummary>
where
    I: IntoIterator<Item = Result<(u64, R)>>,
    R: Row,
    F: FnMut(DecodedRecord) -> std::result::Result<(), CallbackError>,
{
    let mut summary = ScanSummary::default();
    let mut rows = rows.into_iter();

    while !decoder.is_exhausted() {
        let Some(item) = rows.next() else {
            break;
        };
        let (line, row) = item?;
        summary.rows_read += 1;

        match decoder.decode(line, &row)? {
            Decision::Accept(record) => {
                summary.accepted += 1;
                sink(record).map_err(EngineError::Callback)?;
            }
            Decision::Skip(reason) => {
                log::trace!("line {line}: skipped ({reason:?})");
                summary.record_skip(reason);
            }
            Decision::Stop(reason) => {
                summary.stop = Some(reason);
                break;
            }
        }
    }

    if summary.stop.is_none() && decoder.is_exhausted() {
        summary.stop = Some(StopReason::RecordCap);
    }
    summary.elapsed_ms = decoder.elapsed_ms();

    log::debug!(
        "scan finished: {} rows read, {} accepted, stop={:?}",
        summary.rows_read,
        summary.accepted,
        summary.stop
    );
    Ok(summary)
}

/// Decode every accepted record into memory.
///
/// # Errors
/// See [`scan`].
pub fn decode_all<I, R>(rows: I, decoder: &mut RecordDecoder) -> Result<(Vec<DecodedRecord>, ScanSummary)>
where
    I: IntoIterator<Item = Result<(u64, R)>>,
    R: Row,
{
    let mut records = Vec::new();
    let summary = scan(rows, decoder, |record| {
        records.push(record);
        Ok(())
    })?;
    Ok((records, summary))
}
