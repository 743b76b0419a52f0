// crates/engine/src/lib.rs
pub mod aggregator;
pub mod config;
pub mod decoder;
pub mod error;
pub mod inspect;
pub mod metrics;
pub mod options;
pub mod range;
pub mod record;
pub mod source;

use crate::aggregator::{calculate_metrics, stream_metrics};
use crate::config::Config;
use crate::decoder::{RecordDecoder, ScanSummary, decode_all};
use crate::error::Result;
use crate::metrics::EnergyMetrics;
use crate::source::open_rows;

/// Decode and aggregate the measurement file named by `config`.
///
/// Dispatches to [`run_streaming`] or [`run_batch`]; both return the same
/// snapshot for the same input.
///
/// # Errors
///
/// Fails if `start_time` is missing, if the file cannot be read, or on the
/// first malformed row. Nothing is returned for a partially read file.
pub fn run(config: &Config) -> Result<EnergyMetrics> {
    log::info!(
        "processing {} ({} mode)",
        config.input.display(),
        if config.streaming { "streaming" } else { "batch" }
    );
    if config.streaming {
        run_streaming(config)
    } else {
        run_batch(config)
    }
}

/// Materialize every accepted record, then fold them.
///
/// # Errors
///
/// See [`run`].
pub fn run_batch(config: &Config) -> Result<EnergyMetrics> {
    let mut decoder = RecordDecoder::new(config.start_time, &config.filter)?;
    let rows = open_rows(&config.input)?;
    let (records, summary) = decode_all(rows, &mut decoder)?;
    log_summary(&summary);
    Ok(calculate_metrics(&records, &config.metrics))
}

/// Fold records as they are decoded, keeping memory constant.
///
/// # Errors
///
/// See [`run`].
pub fn run_streaming(config: &Config) -> Result<EnergyMetrics> {
    let mut decoder = RecordDecoder::new(config.start_time, &config.filter)?;
    let rows = open_rows(&config.input)?;
    let (metrics, summary) = stream_metrics(rows, &mut decoder, &config.metrics)?;
    log_summary(&summary);
    Ok(metrics)
}

fn log_summary(summary: &ScanSummary) {
    let skipped = summary.sampled_out
        + summary.before_window
        + summary.below_temperature
        + summary.voltage_rejected
        + summary.current_rejected;
    log::info!(
        "{} rows read, {} records accepted, {} skipped",
        summary.rows_read,
        summary.accepted,
        skipped
    );
    if let Some(stop) = summary.stop {
        log::info!("scan stopped early: {stop:?}");
    }
}
