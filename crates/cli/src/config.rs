// crates/cli/src/config.rs
use crate::args::ProcessArgs;
use crate::error::{AppError, Result};
use chrono::{Local, NaiveDateTime, TimeDelta};
pub use enemeter_engine::config::{
    Config, ConfigBuilder, FilterConfig, FilterConfigBuilder, MetricsOptions,
    MetricsOptionsBuilder,
};
use enemeter_engine::range::ValueRange;

/// Bound used to complete a one-sided voltage range (1000 V in µV).
const VOLTAGE_SPAN_MICROVOLTS: i64 = 1_000_000_000;
/// Bound used to complete a one-sided current range (1000 A in nA).
const CURRENT_SPAN_NANOAMPS: i64 = 1_000_000_000_000;

impl TryFrom<&ProcessArgs> for Config {
    type Error = AppError;

    fn try_from(args: &ProcessArgs) -> Result<Self> {
        config_from_args(args, Local::now().naive_local())
    }
}

/// Build the engine configuration, resolving `--window` against `now`.
///
/// # Errors
/// `InvalidArgument` for an unusable window or builder failure.
pub fn config_from_args(args: &ProcessArgs, now: NaiveDateTime) -> Result<Config> {
    let (start, end) = resolve_time_window(args, now)?;
    let filter = filter_config_from_args(args, start, end)?;
    let metrics = metrics_options_from_args(args)?;

    ConfigBuilder::default()
        .input(args.input.clone())
        .start_time(start)
        .filter(filter)
        .metrics(metrics)
        .streaming(args.processing.stream)
        .build()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))
}

fn resolve_time_window(
    args: &ProcessArgs,
    now: NaiveDateTime,
) -> Result<(Option<NaiveDateTime>, Option<NaiveDateTime>)> {
    let start = args.time.start.map(|d| d.0);
    let end = args.time.end.map(|d| d.0);

    let Some(window) = args.time.window.filter(|_| end.is_none()) else {
        return Ok((start, end));
    };
    let span = TimeDelta::from_std(window.0)
        .map_err(|e| AppError::InvalidArgument(format!("time window too large: {e}")))?;
    let overflow = || AppError::InvalidArgument("time window out of range".to_string());

    match start {
        Some(start) => {
            let end = start.checked_add_signed(span).ok_or_else(overflow)?;
            Ok((Some(start), Some(end)))
        }
        None => {
            let start = now.checked_sub_signed(span).ok_or_else(overflow)?;
            Ok((Some(start), Some(now)))
        }
    }
}

fn filter_config_from_args(
    args: &ProcessArgs,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<FilterConfig> {
    let values = &args.values;

    FilterConfigBuilder::default()
        .start(start)
        .end(end)
        .sample_rate(args.processing.sample)
        .max_records(args.processing.max)
        .min_temp((values.min_temp > 0).then_some(values.min_temp))
        .voltage(completed_range(
            values.volt_min,
            values.volt_max,
            VOLTAGE_SPAN_MICROVOLTS,
        ))
        .current(completed_range(
            values.curr_min,
            values.curr_max,
            CURRENT_SPAN_NANOAMPS,
        ))
        .build()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))
}

fn metrics_options_from_args(args: &ProcessArgs) -> Result<MetricsOptions> {
    let mut builder = MetricsOptionsBuilder::default();
    builder.requested_metrics(args.output.metric.iter().cloned().collect::<Vec<_>>());
    if let Some(resolution) = args.processing.resolution {
        builder.time_resolution(resolution.0);
    }
    builder
        .build()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))
}

/// Zero on either side means "not set"; a one-sided range is completed with
/// `±span`.
fn completed_range(min: i64, max: i64, span: i64) -> ValueRange {
    match (min, max) {
        (0, 0) => ValueRange::default(),
        (min, 0) => ValueRange::between(min, span),
        (0, max) => ValueRange::between(-span, max),
        (min, max) => ValueRange::between(min, max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Args, Command};
    use chrono::NaiveDate;
    use clap::Parser;

    fn process_args(extra: &[&str]) -> ProcessArgs {
        let mut argv = vec!["enemeter", "process", "--input", "data.csv"];
        argv.extend_from_slice(extra);
        match Args::try_parse_from(argv).unwrap().command {
            Command::Process(args) => args,
            Command::Inspect(_) => panic!("expected process subcommand"),
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_start_sets_stream_origin_and_lower_bound() {
        let config = config_from_args(&process_args(&["--start", "2025-04-01T10:00"]), at(12, 0))
            .unwrap();
        assert_eq!(config.start_time, Some(at(10, 0)));
        assert_eq!(config.filter.start, Some(at(10, 0)));
        assert_eq!(config.filter.end, None);
    }

    #[test]
    fn test_window_after_start() {
        let args = process_args(&["--start", "2025-04-01T10:00", "--window", "1h30m"]);
        let config = config_from_args(&args, at(23, 0)).unwrap();
        assert_eq!(config.filter.end, Some(at(11, 30)));
    }

    #[test]
    fn test_window_without_start_ends_now() {
        let args = process_args(&["--window", "2h"]);
        let config = config_from_args(&args, at(12, 0)).unwrap();
        assert_eq!(config.filter.start, Some(at(10, 0)));
        assert_eq!(config.filter.end, Some(at(12, 0)));
        assert_eq!(config.start_time, Some(at(10, 0)));
    }

    #[test]
    fn test_window_ignored_when_end_given() {
        let args = process_args(&[
            "--start",
            "2025-04-01T10:00",
            "--end",
            "2025-04-01T10:10",
            "--window",
            "1h",
        ]);
        let config = config_from_args(&args, at(23, 0)).unwrap();
        assert_eq!(config.filter.end, Some(at(10, 10)));
    }

    #[test]
    fn test_one_sided_ranges_are_completed() {
        let args = process_args(&["--volt-min", "3000000", "--curr-max=-1000"]);
        let config = config_from_args(&args, at(0, 0)).unwrap();
        assert_eq!(
            config.filter.voltage,
            ValueRange::between(3_000_000, VOLTAGE_SPAN_MICROVOLTS)
        );
        assert_eq!(
            config.filter.current,
            ValueRange::between(-CURRENT_SPAN_NANOAMPS, -1000)
        );
    }

    #[test]
    fn test_unset_filters() {
        let config = config_from_args(&process_args(&["--min-temp", "0"]), at(0, 0)).unwrap();
        assert_eq!(config.filter.min_temp, None);
        assert_eq!(config.filter.voltage, ValueRange::default());
        assert_eq!(config.filter.current, ValueRange::default());
        assert!(config.metrics.requested_metrics.is_empty());
    }

    #[test]
    fn test_metric_and_resolution() {
        let args = process_args(&["--metric", "peak_power", "--resolution", "5m", "--stream"]);
        let config = config_from_args(&args, at(0, 0)).unwrap();
        assert_eq!(config.metrics.requested_metrics, ["peak_power"]);
        assert_eq!(
            config.metrics.time_resolution,
            std::time::Duration::from_secs(300)
        );
        assert!(config.streaming);
    }

    #[test]
    fn test_unknown_metric_is_kept_for_extraction() {
        let config = config_from_args(&process_args(&["--metric", "bogus"]), at(0, 0)).unwrap();
        assert_eq!(config.metrics.requested_metrics, ["bogus"]);
    }
}
