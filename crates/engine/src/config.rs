use crate::range::ValueRange;
use chrono::NaiveDateTime;
use derive_builder::Builder;
use std::path::PathBuf;
use std::time::Duration;

/// Hour-of-day bucketing is the only granularity the aggregator implements.
pub const HOURLY_RESOLUTION: Duration = Duration::from_secs(60 * 60);

/// Row-level filters applied by the decoder, in raw device units.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct FilterConfig {
    /// Inclusive lower time bound; earlier records are skipped.
    #[builder(default)]
    pub start: Option<NaiveDateTime>,
    /// Upper time bound; the first record past it ends the scan.
    #[builder(default)]
    pub end: Option<NaiveDateTime>,
    /// Keep one of every `sample_rate` decoded rows.
    #[builder(default = "1")]
    pub sample_rate: usize,
    /// Stop after this many accepted records. `0` means unlimited.
    #[builder(default)]
    pub max_records: usize,
    /// Minimum temperature in millicelsius.
    #[builder(default)]
    pub min_temp: Option<i64>,
    /// Accepted voltage in microvolts.
    #[builder(default)]
    pub voltage: ValueRange,
    /// Accepted current in nanoamperes.
    #[builder(default)]
    pub current: ValueRange,
}

impl FilterConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.sample_rate == Some(0) {
            return Err("sample rate must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            sample_rate: 1,
            max_records: 0,
            min_temp: None,
            voltage: ValueRange::default(),
            current: ValueRange::default(),
        }
    }
}

/// Options consumed by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into))]
pub struct MetricsOptions {
    /// Requested bucketing resolution. Anything other than one hour is
    /// accepted but falls back to hour-of-day buckets.
    #[builder(default = "HOURLY_RESOLUTION")]
    pub time_resolution: Duration,
    /// Metric tokens the caller wants reported, resolved against the
    /// finished snapshot. Empty means the full snapshot.
    #[builder(default)]
    pub requested_metrics: Vec<String>,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            time_resolution: HOURLY_RESOLUTION,
            requested_metrics: Vec::new(),
        }
    }
}

/// Everything needed for one end-to-end run over a measurement file.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct Config {
    pub input: PathBuf,
    /// Absolute instant of the stream's first time delta. Required.
    #[builder(default)]
    pub start_time: Option<NaiveDateTime>,
    #[builder(default)]
    pub filter: FilterConfig,
    #[builder(default)]
    pub metrics: MetricsOptions,
    /// Fold records as they are decoded instead of materializing them first.
    #[builder(default)]
    pub streaming: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_builder_defaults() {
        let filter = FilterConfigBuilder::default().build().unwrap();
        assert_eq!(filter, FilterConfig::default());
        assert_eq!(filter.sample_rate, 1);
        assert_eq!(filter.max_records, 0);
    }

    #[test]
    fn test_filter_builder_rejects_zero_stride() {
        let err = FilterConfigBuilder::default()
            .sample_rate(0usize)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("sample rate"));
    }

    #[test]
    fn test_config_builder_requires_input() {
        assert!(ConfigBuilder::default().build().is_err());

        let config = ConfigBuilder::default()
            .input("data.csv")
            .streaming(true)
            .build()
            .unwrap();
        assert!(config.streaming);
        assert!(config.start_time.is_none());
        assert_eq!(config.metrics.time_resolution, HOURLY_RESOLUTION);
    }

    #[test]
    fn test_metrics_options_builder() {
        let options = MetricsOptionsBuilder::default()
            .requested_metrics(vec!["total_energy".to_string()])
            .build()
            .unwrap();
        assert_eq!(options.time_resolution, HOURLY_RESOLUTION);
        assert_eq!(options.requested_metrics, ["total_energy"]);
    }
}
