use chrono::{NaiveDateTime, Timelike};

use crate::config::{HOURLY_RESOLUTION, MetricsOptions};
use crate::decoder::{RecordDecoder, ScanSummary, scan};
use crate::error::Result;
use crate::metrics::{
    BatteryStats, CurrentStats, EnergyMetrics, HourlyEnergy, SolarStats, TemperatureStats,
    TimeRange, VoltageStats,
};
use crate::record::{DecodedRecord, Row};

const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// Running min/max/sum over one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Extrema {
    min: f64,
    max: f64,
    sum: f64,
    count: usize,
}

impl Default for Extrema {
    fn default() -> Self {
        Self {
            min: f64::MAX,
            max: f64::MIN,
            sum: 0.0,
            count: 0,
        }
    }
}

impl Extrema {
    fn push(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Accumulators folded by [`MetricsTracker`]. Only `fold` mutates them.
#[derive(Debug, Clone, Default)]
struct RunningAccumulators {
    total_joules: f64,
    total_power: f64,
    peak_power: f64,
    integrated_ms: i64,
    data_points: usize,

    first_timestamp: Option<NaiveDateTime>,
    last_timestamp: Option<NaiveDateTime>,

    temperature: Extrema,
    voltage: Extrema,
    current: Extrema,
    max_discharge: f64,
    max_charging: f64,

    discharge_seconds: f64,
    charge_seconds: f64,
    discharge_joules: f64,
    charge_joules: f64,

    energy_by_hour: HourlyEnergy,

    previous: Option<DecodedRecord>,
}

/// Single-pass energy aggregator.
///
/// Records must be folded in arrival order. Only the previous record is kept,
/// so memory stays constant regardless of stream length.
#[derive(Debug, Clone, Default)]
pub struct MetricsTracker {
    acc: RunningAccumulators,
}

impl MetricsTracker {
    #[must_use]
    pub fn new(options: &MetricsOptions) -> Self {
        if options.time_resolution != HOURLY_RESOLUTION {
            log::warn!(
                "time resolution {:?} requested; energy is bucketed by hour of day only",
                options.time_resolution
            );
        }
        Self::default()
    }

    #[must_use]
    pub const fn data_points(&self) -> usize {
        self.acc.data_points
    }

    pub fn fold(&mut self, record: &DecodedRecord) {
        let acc = &mut self.acc;
        let celsius = record.raw.celsius();
        let volts = record.raw.volts();
        let amps = record.raw.amps();

        if acc.first_timestamp.is_none() {
            acc.first_timestamp = Some(record.timestamp);
        }
        acc.last_timestamp = Some(record.timestamp);

        acc.temperature.push(celsius);
        acc.voltage.push(volts);
        acc.current.push(amps);

        if amps < 0.0 {
            acc.max_discharge = acc.max_discharge.max(amps.abs());
        } else if amps > 0.0 {
            acc.max_charging = acc.max_charging.max(amps);
        }

        // Voltage magnitude only: power carries the sign of the current.
        let power = volts.abs() * amps;
        acc.peak_power = acc.peak_power.max(power.abs());

        if acc.previous.is_some() {
            let seconds = record.raw.time_delta_ms as f64 / 1000.0;
            let joules = power * seconds;

            acc.integrated_ms = acc.integrated_ms.saturating_add(record.raw.time_delta_ms);
            acc.total_joules += joules;
            acc.total_power += power;
            acc.energy_by_hour.add(record.timestamp.hour(), joules);

            if amps < 0.0 {
                acc.discharge_seconds += seconds;
                acc.discharge_joules += joules.abs();
            } else {
                acc.charge_seconds += seconds;
                acc.charge_joules += joules;
            }
        }

        acc.previous = Some(*record);
        acc.data_points += 1;
    }

    /// Build the snapshot. Pure: calling it twice yields identical results.
    #[must_use]
    pub fn finalize(&self) -> EnergyMetrics {
        let acc = &self.acc;
        if acc.data_points == 0 {
            return EnergyMetrics::default();
        }

        let duration_seconds = acc.integrated_ms as f64 / 1000.0;
        let (average_power_watts, joules_per_day) = if duration_seconds > 0.0 {
            (
                acc.total_joules / duration_seconds,
                acc.total_joules * (SECONDS_PER_DAY / duration_seconds),
            )
        } else {
            (0.0, 0.0)
        };

        EnergyMetrics {
            total_joules: acc.total_joules,
            average_power_watts,
            peak_power_watts: acc.peak_power,
            joules_per_day,
            duration_seconds,
            temperature_stats: TemperatureStats {
                min_celsius: acc.temperature.min,
                max_celsius: acc.temperature.max,
                avg_celsius: acc.temperature.mean(),
            },
            energy_by_hour: acc.energy_by_hour,
            voltage_stats: VoltageStats {
                min_volts: acc.voltage.min,
                max_volts: acc.voltage.max,
                avg_volts: acc.voltage.mean(),
            },
            current_stats: CurrentStats {
                min_amps: acc.current.min,
                max_amps: acc.current.max,
                avg_amps: acc.current.mean(),
                max_discharge_amps: acc.max_discharge,
                max_charging_amps: acc.max_charging,
            },
            battery_stats: self.battery_stats(),
            solar_stats: self.solar_stats(),
            time_range: TimeRange {
                start: acc.first_timestamp,
                end: acc.last_timestamp,
            },
            data_points: acc.data_points,
        }
    }

    fn battery_stats(&self) -> BatteryStats {
        let acc = &self.acc;
        let total_seconds = acc.discharge_seconds + acc.charge_seconds;
        BatteryStats {
            average_discharge_rate_watts: ratio(acc.discharge_joules, acc.discharge_seconds),
            total_discharge_seconds: acc.discharge_seconds,
            total_charge_seconds: acc.charge_seconds,
            discharge_to_charge_ratio: ratio(acc.discharge_seconds, total_seconds),
        }
    }

    fn solar_stats(&self) -> SolarStats {
        let acc = &self.acc;
        let total_joules = acc.discharge_joules + acc.charge_joules;
        SolarStats {
            total_energy_produced_joules: acc.charge_joules,
            average_output_watts: ratio(acc.charge_joules, acc.charge_seconds),
            peak_output: acc.max_charging,
            contribution_percentage: ratio(acc.charge_joules, total_joules) * 100.0,
        }
    }
}

/// `num / den`, or zero when the denominator is not positive.
fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

/// Fold an in-memory record list.
#[must_use]
pub fn calculate_metrics(records: &[DecodedRecord], options: &MetricsOptions) -> EnergyMetrics {
    let mut tracker = MetricsTracker::new(options);
    for record in records {
        tracker.fold(record);
    }
    tracker.finalize()
}

/// Fold records as they are decoded; nothing beyond the previous record is
/// retained.
///
/// # Errors
/// Propagates any decode or source error; no partial snapshot is returned.
pub fn stream_metrics<I, R>(
    rows: I,
    decoder: &mut RecordDecoder,
    options: &MetricsOptions,
) -> Result<(EnergyMetrics, ScanSummary)>
where
    I: IntoIterator<Item = Result<(u64, R)>>,
    R: Row,
{
    let mut tracker = MetricsTracker::new(options);
    let summary = scan(rows, decoder, |record| {
        tracker.fold(&record);
        Ok(())
    })?;
    Ok((tracker.finalize(), summary))
}
