use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::Result;
use crate::options::MetricKind;

/// Finalized result of one aggregation pass. Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct EnergyMetrics {
    pub total_joules: f64,
    pub average_power_watts: f64,
    pub peak_power_watts: f64,
    pub joules_per_day: f64,
    pub duration_seconds: f64,
    pub temperature_stats: TemperatureStats,
    pub energy_by_hour: HourlyEnergy,
    pub voltage_stats: VoltageStats,
    pub current_stats: CurrentStats,
    pub battery_stats: BatteryStats,
    pub solar_stats: SolarStats,
    pub time_range: TimeRange,
    pub data_points: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct TemperatureStats {
    pub min_celsius: f64,
    pub max_celsius: f64,
    pub avg_celsius: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct VoltageStats {
    pub min_volts: f64,
    pub max_volts: f64,
    pub avg_volts: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct CurrentStats {
    pub min_amps: f64,
    pub max_amps: f64,
    pub avg_amps: f64,
    /// Largest magnitude seen among discharging (negative) samples.
    pub max_discharge_amps: f64,
    /// Largest charging (positive) current seen.
    pub max_charging_amps: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct BatteryStats {
    pub average_discharge_rate_watts: f64,
    pub total_discharge_seconds: f64,
    pub total_charge_seconds: f64,
    /// Share of integrated time spent discharging, in `0.0..=1.0`.
    pub discharge_to_charge_ratio: f64,
}

/// Charging is treated as solar production.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct SolarStats {
    pub total_energy_produced_joules: f64,
    pub average_output_watts: f64,
    /// The maximum charging current, reported as-is (amps).
    pub peak_output: f64,
    pub contribution_percentage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TimeRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

/// Energy integrated per hour of day. Hours that never received a sample are
/// absent rather than zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HourlyEnergy([Option<f64>; 24]);

impl HourlyEnergy {
    pub(crate) fn add(&mut self, hour: u32, joules: f64) {
        if let Some(slot) = self.0.get_mut(hour as usize) {
            *slot = Some(slot.unwrap_or(0.0) + joules);
        }
    }

    #[must_use]
    pub fn get(&self, hour: u32) -> Option<f64> {
        self.0.get(hour as usize).copied().flatten()
    }

    /// Populated hours in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        (0u32..).zip(self.0.iter()).filter_map(|(hour, joules)| joules.map(|j| (hour, j)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.iter().filter(|j| j.is_some()).count()
    }
}

impl Serialize for HourlyEnergy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (hour, joules) in self.iter() {
            map.serialize_entry(&hour, &joules)?;
        }
        map.end()
    }
}

/// A single metric pulled out of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum MetricValue<'a> {
    Scalar(f64),
    Temperature(&'a TemperatureStats),
    HourlyEnergy(&'a HourlyEnergy),
    Voltage(&'a VoltageStats),
    Current(&'a CurrentStats),
    Battery(&'a BatteryStats),
    Solar(&'a SolarStats),
}

impl EnergyMetrics {
    #[must_use]
    pub fn extract(&self, kind: MetricKind) -> MetricValue<'_> {
        match kind {
            MetricKind::TotalEnergy => MetricValue::Scalar(self.total_joules),
            MetricKind::AveragePower => MetricValue::Scalar(self.average_power_watts),
            MetricKind::PeakPower => MetricValue::Scalar(self.peak_power_watts),
            MetricKind::Temperature => MetricValue::Temperature(&self.temperature_stats),
            MetricKind::EnergyByHour => MetricValue::HourlyEnergy(&self.energy_by_hour),
            MetricKind::VoltageStats => MetricValue::Voltage(&self.voltage_stats),
            MetricKind::CurrentStats => MetricValue::Current(&self.current_stats),
            MetricKind::BatteryDischarge => MetricValue::Battery(&self.battery_stats),
            MetricKind::SolarContribution => MetricValue::Solar(&self.solar_stats),
        }
    }
}

/// Resolve a metric token and extract it from `metrics`, returning the
/// resolved kind alongside the value.
///
/// # Errors
/// `UnknownMetric` if `name` is not a known token. The snapshot is unaffected.
pub fn extract_metric<'a>(
    metrics: &'a EnergyMetrics,
    name: &str,
) -> Result<(MetricKind, MetricValue<'a>)> {
    let kind: MetricKind = name.parse()?;
    Ok((kind, metrics.extract(kind)))
}
