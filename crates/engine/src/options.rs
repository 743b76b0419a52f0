use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named metrics that can be pulled out of a finished snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    TotalEnergy,
    AveragePower,
    PeakPower,
    Temperature,
    EnergyByHour,
    VoltageStats,
    CurrentStats,
    BatteryDischarge,
    SolarContribution,
}

impl MetricKind {
    pub const ALL: [Self; 9] = [
        Self::TotalEnergy,
        Self::AveragePower,
        Self::PeakPower,
        Self::Temperature,
        Self::EnergyByHour,
        Self::VoltageStats,
        Self::CurrentStats,
        Self::BatteryDischarge,
        Self::SolarContribution,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TotalEnergy => "total_energy",
            Self::AveragePower => "average_power",
            Self::PeakPower => "peak_power",
            Self::Temperature => "temperature",
            Self::EnergyByHour => "energy_by_hour",
            Self::VoltageStats => "voltage_stats",
            Self::CurrentStats => "current_stats",
            Self::BatteryDischarge => "battery_discharge",
            Self::SolarContribution => "solar_contribution",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EngineError::UnknownMetric(s.to_string()))
    }
}
