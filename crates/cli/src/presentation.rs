// crates/cli/src/presentation.rs
use crate::error::Result;
use crate::options::OutputFormat;
use chrono::{NaiveDateTime, SecondsFormat};
use enemeter_engine::inspect::{InspectIssue, InspectReport, UnitSuggestion};
use enemeter_engine::metrics::{
    BatteryStats, CurrentStats, EnergyMetrics, HourlyEnergy, MetricValue, SolarStats,
    TemperatureStats, VoltageStats, extract_metric,
};
use enemeter_engine::options::MetricKind;
use std::fmt::Write;
use std::path::Path;

const REPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RULE: &str = "---------------------------------------------------------------";

/// Render the full snapshot.
///
/// # Errors
/// Serialization or formatting failures.
pub fn render_report(
    metrics: &EnergyMetrics,
    input: &Path,
    format: OutputFormat,
    generated_at: NaiveDateTime,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(metrics)?),
        OutputFormat::Csv => csv_report(metrics),
        OutputFormat::Text => text_report(metrics, input, generated_at),
    }
}

/// Render one metric pulled from the snapshot by its token.
///
/// # Errors
/// `UnknownMetric` for an unrecognised `name`, or serialization and
/// formatting failures.
pub fn render_metric(metrics: &EnergyMetrics, name: &str, format: OutputFormat) -> Result<String> {
    let (kind, value) = extract_metric(metrics, name)?;
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&value)?),
        OutputFormat::Csv => csv_metric(kind, value),
        OutputFormat::Text => text_metric(kind, value),
    }
}

fn text_report(
    metrics: &EnergyMetrics,
    input: &Path,
    generated_at: NaiveDateTime,
) -> Result<String> {
    let mut out = String::new();
    let file_name = input
        .file_name()
        .map_or_else(|| input.display().to_string(), |n| n.to_string_lossy().into_owned());

    writeln!(out, "========== ENEMETER DATA PROCESSING REPORT ==========")?;
    writeln!(out, "Input File: {file_name}")?;
    writeln!(out, "Date: {}", generated_at.format(REPORT_TIME_FORMAT))?;
    writeln!(out, "Data Points: {}", metrics.data_points)?;
    writeln!(
        out,
        "Time Range: {} to {}",
        report_time(metrics.time_range.start),
        report_time(metrics.time_range.end)
    )?;
    writeln!(out)?;

    section(&mut out, "ENERGY METRICS")?;
    writeln!(out, "Total Energy Consumed: {:.4} joules", metrics.total_joules)?;
    writeln!(out, "Average Power: {:.4} watts", metrics.average_power_watts)?;
    writeln!(out, "Peak Power: {:.4} watts", metrics.peak_power_watts)?;
    writeln!(out, "Estimated Energy per Day: {:.4} joules", metrics.joules_per_day)?;
    writeln!(out, "Measurement Duration: {:.2} seconds", metrics.duration_seconds)?;
    writeln!(out)?;

    section(&mut out, "TEMPERATURE STATISTICS")?;
    temperature_lines(&mut out, &metrics.temperature_stats)?;
    writeln!(out)?;

    section(&mut out, "VOLTAGE STATISTICS")?;
    voltage_lines(&mut out, &metrics.voltage_stats)?;
    writeln!(out)?;

    section(&mut out, "CURRENT STATISTICS")?;
    current_lines(&mut out, &metrics.current_stats)?;
    writeln!(out)?;

    section(&mut out, "BATTERY STATISTICS")?;
    battery_lines(&mut out, &metrics.battery_stats)?;
    writeln!(out)?;

    section(&mut out, "SOLAR CONTRIBUTION")?;
    solar_lines(&mut out, &metrics.solar_stats)?;
    writeln!(out)?;

    section(&mut out, "HOURLY ENERGY CONSUMPTION")?;
    if metrics.energy_by_hour.is_empty() {
        writeln!(out, "No hourly data available")?;
    } else {
        hourly_lines(&mut out, &metrics.energy_by_hour)?;
    }

    Ok(out)
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.len()))
}

fn report_time(t: Option<NaiveDateTime>) -> String {
    t.map_or_else(
        || "N/A".to_string(),
        |t| t.format(REPORT_TIME_FORMAT).to_string(),
    )
}

fn temperature_lines(out: &mut String, t: &TemperatureStats) -> std::fmt::Result {
    writeln!(out, "Minimum Temperature: {:.2} °C", t.min_celsius)?;
    writeln!(out, "Maximum Temperature: {:.2} °C", t.max_celsius)?;
    writeln!(out, "Average Temperature: {:.2} °C", t.avg_celsius)
}

fn voltage_lines(out: &mut String, v: &VoltageStats) -> std::fmt::Result {
    writeln!(out, "Minimum Voltage: {:.6} V", v.min_volts)?;
    writeln!(out, "Maximum Voltage: {:.6} V", v.max_volts)?;
    writeln!(out, "Average Voltage: {:.6} V", v.avg_volts)
}

fn current_lines(out: &mut String, c: &CurrentStats) -> std::fmt::Result {
    writeln!(out, "Minimum Current: {:.9} A", c.min_amps)?;
    writeln!(out, "Maximum Current: {:.9} A", c.max_amps)?;
    writeln!(out, "Average Current: {:.9} A", c.avg_amps)?;
    writeln!(out, "Maximum Discharge Current: {:.9} A", c.max_discharge_amps)?;
    writeln!(out, "Maximum Charging Current: {:.9} A", c.max_charging_amps)
}

fn battery_lines(out: &mut String, b: &BatteryStats) -> std::fmt::Result {
    writeln!(out, "Total Discharge Time: {:.2} seconds", b.total_discharge_seconds)?;
    writeln!(out, "Total Charge Time: {:.2} seconds", b.total_charge_seconds)?;
    writeln!(
        out,
        "Discharge to Charge Ratio: {:.2}%",
        b.discharge_to_charge_ratio * 100.0
    )?;
    writeln!(
        out,
        "Average Discharge Rate: {:.4} watts",
        b.average_discharge_rate_watts
    )
}

fn solar_lines(out: &mut String, s: &SolarStats) -> std::fmt::Result {
    writeln!(
        out,
        "Total Energy Produced: {:.4} joules",
        s.total_energy_produced_joules
    )?;
    writeln!(out, "Average Output: {:.4} watts", s.average_output_watts)?;
    // Peak output is the largest charging current, not a power.
    writeln!(out, "Peak Output: {:.4} A", s.peak_output)?;
    writeln!(
        out,
        "Contribution to Energy: {:.2}%",
        s.contribution_percentage
    )
}

fn hourly_lines(out: &mut String, hourly: &HourlyEnergy) -> std::fmt::Result {
    for (hour, joules) in hourly.iter() {
        writeln!(out, "Hour {hour:02}: {joules:.4} joules")?;
    }
    Ok(())
}

fn text_metric(kind: MetricKind, value: MetricValue<'_>) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "===== {} =====", kind.as_str().to_uppercase())?;

    match value {
        MetricValue::Scalar(v) => {
            let (label, unit) = match kind {
                MetricKind::TotalEnergy => ("Total Energy", "joules"),
                MetricKind::AveragePower => ("Average Power", "watts"),
                MetricKind::PeakPower => ("Peak Power", "watts"),
                other => (other.as_str(), ""),
            };
            writeln!(out, "{label}: {v:.4} {unit}")?;
        }
        MetricValue::Temperature(t) => temperature_lines(&mut out, t)?,
        MetricValue::HourlyEnergy(h) => {
            writeln!(out, "Energy Consumption by Hour:")?;
            hourly_lines(&mut out, h)?;
        }
        MetricValue::Voltage(v) => voltage_lines(&mut out, v)?,
        MetricValue::Current(c) => current_lines(&mut out, c)?,
        MetricValue::Battery(b) => battery_lines(&mut out, b)?,
        MetricValue::Solar(s) => solar_lines(&mut out, s)?,
    }
    Ok(out)
}

fn csv_time(t: Option<NaiveDateTime>) -> String {
    t.map(|t| t.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

fn csv_report(metrics: &EnergyMetrics) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "Metric,Value")?;
    writeln!(out, "TotalJoules,{:.6}", metrics.total_joules)?;
    writeln!(out, "AveragePowerWatts,{:.6}", metrics.average_power_watts)?;
    writeln!(out, "PeakPowerWatts,{:.6}", metrics.peak_power_watts)?;
    writeln!(out, "JoulesPerDay,{:.6}", metrics.joules_per_day)?;
    writeln!(out, "DurationSeconds,{:.2}", metrics.duration_seconds)?;
    writeln!(out, "DataPoints,{}", metrics.data_points)?;
    writeln!(out, "StartTime,{}", csv_time(metrics.time_range.start))?;
    writeln!(out, "EndTime,{}", csv_time(metrics.time_range.end))?;

    writeln!(out, "\nTemperatureStats,Value")?;
    csv_temperature(&mut out, &metrics.temperature_stats)?;
    writeln!(out, "\nVoltageStats,Value")?;
    csv_voltage(&mut out, &metrics.voltage_stats)?;
    writeln!(out, "\nCurrentStats,Value")?;
    csv_current(&mut out, &metrics.current_stats)?;
    writeln!(out, "\nBatteryStats,Value")?;
    csv_battery(&mut out, &metrics.battery_stats)?;
    writeln!(out, "\nSolarStats,Value")?;
    csv_solar(&mut out, &metrics.solar_stats)?;
    writeln!(out)?;
    csv_hourly(&mut out, &metrics.energy_by_hour)?;

    Ok(out)
}

fn csv_metric(kind: MetricKind, value: MetricValue<'_>) -> Result<String> {
    let mut out = String::new();
    match value {
        MetricValue::Scalar(v) => {
            writeln!(out, "{},Value", kind.as_str())?;
            writeln!(out, "{},{v:.6}", kind.as_str())?;
        }
        MetricValue::HourlyEnergy(h) => csv_hourly(&mut out, h)?,
        MetricValue::Temperature(t) => {
            writeln!(out, "Measurement,Value")?;
            csv_temperature(&mut out, t)?;
        }
        MetricValue::Voltage(v) => {
            writeln!(out, "Measurement,Value")?;
            csv_voltage(&mut out, v)?;
        }
        MetricValue::Current(c) => {
            writeln!(out, "Measurement,Value")?;
            csv_current(&mut out, c)?;
        }
        MetricValue::Battery(b) => {
            writeln!(out, "Measurement,Value")?;
            csv_battery(&mut out, b)?;
        }
        MetricValue::Solar(s) => {
            writeln!(out, "Measurement,Value")?;
            csv_solar(&mut out, s)?;
        }
    }
    Ok(out)
}

fn csv_temperature(out: &mut String, t: &TemperatureStats) -> std::fmt::Result {
    writeln!(out, "MinTempCelsius,{:.2}", t.min_celsius)?;
    writeln!(out, "MaxTempCelsius,{:.2}", t.max_celsius)?;
    writeln!(out, "AvgTempCelsius,{:.2}", t.avg_celsius)
}

fn csv_voltage(out: &mut String, v: &VoltageStats) -> std::fmt::Result {
    writeln!(out, "MinVoltage,{:.6}", v.min_volts)?;
    writeln!(out, "MaxVoltage,{:.6}", v.max_volts)?;
    writeln!(out, "AvgVoltage,{:.6}", v.avg_volts)
}

fn csv_current(out: &mut String, c: &CurrentStats) -> std::fmt::Result {
    writeln!(out, "MinCurrent,{:.9}", c.min_amps)?;
    writeln!(out, "MaxCurrent,{:.9}", c.max_amps)?;
    writeln!(out, "AvgCurrent,{:.9}", c.avg_amps)?;
    writeln!(out, "MaxDischarge,{:.9}", c.max_discharge_amps)?;
    writeln!(out, "MaxCharging,{:.9}", c.max_charging_amps)
}

fn csv_battery(out: &mut String, b: &BatteryStats) -> std::fmt::Result {
    writeln!(out, "TotalDischargeTime,{:.2}", b.total_discharge_seconds)?;
    writeln!(out, "TotalChargeTime,{:.2}", b.total_charge_seconds)?;
    writeln!(out, "DischargeToChargeRatio,{:.6}", b.discharge_to_charge_ratio)?;
    writeln!(out, "AverageDischargeRate,{:.6}", b.average_discharge_rate_watts)
}

fn csv_solar(out: &mut String, s: &SolarStats) -> std::fmt::Result {
    writeln!(out, "TotalEnergyProduced,{:.6}", s.total_energy_produced_joules)?;
    writeln!(out, "AverageOutput,{:.6}", s.average_output_watts)?;
    writeln!(out, "PeakOutput,{:.6}", s.peak_output)?;
    writeln!(out, "ContributionPercentage,{:.2}", s.contribution_percentage)
}

fn csv_hourly(out: &mut String, hourly: &HourlyEnergy) -> std::fmt::Result {
    writeln!(out, "Hour,EnergyJoules")?;
    for (hour, joules) in hourly.iter() {
        writeln!(out, "{hour},{joules:.6}")?;
    }
    Ok(())
}

/// Render what the inspector found in the head of a file.
///
/// # Errors
/// Formatting failures.
pub fn render_inspection(
    input: &Path,
    sample_size: usize,
    report: &InspectReport,
    units: &UnitSuggestion,
) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Analyzing file: {}", input.display())?;
    writeln!(out, "Showing {sample_size} sample rows:")?;
    writeln!(out)?;

    writeln!(out, "RAW DATA SAMPLES:")?;
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "{:<15} {:<15} {:<15} {:<15}",
        "TIME_DELTA", "VOLTAGE", "CURRENT", "TEMP"
    )?;
    writeln!(out, "{RULE}")?;
    for s in &report.samples {
        writeln!(
            out,
            "{:<15} {:<15} {:<15} {:<15}",
            s.time_delta_ms, s.voltage_microvolts, s.current_nanoamps, s.temp_millicelsius
        )?;
    }
    for issue in &report.issues {
        match issue {
            InspectIssue::FieldCount { line, found } => {
                writeln!(out, "Row {line} has {found} columns, expected 4")?;
            }
        }
    }

    let r = &report.ranges;
    writeln!(out)?;
    writeln!(out, "VALUE RANGES:")?;
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "Time Delta:   Min={} ms, Max={} ms",
        r.time_delta.min, r.time_delta.max
    )?;

    writeln!(
        out,
        "Temperature:  Min={}, Max={} (Raw value)",
        r.temperature.min, r.temperature.max
    )?;
    let (lo, hi) = r.temperature.scaled(1_000.0);
    writeln!(out, "              Min={lo:.2} °C, Max={hi:.2} °C (Millicelsius)")?;
    let (lo, hi) = r.temperature.scaled(100.0);
    writeln!(out, "              Min={lo:.2} °C, Max={hi:.2} °C (Raw/100)")?;

    writeln!(
        out,
        "Voltage:      Min={}, Max={} (Raw value)",
        r.voltage.min, r.voltage.max
    )?;
    let (lo, hi) = r.voltage.scaled(1_000_000.0);
    writeln!(out, "              Min={lo:.6} V, Max={hi:.6} V (Microvolts)")?;
    let (lo, hi) = r.voltage.scaled(1_000.0);
    writeln!(out, "              Min={lo:.6} V, Max={hi:.6} V (Millivolts)")?;

    writeln!(
        out,
        "Current:      Min={}, Max={} (Raw value)",
        r.current.min, r.current.max
    )?;
    let (lo, hi) = r.current.scaled(1_000_000_000.0);
    writeln!(out, "              Min={lo:.6} A, Max={hi:.6} A (Nanoamperes)")?;
    let (lo, hi) = r.current.scaled(1_000_000.0);
    writeln!(out, "              Min={lo:.6} A, Max={hi:.6} A (Microamperes)")?;

    writeln!(out)?;
    writeln!(out, "SUGGESTED UNITS:")?;
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "Temperature: {} (°C = raw / {})",
        units.temperature.label(),
        units.temperature.divisor()
    )?;
    writeln!(
        out,
        "Voltage:     {} (V = raw / {})",
        units.voltage.label(),
        units.voltage.divisor()
    )?;
    writeln!(
        out,
        "Current:     {} (A = raw / {})",
        units.current.label(),
        units.current.divisor()
    )?;

    writeln!(out)?;
    writeln!(out, "ENEMETER DATA FORMAT:")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Column order: TIME_DELTA, VOLTAGE, CURRENT, TEMP")?;
    writeln!(out, "Temperature: millicelsius (°C = value / 1000)")?;
    writeln!(out, "Voltage:     microvolts (V = value / 1000000)")?;
    writeln!(out, "Current:     nanoamperes (A = value / 1000000000)")?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use enemeter_engine::aggregator::calculate_metrics;
    use enemeter_engine::config::MetricsOptions;
    use enemeter_engine::decoder::{RecordDecoder, decode_all, numbered};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn sample_metrics() -> EnergyMetrics {
        let rows = vec![
            ["1000", "3700000", "-20000000", "25000"],
            ["1000", "3700000", "-20000000", "26000"],
            ["1000", "3700000", "10000000", "27000"],
        ];
        let mut decoder = RecordDecoder::new(Some(at(10, 0, 0)), &Default::default()).unwrap();
        let (records, _) = decode_all(numbered(rows), &mut decoder).unwrap();
        calculate_metrics(&records, &MetricsOptions::default())
    }

    #[test]
    fn test_text_report_sections() {
        let text = render_report(
            &sample_metrics(),
            Path::new("/data/run.csv"),
            OutputFormat::Text,
            at(12, 0, 0),
        )
        .unwrap();

        assert!(text.starts_with("========== ENEMETER DATA PROCESSING REPORT =========="));
        assert!(text.contains("Input File: run.csv\n"));
        assert!(text.contains("Date: 2025-04-01 12:00:00\n"));
        assert!(text.contains("Data Points: 3\n"));
        assert!(text.contains("Time Range: 2025-04-01 10:00:01 to 2025-04-01 10:00:03\n"));
        assert!(text.contains("Measurement Duration: 2.00 seconds\n"));
        assert!(text.contains("Hour 10: "));
        assert!(!text.contains("No hourly data available"));
    }

    #[test]
    fn test_text_report_empty_snapshot() {
        let text = render_report(
            &EnergyMetrics::default(),
            Path::new("empty.csv"),
            OutputFormat::Text,
            at(12, 0, 0),
        )
        .unwrap();
        assert!(text.contains("Time Range: N/A to N/A\n"));
        assert!(text.contains("No hourly data available\n"));
    }

    #[test]
    fn test_json_report_parses_back() {
        let json = render_report(
            &sample_metrics(),
            Path::new("run.csv"),
            OutputFormat::Json,
            at(12, 0, 0),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["data_points"], 3);
        assert!(value["energy_by_hour"]["10"].is_number());
    }

    #[test]
    fn test_csv_report_sections() {
        let csv = render_report(
            &sample_metrics(),
            Path::new("run.csv"),
            OutputFormat::Csv,
            at(12, 0, 0),
        )
        .unwrap();
        assert!(csv.starts_with("Metric,Value\n"));
        assert!(csv.contains("DataPoints,3\n"));
        assert!(csv.contains("StartTime,2025-04-01T10:00:01Z\n"));
        assert!(csv.contains("\nSolarStats,Value\n"));
        assert!(csv.contains("\nHour,EnergyJoules\n10,"));
    }

    #[test]
    fn test_render_single_metric() {
        let metrics = sample_metrics();

        let text = render_metric(&metrics, "peak_power", OutputFormat::Text).unwrap();
        assert!(text.starts_with("===== PEAK_POWER =====\nPeak Power: "));
        assert!(text.trim_end().ends_with(" watts"));

        let text = render_metric(&metrics, "average_power", OutputFormat::Text).unwrap();
        assert!(text.contains("\nAverage Power: "));

        let csv = render_metric(&metrics, "total_energy", OutputFormat::Csv).unwrap();
        assert!(csv.starts_with("total_energy,Value\ntotal_energy,"));

        let json = render_metric(&metrics, "temperature", OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["max_celsius"], 27.0);
    }

    #[test]
    fn test_render_unknown_metric_leaves_report_usable() {
        let metrics = sample_metrics();
        let err = render_metric(&metrics, "efficiency", OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("Unknown metric type: efficiency"));

        let report = render_report(
            &metrics,
            Path::new("data.csv"),
            OutputFormat::Json,
            at(12, 0, 0),
        );
        assert!(report.is_ok());
    }

    #[test]
    fn test_render_every_metric_in_every_format() {
        let metrics = sample_metrics();
        for kind in MetricKind::ALL {
            for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Csv] {
                let out = render_metric(&metrics, kind.as_str(), format).unwrap();
                assert!(!out.is_empty(), "{kind} as {format:?}");
            }
        }
    }
}
