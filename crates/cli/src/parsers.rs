use chrono::{NaiveDate, NaiveDateTime};
use std::time::Duration;
use std::{fmt::Display, str::FromStr};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Wrapper type to parse naive date/time arguments in multiple formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeArg(pub NaiveDateTime);

impl FromStr for DateTimeArg {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        try_datetime_formats(s)
            .or_else(|| try_date_format(s))
            .map(Self)
            .ok_or_else(|| format!("Cannot parse datetime: {s}"))
    }
}

fn try_datetime_formats(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn try_date_format(s: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|nd| nd.and_hms_opt(0, 0, 0))
}

/// Wrapper type to parse durations such as `90s`, `30m`, `1h30m`, `500ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationArg(pub Duration);

impl FromStr for DurationArg {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "0" {
            return Ok(Self(Duration::ZERO));
        }
        if s.is_empty() {
            return Err("Empty duration".to_string());
        }

        let mut total = Duration::ZERO;
        let mut rest = s;
        while !rest.is_empty() {
            let (number, tail) = split_leading(rest, |c| c.is_ascii_digit() || c == '.');
            let (unit, next) = split_leading(tail, |c| !(c.is_ascii_digit() || c == '.'));
            total += parse_component(number, unit).map_err(|err| format!("{err}: {s}"))?;
            rest = next;
        }
        Ok(Self(total))
    }
}

fn split_leading(s: &str, pred: impl Fn(char) -> bool) -> (&str, &str) {
    let end = s.find(|c: char| !pred(c)).unwrap_or(s.len());
    s.split_at(end)
}

fn parse_component(number: &str, unit: &str) -> Result<Duration, String> {
    let unit_ms: u64 = match unit {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "" => return Err("Missing duration unit".to_string()),
        other => return Err(format!("Unknown duration unit '{other}'")),
    };

    if let Ok(whole) = number.parse::<u64>() {
        return whole
            .checked_mul(unit_ms)
            .map(Duration::from_millis)
            .ok_or_else(|| "Duration too large".to_string());
    }
    let value: f64 = number
        .parse()
        .map_err(|_| format!("Invalid duration number '{number}'"))?;
    Duration::try_from_secs_f64(value * unit_ms as f64 / 1_000.0).map_err(|err| err.to_string())
}

fn parse_bounded_number<T>(s: &str, min: T, max: Option<T>) -> Result<T, String>
where
    T: Copy + PartialOrd + Display + FromStr,
    <T as FromStr>::Err: Display,
{
    let value = s
        .parse::<T>()
        .map_err(|err| format!("invalid number '{s}': {err}"))?;
    if value < min {
        return Err(format!("value must be at least {min}"));
    }
    if let Some(max_bound) = max
        && value > max_bound
    {
        return Err(format!("value must be at most {max_bound}"));
    }
    Ok(value)
}

/// Parse a positive `usize` (>= 1) from CLI input.
///
/// # Errors
/// Returns an error if the input string is not a valid number or is less than 1.
pub fn parse_positive_usize(s: &str) -> Result<usize, String> {
    parse_bounded_number(s, 1, None)
}
