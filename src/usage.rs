use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::Read,
    path::Path,
};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use clap::ValueEnum;
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{
    prelude::*,
    quantity::{KilowattHours, parse_finite},
};

pub const HALF_HOURS_PER_DAY: usize = 48;

/// Date column plus one value per half hour.
const DAY_FIELDS: usize = HALF_HOURS_PER_DAY + 1;

const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 2] = ["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];

const PERIOD_START_COLUMN: usize = 9;
const PERIOD_END_COLUMN: usize = 10;
const CONSUMPTION_COLUMN: usize = 12;
const INTERVAL_FIELDS: usize = CONSUMPTION_COLUMN + 1;

/// Layout of the usage export.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum UsageFormat {
    /// One row per day: a date followed by 48 half-hour values.
    #[default]
    Daily,

    /// One row per interval with start, end and consumption columns (EIEP13A).
    Interval,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Reading {
    pub start: NaiveDateTime,
    pub duration: TimeDelta,
    pub consumption: KilowattHours,
}

#[derive(Debug)]
pub struct Usage {
    readings: Vec<Reading>,
}

impl Usage {
    pub fn load(path: &Path, format: UsageFormat) -> Result<Self, Error> {
        let file = File::open(path).map_err(|source| Error::Open { path: path.into(), source })?;
        Self::from_reader(file, path, format)
    }

    /// Parse an already opened export. `path` only labels errors.
    pub fn from_reader(reader: impl Read, path: &Path, format: UsageFormat) -> Result<Self, Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let readings = match format {
            UsageFormat::Daily => parse_daily(&mut reader, path)?,
            UsageFormat::Interval => parse_interval(&mut reader, path)?,
        };
        if readings.is_empty() {
            return Err(Error::EmptyUsage { path: path.into() });
        }
        Ok(Self { readings })
    }

    #[must_use]
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    #[must_use]
    pub fn total_consumption(&self) -> KilowattHours {
        self.readings.iter().map(|reading| reading.consumption).sum()
    }

    /// Number of distinct calendar dates with at least one reading.
    #[must_use]
    pub fn n_days(&self) -> usize {
        self.readings.iter().map(|reading| reading.start.date()).collect::<BTreeSet<_>>().len()
    }

    /// Readings grouped by the date they start on.
    #[must_use]
    pub fn by_day(&self) -> BTreeMap<NaiveDate, Vec<&Reading>> {
        let mut days: BTreeMap<NaiveDate, Vec<&Reading>> = BTreeMap::new();
        for reading in &self.readings {
            days.entry(reading.start.date()).or_default().push(reading);
        }
        days
    }

    /// Total time covered by the readings.
    #[must_use]
    pub fn covered(&self) -> TimeDelta {
        self.readings.iter().fold(TimeDelta::zero(), |total, reading| total + reading.duration)
    }

    #[must_use]
    pub fn covered_days(&self) -> f64 {
        self.covered().num_seconds() as f64 / 86_400.0
    }
}

fn parse_daily(reader: &mut csv::Reader<impl Read>, path: &Path) -> Result<Vec<Reading>, Error> {
    let half_hour = TimeDelta::minutes(30);
    let mut readings = Vec::new();
    let mut in_body = false;

    for record in reader.records() {
        let record = record.map_err(|source| Error::from_csv(path, source))?;
        let line = line_of(&record);
        let first = record.get(0).unwrap_or_default();

        let Some(date) = parse_date(first) else {
            if in_body {
                return Err(Error::InvalidTimestamp {
                    path: path.into(),
                    line,
                    value: first.to_string(),
                });
            }
            debug!(line, "skipping metadata row");
            continue;
        };
        in_body = true;

        if record.len() != DAY_FIELDS {
            return Err(Error::FieldCount {
                path: path.into(),
                line,
                expected: DAY_FIELDS,
                actual: record.len(),
            });
        }

        let midnight = date.and_time(NaiveTime::MIN);
        for (index, value) in record.iter().skip(1).enumerate() {
            let consumption = parse_finite(value).ok_or_else(|| Error::InvalidNumber {
                path: path.into(),
                line,
                field: format!("half-hour {}", index + 1),
                value: value.to_string(),
            })?;
            readings.push(Reading {
                start: midnight + half_hour * index as i32,
                duration: half_hour,
                consumption: KilowattHours(consumption),
            });
        }
    }

    Ok(readings)
}

fn parse_interval(reader: &mut csv::Reader<impl Read>, path: &Path) -> Result<Vec<Reading>, Error> {
    let max_duration = TimeDelta::hours(1);
    let mut readings = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|source| Error::from_csv(path, source))?;
        let line = line_of(&record);
        if index == 0 {
            debug!(line, "skipping header row");
            continue;
        }
        if record.len() < INTERVAL_FIELDS {
            return Err(Error::FieldCount {
                path: path.into(),
                line,
                expected: INTERVAL_FIELDS,
                actual: record.len(),
            });
        }

        let start = parse_timestamp(&record[PERIOD_START_COLUMN], path, line)?;
        let end = parse_timestamp(&record[PERIOD_END_COLUMN], path, line)?;
        let value = &record[CONSUMPTION_COLUMN];
        let consumption = parse_finite(value).ok_or_else(|| Error::InvalidNumber {
            path: path.into(),
            line,
            field: format!("column {CONSUMPTION_COLUMN}"),
            value: value.to_string(),
        })?;

        let duration = end - start;
        if duration <= TimeDelta::zero() {
            return Err(Error::InvalidTimestamp {
                path: path.into(),
                line,
                value: record[PERIOD_END_COLUMN].to_string(),
            });
        }
        if duration > max_duration {
            debug!(line, %start, %end, "skipping summary interval");
            continue;
        }

        readings.push(Reading { start, duration, consumption: KilowattHours(consumption) });
    }

    Ok(readings)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn parse_timestamp(value: &str, path: &Path, line: u64) -> Result<NaiveDateTime, Error> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| Error::InvalidTimestamp { path: path.into(), line, value: value.to_string() })
}
