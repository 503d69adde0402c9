//! Temperature file loading.
//!
//! Two layouts are understood, both with a header row (optionally preceded
//! by `skiprows` lines that are ignored):
//!
//! - **Readings**: one row per measurement with station, date, time and air
//!   temperature columns, e.g. `STATION,DATE,TIME,TEMP_A_F`. The time column
//!   may be absent when the date cell holds a full timestamp.
//! - **Daily**: one row per day with date, minimum and maximum columns, e.g.
//!   `STATION,DATE,MinOfTEMP_A_F,MaxOfTEMP_A_F`.
//!
//! Rows whose date or temperature cannot be parsed are skipped and counted.

use crate::settings::InputColumns;
use anyhow::{anyhow, bail, Context};
use chrono::NaiveDateTime;
use csv::StringRecord;
use ddt_core::{
    daily::{DailyRecord, DailySeries},
    reading::Reading,
};
use ddt_utils::dates::{parse_date_flexible, parse_datetime_flexible, parse_time_flexible};
use flate2::read::GzDecoder;
use log::{debug, info};
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

/// Open a temperatures file, decompressing `.gz` files on the fly.
pub fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to load temperatures file '{}'", path.display()))?;
    let gzipped = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if gzipped {
        debug!("Reading gzip-compressed {}", path.display());
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn skip_lines<R: BufRead>(reader: &mut R, count: usize) -> io::Result<()> {
    let mut line = Vec::new();
    for _ in 0..count {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
    }
    Ok(())
}

fn header_position(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn require_column(headers: &StringRecord, name: &str) -> anyhow::Result<usize> {
    header_position(headers, name).ok_or_else(|| {
        anyhow!(
            "Column '{}' not found; header is: {}",
            name,
            headers.iter().collect::<Vec<_>>().join(", ")
        )
    })
}

fn cell<'r>(record: &'r StringRecord, index: usize) -> &'r str {
    record.get(index).unwrap_or("").trim()
}

/// Header positions shared by both layouts.
struct Layout {
    station: Option<usize>,
    date: usize,
    time: Option<usize>,
    wanted_station: Option<String>,
    seen_station: Option<String>,
}

impl Layout {
    fn new(
        headers: &StringRecord,
        columns: &InputColumns,
        station: Option<&str>,
        with_time: bool,
    ) -> anyhow::Result<Layout> {
        let station_index = header_position(headers, &columns.station);
        if station.is_some() && station_index.is_none() {
            bail!(
                "Station filter given but column '{}' not found",
                columns.station
            );
        }
        Ok(Layout {
            station: station_index,
            date: require_column(headers, &columns.date)?,
            time: with_time
                .then(|| header_position(headers, &columns.time))
                .flatten(),
            wanted_station: station.map(str::to_string),
            seen_station: None,
        })
    }

    fn station_id<'r>(&self, record: &'r StringRecord) -> Option<&'r str> {
        self.station.map(|i| cell(record, i))
    }

    /// The row belongs to the requested station. Without a requested
    /// station every row is kept, but the file must then hold one station.
    fn accepts(&mut self, record: &StringRecord) -> anyhow::Result<bool> {
        if let Some(wanted) = &self.wanted_station {
            return Ok(self.station_id(record) == Some(wanted.as_str()));
        }
        let Some(id) = self.station_id(record).filter(|id| !id.is_empty()) else {
            return Ok(true);
        };
        let seen = self.seen_station.get_or_insert_with(|| id.to_string());
        if seen.as_str() != id {
            bail!(
                "File holds more than one station ('{}', '{}'); choose one with --station",
                seen,
                id
            );
        }
        Ok(true)
    }

    fn timestamp(&self, record: &StringRecord) -> anyhow::Result<NaiveDateTime> {
        let date_cell = cell(record, self.date);
        match self.time.map(|i| cell(record, i)).filter(|t| !t.is_empty()) {
            Some(time_cell) => {
                // spreadsheet exports often carry a midnight time in the date cell
                let date_part = date_cell
                    .split_once([' ', 'T'])
                    .map_or(date_cell, |(date, _)| date);
                Ok(parse_date_flexible(date_part)?.and_time(parse_time_flexible(time_cell)?))
            }
            None => parse_datetime_flexible(date_cell),
        }
    }
}

fn parse_temperature(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Read one reading per row.
pub fn read_readings<R: BufRead>(
    mut reader: R,
    columns: &InputColumns,
    station: Option<&str>,
) -> anyhow::Result<Vec<Reading>> {
    skip_lines(&mut reader, columns.skiprows)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut layout = Layout::new(&headers, columns, station, true)?;
    let temp_index = require_column(&headers, &columns.air_temp)?;

    let mut readings = Vec::new();
    let mut other_stations = 0u32;
    let mut skipped = 0u32;
    for result in rdr.records() {
        let record = result?;
        if !layout.accepts(&record)? {
            other_stations += 1;
            continue;
        }
        let timestamp = match layout.timestamp(&record) {
            Ok(ts) => ts,
            Err(e) => {
                debug!("Skipping row {:?}: {}", record.position().map(|p| p.line()), e);
                skipped += 1;
                continue;
            }
        };
        let Some(value) = parse_temperature(cell(&record, temp_index)) else {
            skipped += 1;
            continue;
        };
        let reading = Reading::new(timestamp, value);
        readings.push(match layout.station_id(&record) {
            Some(id) if !id.is_empty() => reading.with_station(id),
            _ => reading,
        });
    }
    info!(
        "Loaded {} readings ({} rows skipped, {} rows for other stations)",
        readings.len(),
        skipped,
        other_stations
    );
    Ok(readings)
}

/// Read one min/max pair per row. A row missing either temperature becomes a
/// missing day; repeated dates keep the last row.
pub fn read_daily<R: BufRead>(
    mut reader: R,
    columns: &InputColumns,
    station: Option<&str>,
) -> anyhow::Result<DailySeries> {
    let Some((min_col, max_col)) = columns.daily_columns()? else {
        bail!("Daily input needs both min_air_temp_col and max_air_temp_col");
    };
    skip_lines(&mut reader, columns.skiprows)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut layout = Layout::new(&headers, columns, station, false)?;
    let min_index = require_column(&headers, min_col)?;
    let max_index = require_column(&headers, max_col)?;

    let mut records = Vec::new();
    let mut skipped = 0u32;
    for result in rdr.records() {
        let record = result?;
        if !layout.accepts(&record)? {
            continue;
        }
        let date = match layout.timestamp(&record) {
            Ok(ts) => ts.date(),
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        let min = parse_temperature(cell(&record, min_index));
        let max = parse_temperature(cell(&record, max_index));
        records.push(match min.zip(max) {
            Some((min, max)) => DailyRecord::observed(date, 1, min, max),
            None => DailyRecord::missing(date),
        });
    }
    let series = DailySeries::from_unsorted(records);
    info!("Loaded {} daily rows ({} skipped)", series.len(), skipped);
    Ok(series)
}
