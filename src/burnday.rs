/*!
 * Group a time series into burn days.
 *
 * A burn day is a 24 hour period that starts at a fixed hour (UTC) rather than midnight. The
 * default of 12Z is early morning in the western U.S., when fire activity is typically at a
 * minimum and wildland fire fighters start their shift, so little continuous activity is split
 * across two days.
 */

use crate::{
    timeseries::{FirePowerTimeSeries, TimeSeriesRow},
    FireId, FirePowerError, FirePowerResult,
};
use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

/// The calendar date of a burn day.
pub type BurnDay = NaiveDate;

/// Number of seconds in a burn day.
pub const SECONDS_PER_BURN_DAY: u32 = 24 * 60 * 60;

/// The hour of the day (UTC) when one burn day ends and the next begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreakHour(u32);

impl BreakHour {
    /// 12Z
    pub const DEFAULT: BreakHour = BreakHour(12);

    /// Create a break hour, it must be in the range 0-23.
    pub fn new(hour: u32) -> FirePowerResult<Self> {
        if hour < 24 {
            Ok(BreakHour(hour))
        } else {
            Err(FirePowerError::InvalidBreakHour(hour))
        }
    }

    pub fn hour(self) -> u32 {
        self.0
    }

    fn offset(self) -> Duration {
        Duration::hours(i64::from(self.0))
    }
}

impl Default for BreakHour {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for BreakHour {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{:02}Z", self.0)
    }
}

/// Find the burn day a time falls in and how many seconds into that burn day it is.
///
/// Fails with [FirePowerError::InvalidTimestamp] if shifting back to the break hour goes past the
/// earliest representable time.
pub fn burn_day(
    scan_time: DateTime<Utc>,
    break_hour: BreakHour,
) -> FirePowerResult<(BurnDay, u32)> {
    let shifted = scan_time
        .checked_sub_signed(break_hour.offset())
        .ok_or(FirePowerError::InvalidTimestamp(scan_time.timestamp()))?;
    let second_of_burn_day = shifted.num_seconds_from_midnight();

    Ok((shifted.date_naive(), second_of_burn_day))
}

/// A [TimeSeriesRow] placed within its burn day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnDayRow {
    pub scan_time: DateTime<Utc>,
    /// Seconds since the start of the burn day, always less than [SECONDS_PER_BURN_DAY].
    pub second_of_burn_day: u32,
    pub total_power: f64,
    pub max_temperature: f64,
}

impl From<BurnDayRow> for TimeSeriesRow {
    fn from(row: BurnDayRow) -> Self {
        TimeSeriesRow {
            scan_time: row.scan_time,
            total_power: row.total_power,
            max_temperature: row.max_temperature,
        }
    }
}

/// All the rows of a fire's time series that fall in a single burn day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub day: BurnDay,
    pub satellite: String,
    /// Ordered by scan time.
    pub rows: Vec<BurnDayRow>,
}

impl DailySeries {
    pub fn max_power(&self) -> Option<f64> {
        self.rows.iter().map(|r| r.total_power).reduce(f64::max)
    }

    /// Get the rows back as a plain time series.
    pub fn time_series_rows(&self) -> Vec<TimeSeriesRow> {
        self.rows.iter().copied().map(TimeSeriesRow::from).collect()
    }
}

impl Display for DailySeries {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "{} {} ({} scans)", self.day, self.satellite, self.rows.len())?;
        for row in &self.rows {
            writeln!(
                f,
                "  {:>5}s  {}  {:>10.0} MW  {:>6.0}K",
                row.second_of_burn_day,
                row.scan_time.format("%H:%M:%S"),
                row.total_power,
                row.max_temperature
            )?;
        }

        Ok(())
    }
}

/// A fire's time series grouped by burn day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyFirePower {
    pub fire_id: FireId,
    pub satellite: String,
    pub break_hour: BreakHour,
    days: BTreeMap<BurnDay, DailySeries>,
}

impl DailyFirePower {
    /// The burn days with data, in ascending order.
    pub fn days(&self) -> impl Iterator<Item = BurnDay> + '_ {
        self.days.keys().copied()
    }

    pub fn get(&self, day: BurnDay) -> Option<&DailySeries> {
        self.days.get(&day)
    }

    /// Iterate over the daily groups in ascending order of day.
    pub fn iter(&self) -> impl Iterator<Item = &DailySeries> {
        self.days.values()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Keep only the days in the inclusive range `start` to `end`. A missing bound is open.
    pub fn filter_days(mut self, start: Option<BurnDay>, end: Option<BurnDay>) -> Self {
        self.days.retain(|day, _| {
            start.map_or(true, |start| *day >= start) && end.map_or(true, |end| *day <= end)
        });
        self
    }

    /// The largest total power on any day, or `None` if there is no data.
    pub fn max_power(&self) -> Option<f64> {
        self.iter().filter_map(DailySeries::max_power).reduce(f64::max)
    }
}

/// Split a time series into burn days.
///
/// Every row ends up in exactly one day, and within a day the rows keep their order.
pub fn bucketize(
    series: &FirePowerTimeSeries,
    break_hour: BreakHour,
) -> FirePowerResult<DailyFirePower> {
    let mut days: BTreeMap<BurnDay, DailySeries> = BTreeMap::new();

    for row in &series.rows {
        let (day, second_of_burn_day) = burn_day(row.scan_time, break_hour)?;

        days.entry(day)
            .or_insert_with(|| DailySeries {
                day,
                satellite: series.satellite.clone(),
                rows: vec![],
            })
            .rows
            .push(BurnDayRow {
                scan_time: row.scan_time,
                second_of_burn_day,
                total_power: row.total_power,
                max_temperature: row.max_temperature,
            });
    }

    for daily in days.values_mut() {
        daily.rows.sort_by_key(|row| row.scan_time);
    }

    Ok(DailyFirePower {
        fire_id: series.fire_id,
        satellite: series.satellite.clone(),
        break_hour,
        days,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn row(y: i32, mo: u32, d: u32, h: u32, mi: u32, power: f64) -> TimeSeriesRow {
        TimeSeriesRow {
            scan_time: Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap(),
            total_power: power,
            max_temperature: 500.0,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> BurnDay {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(rows: Vec<TimeSeriesRow>) -> FirePowerTimeSeries {
        FirePowerTimeSeries {
            fire_id: 1,
            satellite: "G17".to_owned(),
            rows,
        }
    }

    #[test]
    fn test_break_hour_range() {
        assert_eq!(BreakHour::new(0).unwrap().hour(), 0);
        assert_eq!(BreakHour::new(23).unwrap().hour(), 23);
        assert!(matches!(
            BreakHour::new(24),
            Err(FirePowerError::InvalidBreakHour(24))
        ));
        assert_eq!(BreakHour::default().hour(), 12);
        assert_eq!(BreakHour::default().to_string(), "12Z");
    }

    #[test]
    fn test_burn_day_either_side_of_break() {
        let bh = BreakHour::default();

        let before = row(2023, 6, 1, 10, 0, 1.0).scan_time;
        let after = row(2023, 6, 1, 14, 0, 1.0).scan_time;

        assert_eq!(burn_day(before, bh).unwrap(), (date(2023, 5, 31), 79200));
        assert_eq!(burn_day(after, bh).unwrap(), (date(2023, 6, 1), 7200));
    }

    #[test]
    fn test_exactly_on_break_starts_the_day() {
        let bh = BreakHour::new(12).unwrap();
        let on_break = row(2023, 6, 1, 12, 0, 1.0).scan_time;
        assert_eq!(burn_day(on_break, bh).unwrap(), (date(2023, 6, 1), 0));

        let midnight = row(2023, 6, 1, 0, 0, 1.0).scan_time;
        assert_eq!(
            burn_day(midnight, BreakHour::new(0).unwrap()).unwrap(),
            (date(2023, 6, 1), 0)
        );
    }

    #[test]
    fn test_crosses_year_boundary() {
        let bh = BreakHour::new(6).unwrap();
        let t = row(2024, 1, 1, 5, 59, 1.0).scan_time;
        assert_eq!(burn_day(t, bh).unwrap(), (date(2023, 12, 31), 86340));
    }

    #[test]
    fn test_partition_reproduces_input() {
        let rows = vec![
            row(2023, 6, 1, 10, 0, 1.0),
            row(2023, 6, 1, 11, 59, 2.0),
            row(2023, 6, 1, 12, 0, 3.0),
            row(2023, 6, 1, 23, 0, 4.0),
            row(2023, 6, 2, 11, 0, 5.0),
            row(2023, 6, 3, 13, 0, 6.0),
        ];
        let series = series(rows.clone());

        let daily = bucketize(&series, BreakHour::default()).unwrap();
        assert_eq!(
            daily.days().collect::<Vec<_>>(),
            vec![date(2023, 5, 31), date(2023, 6, 1), date(2023, 6, 3)]
        );

        let rejoined: Vec<TimeSeriesRow> =
            daily.iter().flat_map(|d| d.time_series_rows()).collect();
        assert_eq!(rejoined, rows);

        for d in daily.iter() {
            assert_eq!(d.satellite, "G17");
            assert!(d.rows.iter().all(|r| r.second_of_burn_day < SECONDS_PER_BURN_DAY));
            assert!(d
                .rows
                .windows(2)
                .all(|w| w[0].second_of_burn_day < w[1].second_of_burn_day));
        }

        assert_eq!(daily.get(date(2023, 6, 1)).unwrap().rows.len(), 3);
        assert_eq!(daily.max_power(), Some(6.0));
    }

    #[test]
    fn test_rebucketizing_a_day_is_idempotent() {
        let rows = vec![
            row(2023, 6, 1, 13, 0, 1.0),
            row(2023, 6, 1, 20, 0, 2.0),
            row(2023, 6, 2, 3, 0, 3.0),
            row(2023, 6, 2, 11, 59, 4.0),
        ];
        let bh = BreakHour::default();
        let daily = bucketize(&series(rows), bh).unwrap();
        assert_eq!(daily.len(), 1);

        let day = daily.get(date(2023, 6, 1)).unwrap();
        let again = bucketize(&series(day.time_series_rows()), bh).unwrap();

        assert_eq!(again, daily);
    }

    #[test]
    fn test_filter_days() {
        let rows = (1..=5).map(|d| row(2023, 7, d, 18, 0, d as f64)).collect();
        let daily = bucketize(&series(rows), BreakHour::default()).unwrap();
        assert_eq!(daily.len(), 5);

        let all = daily.clone().filter_days(None, None);
        assert_eq!(all.len(), 5);

        let from = daily.clone().filter_days(Some(date(2023, 7, 3)), None);
        assert_eq!(from.days().next(), Some(date(2023, 7, 3)));
        assert_eq!(from.len(), 3);

        let to = daily.clone().filter_days(None, Some(date(2023, 7, 2)));
        assert_eq!(to.len(), 2);

        let between = daily
            .clone()
            .filter_days(Some(date(2023, 7, 2)), Some(date(2023, 7, 4)));
        assert_eq!(
            between.days().collect::<Vec<_>>(),
            vec![date(2023, 7, 2), date(2023, 7, 3), date(2023, 7, 4)]
        );

        let backwards = daily.filter_days(Some(date(2023, 7, 4)), Some(date(2023, 7, 2)));
        assert!(backwards.is_empty());
    }

    #[test]
    fn test_earliest_times_cannot_shift() {
        let earliest = DateTime::<Utc>::MIN_UTC.timestamp();
        let hour_in = DateTime::<Utc>::from_timestamp(earliest + 3600, 0).unwrap();

        assert!(matches!(
            burn_day(hour_in, BreakHour::default()),
            Err(FirePowerError::InvalidTimestamp(ts)) if ts == earliest + 3600
        ));

        // A midnight break never shifts.
        assert!(burn_day(hour_in, BreakHour::new(0).unwrap()).is_ok());

        let rows = vec![
            TimeSeriesRow {
                scan_time: hour_in,
                total_power: 1.0,
                max_temperature: 500.0,
            },
            row(2023, 6, 1, 14, 0, 2.0),
        ];
        assert!(matches!(
            bucketize(&series(rows), BreakHour::default()),
            Err(FirePowerError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_daily_series_display() {
        let rows = vec![row(2023, 6, 1, 14, 0, 175.0), row(2023, 6, 1, 20, 30, 1234.0)];
        let daily = bucketize(&series(rows), BreakHour::default()).unwrap();
        let day = daily.get(date(2023, 6, 1)).unwrap();

        assert_eq!(
            day.to_string(),
            "2023-06-01 G17 (2 scans)\n\
             \x20  7200s  14:00:00         175 MW     500K\n\
             \x20 30600s  20:30:00        1234 MW     500K\n"
        );
    }

    #[test]
    fn test_empty_series() {
        let daily = bucketize(&series(vec![]), BreakHour::default()).unwrap();
        assert!(daily.is_empty());
        assert_eq!(daily.max_power(), None);
    }
}
