/*!
 * Put the burn days of several fires on a common calendar.
 *
 * There are two policies. [align] takes the union of all the days so every day any fire was
 * active gets a panel. [join_pair] compares exactly two fires and only keeps the days both were
 * active.
 */

use crate::{
    burnday::{BreakHour, BurnDay, DailyFirePower, DailySeries, SECONDS_PER_BURN_DAY},
    FireId,
};
use std::{collections::BTreeSet, fmt};
use strum::{Display, EnumIter, EnumString};

/// How to line up the days of several fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum AlignMode {
    /// Every day any of the fires was observed.
    Union,
    /// Only the days both of exactly two fires were observed.
    Pair,
}

/// Identifies a series for the legend. Series with the same key share a color on every panel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub fire_id: FireId,
    pub satellite: String,
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{} {}", self.satellite, self.fire_id)
    }
}

/// One fire's data on one day of an aligned calendar.
#[derive(Debug, Clone, Copy)]
pub struct PanelEntry<'a> {
    /// Index into [AlignedDays::keys], use it to pick a color.
    pub key: usize,
    pub fire_id: FireId,
    pub data: &'a DailySeries,
}

impl<'a> PanelEntry<'a> {
    /// Legend text for this entry, satellite, day, and fire id.
    pub fn label(&self) -> String {
        format!("{} {} {}", self.data.satellite, self.data.day, self.fire_id)
    }
}

/// Everything plotted for a single burn day.
#[derive(Debug, Clone)]
pub struct DayPanel<'a> {
    pub day: BurnDay,
    /// In the order the fires were passed to [align]. Fires with no data this day are absent.
    pub entries: Vec<PanelEntry<'a>>,
}

/// Several fires laid out on the union of their burn days.
#[derive(Debug, Clone)]
pub struct AlignedDays<'a> {
    keys: Vec<SeriesKey>,
    panels: Vec<DayPanel<'a>>,
    max_power: Option<f64>,
}

impl<'a> AlignedDays<'a> {
    /// All days, ascending.
    pub fn days(&self) -> impl Iterator<Item = BurnDay> + '_ {
        self.panels.iter().map(|p| p.day)
    }

    pub fn panels(&self) -> &[DayPanel<'a>] {
        &self.panels
    }

    /// Distinct series keys in the order they were first seen.
    pub fn keys(&self) -> &[SeriesKey] {
        &self.keys
    }

    /// The common vertical scale, the largest total power anywhere. `None` if there is no data.
    pub fn max_power(&self) -> Option<f64> {
        self.max_power
    }
}

/// Lay out several fires on the union of all their burn days.
pub fn align(series: &[DailyFirePower]) -> AlignedDays<'_> {
    let mut keys: Vec<SeriesKey> = vec![];
    let key_indexes: Vec<usize> = series
        .iter()
        .map(|fire| {
            let key = SeriesKey {
                fire_id: fire.fire_id,
                satellite: fire.satellite.clone(),
            };

            match keys.iter().position(|k| *k == key) {
                Some(idx) => idx,
                None => {
                    keys.push(key);
                    keys.len() - 1
                }
            }
        })
        .collect();

    let all_days: BTreeSet<BurnDay> = series.iter().flat_map(|fire| fire.days()).collect();

    let panels = all_days
        .into_iter()
        .map(|day| {
            let entries = series
                .iter()
                .zip(&key_indexes)
                .filter_map(|(fire, &key)| {
                    fire.get(day).map(|data| PanelEntry {
                        key,
                        fire_id: fire.fire_id,
                        data,
                    })
                })
                .collect();

            DayPanel { day, entries }
        })
        .collect();

    let max_power = series
        .iter()
        .filter_map(DailyFirePower::max_power)
        .reduce(f64::max);

    AlignedDays {
        keys,
        panels,
        max_power,
    }
}

/// Two fires side by side on the days both of them were observed.
#[derive(Debug, Clone)]
pub struct PairedDays<'a> {
    pub left: FireId,
    pub right: FireId,
    /// Ascending by day.
    pub days: Vec<(BurnDay, &'a DailySeries, &'a DailySeries)>,
    pub max_power: Option<f64>,
}

/// Join two fires on their shared burn days. Days only one of them was observed are dropped.
pub fn join_pair<'a>(left: &'a DailyFirePower, right: &'a DailyFirePower) -> PairedDays<'a> {
    let days: Vec<_> = left
        .iter()
        .filter_map(|l| right.get(l.day).map(|r| (l.day, l, r)))
        .collect();

    let max_power = days
        .iter()
        .flat_map(|(_, l, r)| [l.max_power(), r.max_power()])
        .flatten()
        .reduce(f64::max);

    PairedDays {
        left: left.fire_id,
        right: right.fire_id,
        days,
        max_power,
    }
}

/// Hourly tick positions across a burn day, labeled with the UTC hour each one falls on.
pub fn hour_ticks(break_hour: BreakHour) -> Vec<(u32, String)> {
    (0..SECONDS_PER_BURN_DAY)
        .step_by(3600)
        .map(|second| {
            let hour = (break_hour.hour() + second / 3600) % 24;
            (second, format!("{:02}", hour))
        })
        .collect()
}
