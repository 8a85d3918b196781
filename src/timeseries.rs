use crate::{
    closure::MergeClosure,
    store::{ClusterObservation, ClusterStore, FireStore},
    FireId, FirePowerError, FirePowerResult,
};
use chrono::{DateTime, Utc};
use log::debug;
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

/// The combined power and temperature of all the clusters of a fire at a single scan time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesRow {
    /// Scan start time.
    pub scan_time: DateTime<Utc>,
    /// Sum of the power of all clusters at this scan time, megawatts.
    pub total_power: f64,
    /// The hottest pixel of any cluster at this scan time, Kelvin.
    pub max_temperature: f64,
}

impl Display for TimeSeriesRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "{}  {:>10.0} MW  {:>6.0}K",
            self.scan_time.format("%Y-%m-%d %H:%M:%S"),
            self.total_power,
            self.max_temperature
        )
    }
}

/**
 * The power time series of a fire, including everything that merged into it.
 *
 * The satellite is the one recorded for the queried fire. If fires observed by another satellite
 * merged into it, their clusters are still included but the label is not changed.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct FirePowerTimeSeries {
    pub fire_id: FireId,
    pub satellite: String,
    /// Ordered by scan time, each scan time appears only once.
    pub rows: Vec<TimeSeriesRow>,
}

impl FirePowerTimeSeries {
    /// The largest total power in the series, or `None` if there are no rows.
    pub fn max_power(&self) -> Option<f64> {
        self.rows.iter().map(|r| r.total_power).reduce(f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl Display for FirePowerTimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "     Fire: {}", self.fire_id)?;
        writeln!(f, "Satellite: {}", self.satellite)?;
        writeln!(f, "    Scans: {}", self.rows.len())?;
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }

        Ok(())
    }
}

/// Group observations by their exact scan time, summing power and taking the maximum
/// temperature. The result is ordered by scan time.
pub fn aggregate_observations<'a, I>(observations: I) -> Vec<TimeSeriesRow>
where
    I: IntoIterator<Item = &'a ClusterObservation>,
{
    let mut by_time: BTreeMap<DateTime<Utc>, (f64, f64)> = BTreeMap::new();

    for obs in observations {
        let (power, max_temperature) = by_time
            .entry(obs.start_time)
            .or_insert((0.0, f64::NEG_INFINITY));

        *power += obs.power;
        *max_temperature = max_temperature.max(obs.max_temperature);
    }

    by_time
        .into_iter()
        .map(|(scan_time, (total_power, max_temperature))| TimeSeriesRow {
            scan_time,
            total_power,
            max_temperature,
        })
        .collect()
}

/// Build the time series for every fire in a merge closure.
///
/// An empty closure is an error. A fire that exists but has no associated clusters yields a
/// series with no rows.
pub fn aggregate<S>(store: &S, closure: &MergeClosure) -> FirePowerResult<FirePowerTimeSeries>
where
    S: FireStore + ClusterStore + ?Sized,
{
    let root = closure.root();
    if closure.is_empty() {
        return Err(FirePowerError::EmptyClosure(root));
    }

    let satellite = store
        .fire(root)?
        .map(|fire| fire.satellite)
        .ok_or(FirePowerError::EmptyClosure(root))?;

    let observations = store.observations_for(closure.members())?;
    let rows = aggregate_observations(&observations);

    debug!(
        target: "aggregate",
        "fire {}: {} clusters in {} scans", root, observations.len(), rows.len()
    );

    Ok(FirePowerTimeSeries {
        fire_id: root,
        satellite,
        rows,
    })
}
