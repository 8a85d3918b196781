/*! The full query, resolve the merge closure, aggregate it, then group it by burn day. */

use crate::{
    burnday::{bucketize, BreakHour, BurnDay, DailyFirePower},
    closure::resolve_closure,
    store::{ClusterStore, FireStore},
    timeseries::{aggregate, FirePowerTimeSeries},
    FireId, FirePowerResult,
};
use log::info;

/// Get a time series of total fire power and maximum temperature for a fire and every fire that
/// merged into it.
pub fn total_fire_power_time_series<S>(
    store: &S,
    fire_id: FireId,
) -> FirePowerResult<FirePowerTimeSeries>
where
    S: FireStore + ClusterStore + ?Sized,
{
    let closure = resolve_closure(store, fire_id)?;
    aggregate(store, &closure)
}

/// Get the merge aware time series of a fire grouped by burn day.
pub fn total_fire_power_by_day<S>(
    store: &S,
    fire_id: FireId,
    break_hour: BreakHour,
) -> FirePowerResult<DailyFirePower>
where
    S: FireStore + ClusterStore + ?Sized,
{
    let series = total_fire_power_time_series(store, fire_id)?;
    bucketize(&series, break_hour)
}

/// Get the burn days in the inclusive range `start` to `end` for each fire, in the order given.
///
/// Fails on the first fire that does not exist.
pub fn daily_data<S>(
    store: &S,
    fire_ids: &[FireId],
    break_hour: BreakHour,
    start: Option<BurnDay>,
    end: Option<BurnDay>,
) -> FirePowerResult<Vec<DailyFirePower>>
where
    S: FireStore + ClusterStore + ?Sized,
{
    fire_ids
        .iter()
        .map(|&fire_id| -> FirePowerResult<DailyFirePower> {
            let daily =
                total_fire_power_by_day(store, fire_id, break_hour)?.filter_days(start, end);
            info!(target: "daily", "fire {}: {} burn days", fire_id, daily.len());
            Ok(daily)
        })
        .collect()
}
