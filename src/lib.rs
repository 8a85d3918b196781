// Public API
pub use align::{
    align, hour_ticks, join_pair, AlignMode, AlignedDays, DayPanel, PairedDays, PanelEntry,
    SeriesKey,
};
pub use arena::FireArena;
pub use burnday::{
    bucketize, burn_day, BreakHour, BurnDay, BurnDayRow, DailyFirePower, DailySeries,
    SECONDS_PER_BURN_DAY,
};
pub use closure::{resolve_closure, MergeClosure};
pub use database::{DataSources, SatFireDatabases, CLUSTER_DB_ENV, FIRES_DB_ENV};
pub use error::{FirePowerError, FirePowerResult};
pub use pipeline::{daily_data, total_fire_power_by_day, total_fire_power_time_series};
pub use store::{ClusterObservation, ClusterStore, FireRecord, FireStore};
pub use timeseries::{aggregate, aggregate_observations, FirePowerTimeSeries, TimeSeriesRow};

/// The id number of a fire in the fires database.
pub type FireId = u64;

// Private API
mod align;
mod arena;
mod burnday;
mod closure;
mod database;
mod error;
mod pipeline;
mod store;
mod timeseries;
