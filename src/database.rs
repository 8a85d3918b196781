use crate::{
    burnday::{BreakHour, BurnDay, DailyFirePower},
    closure::MergeClosure,
    pipeline,
    store::{ClusterObservation, ClusterStore, FireRecord, FireStore},
    timeseries::FirePowerTimeSeries,
    FireId, FirePowerError, FirePowerResult,
};
use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{Connection, OpenFlags};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Environment variable checked for the path to the clusters database.
pub const CLUSTER_DB_ENV: &str = "CLUSTER_DB";
/// Environment variable checked for the path to the fires database.
pub const FIRES_DB_ENV: &str = "FIRES_DB";

/// Largest number of ids bound to a single `IN (...)` query.
const MAX_IDS_PER_QUERY: usize = 500;

/// The locations of the clusters database (from findfire) and the fires database (from
/// connectfire).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub clusters: PathBuf,
    pub fires: PathBuf,
}

impl DataSources {
    /// Use the paths given, and fill in any that are missing from the "CLUSTER_DB" and "FIRES_DB"
    /// environment variables.
    pub fn resolve(clusters: Option<PathBuf>, fires: Option<PathBuf>) -> FirePowerResult<Self> {
        Self::resolve_with(clusters, fires, |var| std::env::var_os(var))
    }

    fn resolve_with<F>(
        clusters: Option<PathBuf>,
        fires: Option<PathBuf>,
        env: F,
    ) -> FirePowerResult<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let lookup = |given: Option<PathBuf>, var: &'static str| {
            given
                .or_else(|| env(var).filter(|v| !v.is_empty()).map(PathBuf::from))
                .ok_or(FirePowerError::MissingDataSource(var))
        };

        Ok(DataSources {
            clusters: lookup(clusters, CLUSTER_DB_ENV)?,
            fires: lookup(fires, FIRES_DB_ENV)?,
        })
    }
}

/**
 * A read only handle to the clusters and fires databases.
 *
 * The clusters live in one database and the fires and their associations with clusters in
 * another, so this holds one connection to each. The connections are not shared; if several
 * threads need to query, give each its own handle.
 */
pub struct SatFireDatabases {
    clusters: Connection,
    fires: Connection,
}

impl SatFireDatabases {
    /// Open both databases.
    pub fn connect(sources: &DataSources) -> FirePowerResult<Self> {
        let clusters = Self::open_database_to_read(&sources.clusters)?;
        let fires = Self::open_database_to_read(&sources.fires)?;

        info!(
            target: "startup",
            "opened clusters {} and fires {}",
            sources.clusters.display(),
            sources.fires.display()
        );

        Ok(SatFireDatabases { clusters, fires })
    }

    /// Open the databases, using the environment for any path not supplied.
    pub fn open(clusters: Option<PathBuf>, fires: Option<PathBuf>) -> FirePowerResult<Self> {
        let sources = DataSources::resolve(clusters, fires)?;
        Self::connect(&sources)
    }

    /// Wrap connections that are already open.
    pub fn from_connections(clusters: Connection, fires: Connection) -> Self {
        SatFireDatabases { clusters, fires }
    }

    fn open_database_to_read(path: &Path) -> FirePowerResult<Connection> {
        let conn = rusqlite::Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        // A 5-second busy time out is WAY too much. If we hit this something has gone terribly wrong.
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        Ok(conn)
    }

    /// Get the merge closure of a fire.
    pub fn resolve_closure(&self, fire_id: FireId) -> FirePowerResult<MergeClosure> {
        crate::closure::resolve_closure(self, fire_id)
    }

    /// Get a time series of total fire power and maximum temperature for a fire and every fire
    /// that merged into it.
    pub fn total_fire_power_time_series(
        &self,
        fire_id: FireId,
    ) -> FirePowerResult<FirePowerTimeSeries> {
        pipeline::total_fire_power_time_series(self, fire_id)
    }

    /// Same as [total_fire_power_time_series](Self::total_fire_power_time_series), grouped by
    /// burn day.
    pub fn total_fire_power_by_day(
        &self,
        fire_id: FireId,
        break_hour: BreakHour,
    ) -> FirePowerResult<DailyFirePower> {
        pipeline::total_fire_power_by_day(self, fire_id, break_hour)
    }

    /// Get the burn days between `start` and `end` (inclusive, either may be open) for each fire.
    pub fn daily_data(
        &self,
        fire_ids: &[FireId],
        break_hour: BreakHour,
        start: Option<BurnDay>,
        end: Option<BurnDay>,
    ) -> FirePowerResult<Vec<DailyFirePower>> {
        pipeline::daily_data(self, fire_ids, break_hour, start, end)
    }

    fn cluster_ids_for(&self, fire_id: FireId) -> FirePowerResult<Vec<u64>> {
        let mut stmt = self
            .fires
            .prepare_cached(include_str!("database/fire_associations.sql"))?;

        let ids = stmt
            .query_map([fire_id], |row| row.get::<_, u64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    fn clusters_by_id(
        &self,
        fire_id: FireId,
        cluster_ids: &[u64],
        observations: &mut Vec<ClusterObservation>,
    ) -> FirePowerResult<()> {
        for chunk in cluster_ids.chunks(MAX_IDS_PER_QUERY) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let query = format!(
                r#"SELECT
                     cluster_id,
                     start_time,
                     power,
                     max_temperature
                   FROM clusters
                   WHERE cluster_id IN ({})"#,
                placeholders
            );

            let mut stmt = self.clusters.prepare(&query)?;
            let rows = stmt.query_and_then(
                rusqlite::params_from_iter(chunk.iter()),
                |row| -> FirePowerResult<ClusterObservation> {
                    let cluster_id: u64 = row.get(0)?;
                    let timestamp: i64 = row.get(1)?;
                    let start_time = DateTime::<Utc>::from_timestamp(timestamp, 0)
                        .ok_or(FirePowerError::InvalidTimestamp(timestamp))?;

                    Ok(ClusterObservation {
                        cluster_id,
                        fire_id,
                        start_time,
                        power: row.get(2)?,
                        max_temperature: row.get(3)?,
                    })
                },
            )?;

            for obs in rows {
                observations.push(obs?);
            }
        }

        Ok(())
    }
}

fn row_to_fire_record(row: &rusqlite::Row) -> rusqlite::Result<FireRecord> {
    let fire_id: u64 = row.get(0)?;
    let satellite: String = row.get(1)?;
    // connectfire records 0 for fires that were never merged.
    let merged_into: Option<u64> = row.get::<_, Option<u64>>(2)?.filter(|id| *id != 0);

    Ok(FireRecord {
        fire_id,
        satellite,
        merged_into,
    })
}

impl FireStore for SatFireDatabases {
    fn fire(&self, fire_id: FireId) -> FirePowerResult<Option<FireRecord>> {
        let mut stmt = self
            .fires
            .prepare_cached(include_str!("database/fire_by_id.sql"))?;

        let mut rows = stmt.query_map([fire_id], row_to_fire_record)?;
        match rows.next() {
            Some(res) => Ok(Some(res?)),
            None => Ok(None),
        }
    }

    fn fires_merged_into(&self, targets: &[FireId]) -> FirePowerResult<Vec<FireRecord>> {
        let mut stmt = self
            .fires
            .prepare_cached(include_str!("database/fires_merged_into.sql"))?;

        let mut fires = vec![];
        for &target in targets {
            for res in stmt.query_map([target], row_to_fire_record)? {
                fires.push(res?);
            }
        }

        Ok(fires)
    }
}

impl ClusterStore for SatFireDatabases {
    fn observations_for(&self, fire_ids: &[FireId]) -> FirePowerResult<Vec<ClusterObservation>> {
        let mut observations = vec![];

        for &fire_id in fire_ids {
            let cluster_ids = self.cluster_ids_for(fire_id)?;
            debug!(target: "database", "fire {} has {} clusters", fire_id, cluster_ids.len());

            self.clusters_by_id(fire_id, &cluster_ids, &mut observations)?;
        }

        Ok(observations)
    }
}
