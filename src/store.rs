/*!
 * The read interface to the fires and clusters data.
 *
 * The resolver and aggregator only ever talk to these traits. [SatFireDatabases] implements them
 * over the SQLite files produced by findfire and connectfire, and [FireArena] implements them in
 * memory.
 *
 * [SatFireDatabases]: crate::SatFireDatabases
 * [FireArena]: crate::FireArena
 */

use crate::{FirePowerResult, FireId};
use chrono::{DateTime, Utc};

/// The identity of a fire as recorded in the fires table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireRecord {
    /// The unique id of this fire.
    pub fire_id: FireId,
    /// The satellite the clusters of this fire were observed with.
    pub satellite: String,
    /// The fire this one was merged into, if any.
    pub merged_into: Option<FireId>,
}

impl FireRecord {
    /// Create a record for a fire that has not been merged into another fire.
    pub fn new<S: Into<String>>(fire_id: FireId, satellite: S) -> Self {
        FireRecord {
            fire_id,
            satellite: satellite.into(),
            merged_into: None,
        }
    }

    /// Mark this fire as merged into `target`.
    pub fn merged_into(mut self, target: FireId) -> Self {
        self.merged_into = Some(target);
        self
    }
}

/// A single cluster observed during one satellite scan and the fire it is associated with.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterObservation {
    /// The row id of the cluster in the clusters table.
    pub cluster_id: u64,
    /// The fire this cluster was associated with.
    pub fire_id: FireId,
    /// Scan start time of the image the cluster was found in.
    pub start_time: DateTime<Utc>,
    /// Total radiative power of the cluster, megawatts.
    pub power: f64,
    /// Maximum temperature of any pixel in the cluster, Kelvin.
    pub max_temperature: f64,
}

/// Read access to fire identities and merge records.
pub trait FireStore {
    /// Look up a single fire by id. Returns `None` if there is no such fire.
    fn fire(&self, fire_id: FireId) -> FirePowerResult<Option<FireRecord>>;

    /// Get every fire whose `merged_into` is one of `targets`.
    fn fires_merged_into(&self, targets: &[FireId]) -> FirePowerResult<Vec<FireRecord>>;
}

/// Read access to cluster observations.
pub trait ClusterStore {
    /// Get every observation associated with any of the fires in `fire_ids`, in no particular
    /// order.
    fn observations_for(&self, fire_ids: &[FireId]) -> FirePowerResult<Vec<ClusterObservation>>;
}
