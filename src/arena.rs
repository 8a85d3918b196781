use crate::{
    store::{ClusterObservation, ClusterStore, FireRecord, FireStore},
    FireId, FirePowerResult,
};
use chrono::{DateTime, Utc};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/**
 * An in-memory store of fires and their observations.
 *
 * Fires are indexed by id, and the inverse of the `merged_into` relation is kept alongside so
 * finding the fires that merged into a given fire is a lookup rather than a scan.
 */
#[derive(Debug, Default, Clone)]
pub struct FireArena {
    fires: HashMap<FireId, FireRecord>,
    mergers: HashMap<FireId, Vec<FireId>>,
    observations: Vec<ClusterObservation>,
}

impl FireArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fire, replacing any fire already stored under the same id.
    pub fn add_fire(&mut self, fire: FireRecord) {
        if let Some(old) = self.fires.remove(&fire.fire_id) {
            if let Some(target) = old.merged_into {
                if let Some(ids) = self.mergers.get_mut(&target) {
                    ids.retain(|id| *id != old.fire_id);
                }
            }
        }

        if let Some(target) = fire.merged_into {
            self.mergers.entry(target).or_default().push(fire.fire_id);
        }

        self.fires.insert(fire.fire_id, fire);
    }

    /// Add an observation of a cluster associated with `fire_id`. The cluster id is assigned in
    /// insertion order.
    pub fn add_observation(
        &mut self,
        fire_id: FireId,
        start_time: DateTime<Utc>,
        power: f64,
        max_temperature: f64,
    ) {
        let cluster_id = self.observations.len() as u64 + 1;
        self.observations.push(ClusterObservation {
            cluster_id,
            fire_id,
            start_time,
            power,
            max_temperature,
        });
    }

    /// The number of fires in the arena.
    pub fn len(&self) -> usize {
        self.fires.len()
    }

    /// Is the arena devoid of fires?
    pub fn is_empty(&self) -> bool {
        self.fires.is_empty()
    }
}

impl FireStore for FireArena {
    fn fire(&self, fire_id: FireId) -> FirePowerResult<Option<FireRecord>> {
        Ok(self.fires.get(&fire_id).cloned())
    }

    fn fires_merged_into(&self, targets: &[FireId]) -> FirePowerResult<Vec<FireRecord>> {
        Ok(targets
            .iter()
            .filter_map(|target| self.mergers.get(target))
            .flatten()
            .filter_map(|id| self.fires.get(id))
            .cloned()
            .collect())
    }
}

impl ClusterStore for FireArena {
    fn observations_for(&self, fire_ids: &[FireId]) -> FirePowerResult<Vec<ClusterObservation>> {
        let wanted: HashSet<FireId> = fire_ids.iter().copied().collect();

        Ok(self
            .observations
            .iter()
            .filter(|obs| wanted.contains(&obs.fire_id))
            .cloned()
            .collect())
    }
}
