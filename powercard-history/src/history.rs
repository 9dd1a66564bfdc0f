use std::{collections::BTreeMap, error::Error};

use bon::bon;
use chrono::{DateTime, Local, TimeDelta, Utc};
use powercard_quantities::Watts;
use serde::Serialize;
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    bucket::{EntityHistory, HourBucket},
    clock::{Clock, SystemClock},
    hour::{HourStart, start_of_day},
    sample::Sample,
    snapshot::{EntityAverages, HourlyAverage, HourlyBreakdown, Snapshot, SnapshotListener},
    storage::{Key, Storage, StorageError},
};

pub const DEFAULT_RETENTION_DAYS: i64 = 7;

pub const DEFAULT_SNAPSHOT_MAX_AGE_HOURS: i64 = 1;

/// Number of hours in the hourly breakdown, including the current one.
pub const N_BREAKDOWN_HOURS: u32 = 24;

/// Called on every failed storage read or write, after it has been logged.
pub type StorageErrorHook = Box<dyn FnMut(&StorageError)>;

/// Rolling hourly power history of every entity.
///
/// The in-memory buckets are the source of truth. Every mutation is written
/// through to the storage on a best-effort basis: failures are logged, passed
/// to the optional hook and counted, but never surface as errors.
#[must_use]
pub struct PowerHistory<S, C = SystemClock> {
    storage: S,
    clock: C,
    retention: TimeDelta,
    entities: BTreeMap<String, EntityHistory>,
    listeners: Vec<Box<dyn SnapshotListener>>,
    latest_snapshot: Option<Snapshot>,
    on_storage_error: Option<StorageErrorHook>,
    n_consecutive_storage_failures: u32,
}

#[bon]
impl<S: Storage, C: Clock> PowerHistory<S, C> {
    /// Restore the history from the storage and evict the expired buckets.
    #[builder]
    pub fn new(
        storage: S,
        clock: C,
        #[builder(default = TimeDelta::days(DEFAULT_RETENTION_DAYS))] retention: TimeDelta,
        on_storage_error: Option<StorageErrorHook>,
    ) -> Self {
        let mut this = Self {
            storage,
            clock,
            retention,
            entities: BTreeMap::new(),
            listeners: Vec::new(),
            latest_snapshot: None,
            on_storage_error,
            n_consecutive_storage_failures: 0,
        };
        match read_json::<BTreeMap<String, EntityHistory>>(&this.storage, Key::History) {
            Ok(Some(entities)) => {
                this.entities = entities;
                for history in this.entities.values_mut() {
                    history.retain_populated();
                }
                this.entities.retain(|_, history| !history.is_empty());
                info!(n_entities = this.entities.len(), "restored the power history");
            }
            Ok(None) => debug!("no stored power history, starting afresh"),
            Err(error) => this.report_storage_error(&error),
        }
        this.prune();
        this
    }
}

impl<S: Storage, C: Clock> PowerHistory<S, C> {
    /// Record a reading taken at `at`, or now.
    ///
    /// Readings with an empty entity ID or a non-finite value are dropped, and so are
    /// readings which would push the hourly sum out of the finite range.
    pub fn record_sample(
        &mut self,
        entity_id: &str,
        value: impl Into<Watts>,
        at: Option<DateTime<Local>>,
    ) {
        let value = value.into();
        if entity_id.is_empty() || !value.is_finite() {
            trace!(entity_id, ?value, "dropping the sample");
            return;
        }
        let hour = HourStart::floor(at.unwrap_or_else(|| self.clock.now()));
        if !self.entities.entry(entity_id.to_owned()).or_default().push(hour, value) {
            trace!(entity_id, ?value, %hour, "the hourly sum would overflow, dropping the sample");
            return;
        }
        self.write_history();
    }

    pub fn record(&mut self, sample: Sample) {
        self.record_sample(&sample.entity_id, sample.value, sample.timestamp);
    }

    /// Average of the hour which started `hours_ago` hours before the current one.
    #[must_use]
    pub fn hourly_average(&self, entity_id: &str, hours_ago: u32) -> Option<Watts> {
        let hour = HourStart::floor(self.clock.now()).hours_before(hours_ago)?;
        self.entities.get(entity_id)?.get(hour)?.average()
    }

    /// Sample-weighted average since the local midnight.
    #[must_use]
    pub fn daily_average(&self, entity_id: &str) -> Option<Watts> {
        let now = self.clock.now();
        let today = HourStart::floor(start_of_day(now))..=HourStart::floor(now);
        self.entities.get(entity_id)?.total(today).average()
    }

    /// Averages of the last [`N_BREAKDOWN_HOURS`] hours, oldest first.
    pub fn hourly_averages(&self, entity_id: &str) -> HourlyBreakdown {
        let current_hour = HourStart::floor(self.clock.now());
        let history = self.entities.get(entity_id);
        HourlyBreakdown(
            (0..N_BREAKDOWN_HOURS)
                .rev()
                .filter_map(|hours_ago| current_hour.hours_before(hours_ago))
                .map(|hour| HourlyAverage {
                    hour: hour.label(),
                    hour_start: hour,
                    average: history
                        .and_then(|history| history.get(hour))
                        .and_then(HourBucket::average),
                })
                .collect(),
        )
    }

    pub fn averages(&self, entity_id: &str) -> EntityAverages {
        EntityAverages {
            current_hour: self.hourly_average(entity_id, 0),
            last_hour: self.hourly_average(entity_id, 1),
            daily_average: self.daily_average(entity_id),
            hourly_breakdown: self.hourly_averages(entity_id),
        }
    }

    /// Compute the averages of every entity, then persist and broadcast them.
    #[instrument(skip_all, fields(n_entities = self.entities.len()))]
    pub fn compute_snapshot(&mut self) -> Snapshot {
        let snapshot = Snapshot {
            timestamp: self.clock.now().with_timezone(&Utc),
            averages: self
                .entities
                .keys()
                .map(|entity_id| (entity_id.clone(), self.averages(entity_id)))
                .collect(),
        };
        let result = write_json(&mut self.storage, Key::Snapshot, &snapshot);
        self.handle_write(result);
        for listener in &mut self.listeners {
            listener.on_snapshot(&snapshot);
        }
        self.latest_snapshot = Some(snapshot.clone());
        debug!(n_listeners = self.listeners.len(), "published the snapshot");
        snapshot
    }

    /// Evict the buckets which started earlier than `horizon` ago.
    ///
    /// Entities left without buckets are forgotten.
    #[instrument(skip_all, fields(horizon = %horizon))]
    pub fn prune_older_than(&mut self, horizon: TimeDelta) {
        let Some(cutoff) = self.clock.now().checked_sub_signed(horizon) else {
            debug!("the horizon reaches past the earliest representable time, nothing to evict");
            return;
        };
        let n_buckets: usize =
            self.entities.values_mut().map(|history| history.retain_since(cutoff)).sum();
        let n_entities_before = self.entities.len();
        self.entities.retain(|_, history| !history.is_empty());
        let n_entities = n_entities_before - self.entities.len();
        if n_buckets != 0 {
            info!(n_buckets, n_entities, "evicted expired buckets");
            self.write_history();
        }
    }

    /// Evict the buckets older than the configured retention.
    pub fn prune(&mut self) {
        self.prune_older_than(self.retention);
    }

    /// Register a listener notified on every computed snapshot.
    pub fn subscribe(&mut self, listener: impl SnapshotListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Read the persisted snapshot if it has been generated no longer than `max_age` ago.
    #[instrument(skip_all, fields(max_age = %max_age))]
    pub fn load_last_snapshot(storage: &S, clock: &C, max_age: TimeDelta) -> Option<Snapshot> {
        let snapshot = read_json::<Snapshot>(storage, Key::Snapshot)
            .inspect_err(|error| {
                warn!(error = error as &(dyn Error + 'static), "failed to read the snapshot");
            })
            .ok()??;
        if snapshot.is_fresh(clock.now().with_timezone(&Utc), max_age) {
            Some(snapshot)
        } else {
            debug!(timestamp = %snapshot.timestamp, "the snapshot is stale");
            None
        }
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    #[must_use]
    pub fn history(&self, entity_id: &str) -> Option<&EntityHistory> {
        self.entities.get(entity_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub const fn latest_snapshot(&self) -> Option<&Snapshot> {
        self.latest_snapshot.as_ref()
    }

    #[must_use]
    pub const fn retention(&self) -> TimeDelta {
        self.retention
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Number of storage failures since the last successful write.
    #[must_use]
    pub const fn consecutive_storage_failures(&self) -> u32 {
        self.n_consecutive_storage_failures
    }

    fn write_history(&mut self) {
        let result = write_json(&mut self.storage, Key::History, &self.entities);
        self.handle_write(result);
    }

    fn handle_write(&mut self, result: Result<(), StorageError>) {
        match result {
            Ok(()) => self.n_consecutive_storage_failures = 0,
            Err(error) => self.report_storage_error(&error),
        }
    }

    fn report_storage_error(&mut self, error: &StorageError) {
        self.n_consecutive_storage_failures = self.n_consecutive_storage_failures.saturating_add(1);
        warn!(
            error = error as &(dyn Error + 'static),
            n_consecutive_failures = self.n_consecutive_storage_failures,
            "storage failure, keeping the in-memory state",
        );
        if let Some(hook) = &mut self.on_storage_error {
            hook(error);
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(
    storage: &impl Storage,
    key: Key,
) -> Result<Option<T>, StorageError> {
    storage
        .get(key)?
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(|source| StorageError::Deserialize { key: key.as_str(), source })
}

fn write_json<T: Serialize>(
    storage: &mut impl Storage,
    key: Key,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)
        .map_err(|source| StorageError::Serialize { key: key.as_str(), source })?;
    storage.set(key, &json)
}
