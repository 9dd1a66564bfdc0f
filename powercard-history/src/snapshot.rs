use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use chrono::{DateTime, TimeDelta, Utc};
use powercard_quantities::Watts;
use serde::{Deserialize, Serialize};
use serde_with::{TimestampMilliSeconds, serde_as};

use crate::hour::HourStart;

/// Name under which snapshots are broadcast.
pub const SNAPSHOT_EVENT: &str = "powercard-averages-updated";

/// Averages of every tracked entity at a point in time.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Snapshot {
    /// Generation time.
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub timestamp: DateTime<Utc>,

    pub averages: BTreeMap<String, EntityAverages>,
}

impl Snapshot {
    #[must_use]
    pub fn get(&self, entity_id: &str) -> Option<&EntityAverages> {
        self.averages.get(entity_id)
    }

    /// Generated no longer than `max_age` before `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: TimeDelta) -> bool {
        now - self.timestamp <= max_age
    }

    /// Wrap into the broadcast envelope.
    pub const fn as_event(&self) -> Event<'_> {
        Event { event: SNAPSHOT_EVENT, payload: self }
    }
}

#[derive(Serialize)]
pub struct Event<'a> {
    pub event: &'static str,
    pub payload: &'a Snapshot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAverages {
    pub current_hour: Option<Watts>,
    pub last_hour: Option<Watts>,
    pub daily_average: Option<Watts>,
    pub hourly_breakdown: HourlyBreakdown,
}

/// Averages of the last 24 hours, oldest first, current hour last.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    derive_more::Deref,
    derive_more::IntoIterator,
)]
#[serde(transparent)]
pub struct HourlyBreakdown(#[into_iterator(owned, ref)] pub Vec<HourlyAverage>);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyAverage {
    /// Local wall-clock label, for example `14:00`.
    pub hour: String,

    pub hour_start: HourStart,

    pub average: Option<Watts>,
}

pub trait SnapshotListener {
    fn on_snapshot(&mut self, snapshot: &Snapshot);
}

impl<F: FnMut(&Snapshot)> SnapshotListener for F {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self(snapshot);
    }
}

/// Latest snapshot, readable by whoever holds a clone.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct SharedSnapshot(Rc<RefCell<Option<Snapshot>>>);

impl SharedSnapshot {
    #[must_use]
    pub fn get(&self) -> Option<Snapshot> {
        self.0.borrow().clone()
    }
}

impl SnapshotListener for SharedSnapshot {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.0.replace(Some(snapshot.clone()));
    }
}
