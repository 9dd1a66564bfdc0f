//! Rolling hourly power history for distribution board dashboards.
//!
//! [`PowerHistory`] ingests per-entity power readings, keeps a running sum and
//! count per local calendar hour, answers current-hour, last-hour, daily and
//! 24-hour breakdown queries, and writes everything through to a [`Storage`].

pub mod bucket;
pub mod clock;
pub mod history;
pub mod hour;
pub mod sample;
pub mod snapshot;
pub mod storage;

pub use powercard_quantities::Watts;

pub use self::{
    bucket::{EntityHistory, HourBucket},
    clock::{Clock, ManualClock, SystemClock},
    history::{PowerHistory, StorageErrorHook},
    hour::HourStart,
    sample::Sample,
    snapshot::{
        EntityAverages,
        HourlyAverage,
        HourlyBreakdown,
        SNAPSHOT_EVENT,
        SharedSnapshot,
        Snapshot,
        SnapshotListener,
    },
    storage::{DirectoryStorage, Key, MemoryStorage, Storage, StorageError},
};
