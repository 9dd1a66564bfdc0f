use std::path::PathBuf;

use chrono::{DateTime, Local, TimeDelta};
use clap::Parser;
use powercard_history::{DirectoryStorage, ManualClock, PowerHistory, Snapshot};

use crate::prelude::*;

pub type History = PowerHistory<DirectoryStorage, ManualClock>;

#[derive(Parser)]
pub struct StoreArgs {
    /// Directory with the persisted history and the last snapshot.
    #[clap(long, env = "POWERCARD_STATE_DIR", default_value = ".powercard")]
    state_dir: PathBuf,

    /// How long the hourly buckets are kept.
    #[clap(long, env = "POWERCARD_RETENTION", default_value = "7days")]
    retention: humantime::Duration,

    /// Pretend that it is this time now, for example `2025-06-02T10:50:00+02:00`.
    #[clap(long, env = "POWERCARD_NOW")]
    now: Option<DateTime<Local>>,

    /// Print every published snapshot to the standard output as a JSON event line.
    #[clap(long)]
    emit_events: bool,
}

impl StoreArgs {
    pub fn storage(&self) -> DirectoryStorage {
        DirectoryStorage::new(&self.state_dir)
    }

    /// The clock is frozen for the duration of the run.
    pub fn clock(&self) -> ManualClock {
        ManualClock::new(self.now.unwrap_or_else(Local::now))
    }

    #[instrument(skip_all, fields(state_dir = %self.state_dir.display()))]
    pub fn open(&self) -> Result<History> {
        let retention = TimeDelta::from_std(self.retention.into())
            .context("the retention period is too long")?;
        let mut history = History::builder()
            .storage(self.storage())
            .clock(self.clock())
            .retention(retention)
            .build();
        history.subscribe(|snapshot: &Snapshot| {
            info!(n_entities = snapshot.averages.len(), "published the snapshot");
        });
        if self.emit_events {
            history.subscribe(|snapshot: &Snapshot| {
                match serde_json::to_string(&snapshot.as_event()) {
                    Ok(line) => println!("{line}"),
                    Err(error) => warn!("failed to serialize the event: {error:#}"),
                }
            });
        }
        Ok(history)
    }

    /// Open the history, run the command against it and complain if the last write failed.
    pub fn with_history(&self, run: impl FnOnce(&mut History) -> Result) -> Result {
        let mut history = self.open()?;
        let result = run(&mut history);
        let n_failures = history.consecutive_storage_failures();
        if n_failures != 0 {
            warn!(n_failures, "the power history has not been persisted");
        }
        result
    }
}
