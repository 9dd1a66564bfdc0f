use chrono::TimeDelta;
use clap::Parser;

use crate::{
    cli::store::{History, StoreArgs},
    prelude::*,
};

#[derive(Parser)]
pub struct SnapshotArgs {
    /// Ignore snapshots older than this.
    #[clap(long, env = "POWERCARD_SNAPSHOT_MAX_AGE", default_value = "1h")]
    max_age: humantime::Duration,
}

impl SnapshotArgs {
    pub fn run(&self, store: &StoreArgs) -> Result {
        let max_age =
            TimeDelta::from_std(self.max_age.into()).context("the maximum age is too long")?;
        match History::load_last_snapshot(&store.storage(), &store.clock(), max_age) {
            Some(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            None => warn!(max_age = %self.max_age, "no recent snapshot"),
        }
        Ok(())
    }
}
