use chrono::TimeDelta;
use clap::Parser;

use crate::{cli::store::History, prelude::*};

#[derive(Parser)]
pub struct PruneArgs {
    /// Evict buckets older than this instead of the retention period.
    #[clap(long)]
    older_than: Option<humantime::Duration>,
}

impl PruneArgs {
    pub fn run(&self, history: &mut History) -> Result {
        match self.older_than {
            Some(older_than) => {
                let horizon = TimeDelta::from_std(older_than.into())
                    .context("the pruning horizon is too long")?;
                history.prune_older_than(horizon);
            }
            None => history.prune(),
        }
        info!(n_entities = history.len(), "pruned");
        Ok(())
    }
}
