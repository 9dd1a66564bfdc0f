use chrono::{DateTime, Local};
use clap::Parser;
use powercard_history::Watts;

use crate::{cli::store::History, prelude::*, tables::build_averages_table};

#[derive(Parser)]
pub struct RecordArgs {
    #[clap(long)]
    entity_id: String,

    /// Power in watts, negative for the reverse flow.
    #[clap(long, allow_negative_numbers = true)]
    value: Watts,

    /// When the reading was taken, defaults to now.
    #[clap(long)]
    at: Option<DateTime<Local>>,
}

impl RecordArgs {
    pub fn run(&self, history: &mut History) -> Result {
        ensure!(!self.entity_id.is_empty(), "the entity ID must not be empty");
        ensure!(self.value.is_finite(), "the value must be a finite number");
        history.record_sample(&self.entity_id, self.value, self.at);
        let snapshot = history.compute_snapshot();
        if let Some(averages) = snapshot.get(&self.entity_id) {
            eprintln!("{}", build_averages_table(&self.entity_id, averages));
        }
        Ok(())
    }
}
