use clap::Parser;

use crate::{
    cli::store::History,
    prelude::*,
    tables::{build_averages_table, build_breakdown_table},
};

#[derive(Parser)]
pub struct ShowArgs {
    #[clap(long)]
    entity_id: String,
}

impl ShowArgs {
    pub fn run(&self, history: &History) -> Result {
        if history.history(&self.entity_id).is_none() {
            warn!(entity_id = %self.entity_id, "no data recorded for the entity");
        }
        let averages = history.averages(&self.entity_id);
        println!("{}", build_averages_table(&self.entity_id, &averages));
        println!("{}", build_breakdown_table(&averages.hourly_breakdown));
        Ok(())
    }
}
