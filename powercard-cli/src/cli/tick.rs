use std::path::PathBuf;

use clap::Parser;

use crate::{
    board::{Board, PowerEntity},
    cli::store::History,
    prelude::*,
    states::EntityStates,
    tables::build_board_table,
};

#[derive(Parser)]
pub struct TickArgs {
    /// Board layout in TOML.
    #[clap(long, env = "POWERCARD_BOARD", default_value = "board.toml")]
    board: PathBuf,

    /// Entity states in JSON, `-` to read them from the standard input.
    #[clap(long, env = "POWERCARD_STATES", default_value = "-")]
    states: PathBuf,

    /// Do not print the board table.
    #[clap(long)]
    quiet: bool,
}

impl TickArgs {
    pub fn run(&self, history: &mut History) -> Result {
        let board = Board::read_from(&self.board)?;
        let states = EntityStates::read_from(&self.states)?;
        let entities = board.power_entities();
        let n_recorded = record_states(&entities, &states, history);
        info!(n_entities = entities.len(), n_recorded, "recorded");
        let snapshot = history.compute_snapshot();
        if !self.quiet {
            eprintln!("{}", board.title);
            eprintln!("{}", build_board_table(&entities, &states, &snapshot));
        }
        Ok(())
    }
}

/// Record the current power of every entity with a numeric state.
///
/// Returns the number of recorded samples.
#[instrument(skip_all)]
pub fn record_states(
    entities: &[PowerEntity<'_>],
    states: &EntityStates,
    history: &mut History,
) -> usize {
    let mut n_recorded = 0;
    for entity in entities {
        if let Some(power) = states.power(entity.entity_id) {
            history.record_sample(entity.entity_id, power, None);
            n_recorded += 1;
        } else {
            debug!(entity_id = entity.entity_id, "no numeric state");
        }
    }
    n_recorded
}
