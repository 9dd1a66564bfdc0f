#![allow(clippy::doc_markdown)]

mod board;
mod cli;
mod fmt;
mod prelude;
mod states;
mod tables;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().with_writer(std::io::stderr).init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();

    match &args.command {
        Command::Tick(command) => args.store.with_history(|history| command.run(history))?,
        Command::Record(command) => args.store.with_history(|history| command.run(history))?,
        Command::Show(command) => args.store.with_history(|history| command.run(history))?,
        Command::Prune(command) => args.store.with_history(|history| command.run(history))?,
        Command::Snapshot(command) => command.run(&args.store)?,
    }

    info!("done!");
    Ok(())
}
