mod prune;
mod record;
mod show;
mod snapshot;
mod store;
mod tick;

use clap::{Parser, Subcommand};

pub use self::store::StoreArgs;
use crate::cli::{
    prune::PruneArgs,
    record::RecordArgs,
    show::ShowArgs,
    snapshot::SnapshotArgs,
    tick::TickArgs,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[clap(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: record the current power of every board entity and publish the averages.
    #[clap(name = "tick")]
    Tick(Box<TickArgs>),

    /// Record a single reading.
    #[clap(name = "record")]
    Record(RecordArgs),

    /// Show the averages and the hourly breakdown of an entity.
    #[clap(name = "show")]
    Show(ShowArgs),

    /// Print the last published snapshot, if it is recent enough.
    #[clap(name = "snapshot")]
    Snapshot(SnapshotArgs),

    /// Evict expired hourly buckets.
    #[clap(name = "prune")]
    Prune(PruneArgs),
}
