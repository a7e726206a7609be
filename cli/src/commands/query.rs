use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use geo::{coord, Rect};
use hexpath_core::storage::{intersecting, rocksdb::RocksDBStore};
use humantime::format_duration;

use super::format_bound;

/// List stored chunk bounds intersecting a box
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// The location of the store
    #[arg(long, default_value = "store")]
    pub store: String,

    /// Minimum longitude
    #[arg(allow_negative_numbers = true)]
    pub minx: f64,

    /// Minimum latitude
    #[arg(allow_negative_numbers = true)]
    pub miny: f64,

    /// Maximum longitude
    #[arg(allow_negative_numbers = true)]
    pub maxx: f64,

    /// Maximum latitude
    #[arg(allow_negative_numbers = true)]
    pub maxy: f64,
}

/// Run the `query` command
pub fn run_query(args: QueryArgs) -> Result<()> {
    let store = RocksDBStore::new(&args.store)?;
    let query = Rect::new(
        coord! { x: args.minx, y: args.miny },
        coord! { x: args.maxx, y: args.maxy },
    );

    let start = Instant::now();
    let found = intersecting(&store, &query)?;
    for bound in &found {
        println!("{}", format_bound(bound));
    }

    eprintln!(
        "Found {} chunks in {}",
        found.len(),
        format_duration(Duration::from_millis(start.elapsed().as_millis() as u64))
    );
    Ok(())
}
