use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Args;
use hexpath_core::{
    chunk::{BuilderConfig, ChunkBoundsBuilder, ChunkStat, StatParseError},
    envelope::DEFAULT_K,
    grid::{H3Grid, MAX_RESOLUTION},
    storage::{rocksdb::RocksDBStore, BoundsStore},
};
use humantime::format_duration;
use thiserror::Error;
use tracing::debug;

use super::{format_bound, paint_error};

/// An input line that could not be read as chunk statistics
#[derive(Error, Debug)]
#[error("line {line}: {source}")]
pub struct InputError {
    pub line: usize,
    pub source: StatParseError,
}

/// Compute the bounding boxes of storage chunks
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// A file with one tab-separated record `file_id chunk_id hex_min
    /// hex_max file_resolution` per line (reads stdin if omitted)
    pub input: Option<PathBuf>,

    /// Persist the computed bounds into the store at this location
    #[arg(long)]
    pub store: Option<String>,

    /// Coarsen range endpoints to this resolution before walking the range
    #[arg(long, default_value_t = MAX_RESOLUTION)]
    pub base_res: u8,

    /// Number of rings to buffer each cell by
    #[arg(short, default_value_t = DEFAULT_K)]
    pub k: u32,

    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(long)]
    pub workers: Option<usize>,
}

fn read_stats(reader: impl BufRead) -> Result<(Vec<ChunkStat>, Vec<InputError>)> {
    let mut stats = Vec::new();
    let mut errors = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        match line.parse::<ChunkStat>() {
            Ok(stat) => stats.push(stat),
            Err(source) => errors.push(InputError {
                line: i + 1,
                source,
            }),
        }
    }
    Ok((stats, errors))
}

/// Run the `build` command
pub fn run_build(args: BuildArgs) -> Result<()> {
    let start = Instant::now();

    let (stats, input_errors) = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Unable to open input file `{}'", path.display()))?;
            read_stats(BufReader::new(file))?
        }
        None => read_stats(io::stdin().lock())?,
    };
    debug!(
        records = stats.len(),
        invalid = input_errors.len(),
        "read chunk statistics"
    );
    for err in &input_errors {
        eprintln!("{}", paint_error(err));
    }

    let mut store = args.store.as_deref().map(RocksDBStore::new).transpose()?;

    let mut config = BuilderConfig {
        base_resolution: args.base_res,
        k: args.k,
        ..Default::default()
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    let builder = ChunkBoundsBuilder::new(H3Grid::new(), config);

    let mut built = 0;
    let mut failed = input_errors.len();
    for result in builder.build(stats) {
        match result {
            Ok(bound) => {
                println!("{}", format_bound(&bound));
                if let Some(store) = &mut store {
                    store.add(&bound)?;
                }
                built += 1;
            }
            Err(err) => {
                eprintln!("{}", paint_error(err));
                failed += 1;
            }
        }
    }

    if let Some(store) = &mut store {
        store.commit()?;
    }

    eprintln!(
        "Computed bounds of {} chunks ({} failed) in {}",
        built,
        failed,
        format_duration(Duration::from_millis(start.elapsed().as_millis() as u64))
    );

    Ok(())
}
