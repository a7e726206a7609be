use anyhow::{Context, Result};
use clap::Args;
use hexpath_core::{
    envelope::{bounds, DEFAULT_K},
    grid::{CellId, H3Grid},
};

/// Compute the bounding box of a range of cells
#[derive(Args, Debug)]
pub struct BoundsArgs {
    /// The first cell of the range in hex notation
    pub hex_min: CellId,

    /// The last cell of the range in hex notation
    pub hex_max: CellId,

    /// The resolution of the common ancestor of both cells
    #[arg(long)]
    pub chunk_res: u8,

    /// Number of rings to buffer each cell by
    #[arg(short, default_value_t = DEFAULT_K)]
    pub k: u32,
}

/// Run the `bounds` command
pub fn run_bounds(args: BoundsArgs) -> Result<()> {
    let grid = H3Grid::new();
    let rect = bounds(&grid, args.hex_min, args.hex_max, args.chunk_res, args.k)
        .with_context(|| {
            format!(
                "Unable to compute bounds of range `{}'..`{}'",
                args.hex_min, args.hex_max
            )
        })?;

    let (min, max) = (rect.min(), rect.max());
    println!("{}\t{}\t{}\t{}", min.x, min.y, max.x, max.y);
    Ok(())
}
