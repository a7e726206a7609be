use anyhow::{Context, Result};
use clap::Args;
use hexpath_core::{
    grid::{CellId, H3Grid, HexGrid},
    packed_key::pack,
    path::encode,
};

/// Convert a cell into a position path and a packed key
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// The cell in hex notation
    pub cell: CellId,

    /// The resolution to anchor the path at
    #[arg(long, default_value_t = 0)]
    pub base_res: u8,

    /// The resolution of the cell (defaults to its actual resolution)
    #[arg(long)]
    pub target_res: Option<u8>,
}

/// Run the `encode` command
pub fn run_encode(args: EncodeArgs) -> Result<()> {
    let grid = H3Grid::new();
    let target_res = match args.target_res {
        Some(r) => r,
        None => grid.resolution(args.cell)?,
    };

    let path = encode(&grid, args.cell, target_res, args.base_res)
        .with_context(|| format!("Unable to encode cell `{}'", args.cell))?;
    let key = pack(&grid, &path)?;

    println!("{path}\t{key}");
    Ok(())
}
