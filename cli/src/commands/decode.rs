use anyhow::{Context, Result};
use clap::Args;
use hexpath_core::{
    grid::{CellId, H3Grid},
    path::{decode, PositionPath},
};

use super::Digits;

/// Convert a position path back into a cell
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// The anchor cell in hex notation
    pub anchor: CellId,

    /// One digit (0-6) per resolution below the anchor
    #[arg(default_value = "")]
    pub digits: Digits,

    /// The resolution to decode at (defaults to the path's resolution)
    #[arg(long)]
    pub target_res: Option<u8>,
}

/// Run the `decode` command
pub fn run_decode(args: DecodeArgs) -> Result<()> {
    let grid = H3Grid::new();
    let path = PositionPath::new(&grid, args.anchor, args.digits.0)?;
    let target_res = args.target_res.unwrap_or_else(|| path.resolution());

    let cell = decode(&grid, &path, target_res)
        .with_context(|| format!("Unable to decode path `{path}'"))?;

    println!("{cell}");
    Ok(())
}
