use anyhow::Result;
use clap::Args;
use hexpath_core::{
    grid::H3Grid,
    packed_key::{KeyPacker, DEFAULT_MAX_DEPTH},
    path::PositionPath,
};

use super::Digits;

/// Pack a root-anchored position path into an integer key
#[derive(Args, Debug)]
pub struct PackArgs {
    /// The number of the base cell
    pub base_cell: u8,

    /// One digit (0-6) per resolution below the base cell
    #[arg(default_value = "")]
    pub digits: Digits,

    /// The width of the digit section
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: u8,

    /// Also print the key interval covering all descendants of the path
    #[arg(long)]
    pub range: bool,
}

/// Run the `pack` command
pub fn run_pack(args: PackArgs) -> Result<()> {
    let grid = H3Grid::new();
    let packer = KeyPacker::new(args.max_depth)?;
    let path = PositionPath::from_base_cell(&grid, args.base_cell, args.digits.0)?;
    if args.range {
        let range = packer.range(&grid, &path)?;
        println!("{}\t{}", range.lo, range.hi);
    } else {
        println!("{}", packer.pack(&grid, &path)?);
    }
    Ok(())
}
