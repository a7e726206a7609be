use anyhow::{Context, Result};
use clap::Args;
use hexpath_core::{
    grid::H3Grid,
    packed_key::{KeyPacker, DEFAULT_MAX_DEPTH},
    path::decode,
};

/// Unpack an integer key into a position path and its cell
#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// The packed key
    pub key: u64,

    /// The number of digits the key was packed with
    pub depth: u8,

    /// The width of the digit section
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: u8,
}

/// Run the `unpack` command
pub fn run_unpack(args: UnpackArgs) -> Result<()> {
    let grid = H3Grid::new();
    let packer = KeyPacker::new(args.max_depth)?;
    let path = packer
        .unpack(&grid, args.key, args.depth)
        .with_context(|| format!("Unable to unpack key {}", args.key))?;
    let cell = decode(&grid, &path, path.resolution())?;

    println!("{path}\t{cell}");
    Ok(())
}
