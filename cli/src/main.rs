use clap::{Parser, Subcommand};
use commands::{
    bounds::{run_bounds, BoundsArgs},
    build::{run_build, BuildArgs},
    decode::{run_decode, DecodeArgs},
    encode::{run_encode, EncodeArgs},
    pack::{run_pack, PackArgs},
    query::{run_query, QueryArgs},
    unpack::{run_unpack, UnpackArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(author, version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Encode(EncodeArgs),
    Decode(DecodeArgs),
    Pack(PackArgs),
    Unpack(UnpackArgs),
    Bounds(BoundsArgs),
    Build(BuildArgs),
    Query(QueryArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Encode(args) => run_encode(args),
        Commands::Decode(args) => run_decode(args),
        Commands::Pack(args) => run_pack(args),
        Commands::Unpack(args) => run_unpack(args),
        Commands::Bounds(args) => run_bounds(args),
        Commands::Build(args) => run_build(args),
        Commands::Query(args) => run_query(args),
    }
}
