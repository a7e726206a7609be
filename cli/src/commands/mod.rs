use std::{fmt::Display, str::FromStr};

use hexpath_core::{chunk::ChunkBound, path::MAX_DIGIT};
use yansi::{Condition, Paint};

pub mod bounds;
pub mod build;
pub mod decode;
pub mod encode;
pub mod pack;
pub mod query;
pub mod unpack;

/// A digit sequence given as a string such as `0316`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Digits(pub Vec<u8>);

impl FromStr for Digits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.bytes()
            .map(|c| match c.wrapping_sub(b'0') {
                d if d <= MAX_DIGIT => Ok(d),
                _ => Err(format!(
                    "invalid digit `{}' (expected 0-{MAX_DIGIT})",
                    c as char
                )),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Digits)
    }
}

/// Renders a record as a tab-separated line
pub fn format_bound(bound: &ChunkBound) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        bound.file_id,
        bound.chunk_id,
        bound.bbox_minx,
        bound.bbox_miny,
        bound.bbox_maxx,
        bound.bbox_maxy
    )
}

/// Formats an error message for stderr, coloured if stderr is a terminal
pub fn paint_error(msg: impl Display) -> String {
    let label = "error:".red().bold().whenever(Condition::from(|| {
        Condition::stderr_is_tty() && Condition::clicolor() && Condition::no_color()
    }));
    format!("{label} {msg}")
}
