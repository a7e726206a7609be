use std::str::FromStr;

use bincode::{Decode, Encode};
use geo::{coord, LineString, Polygon, Rect};
use thiserror::Error;

use crate::{error::CodecError, grid::CellId};

pub use self::builder::{BuilderConfig, ChunkBoundsBuilder};

pub mod builder;

/// Per-chunk statistics recorded while a file was written: the smallest and
/// the largest cell (in child position order) stored in the chunk
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ChunkStat {
    pub file_id: String,
    pub chunk_id: u64,
    pub hex_min: CellId,
    pub hex_max: CellId,

    /// The resolution the file was partitioned at. Every chunk holds cells
    /// below exactly one cell of this resolution.
    pub file_resolution: u8,
}

/// The bounding box of one storage chunk
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
pub struct ChunkBound {
    pub file_id: String,
    pub chunk_id: u64,
    pub bbox_minx: f64,
    pub bbox_miny: f64,
    pub bbox_maxx: f64,
    pub bbox_maxy: f64,

    /// The box as a closed ring of `(x, y)` coordinates
    pub geometry: Vec<(f64, f64)>,
}

impl ChunkBound {
    /// Creates a new record for the given chunk and bounding box
    pub fn new(file_id: String, chunk_id: u64, rect: Rect) -> Self {
        let (min, max) = (rect.min(), rect.max());
        let geometry = vec![
            (min.x, min.y),
            (max.x, min.y),
            (max.x, max.y),
            (min.x, max.y),
            (min.x, min.y),
        ];
        Self {
            file_id,
            chunk_id,
            bbox_minx: min.x,
            bbox_miny: min.y,
            bbox_maxx: max.x,
            bbox_maxy: max.y,
            geometry,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            coord! { x: self.bbox_minx, y: self.bbox_miny },
            coord! { x: self.bbox_maxx, y: self.bbox_maxy },
        )
    }

    pub fn polygon(&self) -> Polygon {
        Polygon::new(LineString::from(self.geometry.clone()), vec![])
    }
}

/// A chunk whose bounds could not be computed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unable to compute bounds of chunk {chunk_id} in file `{file_id}': {source}")]
pub struct ChunkError {
    pub file_id: String,
    pub chunk_id: u64,
    pub source: CodecError,
}

/// A line that could not be parsed into a [`ChunkStat`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatParseError {
    #[error("expected 5 fields (file_id, chunk_id, hex_min, hex_max, file_resolution), got {0}")]
    FieldCount(usize),

    #[error("invalid {field} `{value}'")]
    InvalidField { field: &'static str, value: String },
}

fn parse_field<T: FromStr>(field: &'static str, value: &str) -> Result<T, StatParseError> {
    value.parse().map_err(|_| StatParseError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// Parses a tab-separated line `file_id chunk_id hex_min hex_max
/// file_resolution`. Cells are given in hex.
impl FromStr for ChunkStat {
    type Err = StatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s.trim_end_matches(['\r', '\n']).split('\t').collect::<Vec<_>>();
        let &[file_id, chunk_id, hex_min, hex_max, file_resolution] = fields.as_slice() else {
            return Err(StatParseError::FieldCount(fields.len()));
        };
        if file_id.is_empty() {
            return Err(StatParseError::InvalidField {
                field: "file_id",
                value: String::new(),
            });
        }
        Ok(ChunkStat {
            file_id: file_id.to_string(),
            chunk_id: parse_field("chunk_id", chunk_id.trim())?,
            hex_min: parse_field("hex_min", hex_min)?,
            hex_max: parse_field("hex_max", hex_max)?,
            file_resolution: parse_field("file_resolution", file_resolution.trim())?,
        })
    }
}
