use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use bincode::{Decode, Encode};

use crate::error::CodecError;

pub use self::h3::H3Grid;

pub mod h3;

/// The finest resolution of the hex grid
pub const MAX_RESOLUTION: u8 = 15;

/// Number of base cells covering the sphere
pub const BASE_CELL_COUNT: u8 = 122;

/// An opaque 64-bit cell identifier. Rendered in lowercase hex, which is
/// the usual string form of H3 indexes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Encode, Decode)]
pub struct CellId(pub u64);

impl Display for CellId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl FromStr for CellId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s.trim(), 16).map(CellId)
    }
}

impl From<u64> for CellId {
    fn from(value: u64) -> Self {
        CellId(value)
    }
}

/// A geographic position in degrees
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Checks that `resolution` lies within `[0, 15]`
pub(crate) fn check_resolution(resolution: u8) -> Result<(), CodecError> {
    if resolution > MAX_RESOLUTION {
        return Err(CodecError::InvalidResolutionOrder {
            base: resolution.min(MAX_RESOLUTION),
            target: resolution,
        });
    }
    Ok(())
}

/// Multi-resolution hex tree primitives the codec is built on. Child
/// enumeration is entirely up to the implementation; nothing in this crate
/// assumes that every cell has exactly seven children.
pub trait HexGrid: Send + Sync {
    /// Checks if `cell` is a valid cell at the given `resolution`
    fn is_valid(&self, cell: CellId, resolution: u8) -> bool;

    /// Returns the resolution of `cell`
    fn resolution(&self, cell: CellId) -> Result<u8, CodecError>;

    /// Returns the number of the base cell `cell` descends from
    fn base_cell(&self, cell: CellId) -> Result<u8, CodecError>;

    /// Returns the resolution-0 cell of the base cell with the given number
    fn base_cell_root(&self, base_cell: u8) -> Result<CellId, CodecError>;

    /// Returns the ancestor of `cell` at `resolution`. A cell is its own
    /// ancestor at its own resolution.
    fn parent(&self, cell: CellId, resolution: u8) -> Result<CellId, CodecError>;

    /// Returns all descendants of `cell` at `resolution`, in child position
    /// order
    fn children(&self, cell: CellId, resolution: u8) -> Result<Vec<CellId>, CodecError>;

    /// Returns the position of `child` among the descendants of its
    /// ancestor at `parent_resolution`
    fn child_position(&self, child: CellId, parent_resolution: u8) -> Result<u64, CodecError>;

    /// Returns the descendant of `parent` at `child_resolution` sitting at
    /// `position`, or `None` if there is no such descendant
    fn child_at_position(
        &self,
        parent: CellId,
        position: u64,
        child_resolution: u8,
    ) -> Result<Option<CellId>, CodecError>;

    /// Returns all cells within `k` grid steps of `cell` (including `cell`)
    fn grid_disk(&self, cell: CellId, k: u32) -> Result<Vec<CellId>, CodecError>;

    /// Returns the centroid of `cell`
    fn cell_to_latlng(&self, cell: CellId) -> Result<LatLng, CodecError>;

    /// Returns the boundary ring of `cell`
    fn cell_to_boundary(&self, cell: CellId) -> Result<Vec<LatLng>, CodecError>;

    /// Checks if `cell` is a pentagon. Pentagons have only six children.
    fn is_pentagon(&self, cell: CellId) -> Result<bool, CodecError>;
}
